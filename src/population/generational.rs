//! Synchronous-generations population manager
//!
//! The classic evolutionary-algorithm setup: births accumulate in a pending
//! generation buffer while the live population stays untouched, then
//! [`update`](crate::population::PopulationManager::update) swaps the buffer in
//! atomically. No partially-replaced population is ever observable
//! mid-generation.

use log::debug;
use rand::Rng;

use crate::organism::Organism;
use crate::population::PopulationManager;

/// Population manager with synchronous, non-overlapping generations.
#[derive(Clone, Debug)]
pub struct GenerationalManager<O: Organism> {
    slots: Vec<Option<O>>,
    next_gen: Vec<Option<O>>,
}

impl<O: Organism> Default for GenerationalManager<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Organism> GenerationalManager<O> {
    /// Create an empty population.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_gen: Vec::new(),
        }
    }

    /// Number of offspring accumulated for the next generation so far.
    pub fn pending_len(&self) -> usize {
        self.next_gen.len()
    }

    /// The pending generation buffer.
    pub fn pending_slots(&self) -> &[Option<O>] {
        &self.next_gen
    }
}

impl<O: Organism> PopulationManager<O> for GenerationalManager<O> {
    const SEPARATE_GENERATIONS: bool = true;

    fn slots(&self) -> &[Option<O>] {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut Vec<Option<O>> {
        &mut self.slots
    }

    fn add_org<R: Rng>(&mut self, org: O, _rng: &mut R) -> usize {
        let pos = self.slots.len();
        self.slots.push(Some(org));
        pos
    }

    /// Births go into the pending buffer; the returned slot indexes into the
    /// next generation, not the live one.
    fn add_org_birth<R: Rng>(&mut self, org: O, _parent_slot: usize, _rng: &mut R) -> usize {
        let pos = self.next_gen.len();
        self.next_gen.push(Some(org));
        pos
    }

    fn update(&mut self) {
        debug!(
            "generation swap: {} live -> {} pending",
            self.slots.len(),
            self.next_gen.len()
        );
        self.slots = std::mem::take(&mut self.next_gen);
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.next_gen.clear();
    }
}
