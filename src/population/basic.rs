//! Basic population manager
//!
//! Single generation, modified in place. Injections append; births replace a
//! uniformly random slot.

use rand::Rng;

use crate::organism::Organism;
use crate::population::PopulationManager;

/// The simplest population manager: a growable vector of slots.
#[derive(Clone, Debug)]
pub struct BasicManager<O: Organism> {
    slots: Vec<Option<O>>,
}

impl<O: Organism> Default for BasicManager<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Organism> BasicManager<O> {
    /// Create an empty population.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Create an empty population with room for `capacity` organisms.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }
}

impl<O: Organism> PopulationManager<O> for BasicManager<O> {
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

    fn add_org_birth<R: Rng>(&mut self, org: O, _parent_slot: usize, rng: &mut R) -> usize {
        assert!(
            !self.slots.is_empty(),
            "add_org_birth called on an empty population"
        );
        let pos = rng.gen_range(0..self.slots.len());
        self.slots[pos] = Some(org);
        pos
    }
}
