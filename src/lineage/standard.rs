//! Standard lineage tracker
//!
//! Maintains a record of every organism that ever existed: its id, its genome
//! (deduplicated in a shared store), and its parent's id. Tracing walks the
//! parent chain back to the root. Nothing is ever forgotten, so memory grows
//! without bound; the [`PrunedTracker`](crate::lineage::PrunedTracker) exists
//! for runs where that matters.

use std::collections::HashMap;
use std::sync::Arc;

use crate::lineage::store::GenomeStore;
use crate::lineage::{LineageTracker, Pending, SlotMap};
use crate::organism::Organism;

/// Lineage tracker retaining the full ancestry of every organism ever seen.
#[derive(Clone, Debug)]
pub struct StandardTracker<O: Organism> {
    genomes: GenomeStore<O>,
    org_to_genome: HashMap<usize, Arc<O>>,
    parents: HashMap<usize, usize>,
    next_id: usize,
    slot_map: SlotMap,
    next_parent: Option<usize>,
    pending: Option<Pending>,
}

impl<O: Organism> Default for StandardTracker<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Organism> StandardTracker<O> {
    /// Create an empty tracker. Ids are assigned from 1; 0 means "no parent".
    pub fn new() -> Self {
        Self {
            genomes: GenomeStore::new(),
            org_to_genome: HashMap::new(),
            parents: HashMap::new(),
            next_id: 1,
            slot_map: SlotMap::default(),
            next_parent: None,
            pending: None,
        }
    }

    fn add_organism(&mut self, genome: &O, parent: usize) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        let shared = self.genomes.acquire(genome);
        self.org_to_genome.insert(id, shared);
        self.parents.insert(id, parent);
        id
    }

    /// Number of organisms recorded so far.
    pub fn num_tracked(&self) -> usize {
        self.parents.len()
    }

    /// True when `id` has been recorded.
    pub fn contains(&self, id: usize) -> bool {
        self.parents.contains_key(&id)
    }

    /// Lineage id of the organism currently mapped at `slot` (0 when the slot
    /// has never been occupied).
    pub fn id_at(&self, slot: usize) -> usize {
        self.slot_map.current_ids().get(slot).copied().unwrap_or(0)
    }

    /// The current slot-to-id map.
    pub fn current_ids(&self) -> &[usize] {
        self.slot_map.current_ids()
    }

    /// Parent id of `id`, if recorded.
    pub fn parent_of(&self, id: usize) -> Option<usize> {
        self.parents.get(&id).copied()
    }

    /// The deduplicated genome store.
    pub fn genome_store(&self) -> &GenomeStore<O> {
        &self.genomes
    }

    /// Ancestor ids of `id`, newest first, ending at the last ancestor before
    /// the root. Panics when `id` was never recorded.
    pub fn trace_lineage_ids(&self, id: usize) -> Vec<usize> {
        assert!(
            self.parents.contains_key(&id),
            "invalid lineage id {} passed to trace_lineage_ids",
            id
        );
        let mut lineage = Vec::new();
        let mut id = id;
        while id != 0 {
            lineage.push(id);
            id = self.parents[&id];
        }
        lineage
    }

    /// Ancestor genomes of `id`, newest first. Panics when `id` was never
    /// recorded.
    pub fn trace_lineage(&self, id: usize) -> Vec<O> {
        self.trace_lineage_ids(id)
            .into_iter()
            .map(|id| (*self.org_to_genome[&id]).clone())
            .collect()
    }

    /// The ancestor exactly `generations` steps back from `id` (0 steps is
    /// `id` itself). Panics when the chain is shorter than that.
    ///
    /// Together with [`persistent_ancestors`](Self::persistent_ancestors) this
    /// backs persistence statistics: which lineages survived a fixed span.
    pub fn ancestor_at_depth(&self, id: usize, generations: usize) -> usize {
        let lineage = self.trace_lineage_ids(id);
        assert!(
            generations < lineage.len(),
            "lineage of {} is only {} long, cannot look back {} generations",
            id,
            lineage.len(),
            generations
        );
        lineage[generations]
    }

    /// Which ids of a past snapshot have descendants in a current snapshot.
    ///
    /// For each id in `current`, walks its ancestor chain and reports the
    /// first ancestor found in `previous`. Ids are reported once per current
    /// descendant line, in `current` order.
    pub fn persistent_ancestors(&self, current: &[usize], previous: &[usize]) -> Vec<usize> {
        let mut persist = Vec::new();
        for &start in current {
            let mut id = start;
            while id != 0 {
                if previous.contains(&id) {
                    persist.push(id);
                    break;
                }
                id = self.parents[&id];
            }
        }
        persist
    }

    /// Genome-valued variant of [`persistent_ancestors`](Self::persistent_ancestors).
    pub fn persistent_ancestor_genomes(&self, current: &[usize], previous: &[usize]) -> Vec<O> {
        self.persistent_ancestors(current, previous)
            .into_iter()
            .map(|id| (*self.org_to_genome[&id]).clone())
            .collect()
    }
}

impl<O: Organism> LineageTracker<O> for StandardTracker<O> {
    fn configure(&mut self, separate_generations: bool) {
        self.slot_map.configure(separate_generations);
    }

    fn on_before_reproduction(&mut self, parent_slot: usize) {
        self.next_parent = Some(self.slot_map.parent_id(parent_slot));
    }

    fn on_offspring_ready(&mut self, genome: &O) {
        assert!(
            self.pending.is_none(),
            "offspring ready before the previous organism was placed"
        );
        let parent = self
            .next_parent
            .take()
            .expect("offspring ready without a recorded parent");
        let id = self.add_organism(genome, parent);
        self.pending = Some(Pending {
            id,
            injected: false,
        });
    }

    fn on_injection_ready(&mut self, genome: &O) {
        assert!(
            self.pending.is_none(),
            "injection ready before the previous organism was placed"
        );
        let id = self.add_organism(genome, 0);
        self.pending = Some(Pending { id, injected: true });
    }

    fn on_placement(&mut self, slot: usize) {
        let pending = self
            .pending
            .take()
            .expect("placement notified with no pending organism");
        self.slot_map.record(slot, pending.id, pending.injected);
    }

    fn on_generation_advance(&mut self, _generation: usize) {
        self.slot_map.advance_generation();
    }
}
