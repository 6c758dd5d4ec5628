//! Pruning lineage tracker
//!
//! Keeps a live ancestry tree and compacts it as organisms die, so memory
//! tracks the surviving diversity instead of the full history. A node survives
//! exactly as long as it is alive or lies on the path from the root to some
//! living organism; everything else is unlinked, its genome reference
//! released, and its record dropped, the moment the last descendant line dies.
//!
//! The tracker also maintains the coalescence point: the most recent ancestor
//! from which every living lineage descends. Whenever pruning unwinds back to
//! the coalescence point and leaves it a single surviving branch, the point is
//! advanced down that branch, keeping future traces short.

use std::collections::HashMap;
use std::sync::Arc;

use log::trace;

use crate::lineage::store::GenomeStore;
use crate::lineage::{LineageTracker, Pending, SlotMap};
use crate::organism::Organism;

/// The root sentinel's id: always present, never alive, its own parent.
const ROOT: usize = 0;

#[derive(Clone, Debug)]
struct Node<O> {
    parent: usize,
    alive: bool,
    /// `None` only for the root sentinel.
    genome: Option<Arc<O>>,
    /// Children that still have surviving descendants.
    children: Vec<usize>,
}

/// Lineage tracker that prunes dead, descendant-less branches on the fly.
#[derive(Clone, Debug)]
pub struct PrunedTracker<O: Organism> {
    nodes: HashMap<usize, Node<O>>,
    genomes: GenomeStore<O>,
    next_id: usize,
    last_coalescence: usize,
    slot_map: SlotMap,
    next_parent: Option<usize>,
    pending: Option<Pending>,
}

impl<O: Organism> Default for PrunedTracker<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Organism> PrunedTracker<O> {
    /// Create an empty tracker holding only the root sentinel.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT,
            Node {
                parent: ROOT,
                alive: false,
                genome: None,
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            genomes: GenomeStore::new(),
            next_id: 1,
            last_coalescence: ROOT,
            slot_map: SlotMap::default(),
            next_parent: None,
            pending: None,
        }
    }

    fn add_organism(&mut self, genome: &O, parent: usize) -> usize {
        assert!(
            self.nodes.contains_key(&parent),
            "parent id {} is no longer retained (reproduction recorded from a pruned organism)",
            parent
        );
        let id = self.next_id;
        self.next_id += 1;
        let shared = self.genomes.acquire(genome);
        self.nodes.insert(
            id,
            Node {
                parent,
                alive: true,
                genome: Some(shared),
                children: Vec::new(),
            },
        );
        self.nodes
            .get_mut(&parent)
            .expect("parent node present")
            .children
            .push(id);
        id
    }

    /// Remove `id` from the arena: unlink it from its parent's child list and
    /// release its genome reference. Returns the parent's id.
    fn remove_node(&mut self, id: usize) -> usize {
        let node = self.nodes.remove(&id).expect("node missing from arena");
        let siblings = &mut self
            .nodes
            .get_mut(&node.parent)
            .expect("parent node missing from arena")
            .children;
        siblings.retain(|&child| child != id);
        let genome = node.genome.expect("non-root node without a genome");
        self.genomes.release(&genome);
        node.parent
    }

    /// Id of the most recent common ancestor of all living lineages found so
    /// far. Starts at the root and only ever moves toward the present.
    pub fn last_coalescence(&self) -> usize {
        self.last_coalescence
    }

    /// Number of nodes currently retained, the root sentinel included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct genome values currently retained.
    pub fn genome_count(&self) -> usize {
        self.genomes.len()
    }

    /// Reference count of a genome value (zero when not retained).
    pub fn genome_ref_count(&self, genome: &O) -> usize {
        self.genomes.ref_count(genome)
    }

    /// True when `id` is currently retained.
    pub fn contains(&self, id: usize) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Ids of all retained nodes, the root sentinel included.
    pub fn node_ids(&self) -> Vec<usize> {
        self.nodes.keys().copied().collect()
    }

    /// Whether the node `id` currently occupies a population slot.
    pub fn is_alive(&self, id: usize) -> bool {
        self.nodes.get(&id).map(|n| n.alive).unwrap_or(false)
    }

    /// Parent id of `id`, if retained.
    pub fn parent_of(&self, id: usize) -> Option<usize> {
        self.nodes.get(&id).map(|n| n.parent)
    }

    /// Children of `id` that still have surviving descendants, if retained.
    pub fn children_of(&self, id: usize) -> Option<&[usize]> {
        self.nodes.get(&id).map(|n| n.children.as_slice())
    }

    /// Genome of `id`, if retained (`None` for the root sentinel).
    pub fn genome_of(&self, id: usize) -> Option<&O> {
        self.nodes
            .get(&id)
            .and_then(|n| n.genome.as_deref())
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

    /// Ancestor ids of `id`, newest first, ending at the last ancestor before
    /// the root. Panics when `id` is not retained.
    pub fn trace_lineage_ids(&self, id: usize) -> Vec<usize> {
        assert!(
            self.nodes.contains_key(&id),
            "invalid lineage id {} passed to trace_lineage_ids",
            id
        );
        let mut lineage = Vec::new();
        let mut id = id;
        while id != ROOT {
            lineage.push(id);
            id = self.nodes[&id].parent;
        }
        lineage
    }

    /// Ancestor genomes of `id`, newest first. Panics when `id` is not
    /// retained.
    pub fn trace_lineage(&self, id: usize) -> Vec<O> {
        self.trace_lineage_ids(id)
            .into_iter()
            .map(|id| {
                (**self.nodes[&id]
                    .genome
                    .as_ref()
                    .expect("non-root node without a genome"))
                .clone()
            })
            .collect()
    }
}

impl<O: Organism> LineageTracker<O> for PrunedTracker<O> {
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
        let id = self.add_organism(genome, ROOT);
        self.pending = Some(Pending { id, injected: true });
    }

    fn on_placement(&mut self, slot: usize) {
        let pending = self
            .pending
            .take()
            .expect("placement notified with no pending organism");

        // The organism previously at this slot is no longer alive.
        let mut curr = self.slot_map.occupant(slot);
        self.nodes
            .get_mut(&curr)
            .expect("displaced node missing from arena")
            .alive = false;

        // Unwind: a dead node with no surviving offspring lines is garbage,
        // and removing it may strand its parent in the same state, and so on
        // up the tree. The root sentinel is never removed.
        while curr != ROOT {
            let node = &self.nodes[&curr];
            if node.alive || !node.children.is_empty() {
                break;
            }
            curr = self.remove_node(curr);
        }

        // If the unwind came back to the coalescence point and left it a
        // single surviving branch, the point moves down that branch. Injected
        // organisms are founders, not descendants, and never advance it.
        if !pending.injected {
            while curr == self.last_coalescence {
                let node = &self.nodes[&curr];
                if node.alive || node.children.len() != 1 {
                    break;
                }
                curr = node.children[0];
                self.last_coalescence = curr;
                trace!("coalescence advanced to {}", curr);
            }
        }

        self.slot_map.record(slot, pending.id, pending.injected);
    }

    fn on_generation_advance(&mut self, _generation: usize) {
        self.slot_map.advance_generation();
    }
}
