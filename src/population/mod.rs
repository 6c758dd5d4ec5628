//! Population managers
//!
//! A population manager owns the living organism slots and the policy for
//! inserting new organisms, either from outside the population ("inject") or
//! from in-population reproduction ("birth"). The five built-in managers share
//! one contract and differ only in placement policy:
//!
//! - [`BasicManager`]: births replace a uniformly random slot, in place.
//! - [`GenerationalManager`]: births accumulate in a buffer swapped in at the
//!   generation boundary (synchronous generations).
//! - [`SerialTransferManager`]: births append; a full population is bottlenecked
//!   down first (serial-dilution culture).
//! - [`GridManager`]: births land in the parent's toroidal Moore neighborhood.
//! - [`PoolsManager`]: births may migrate between connected pools.

mod basic;
mod generational;
mod grid;
mod pools;
mod serial;

pub use basic::BasicManager;
pub use generational::GenerationalManager;
pub use grid::GridManager;
pub use pools::{PoolSizes, PoolsConfig, PoolsManager};
pub use serial::{SerialTransferConfig, SerialTransferManager};

use log::debug;
use rand::Rng;

use crate::organism::Organism;

/// Contract shared by every population manager.
///
/// `add_org` and `add_org_birth` are the only ways organisms enter a
/// population; both return the assigned slot index. Placement policies that
/// replace an occupant destroy it. Randomized operations take the random
/// source per call, so a manager can never be used without one.
pub trait PopulationManager<O: Organism> {
    /// True when births accumulate in a separate generation buffer that
    /// [`update`](Self::update) swaps in atomically.
    const SEPARATE_GENERATIONS: bool = false;

    /// The organism slots; an empty slot holds no organism.
    fn slots(&self) -> &[Option<O>];

    /// Mutable access to the slot storage.
    fn slots_mut(&mut self) -> &mut Vec<Option<O>>;

    /// Insert an organism supplied from outside the population.
    fn add_org<R: Rng>(&mut self, org: O, rng: &mut R) -> usize;

    /// Insert an offspring produced by reproduction at `parent_slot`.
    fn add_org_birth<R: Rng>(&mut self, org: O, parent_slot: usize, rng: &mut R) -> usize;

    /// Advance manager-internal state between generations.
    fn update(&mut self) {}

    /// Destroy all organisms and empty the population.
    fn clear(&mut self) {
        self.slots_mut().clear();
    }

    /// Shrink the population to `new_size`, destroying the excess.
    ///
    /// With `randomize` set, survivors are a uniform random subset (a partial
    /// front shuffle keeps `new_size` random entries in place before the tail
    /// is dropped); otherwise the first `new_size` slots survive. No-op if the
    /// population is already at or below the target size.
    fn do_bottleneck<R: Rng>(&mut self, new_size: usize, randomize: bool, rng: &mut R) {
        let slots = self.slots_mut();
        if new_size >= slots.len() {
            return;
        }
        if randomize {
            for i in 0..new_size {
                let j = rng.gen_range(i..slots.len());
                slots.swap(i, j);
            }
        }
        let old_len = slots.len();
        slots.truncate(new_size);
        debug!("bottleneck: population {} -> {}", old_len, new_size);
    }

    /// Number of slots, occupied or not.
    fn len(&self) -> usize {
        self.slots().len()
    }

    /// True when there are no slots at all.
    fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    /// Number of occupied slots.
    fn num_orgs(&self) -> usize {
        self.slots().iter().filter(|s| s.is_some()).count()
    }

    /// The organism at `slot`, if the slot exists and is occupied.
    fn get(&self, slot: usize) -> Option<&O> {
        self.slots().get(slot).and_then(|s| s.as_ref())
    }

    /// Mutable access to the organism at `slot`.
    fn get_mut(&mut self, slot: usize) -> Option<&mut O> {
        self.slots_mut().get_mut(slot).and_then(|s| s.as_mut())
    }

    /// Iterator over the occupied slots' organisms.
    fn organisms(&self) -> std::iter::Flatten<std::slice::Iter<'_, Option<O>>> {
        self.slots().iter().flatten()
    }

    /// Indices of occupied slots, in slot order.
    fn occupied_slots(&self) -> Vec<usize> {
        self.slots()
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| i))
            .collect()
    }
}
