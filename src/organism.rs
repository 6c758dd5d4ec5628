//! Organism abstraction
//!
//! The population core treats organisms as opaque values. Anything cloneable
//! and totally ordered qualifies; the ordering is what lets the lineage
//! trackers deduplicate genomes in a sorted store.

use rand::Rng;

/// An organism (equivalently, its genome) as seen by the population core.
///
/// Implemented automatically for every `Clone + Ord + 'static` type, so plain
/// value types (`u32`, `Vec<u8>`, a bit-string genome, ...) work unchanged.
pub trait Organism: Clone + Ord + 'static {}

impl<T: Clone + Ord + 'static> Organism for T {}

/// Optional fitness capability.
///
/// Organisms that know their own fitness can be hooked into a
/// [`World`](crate::world::World) as the default fitness function via
/// [`use_fitness_capability`](crate::world::World::use_fitness_capability);
/// otherwise selection methods take an explicit closure.
pub trait Fitness {
    /// Fitness of this organism; higher is better.
    fn fitness(&self) -> f64;
}

/// Optional self-mutation capability.
///
/// The counterpart of [`Fitness`] for the mutation pass; hook it in with
/// [`use_mutate_capability`](crate::world::World::use_mutate_capability).
pub trait Mutate {
    /// Mutate this organism in place. Returns true if anything changed.
    fn mutate<R: Rng>(&mut self, rng: &mut R) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
    struct BitOrg(Vec<bool>);

    impl Fitness for BitOrg {
        fn fitness(&self) -> f64 {
            self.0.iter().filter(|&&b| b).count() as f64
        }
    }

    impl Mutate for BitOrg {
        fn mutate<R: Rng>(&mut self, rng: &mut R) -> bool {
            if self.0.is_empty() {
                return false;
            }
            let i = rng.gen_range(0..self.0.len());
            self.0[i] = !self.0[i];
            true
        }
    }

    #[test]
    fn test_fitness_capability() {
        let org = BitOrg(vec![true, false, true]);
        assert_eq!(org.fitness(), 2.0);
    }

    #[test]
    fn test_mutate_capability_flips_one_bit() {
        let mut rng = StdRng::seed_from_u64(7);
        let original = BitOrg(vec![true, false, true, false]);
        let mut org = original.clone();

        assert!(org.mutate(&mut rng));
        let diffs = org
            .0
            .iter()
            .zip(original.0.iter())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(diffs, 1);
    }

    #[test]
    fn test_plain_values_are_organisms() {
        fn takes_organism<O: Organism>(_org: &O) {}
        takes_organism(&42_u32);
        takes_organism(&String::from("acgt"));
    }
}
