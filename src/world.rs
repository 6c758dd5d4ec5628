//! World orchestrator
//!
//! A [`World`] owns one population manager and (optionally) one lineage
//! tracker, and drives everything that happens to a population: insertion of
//! founders, reproduction, the mutation pass, the selection algorithms, and
//! the generational update. All randomness flows through one seeded generator
//! owned by the world.
//!
//! Every insertion notifies the lineage tracker in a fixed order: parent
//! recorded (births only), then offspring/injection ready, then placement.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::lineage::{LineageTracker, NullTracker};
use crate::organism::{Fitness, Mutate, Organism};
use crate::population::PopulationManager;

/// Orchestrator for a single evolving population.
///
/// `M` decides where organisms live and how offspring are placed; `L` observes
/// every event and maintains ancestry (defaulting to no tracking at all).
pub struct World<O, M, L = NullTracker>
where
    O: Organism,
    M: PopulationManager<O>,
    L: LineageTracker<O>,
{
    pop: M,
    lineage: L,
    rng: StdRng,
    generation: usize,
    /// First slot touched by the mutation pass. Defaults to 1: slot 0 is
    /// conventionally exempt (see `set_mutate_start`).
    mutate_start: usize,
    default_fitness: Option<Box<dyn Fn(&O) -> f64>>,
    default_mutation: Option<Box<dyn Fn(&mut O, &mut StdRng) -> bool>>,
}

impl<O, M> World<O, M>
where
    O: Organism,
    M: PopulationManager<O>,
{
    /// Create a world with no lineage tracking.
    pub fn new(pop: M, seed: u64) -> Self {
        Self::with_tracker(pop, NullTracker, seed)
    }
}

impl<O, M, L> World<O, M, L>
where
    O: Organism,
    M: PopulationManager<O>,
    L: LineageTracker<O>,
{
    /// Create a world around `pop`, observed by `lineage`, with a
    /// deterministic random seed.
    ///
    /// The tracker is configured with the manager's generation-separation mode
    /// so its slot bookkeeping mirrors the manager's buffering.
    pub fn with_tracker(pop: M, mut lineage: L, seed: u64) -> Self {
        lineage.configure(M::SEPARATE_GENERATIONS);
        Self {
            pop,
            lineage,
            rng: StdRng::seed_from_u64(seed),
            generation: 0,
            mutate_start: 1,
            default_fitness: None,
            default_mutation: None,
        }
    }

    /// The population manager.
    pub fn pop(&self) -> &M {
        &self.pop
    }

    /// Mutable access to the population manager.
    pub fn pop_mut(&mut self) -> &mut M {
        &mut self.pop
    }

    /// The lineage tracker.
    pub fn lineage(&self) -> &L {
        &self.lineage
    }

    /// Mutable access to the lineage tracker.
    pub fn lineage_mut(&mut self) -> &mut L {
        &mut self.lineage
    }

    /// Number of slots in the population.
    pub fn size(&self) -> usize {
        self.pop.len()
    }

    /// Number of occupied slots.
    pub fn num_orgs(&self) -> usize {
        self.pop.num_orgs()
    }

    /// The organism at `slot`, if occupied.
    pub fn get(&self, slot: usize) -> Option<&O> {
        self.pop.get(slot)
    }

    /// Completed generation count.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Destroy all organisms in the population.
    pub fn clear(&mut self) {
        self.pop.clear();
    }

    /// Set the default fitness function used by the `_default` selection
    /// variants.
    pub fn set_default_fitness_fun<F>(&mut self, fit_fun: F)
    where
        F: Fn(&O) -> f64 + 'static,
    {
        self.default_fitness = Some(Box::new(fit_fun));
    }

    /// Set the default mutation function used by
    /// [`mutate_pop_default`](Self::mutate_pop_default).
    pub fn set_default_mutation_fun<F>(&mut self, mut_fun: F)
    where
        F: Fn(&mut O, &mut StdRng) -> bool + 'static,
    {
        self.default_mutation = Some(Box::new(mut_fun));
    }

    /// Use the organism's own [`Fitness`] capability as the default fitness
    /// function.
    pub fn use_fitness_capability(&mut self)
    where
        O: Fitness,
    {
        self.set_default_fitness_fun(|org: &O| org.fitness());
    }

    /// Use the organism's own [`Mutate`] capability as the default mutation
    /// function.
    pub fn use_mutate_capability(&mut self)
    where
        O: Mutate,
    {
        self.set_default_mutation_fun(|org: &mut O, rng: &mut StdRng| org.mutate(rng));
    }

    /// Change which slot the mutation pass starts from.
    ///
    /// The inherited default of 1 exempts slot 0, historically the ancestor
    /// slot, though it is unclear whether that was deliberate. Pass 0 to
    /// mutate the whole population.
    pub fn set_mutate_start(&mut self, first_slot: usize) {
        self.mutate_start = first_slot;
    }

    /// Insert `copy_count` copies of an organism from outside the population.
    pub fn insert(&mut self, org: &O, copy_count: usize) {
        for _ in 0..copy_count {
            self.lineage.on_injection_ready(org);
            let pos = self.pop.add_org(org.clone(), &mut self.rng);
            self.lineage.on_placement(pos);
        }
    }

    /// Insert `copy_count` copies of an offspring born to the organism at
    /// `parent_slot`.
    pub fn insert_birth(&mut self, org: &O, parent_slot: usize, copy_count: usize) {
        for _ in 0..copy_count {
            self.lineage.on_before_reproduction(parent_slot);
            self.lineage.on_offspring_ready(org);
            let pos = self.pop.add_org_birth(org.clone(), parent_slot, &mut self.rng);
            self.lineage.on_placement(pos);
        }
    }

    /// Apply `mut_fun` to every organism from the configured start slot on,
    /// returning how many reported a change.
    pub fn mutate_pop<F>(&mut self, mut mut_fun: F) -> usize
    where
        F: FnMut(&mut O, &mut StdRng) -> bool,
    {
        let mut mutated = 0;
        for slot in self.mutate_start..self.pop.len() {
            if let Some(org) = self.pop.get_mut(slot) {
                if mut_fun(org, &mut self.rng) {
                    mutated += 1;
                }
            }
        }
        mutated
    }

    /// [`mutate_pop`](Self::mutate_pop) with the configured default mutation
    /// function. Panics when none is configured.
    pub fn mutate_pop_default(&mut self) -> usize {
        let mut_fun = self
            .default_mutation
            .take()
            .expect("no default mutation function configured");
        let mutated = self.mutate_pop(|org, rng| mut_fun(org, rng));
        self.default_mutation = Some(mut_fun);
        mutated
    }

    /// Elite selection: rank all organisms by fitness (a stable ranking, so
    /// ties keep slot order), take the top `e_count`, and birth `copy_count`
    /// copies of each into the next generation.
    ///
    /// The elites are cloned before any birth is placed, so in-place managers
    /// cannot displace one elite with copies of another mid-selection.
    pub fn elite_select<F>(&mut self, mut fit_fun: F, e_count: usize, copy_count: usize)
    where
        F: FnMut(&O) -> f64,
    {
        let occupied = self.pop.occupied_slots();
        assert!(
            e_count > 0 && e_count <= occupied.len(),
            "elite count {} out of range for population of {}",
            e_count,
            occupied.len()
        );

        let mut ranked: Vec<(usize, f64)> = occupied
            .into_iter()
            .map(|slot| {
                let fit = fit_fun(self.pop.get(slot).expect("occupied slot"));
                (slot, fit)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let elites: Vec<(usize, O)> = ranked
            .iter()
            .take(e_count)
            .map(|&(slot, _)| (slot, self.pop.get(slot).expect("occupied slot").clone()))
            .collect();
        for (slot, org) in elites {
            self.insert_birth(&org, slot, copy_count);
        }
    }

    /// [`elite_select`](Self::elite_select) with the configured default
    /// fitness function. Panics when none is configured.
    pub fn elite_select_default(&mut self, e_count: usize, copy_count: usize) {
        let fit_fun = self
            .default_fitness
            .take()
            .expect("no default fitness function configured");
        self.elite_select(|org| fit_fun(org), e_count, copy_count);
        self.default_fitness = Some(fit_fun);
    }

    /// Tournament selection: run `t_count` independent tournaments, each over
    /// `t_size` distinct organisms sampled without replacement, and birth a
    /// copy of each winner (first-seen entrant wins ties).
    ///
    /// When `t_size * t_count * 2` reaches the population size, fitness is
    /// precomputed once for everyone, amortizing repeated evaluation;
    /// otherwise it is evaluated lazily per entrant.
    pub fn tournament_select<F>(&mut self, mut fit_fun: F, t_size: usize, t_count: usize)
    where
        F: FnMut(&O) -> f64,
    {
        let occupied = self.pop.occupied_slots();
        assert!(
            t_size > 0 && t_size <= occupied.len(),
            "tournament size {} out of range for population of {}",
            t_size,
            occupied.len()
        );

        if t_size * t_count * 2 >= occupied.len() {
            let fitness: Vec<f64> = occupied
                .iter()
                .map(|&slot| fit_fun(self.pop.get(slot).expect("occupied slot")))
                .collect();
            self.run_tournaments_precalc(&occupied, &fitness, t_size, t_count);
        } else {
            self.run_tournaments_lazy(&occupied, &mut fit_fun, t_size, t_count);
        }
    }

    /// [`tournament_select`](Self::tournament_select) with the configured
    /// default fitness function. Panics when none is configured.
    pub fn tournament_select_default(&mut self, t_size: usize, t_count: usize) {
        let fit_fun = self
            .default_fitness
            .take()
            .expect("no default fitness function configured");
        self.tournament_select(|org| fit_fun(org), t_size, t_count);
        self.default_fitness = Some(fit_fun);
    }

    /// Tournament selection over fitnesses adjusted by Goldberg and
    /// Richardson's fitness sharing: each organism's fitness is divided by its
    /// niche count `sum_j max(1 - (d(i,j)/sigma)^alpha, 0)`, which always
    /// includes the organism itself and so is at least 1.
    ///
    /// The niche computation is O(n^2) in the population size per call.
    pub fn fitness_sharing_tournament_select<F, D>(
        &mut self,
        mut fit_fun: F,
        mut dist_fun: D,
        sharing_threshold: f64,
        alpha: f64,
        t_size: usize,
        t_count: usize,
    ) where
        F: FnMut(&O) -> f64,
        D: FnMut(&O, &O) -> f64,
    {
        let occupied = self.pop.occupied_slots();
        assert!(
            t_size > 0 && t_size <= occupied.len(),
            "tournament size {} out of range for population of {}",
            t_size,
            occupied.len()
        );

        let shared: Vec<f64> = occupied
            .iter()
            .map(|&i| {
                let org = self.pop.get(i).expect("occupied slot");
                let niche_count: f64 = occupied
                    .iter()
                    .map(|&j| {
                        let d = dist_fun(org, self.pop.get(j).expect("occupied slot"));
                        (1.0 - (d / sharing_threshold).powf(alpha)).max(0.0)
                    })
                    .sum();
                fit_fun(org) / niche_count
            })
            .collect();

        self.run_tournaments_precalc(&occupied, &shared, t_size, t_count);
    }

    fn run_tournaments_precalc(
        &mut self,
        occupied: &[usize],
        fitness: &[f64],
        t_size: usize,
        t_count: usize,
    ) {
        for _ in 0..t_count {
            let entries = index::sample(&mut self.rng, occupied.len(), t_size);
            let mut best = entries.index(0);
            for k in 1..t_size {
                let entry = entries.index(k);
                if fitness[entry] > fitness[best] {
                    best = entry;
                }
            }
            let winner_slot = occupied[best];
            let winner = self
                .pop
                .get(winner_slot)
                .expect("tournament winner slot vacated mid-selection")
                .clone();
            self.insert_birth(&winner, winner_slot, 1);
        }
    }

    fn run_tournaments_lazy<F>(
        &mut self,
        occupied: &[usize],
        fit_fun: &mut F,
        t_size: usize,
        t_count: usize,
    ) where
        F: FnMut(&O) -> f64,
    {
        for _ in 0..t_count {
            let entries = index::sample(&mut self.rng, occupied.len(), t_size);
            let mut best = entries.index(0);
            let mut best_fit = fit_fun(self.pop.get(occupied[best]).expect("occupied slot"));
            for k in 1..t_size {
                let entry = entries.index(k);
                let fit = fit_fun(self.pop.get(occupied[entry]).expect("occupied slot"));
                if fit > best_fit {
                    best = entry;
                    best_fit = fit;
                }
            }
            let winner_slot = occupied[best];
            let winner = self
                .pop
                .get(winner_slot)
                .expect("tournament winner slot vacated mid-selection")
                .clone();
            self.insert_birth(&winner, winner_slot, 1);
        }
    }

    /// Shrink the population to `new_size`, optionally by uniform random
    /// retention.
    pub fn do_bottleneck(&mut self, new_size: usize, randomize: bool) {
        self.pop.do_bottleneck(new_size, randomize, &mut self.rng);
    }

    /// Advance to the next generation: swap in any pending generation buffer
    /// and notify the lineage tracker.
    pub fn update(&mut self) {
        self.pop.update();
        self.generation += 1;
        self.lineage.on_generation_advance(self.generation);
    }
}
