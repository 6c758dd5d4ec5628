//! Property-based tests for evo-world
//!
//! Uses proptest to verify the structural invariants of the population
//! managers and the pruned lineage tracker.

use std::collections::HashMap;

use evo_world::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Drive identical event sequences through both trackers.
///
/// `events` are (parent_choice, slot_choice, genome_seed) triples applied as
/// births to a population of `slots` slots that is first seeded with one
/// injection per slot. Genomes are drawn from a small value space so
/// deduplication is exercised.
fn drive_trackers(
    slots: usize,
    events: &[(usize, usize, u32)],
) -> (StandardTracker<u32>, PrunedTracker<u32>) {
    let mut standard = StandardTracker::new();
    let mut pruned = PrunedTracker::new();

    for i in 0..slots {
        let genome = i as u32 % 5;
        for tracker in [
            &mut standard as &mut dyn LineageTracker<u32>,
            &mut pruned as &mut dyn LineageTracker<u32>,
        ] {
            tracker.on_injection_ready(&genome);
            tracker.on_placement(i);
        }
    }

    for &(parent_choice, slot_choice, genome_seed) in events {
        let parent = parent_choice % slots;
        let slot = slot_choice % slots;
        let genome = genome_seed % 5;
        for tracker in [
            &mut standard as &mut dyn LineageTracker<u32>,
            &mut pruned as &mut dyn LineageTracker<u32>,
        ] {
            tracker.on_before_reproduction(parent);
            tracker.on_offspring_ready(&genome);
            tracker.on_placement(slot);
        }
    }

    (standard, pruned)
}

proptest! {
    // ==================== Grid Properties ====================

    #[test]
    fn grid_coordinate_round_trip(width in 1usize..20, height in 1usize..20) {
        let grid: GridManager<u32> = GridManager::new(width, height).unwrap();
        for id in 0..grid.len() {
            prop_assert_eq!(grid.to_id(grid.to_x(id), grid.to_y(id)), id);
        }
    }

    #[test]
    fn grid_occupancy_never_exceeds_capacity(
        width in 1usize..8,
        height in 1usize..8,
        injections in 0usize..40,
        births in 0usize..40,
    ) {
        let mut rng = StdRng::seed_from_u64(9);
        let mut grid: GridManager<u32> = GridManager::new(width, height).unwrap();
        for i in 0..injections {
            grid.add_org(i as u32, &mut rng);
            prop_assert!(grid.num_orgs() <= width * height);
        }
        if grid.num_orgs() > 0 {
            let parent = grid.occupied_slots()[0];
            for i in 0..births {
                grid.add_org_birth(i as u32, parent, &mut rng);
                prop_assert!(grid.num_orgs() <= width * height);
            }
        }
    }

    // ==================== Pools Properties ====================

    #[test]
    fn pool_ranges_partition_population(
        pool_count in 1usize..10,
        extra in 0usize..50,
    ) {
        let pop_size = pool_count + extra;
        let pools: PoolsManager<u32> = PoolsManager::new(PoolsConfig {
            pool_count,
            pool_sizes: PoolSizes::Even,
            connections: HashMap::new(),
            mig_rate: 0.1,
            pop_size,
        })
        .unwrap();

        // Contiguous, non-overlapping, exactly covering [0, pop_size).
        let mut next = 0;
        for pool in 0..pools.pool_count() {
            let range = pools.pool_range(pool);
            prop_assert_eq!(range.start, next);
            prop_assert!(range.end > range.start);
            next = range.end;
        }
        prop_assert_eq!(next, pop_size);
        for slot in 0..pop_size {
            let pool = pools.pool_of(slot);
            prop_assert!(pools.pool_range(pool).contains(&slot));
        }
    }

    // ==================== Serial Transfer Properties ====================

    #[test]
    fn serial_transfer_bounds_population(
        max_size in 2usize..30,
        bottleneck_divisor in 2usize..5,
        births in 1usize..100,
    ) {
        let bottleneck_size = (max_size / bottleneck_divisor).max(1);
        let mut rng = StdRng::seed_from_u64(17);
        let mut pop: SerialTransferManager<u32> = SerialTransferManager::new(
            SerialTransferConfig { max_size, bottleneck_size },
        )
        .unwrap();

        pop.add_org(0, &mut rng);
        for i in 0..births {
            pop.add_org_birth(i as u32, 0, &mut rng);
            prop_assert!(pop.len() <= max_size);
        }
    }

    // ==================== Pruned Lineage Properties ====================

    #[test]
    fn pruned_tracker_upholds_retention_and_refcounts(
        slots in 1usize..6,
        events in prop::collection::vec((0usize..100, 0usize..100, 0u32..100), 0..60),
    ) {
        let (_, pruned) = drive_trackers(slots, &events);

        // Retention invariant and link consistency.
        for id in pruned.node_ids() {
            let children = pruned.children_of(id).unwrap();
            if id != 0 {
                prop_assert!(
                    pruned.is_alive(id) || !children.is_empty(),
                    "node {} is dead and childless but retained",
                    id
                );
                let parent = pruned.parent_of(id).unwrap();
                prop_assert!(pruned.children_of(parent).unwrap().contains(&id));
            }
            for &child in children {
                prop_assert_eq!(pruned.parent_of(child), Some(id));
            }
        }

        // Genome refcounts equal the number of nodes referencing each value.
        let mut expected: HashMap<u32, usize> = HashMap::new();
        for id in pruned.node_ids() {
            if let Some(genome) = pruned.genome_of(id) {
                *expected.entry(*genome).or_insert(0) += 1;
            }
        }
        prop_assert_eq!(pruned.genome_count(), expected.len());
        for (genome, count) in expected {
            prop_assert_eq!(pruned.genome_ref_count(&genome), count);
        }
    }

    #[test]
    fn pruned_tracker_coalescence_is_monotonic(
        slots in 1usize..5,
        events in prop::collection::vec((0usize..100, 0usize..100, 0u32..100), 1..50),
    ) {
        let mut pruned: PrunedTracker<u32> = PrunedTracker::new();
        for i in 0..slots {
            pruned.on_injection_ready(&(i as u32));
            pruned.on_placement(i);
        }

        let mut last = pruned.last_coalescence();
        for &(parent_choice, slot_choice, genome_seed) in &events {
            pruned.on_before_reproduction(parent_choice % slots);
            pruned.on_offspring_ready(&(genome_seed % 5));
            pruned.on_placement(slot_choice % slots);

            let current = pruned.last_coalescence();
            if current != last {
                // The pointer only ever moves to a descendant of its previous
                // position: the old id must appear on the new id's ancestor
                // chain (or have been the root).
                prop_assert!(
                    last == 0 || pruned.trace_lineage_ids(current).contains(&last),
                    "coalescence regressed from {} to {}",
                    last,
                    current
                );
                last = current;
            }
        }
    }

    #[test]
    fn pruned_traces_match_standard_traces(
        slots in 1usize..6,
        events in prop::collection::vec((0usize..100, 0usize..100, 0u32..100), 0..40),
    ) {
        let (standard, pruned) = drive_trackers(slots, &events);

        // Pruning must not change the ancestry of anything still alive.
        for slot in 0..slots {
            let id = pruned.id_at(slot);
            prop_assert_eq!(standard.id_at(slot), id);
            if id != 0 {
                prop_assert_eq!(
                    pruned.trace_lineage_ids(id),
                    standard.trace_lineage_ids(id)
                );
                prop_assert_eq!(pruned.trace_lineage(id), standard.trace_lineage(id));
            }
        }
    }
}
