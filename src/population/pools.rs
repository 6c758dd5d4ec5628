//! Pools population manager
//!
//! Partitions the population index space into contiguous pools with an
//! inter-pool adjacency map. Offspring stay in their parent's pool unless a
//! migration draw succeeds, in which case they move to a uniformly chosen
//! adjacent pool.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::organism::Organism;
use crate::population::PopulationManager;

/// How the per-pool sizes are derived from the configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PoolSizes {
    /// Split the population evenly, spreading any remainder over the first
    /// pools.
    Even,
    /// Every pool gets the same explicit size; must sum to the population.
    Same(usize),
    /// One explicit size per pool; must sum to the population.
    Explicit(Vec<usize>),
}

/// Configuration for [`PoolsManager`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolsConfig {
    /// Number of pools.
    pub pool_count: usize,
    /// Per-pool size policy.
    pub pool_sizes: PoolSizes,
    /// Adjacency: which pools an offspring born in each pool may migrate to.
    pub connections: HashMap<usize, Vec<usize>>,
    /// Probability that a birth migrates to a connected pool.
    pub mig_rate: f64,
    /// Total population size.
    pub pop_size: usize,
}

impl PoolsConfig {
    fn resolve_sizes(&self) -> ConfigResult<Vec<usize>> {
        if self.pool_count == 0 {
            return Err(ConfigError::ZeroSize { what: "pool_count" });
        }
        if self.pop_size == 0 {
            return Err(ConfigError::ZeroSize { what: "pop_size" });
        }

        let sizes = match &self.pool_sizes {
            PoolSizes::Even => {
                let base = self.pop_size / self.pool_count;
                let remainder = self.pop_size % self.pool_count;
                (0..self.pool_count)
                    .map(|i| base + usize::from(i < remainder))
                    .collect()
            }
            PoolSizes::Same(size) => vec![*size; self.pool_count],
            PoolSizes::Explicit(sizes) => {
                if sizes.len() != self.pool_count {
                    return Err(ConfigError::PoolCountMismatch {
                        expected: self.pool_count,
                        actual: sizes.len(),
                    });
                }
                sizes.clone()
            }
        };

        if sizes.iter().any(|&s| s == 0) {
            return Err(ConfigError::ZeroSize { what: "pool size" });
        }
        let total: usize = sizes.iter().sum();
        if total != self.pop_size {
            return Err(ConfigError::PoolSizeMismatch {
                total,
                expected: self.pop_size,
            });
        }
        Ok(sizes)
    }

    fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.mig_rate) {
            return Err(ConfigError::InvalidMigrationRate(self.mig_rate));
        }
        for (&pool, targets) in &self.connections {
            for &target in std::iter::once(&pool).chain(targets) {
                if target >= self.pool_count {
                    return Err(ConfigError::UnknownPool {
                        pool: target,
                        pool_count: self.pool_count,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Population manager with pool topology and migration.
#[derive(Clone, Debug)]
pub struct PoolsManager<O: Organism> {
    slots: Vec<Option<O>>,
    pool_sizes: Vec<usize>,
    /// End index (exclusive) of each pool; the first pool begins at 0.
    pool_end: Vec<usize>,
    /// Pool owning each slot index.
    pool_id: Vec<usize>,
    connections: HashMap<usize, Vec<usize>>,
    mig_rate: f64,
    /// How many organisms have been injected so far (drives round-robin
    /// seeding of the pools).
    org_count: usize,
}

impl<O: Organism> PoolsManager<O> {
    /// Create an empty pooled population from a validated configuration.
    pub fn new(config: PoolsConfig) -> ConfigResult<Self> {
        let pool_sizes = config.resolve_sizes()?;
        config.validate()?;

        let mut pool_end = Vec::with_capacity(pool_sizes.len());
        let mut pool_id = Vec::with_capacity(config.pop_size);
        let mut end = 0;
        for (pool, &size) in pool_sizes.iter().enumerate() {
            end += size;
            pool_end.push(end);
            pool_id.extend(std::iter::repeat(pool).take(size));
        }

        let mut slots = Vec::new();
        slots.resize_with(config.pop_size, || None);
        Ok(Self {
            slots,
            pool_sizes,
            pool_end,
            pool_id,
            connections: config.connections,
            mig_rate: config.mig_rate,
            org_count: 0,
        })
    }

    /// Number of pools.
    pub fn pool_count(&self) -> usize {
        self.pool_sizes.len()
    }

    /// The resolved per-pool sizes.
    pub fn pool_sizes(&self) -> &[usize] {
        &self.pool_sizes
    }

    /// The pool owning a slot index.
    pub fn pool_of(&self, slot: usize) -> usize {
        assert!(slot < self.pool_id.len(), "slot {} out of range", slot);
        self.pool_id[slot]
    }

    /// The contiguous slot range of a pool.
    pub fn pool_range(&self, pool: usize) -> std::ops::Range<usize> {
        assert!(pool < self.pool_end.len(), "pool {} out of range", pool);
        let start = if pool == 0 { 0 } else { self.pool_end[pool - 1] };
        start..self.pool_end[pool]
    }
}

impl<O: Organism> PopulationManager<O> for PoolsManager<O> {
    fn slots(&self) -> &[Option<O>] {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut Vec<Option<O>> {
        &mut self.slots
    }

    /// Injections seed the pools round-robin: every pool receives one organism
    /// before any pool receives a second. After that, placement is uniform
    /// over the whole population, replacing any occupant.
    fn add_org<R: Rng>(&mut self, org: O, rng: &mut R) -> usize {
        let range = if self.org_count < self.pool_count() {
            self.pool_range(self.org_count)
        } else {
            0..self.slots.len()
        };
        let pos = rng.gen_range(range);
        self.slots[pos] = Some(org);
        self.org_count += 1;
        pos
    }

    /// Births draw a migration decision at `mig_rate`; on success (and if the
    /// parent's pool has any adjacency) the offspring moves to a uniformly
    /// chosen adjacent pool, otherwise it stays in the parent's pool. Within
    /// the target pool, placement is uniform.
    fn add_org_birth<R: Rng>(&mut self, org: O, parent_slot: usize, rng: &mut R) -> usize {
        let parent_pool = self.pool_of(parent_slot);

        let migrate = rng.gen_bool(self.mig_rate);
        let conns = self.connections.get(&parent_pool);
        let target_pool = match conns {
            Some(conns) if migrate && !conns.is_empty() => conns[rng.gen_range(0..conns.len())],
            _ => parent_pool,
        };

        let pos = rng.gen_range(self.pool_range(target_pool));
        self.slots[pos] = Some(org);
        pos
    }

    /// Destroy all organisms; pool topology keeps its shape and round-robin
    /// seeding restarts.
    fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.org_count = 0;
    }
}
