//! # evo-world
//!
//! The population-evolution core of a digital-evolution toolkit: population
//! managers, selection algorithms, and ancestry tracking with on-the-fly
//! pruning.
//!
//! ## Core Concepts
//!
//! - **Population managers** own the organism slots and the placement policy:
//!   in-place replacement, synchronous generations, serial transfer, a
//!   toroidal grid, or migration-connected pools.
//! - **The World** orchestrates insertion, mutation, selection (elite,
//!   tournament, fitness sharing), and the generational update, emitting
//!   lineage events in a fixed order.
//! - **Lineage trackers** observe those events. The pruned tracker keeps the
//!   ancestry tree compact as organisms die, deduplicates genomes behind
//!   reference counts, and advances the coalescence point (most recent common
//!   ancestor) so long simulations stay bounded.
//!
//! ## Quick Start
//!
//! ```rust
//! use evo_world::prelude::*;
//!
//! let pop: BasicManager<i32> = BasicManager::new();
//! let mut world = World::with_tracker(pop, PrunedTracker::new(), 42);
//!
//! world.insert(&10, 4);
//! world.tournament_select(|org| *org as f64, 2, 4);
//! world.update();
//!
//! assert_eq!(world.num_orgs(), 4);
//! assert!(world.lineage().node_count() >= 1);
//! ```

pub mod error;
pub mod lineage;
pub mod organism;
pub mod population;
pub mod world;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::lineage::{
        GenomeStore, LineageTracker, NullTracker, PrunedTracker, StandardTracker,
    };
    pub use crate::organism::{Fitness, Mutate, Organism};
    pub use crate::population::{
        BasicManager, GenerationalManager, GridManager, PoolSizes, PoolsConfig, PoolsManager,
        PopulationManager, SerialTransferConfig, SerialTransferManager,
    };
    pub use crate::world::World;
}
