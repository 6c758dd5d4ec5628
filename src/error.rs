//! Error types for evo-world
//!
//! Configuration problems are reported through [`ConfigError`] before a
//! simulation starts. Precondition violations at run time (selection counts
//! out of range, tracing an unknown lineage id, out-of-order lineage
//! notifications) are programmer errors and panic with a diagnostic instead.

use thiserror::Error;

/// Error type for population-manager configuration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Grid dimensions must both be nonzero
    #[error("grid dimensions must be nonzero, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    /// Serial-transfer sizes are inconsistent
    #[error("bottleneck size {bottleneck_size} exceeds max size {max_size}")]
    BottleneckExceedsMax {
        max_size: usize,
        bottleneck_size: usize,
    },

    /// A size parameter that must be nonzero was zero
    #[error("{what} must be nonzero")]
    ZeroSize { what: &'static str },

    /// Explicit pool sizes disagree with the pool count
    #[error("expected {expected} pool sizes, got {actual}")]
    PoolCountMismatch { expected: usize, actual: usize },

    /// Pool sizes do not sum to the population size
    #[error("pool sizes sum to {total} but population size is {expected}")]
    PoolSizeMismatch { total: usize, expected: usize },

    /// Pool adjacency references a pool that does not exist
    #[error("adjacency references unknown pool {pool} (pool count {pool_count})")]
    UnknownPool { pool: usize, pool_count: usize },

    /// Migration rate outside [0, 1]
    #[error("migration rate {0} must be within [0, 1]")]
    InvalidMigrationRate(f64),
}

/// Result type alias for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::EmptyGrid {
            width: 0,
            height: 10,
        };
        assert_eq!(err.to_string(), "grid dimensions must be nonzero, got 0x10");

        let err = ConfigError::PoolSizeMismatch {
            total: 90,
            expected: 100,
        };
        assert_eq!(
            err.to_string(),
            "pool sizes sum to 90 but population size is 100"
        );

        let err = ConfigError::InvalidMigrationRate(1.5);
        assert_eq!(err.to_string(), "migration rate 1.5 must be within [0, 1]");
    }
}
