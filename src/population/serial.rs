//! Serial-transfer population manager
//!
//! Models a serial-dilution culture protocol: all births append to the main
//! population, and once it would outgrow `max_size` it is bottlenecked down to
//! `bottleneck_size` by uniform random retention first.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::organism::Organism;
use crate::population::PopulationManager;

/// Configuration for [`SerialTransferManager`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerialTransferConfig {
    /// Population size that triggers a transfer.
    pub max_size: usize,
    /// Population size retained after a transfer.
    pub bottleneck_size: usize,
}

impl Default for SerialTransferConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            bottleneck_size: 100,
        }
    }
}

impl SerialTransferConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_size == 0 {
            return Err(ConfigError::ZeroSize { what: "max_size" });
        }
        if self.bottleneck_size == 0 {
            return Err(ConfigError::ZeroSize {
                what: "bottleneck_size",
            });
        }
        if self.bottleneck_size > self.max_size {
            return Err(ConfigError::BottleneckExceedsMax {
                max_size: self.max_size,
                bottleneck_size: self.bottleneck_size,
            });
        }
        Ok(())
    }
}

/// Population manager implementing the serial-transfer protocol.
#[derive(Clone, Debug)]
pub struct SerialTransferManager<O: Organism> {
    slots: Vec<Option<O>>,
    config: SerialTransferConfig,
    num_bottlenecks: usize,
}

impl<O: Organism> SerialTransferManager<O> {
    /// Create an empty population with the given transfer configuration.
    pub fn new(config: SerialTransferConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            slots: Vec::new(),
            config,
            num_bottlenecks: 0,
        })
    }

    /// Population size that triggers a transfer.
    pub fn max_size(&self) -> usize {
        self.config.max_size
    }

    /// Population size retained after a transfer.
    pub fn bottleneck_size(&self) -> usize {
        self.config.bottleneck_size
    }

    /// How many bottlenecks have fired so far.
    pub fn num_bottlenecks(&self) -> usize {
        self.num_bottlenecks
    }
}

impl<O: Organism> PopulationManager<O> for SerialTransferManager<O> {
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
        if self.slots.len() >= self.config.max_size {
            let bottleneck_size = self.config.bottleneck_size;
            self.do_bottleneck(bottleneck_size, true, rng);
            self.num_bottlenecks += 1;
            debug!("serial transfer #{} complete", self.num_bottlenecks);
        }
        let pos = self.slots.len();
        self.slots.push(Some(org));
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn manager(max_size: usize, bottleneck_size: usize) -> SerialTransferManager<u32> {
        SerialTransferManager::new(SerialTransferConfig {
            max_size,
            bottleneck_size,
        })
        .unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert_eq!(
            SerialTransferManager::<u32>::new(SerialTransferConfig {
                max_size: 5,
                bottleneck_size: 10,
            })
            .unwrap_err(),
            ConfigError::BottleneckExceedsMax {
                max_size: 5,
                bottleneck_size: 10,
            }
        );
        assert!(SerialTransferManager::<u32>::new(SerialTransferConfig {
            max_size: 0,
            bottleneck_size: 0,
        })
        .is_err());
    }

    #[test]
    fn test_births_append_below_max() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut pop = manager(10, 3);
        pop.add_org(0, &mut rng);

        for i in 0..5 {
            pop.add_org_birth(i, 0, &mut rng);
        }
        assert_eq!(pop.len(), 6);
        assert_eq!(pop.num_bottlenecks(), 0);
    }

    #[test]
    fn test_bottleneck_fires_exactly_once_at_max() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut pop = manager(10, 3);
        pop.add_org(100, &mut rng);
        pop.add_org(101, &mut rng);

        // Eight births grow the population from 2 to exactly max_size.
        for i in 0..8 {
            pop.add_org_birth(i, 0, &mut rng);
        }
        assert_eq!(pop.len(), 10);
        assert_eq!(pop.num_bottlenecks(), 0);

        // The next birth triggers the transfer, then appends.
        pop.add_org_birth(99, 0, &mut rng);
        assert_eq!(pop.num_bottlenecks(), 1);
        assert_eq!(pop.len(), 4);
        assert!(pop.organisms().any(|&org| org == 99));
    }

    #[test]
    fn test_population_never_exceeds_max_under_births() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pop = manager(10, 3);
        pop.add_org(0, &mut rng);

        for i in 0..100 {
            pop.add_org_birth(i, 0, &mut rng);
            assert!(pop.len() <= 10);
        }
        assert!(pop.num_bottlenecks() > 0);
    }
}
