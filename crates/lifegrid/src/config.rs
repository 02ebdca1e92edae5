//! Simulation configuration.
//!
//! [`SimulationConfig`] is the input to
//! [`run_simulation`](crate::run_simulation). [`validate()`](SimulationConfig::validate)
//! checks everything that can be checked before a thread is started,
//! including that the chosen layout gives every active worker a
//! non-empty tile.

use std::path::PathBuf;

use lifegrid_core::ConfigError;
use lifegrid_exchange::Layout;
use lifegrid_export::DEFAULT_SCALE;
use lifegrid_tile::Pattern;

/// Everything needed to run one simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Side length of the square frame. Default: 64.
    pub frame_size: usize,
    /// Generations to run. Default: 100.
    pub iterations: u64,
    /// Initial pattern. Default: [`Pattern::Cross`].
    pub pattern: Pattern,
    /// Seed for the random pattern. `None` draws one at startup.
    pub seed: Option<u64>,
    /// Workers in the cooperating set. Default: 1.
    pub workers: usize,
    /// How the frame is split across workers. Default: [`Layout::Strips`].
    pub layout: Layout,
    /// Directory for `frame{N}.bmp` files. `None` disables export.
    pub export_dir: Option<PathBuf>,
    /// Output pixels per cell side. Default: 4.
    pub scale: u32,
    /// Messages buffered per worker pair. Default: 0 (every send waits
    /// for its receive).
    pub mesh_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_size: 64,
            iterations: 100,
            pattern: Pattern::Cross,
            seed: None,
            workers: 1,
            layout: Layout::Strips,
            export_dir: None,
            scale: DEFAULT_SCALE,
            mesh_capacity: 0,
        }
    }
}

impl SimulationConfig {
    /// Whether frames will be written.
    pub fn exports(&self) -> bool {
        self.export_dir.is_some()
    }

    /// Validate every field and the resulting decomposition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_size == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.scale == 0 {
            return Err(ConfigError::ZeroScale);
        }
        self.layout.build(self.frame_size, self.workers)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = SimulationConfig::default();
        assert!(c.validate().is_ok());
        assert!(!c.exports());
        assert_eq!(c.scale, 4);
    }

    #[test]
    fn zero_fields_are_rejected() {
        let c = SimulationConfig {
            frame_size: 0,
            ..Default::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroFrameSize));

        let c = SimulationConfig {
            workers: 0,
            ..Default::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroWorkers));

        let c = SimulationConfig {
            scale: 0,
            ..Default::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroScale));
    }

    #[test]
    fn more_strips_than_rows_is_rejected() {
        let c = SimulationConfig {
            frame_size: 3,
            workers: 4,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::EmptyTile { .. })));
    }

    #[test]
    fn blocks_that_leave_an_empty_edge_are_rejected() {
        let c = SimulationConfig {
            frame_size: 4,
            workers: 9,
            layout: Layout::Blocks,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::EmptyTile { .. })));
    }

    #[test]
    fn surplus_block_workers_are_allowed() {
        let c = SimulationConfig {
            frame_size: 10,
            workers: 5,
            layout: Layout::Blocks,
            ..Default::default()
        };
        assert!(c.validate().is_ok());
    }
}
