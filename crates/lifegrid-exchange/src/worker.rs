//! One rank's grid, exchange protocol and transport.

use std::time::Instant;

use lifegrid_core::{ConfigError, FrameSink, Generation, Rank, Transport, WorkerError};
use lifegrid_tile::{Grid, Initializer};
use tracing::debug;

use crate::decomposition::Decomposition;
use crate::exchange::{ExportFrame, HaloExchange};
use crate::metrics::GenerationMetrics;

/// A single worker in the cooperating set.
///
/// Every active rank must call [`run_one_generation`](Self::run_one_generation)
/// the same number of times; the exchange protocols are collective and a
/// rank that stops early leaves its neighbours blocked (or, with the
/// [`Mesh`](crate::Mesh) transport, disconnected once it is dropped).
pub struct Worker<T: Transport> {
    grid: Grid,
    exchange: Box<dyn HaloExchange>,
    transport: T,
    generation: Generation,
}

impl<T: Transport> Worker<T> {
    /// Build the worker for `transport.rank()` under `decomposition`,
    /// seeding its tile from `init`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TransportMismatch`] if the transport's size
    /// differs from the decomposition's worker count, and whatever the
    /// decomposition reports for an out-of-range or inactive rank.
    pub fn new(
        decomposition: &dyn Decomposition,
        init: &mut Initializer,
        transport: T,
    ) -> Result<Self, ConfigError> {
        if transport.size() != decomposition.workers() {
            return Err(ConfigError::TransportMismatch {
                expected: decomposition.workers(),
                actual: transport.size(),
            });
        }
        let rank = transport.rank();
        let geometry = decomposition.tile(rank)?;
        let grid = Grid::new(init, decomposition.frame_size(), geometry, rank)?;
        let exchange = decomposition.exchange(rank)?;
        debug!(
            %rank,
            layout = decomposition.name(),
            width = geometry.width,
            height = geometry.height,
            origin_x = geometry.origin_x,
            origin_y = geometry.origin_y,
            "worker ready"
        );
        Ok(Self {
            grid,
            exchange,
            transport,
            generation: Generation::default(),
        })
    }

    /// This worker's rank.
    pub fn rank(&self) -> Rank {
        self.grid.rank()
    }

    /// Generations advanced so far.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Current tile.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The transport, for inspecting test doubles.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Name of the exchange protocol in use.
    pub fn exchange_name(&self) -> &'static str {
        self.exchange.name()
    }

    /// Consume the worker, keeping its tile.
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// Run the halo refresh alone, without advancing.
    ///
    /// Collective: every active rank must call it together.
    pub fn refresh_halos(&mut self) -> Result<(), WorkerError> {
        self.exchange
            .refresh(&mut self.grid, &mut self.transport, None)
    }

    /// Refresh halos from the neighbours, then apply the rule.
    ///
    /// With a sink, the frame numbered after the current generation is
    /// painted from the pre-update cells this worker exports.
    ///
    /// # Errors
    ///
    /// Any transport failure or protocol violation during the refresh,
    /// or a sink error while exporting. The worker is unusable after an
    /// error.
    pub fn run_one_generation(
        &mut self,
        sink: Option<&mut dyn FrameSink>,
    ) -> Result<GenerationMetrics, WorkerError> {
        let generation = self.generation;
        let mut export = sink.map(|sink| ExportFrame {
            sink,
            frame: generation,
        });

        let start = Instant::now();
        self.exchange
            .refresh(&mut self.grid, &mut self.transport, export.as_mut())?;
        let exchanged = Instant::now();
        self.exchange.advance(&mut self.grid, export.as_mut())?;
        let done = Instant::now();

        self.generation = generation.succ();
        let metrics = GenerationMetrics {
            generation,
            exchange_us: (exchanged - start).as_micros() as u64,
            advance_us: (done - exchanged).as_micros() as u64,
        };
        debug!(
            rank = %self.rank(),
            %generation,
            exchange_us = metrics.exchange_us,
            advance_us = metrics.advance_us,
            "generation done"
        );
        Ok(metrics)
    }
}

impl<T: Transport> std::fmt::Debug for Worker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("rank", &self.rank())
            .field("exchange", &self.exchange.name())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
