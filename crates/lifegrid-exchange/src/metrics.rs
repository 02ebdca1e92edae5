//! Per-generation timing for a worker.

use lifegrid_core::Generation;

/// Timing collected while a [`Worker`](crate::Worker) runs one generation.
///
/// Durations are in microseconds. `exchange_us` includes time spent
/// blocked on neighbours and, for the block protocol, painting the band;
/// `advance_us` includes painting for the strip protocol.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationMetrics {
    /// The generation that was advanced (its pre-update number).
    pub generation: Generation,
    /// Halo refresh, in microseconds.
    pub exchange_us: u64,
    /// Rule application, in microseconds.
    pub advance_us: u64,
}

impl GenerationMetrics {
    /// Wall-clock time for the whole generation, in microseconds.
    pub fn total_us(&self) -> u64 {
        self.exchange_us + self.advance_us
    }
}
