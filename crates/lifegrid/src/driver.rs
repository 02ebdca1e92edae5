//! Threaded driver: one OS thread per active worker over a channel mesh.
//!
//! [`run_simulation`] validates the configuration, builds the
//! decomposition, connects a [`Mesh`] and runs every active rank on its
//! own scoped thread. With export enabled, each rank paints into a
//! [`BandSink`] and one more thread assembles and writes the frames.

use std::error::Error;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use lifegrid_core::{
    ConfigError, ExchangeError, ExportError, FrameSink, Rank, Transport, WorkerError,
};
use lifegrid_exchange::{Decomposition, GenerationMetrics, Mesh, MeshEndpoint, Worker};
use lifegrid_export::{band_channel, BandSink, ExportSummary, FrameAssembler, FrameBand};
use lifegrid_tile::{CellNoise, Grid, Initializer};
use tracing::{info, warn};

use crate::config::SimulationConfig;

// ── Reports ────────────────────────────────────────────────────────

/// Timing for one rank over the whole run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// The rank.
    pub rank: Rank,
    /// Generations run.
    pub generations: u64,
    /// Wall time of the generation loop.
    pub elapsed: Duration,
    /// Sum of per-generation halo refresh time, in microseconds.
    pub exchange_us: u64,
    /// Sum of per-generation rule time, in microseconds.
    pub advance_us: u64,
}

impl WorkerReport {
    fn new(rank: Rank) -> Self {
        Self {
            rank,
            ..Default::default()
        }
    }

    fn record(&mut self, m: &GenerationMetrics) {
        self.generations += 1;
        self.exchange_us += m.exchange_us;
        self.advance_us += m.advance_us;
    }

    /// Mean wall time per generation, in seconds. Zero if nothing ran.
    pub fn mean_seconds(&self) -> f64 {
        if self.generations == 0 {
            return 0.0;
        }
        self.elapsed.as_secs_f64() / self.generations as f64
    }
}

/// The result of a completed run.
#[derive(Clone, Debug)]
pub struct SimulationOutcome {
    /// Side length of the frame.
    pub frame_size: usize,
    /// Final cells, row-major.
    pub cells: Vec<bool>,
    /// Seed the random pattern used.
    pub seed: u64,
    /// One report per active rank, in rank order.
    pub reports: Vec<WorkerReport>,
    /// What was written, if export was enabled.
    pub export: Option<ExportSummary>,
}

impl SimulationOutcome {
    /// Live cells in the final frame.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Final frame as text: `*` alive, `_` dead, one line per row.
    pub fn to_ascii(&self) -> String {
        let mut s = String::with_capacity(self.cells.len() + self.frame_size);
        for row in self.cells.chunks(self.frame_size.max(1)) {
            s.extend(row.iter().map(|&c| if c { '*' } else { '_' }));
            s.push('\n');
        }
        s
    }
}

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from [`run_simulation`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimulationError {
    /// The configuration was rejected before any thread started.
    Config(ConfigError),
    /// A worker failed mid-run.
    Worker {
        /// The failing rank.
        rank: Rank,
        /// What went wrong.
        source: WorkerError,
    },
    /// The frame writer failed.
    Export(ExportError),
    /// A worker or writer thread could not be spawned.
    ThreadSpawn {
        /// Description of the failure.
        reason: String,
    },
    /// A worker or writer thread panicked.
    Panicked {
        /// Which thread.
        thread: String,
    },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Worker { rank, source } => write!(f, "rank {rank} failed: {source}"),
            Self::Export(e) => write!(f, "frame export failed: {e}"),
            Self::ThreadSpawn { reason } => write!(f, "failed to spawn thread: {reason}"),
            Self::Panicked { thread } => write!(f, "thread {thread} panicked"),
        }
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Worker { source, .. } => Some(source),
            Self::Export(e) => Some(e),
            Self::ThreadSpawn { .. } | Self::Panicked { .. } => None,
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ExportError> for SimulationError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

impl SimulationError {
    /// Whether this is only the echo of another thread failing first: a
    /// neighbour disconnecting, or the frame writer going away.
    fn is_echo(&self) -> bool {
        matches!(
            self,
            Self::Worker {
                source: WorkerError::Exchange(ExchangeError::Disconnected { .. })
                    | WorkerError::Export(ExportError::Closed),
                ..
            }
        )
    }
}

// ── Driver ─────────────────────────────────────────────────────────

type RankResult = Result<(Grid, WorkerReport), SimulationError>;

/// Run the configured simulation to completion.
///
/// Blocks until every worker has finished `config.iterations`
/// generations and every exported frame is written. When several
/// threads fail, the error reported is the first one that is not merely
/// a neighbour disconnecting or the frame writer closing; a writer
/// failure outranks the workers it cut off.
///
/// # Errors
///
/// [`SimulationError::Config`] before any thread starts,
/// [`SimulationError::Worker`] if a rank fails mid-run, and
/// [`SimulationError::Export`] if a frame cannot be written.
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationOutcome, SimulationError> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(rand::random);
    let decomposition = config.layout.build(config.frame_size, config.workers)?;
    let active = decomposition.active_workers();
    if active < config.workers {
        warn!(
            workers = config.workers,
            active,
            layout = %config.layout,
            "surplus workers own no tile and stay idle"
        );
    }
    let assembler = match &config.export_dir {
        Some(dir) => Some(FrameAssembler::new(dir.clone(), config.scale)?),
        None => None,
    };
    info!(
        frame_size = config.frame_size,
        iterations = config.iterations,
        pattern = %config.pattern,
        layout = %config.layout,
        workers = config.workers,
        seed,
        export = config.exports(),
        "starting simulation"
    );

    let endpoints = Mesh::buffered(config.workers, config.mesh_capacity).connect();
    let d = decomposition.as_ref();
    let (results, export) = thread::scope(|s| {
        let (band_tx, band_rx) = band_channel();
        let writer = assembler.map(|a| s.spawn(move || a.collect(&band_rx)));

        let mut handles = Vec::with_capacity(active);
        let mut results: Vec<RankResult> = Vec::with_capacity(active);
        for ep in endpoints.into_iter().take(active) {
            let rank = ep.rank();
            let tx = writer.as_ref().map(|_| band_tx.clone());
            let init = Initializer::new(config.pattern, CellNoise::new(seed));
            let iterations = config.iterations;
            let spawned = thread::Builder::new()
                .name(format!("lifegrid-rank-{}", rank.0))
                .spawn_scoped(s, move || run_rank(d, init, iterations, ep, tx));
            match spawned {
                Ok(h) => handles.push((rank, h)),
                Err(e) => {
                    results.push(Err(SimulationError::ThreadSpawn {
                        reason: e.to_string(),
                    }));
                    break;
                }
            }
        }
        drop(band_tx);

        for (rank, h) in handles {
            results.push(h.join().unwrap_or_else(|_| {
                Err(SimulationError::Panicked {
                    thread: format!("rank {rank}"),
                })
            }));
        }
        let export = writer.map(|w| {
            w.join().map_err(|_| SimulationError::Panicked {
                thread: "frame writer".to_string(),
            })
        });
        (results, export)
    });

    let mut grids = Vec::with_capacity(results.len());
    let mut reports = Vec::with_capacity(results.len());
    let mut first_error: Option<SimulationError> = None;
    for result in results {
        match result {
            Ok((grid, report)) => {
                grids.push(grid);
                reports.push(report);
            }
            Err(e) => {
                let replace = match &first_error {
                    None => true,
                    Some(prev) => prev.is_echo() && !e.is_echo(),
                };
                if replace {
                    first_error = Some(e);
                }
            }
        }
    }
    let written = export.map(|joined| joined.and_then(|w| w.map_err(SimulationError::from)));
    let export = match written.transpose() {
        Ok(summary) => summary,
        Err(writer_error) => {
            return Err(match first_error {
                Some(e) if !e.is_echo() => e,
                _ => writer_error,
            });
        }
    };
    if let Some(e) = first_error {
        return Err(e);
    }

    for r in &reports {
        info!(
            rank = %r.rank,
            mean_s = r.mean_seconds(),
            exchange_us = r.exchange_us,
            advance_us = r.advance_us,
            "process {}: {:.6} s per generation",
            r.rank,
            r.mean_seconds()
        );
    }
    if let Some(summary) = &export {
        if !summary.incomplete.is_empty() {
            warn!(frames = summary.incomplete.len(), "some frames were incomplete");
        }
        info!(frames = summary.paths.len(), "frames written");
    }

    Ok(SimulationOutcome {
        frame_size: config.frame_size,
        cells: assemble(config.frame_size, &grids),
        seed,
        reports,
        export,
    })
}

fn run_rank(
    decomposition: &dyn Decomposition,
    mut init: Initializer,
    iterations: u64,
    endpoint: MeshEndpoint,
    bands: Option<Sender<FrameBand>>,
) -> RankResult {
    let rank = endpoint.rank();
    let mut worker = Worker::new(decomposition, &mut init, endpoint)?;
    let mut sink = bands.map(BandSink::new);
    let mut report = WorkerReport::new(rank);

    let start = Instant::now();
    for _ in 0..iterations {
        let sink = sink.as_mut().map(|s| s as &mut dyn FrameSink);
        let metrics = worker
            .run_one_generation(sink)
            .map_err(|source| SimulationError::Worker { rank, source })?;
        report.record(&metrics);
    }
    report.elapsed = start.elapsed();
    Ok((worker.into_grid(), report))
}

/// Place each tile's interior at its global position.
fn assemble(frame_size: usize, grids: &[Grid]) -> Vec<bool> {
    let mut cells = vec![false; frame_size * frame_size];
    for grid in grids {
        let g = grid.geometry();
        for i in 0..g.height {
            let start = (g.origin_y + i) * frame_size + g.origin_x;
            cells[start..start + g.width].copy_from_slice(grid.interior_row(i));
        }
    }
    cells
}
