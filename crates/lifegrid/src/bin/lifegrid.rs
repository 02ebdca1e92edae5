//! `lifegrid`: run Game of Life over a set of cooperating worker threads.
//!
//! **Usage:**
//! ```text
//! lifegrid <FRAME_SIZE> <ITERATIONS> <PATTERN> [-e] [-w <N>] [-d strips|blocks]
//! ```
//!
//! `PATTERN` is `cross` (`t`, `0`), `border-midline` (`e`, `1`),
//! `border` (`o`, `2`) or `random` (`3`). With `-e`, frames are written
//! to `frames/frame{N}.bmp`. Log verbosity follows `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lifegrid::exchange::Layout;
use lifegrid::export::DEFAULT_SCALE;
use lifegrid::tile::Pattern;
use lifegrid::{run_simulation, SimulationConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Run Game of Life split across worker threads with halo exchange.
#[derive(Parser, Debug)]
#[command(name = "lifegrid", version, about)]
struct Args {
    /// Side length of the square frame.
    frame_size: usize,

    /// Generations to run.
    iterations: u64,

    /// Initial pattern: name, letter alias, or numeric code.
    pattern: Pattern,

    /// Write every frame as a BMP file.
    #[arg(short = 'e', long)]
    export: bool,

    /// Worker threads.
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    /// How the frame is split: strips (1D) or blocks (2D).
    #[arg(short, long, default_value_t = Layout::Strips)]
    decomposition: Layout,

    /// Seed for the random pattern (drawn at startup if omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Output pixels per cell side.
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: u32,

    /// Directory for exported frames.
    #[arg(long, default_value = "frames")]
    out: PathBuf,

    /// Messages buffered between each pair of workers (0 = rendezvous).
    #[arg(long, default_value_t = 0)]
    mesh_capacity: usize,

    /// Print the final frame to stdout.
    #[arg(long)]
    print: bool,
}

impl Args {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            frame_size: self.frame_size,
            iterations: self.iterations,
            pattern: self.pattern,
            seed: self.seed,
            workers: self.workers,
            layout: self.decomposition,
            export_dir: self.export.then(|| self.out.clone()),
            scale: self.scale,
            mesh_capacity: self.mesh_capacity,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run_simulation(&args.config()) {
        Ok(outcome) => {
            if args.print {
                print!("{}", outcome.to_ascii());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}
