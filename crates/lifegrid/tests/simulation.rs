//! Integration test: the threaded driver end to end.

use lifegrid::prelude::*;
use lifegrid_test_utils::{reference_run, render};

fn config(layout: Layout, workers: usize) -> SimulationConfig {
    SimulationConfig {
        frame_size: 17,
        iterations: 9,
        pattern: Pattern::Random,
        seed: Some(1234),
        workers,
        layout,
        ..Default::default()
    }
}

fn reference(c: &SimulationConfig) -> Vec<bool> {
    let seed = c.seed.unwrap_or_default();
    let mut init = Initializer::new(c.pattern, CellNoise::new(seed));
    reference_run(&mut init, c.frame_size, c.iterations)
}

#[test]
fn every_layout_matches_the_reference() {
    for (layout, workers) in [
        (Layout::Strips, 1),
        (Layout::Strips, 5),
        (Layout::Blocks, 4),
        (Layout::Blocks, 11),
    ] {
        let c = config(layout, workers);
        let outcome = run_simulation(&c).unwrap();
        assert_eq!(
            render(&outcome.cells, 17),
            render(&reference(&c), 17),
            "{layout} x {workers}"
        );
        assert_eq!(outcome.seed, 1234);
    }
}

#[test]
fn buffered_mesh_gives_same_result() {
    let mut c = config(Layout::Blocks, 9);
    c.mesh_capacity = 4;
    let outcome = run_simulation(&c).unwrap();
    assert_eq!(outcome.cells, reference(&c));
}

#[test]
fn reports_cover_active_ranks() {
    let outcome = run_simulation(&config(Layout::Blocks, 6)).unwrap();
    let ranks: Vec<Rank> = outcome.reports.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![Rank(0), Rank(1), Rank(2), Rank(3)]);
    assert!(outcome.reports.iter().all(|r| r.generations == 9));
}

#[test]
fn zero_iterations_returns_the_seed_frame() {
    let mut c = config(Layout::Strips, 3);
    c.iterations = 0;
    c.pattern = Pattern::Cross;
    let outcome = run_simulation(&c).unwrap();
    assert_eq!(outcome.cells, reference(&c));
    assert_eq!(outcome.reports[0].mean_seconds(), 0.0);
}

#[test]
fn invalid_config_fails_before_running() {
    let mut c = config(Layout::Strips, 18);
    assert!(matches!(
        run_simulation(&c),
        Err(SimulationError::Config(ConfigError::EmptyTile { .. }))
    ));
    c.workers = 0;
    assert_eq!(
        run_simulation(&c).unwrap_err(),
        SimulationError::Config(ConfigError::ZeroWorkers)
    );
}

#[test]
fn export_writes_one_file_per_generation() {
    let dir = std::env::temp_dir().join(format!("lifegrid-sim-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    for layout in [Layout::Strips, Layout::Blocks] {
        let mut c = config(layout, 4);
        c.iterations = 3;
        c.scale = 1;
        c.export_dir = Some(dir.clone());
        let outcome = run_simulation(&c).unwrap();
        let summary = outcome.export.unwrap();
        assert_eq!(summary.paths.len(), 3, "{layout}");
        assert!(summary.incomplete.is_empty());
        for g in 0..3 {
            assert!(dir.join(format!("frame{g}.bmp")).exists());
        }
    }
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unwritable_export_dir_reports_the_io_error() {
    let root = std::env::temp_dir().join(format!("lifegrid-blocked-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).unwrap();
    // A regular file where the output directory's parent should be.
    let file = root.join("not-a-dir");
    std::fs::write(&file, b"x").unwrap();

    for layout in [Layout::Strips, Layout::Blocks] {
        let mut c = config(layout, 4);
        c.frame_size = 64;
        c.iterations = 400;
        c.scale = 1;
        c.export_dir = Some(file.join("sub"));
        let err = run_simulation(&c).unwrap_err();
        assert!(
            matches!(err, SimulationError::Export(ExportError::Io { .. })),
            "{layout}: {err}"
        );
    }
    let _ = std::fs::remove_dir_all(&root);
}
