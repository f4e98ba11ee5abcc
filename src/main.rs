//! Conway's Game of Life.
//!
//! Usage: `conway-life [--width W] [--height H] [--interval-ms MS] [--seed N]
//! [--snapshot PATH] [--load] [--headless GENERATIONS]`

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use winit::event_loop::{ControlFlow, EventLoop};

use conway_life::app::{App, Settings};
use conway_life::config::{DEFAULT_SNAPSHOT_PATH, GRID_HEIGHT, GRID_WIDTH, TICK_INTERVAL_MS};
use conway_life::persistence;
use conway_life::render::ConsoleRenderer;
use conway_life::simulation::{Engine, Grid};

#[derive(Parser, Debug)]
#[command(name = "conway-life")]
#[command(about = "Conway's Game of Life on a fixed-size grid")]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = GRID_WIDTH)]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value_t = GRID_HEIGHT)]
    height: usize,

    /// Milliseconds between generations while running
    #[arg(long = "interval-ms", default_value_t = TICK_INTERVAL_MS)]
    interval_ms: u64,

    /// Seed for reproducible randomization
    #[arg(long)]
    seed: Option<u64>,

    /// Snapshot file used by save/load
    #[arg(long, default_value = DEFAULT_SNAPSHOT_PATH)]
    snapshot: PathBuf,

    /// Start from the snapshot file instead of a random grid
    #[arg(long)]
    load: bool,

    /// Run this many generations printing to stdout, without a window
    #[arg(long)]
    headless: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // Loaded snapshots decide the grid size
    let initial = if args.load {
        Some(persistence::load(&args.snapshot)?)
    } else {
        None
    };

    if let Some(generations) = args.headless {
        return run_headless(&args, initial, generations);
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(Settings {
        width: args.width,
        height: args.height,
        tick_interval: Duration::from_millis(args.interval_ms),
        seed: args.seed,
        snapshot_path: args.snapshot,
        initial,
    });
    event_loop.run_app(&mut app)?;

    Ok(())
}

fn run_headless(
    args: &Args,
    initial: Option<Grid>,
    generations: u64,
) -> Result<(), Box<dyn Error>> {
    let (width, height) = initial
        .as_ref()
        .map_or((args.width, args.height), Grid::dimensions);

    let renderer = ConsoleRenderer::new(io::stdout().lock());
    let mut engine = Engine::from_seed(width, height, renderer, args.seed)?;

    match initial {
        Some(grid) => engine.import_snapshot(grid)?,
        None => engine.randomize(),
    }

    for _ in 0..generations {
        engine.step();
    }

    log::info!(
        "Finished after {} generations, {} cells alive",
        engine.generation(),
        engine.grid().alive_count()
    );
    Ok(())
}
