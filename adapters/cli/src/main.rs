#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays seeded cascades on a text grid.

mod config;
mod logging;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cascade_core::{Command, Event, PhaseReport};
use cascade_system_autoplay::{self as autoplay, Autoplay};
use cascade_world::{self as world, query, TileGrid};
use clap::Parser;
use log::{info, warn};

use crate::{
    config::{FileConfig, Overrides, Settings},
    render::Legend,
};

/// Phases after which a cascade is considered runaway and abandoned.
const MAX_PHASES_PER_CASCADE: u32 = 256;

#[derive(Debug, Parser)]
#[command(
    name = "cascade",
    version,
    about = "Plays seeded tile-matching cascades in the terminal"
)]
struct CliArgs {
    /// TOML file with grid dimensions, minimum run length, seed and tile palette.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Number of rows in the grid.
    #[arg(long)]
    rows: Option<u32>,
    /// Number of columns in the grid.
    #[arg(long)]
    columns: Option<u32>,
    /// Minimum straight-line length for a group to be removed.
    #[arg(long)]
    min_run: Option<usize>,
    /// Seed shared by tile generation and swap selection.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of swaps to play before exiting.
    #[arg(long, default_value_t = 10)]
    swaps: u32,
    /// Log every swap, phase and generation fixup to stderr.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the cascade command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    logging::init(args.verbose)?;
    run(&args)
}

fn run(args: &CliArgs) -> Result<()> {
    let file = match &args.config {
        Some(path) => config::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(
        file,
        Overrides {
            rows: args.rows,
            columns: args.columns,
            min_run: args.min_run,
            seed: args.seed,
        },
    )?;

    let palette = settings.palette()?;
    let legend = Legend::new(settings.tiles.iter().map(|tile| tile.name.as_str()));
    let mut grid =
        TileGrid::new(settings.grid, palette).context("failed to generate the tile grid")?;
    let mut autoplay = Autoplay::new(autoplay::Config::new(
        settings.grid.rows(),
        settings.grid.columns(),
        settings.grid.min_run(),
        settings.grid.seed(),
    ));

    info!(
        "generated {}x{} grid, minimum run {}, seed {:#x}",
        settings.grid.rows(),
        settings.grid.columns(),
        settings.grid.min_run(),
        settings.grid.seed()
    );
    println!("legend: {}", legend.describe());
    println!("initial grid:");
    print!("{}", legend.render(&query::layout(&grid)));

    let mut events = vec![Event::GridGenerated {
        rows: settings.grid.rows(),
        columns: settings.grid.columns(),
    }];
    let mut played = 0;
    let mut cleared = 0;

    'session: loop {
        let mut commands = Vec::new();
        autoplay.handle(
            &events,
            |cell| query::tile_type(&grid, cell).ok().flatten(),
            &mut commands,
        );
        if commands.is_empty() {
            warn!("no further moves are available");
            break;
        }

        events.clear();
        for command in commands {
            if let Command::Swap { from, to } = command {
                if played == args.swaps {
                    break 'session;
                }
                played += 1;
                println!("swap {played}: {from} <-> {to}");
            }
            world::apply(&mut grid, command, &mut events).context("grid rejected command")?;
        }

        for event in &events {
            match event {
                Event::RunsResolved { report } => {
                    cleared += report.cleared_tiles();
                    print_phase(report, &legend);
                }
                Event::SwapSettled { .. } => {
                    println!("{}", legend.render(&query::layout(&grid)));
                }
                _ => {}
            }
        }

        if let world::CascadeState::Resolving { next_phase, .. } = query::cascade_state(&grid) {
            if next_phase >= MAX_PHASES_PER_CASCADE {
                warn!("cascade still resolving after {next_phase} phases; abandoning it");
                let mut abandoned = Vec::new();
                grid.abandon(&mut abandoned);
                events = abandoned;
            }
        }
    }

    println!("final grid after {played} swap(s), {cleared} tile(s) cleared:");
    print!("{}", legend.render(&query::layout(&grid)));
    Ok(())
}

fn print_phase(report: &PhaseReport, legend: &Legend) {
    let runs = report
        .runs()
        .iter()
        .map(|run| {
            format!(
                "{} x{} ({}x{})",
                legend.name(run.tile_type()),
                run.len(),
                run.horizontal(),
                run.vertical()
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "  phase {}: {} run(s) [{runs}], {} cleared, {} spawned",
        report.phase(),
        report.runs().len(),
        report.cleared_tiles(),
        report.spawned_tiles()
    );
}
