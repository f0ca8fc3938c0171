//! Rasterize scenario terrain into a traversal cost grid.
//!
//! Prints grid statistics, optionally with the full cost matrix. Cells are
//! POLEPLAN_CELL_SIZE_M wide unless --cell-size is given.
//!
//! Usage:
//!   cargo run -p poleplan-cli --bin cost_grid -- --scenario suburb --slope

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgGroup, Parser};
use poleplan_cli::logging::init_tracing;
use poleplan_cli::{build_scenario, load_scenario, write_json, CliConfig, ScenarioKind};
use poleplan_core::terrain::GridStats;
use poleplan_core::{build_cost_grid, BoundingBox, CostGrid};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Build a terrain cost grid for a scenario")]
#[command(group(ArgGroup::new("source").required(true).args(["input", "scenario"])))]
struct Args {
    /// Scenario JSON file
    #[arg(long)]
    input: Option<PathBuf>,

    /// Built-in scenario
    #[arg(long, value_enum)]
    scenario: Option<ScenarioKind>,

    /// Cell edge in meters
    #[arg(long)]
    cell_size: Option<f64>,

    /// Scale costs by the scenario's elevation profile
    #[arg(long, default_value_t = false)]
    slope: bool,

    /// Include every cell cost in the output; impassable cells print as null
    #[arg(long, default_value_t = false)]
    cells: bool,

    /// Write the result here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct GridReport {
    scenario: String,
    generated_at: DateTime<Utc>,
    bbox: BoundingBox,
    rows: usize,
    cols: usize,
    cell_size_m: f64,
    slope_applied: bool,
    stats: GridStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    grid: Option<CostGrid>,
}

fn main() -> Result<()> {
    init_tracing("cost_grid")?;
    let args = Args::parse();
    let config = CliConfig::from_env();

    let scenario = match (&args.input, args.scenario) {
        (Some(path), _) => load_scenario(path)?,
        (None, Some(kind)) => build_scenario(kind, config.seed),
        (None, None) => bail!("either --input or --scenario is required"),
    };
    let cell_size_m = args.cell_size.unwrap_or(config.cell_size_m);

    let mut grid = build_cost_grid(&scenario.terrain, scenario.terrain.bbox, cell_size_m)
        .with_context(|| format!("Cost grid for {} failed", scenario.display_name()))?;
    let slope_applied = args.slope && scenario.elevation_profile.len() >= 2;
    if slope_applied {
        grid = grid.apply_slope_factors(&scenario.elevation_profile);
    } else if args.slope {
        tracing::warn!("Scenario has no elevation profile, slope factors skipped");
    }

    let stats = grid.stats();
    tracing::info!(
        scenario = scenario.display_name(),
        rows = grid.rows(),
        cols = grid.cols(),
        impassable = stats.impassable_cells,
        mean_cost = stats.mean_cost,
        "Cost grid built"
    );

    let report = GridReport {
        scenario: scenario.display_name().to_string(),
        generated_at: Utc::now(),
        bbox: grid.bbox(),
        rows: grid.rows(),
        cols: grid.cols(),
        cell_size_m: grid.cell_size_m(),
        slope_applied,
        stats,
        grid: args.cells.then_some(grid),
    };
    write_json(&report, args.output.as_deref(), false)
}
