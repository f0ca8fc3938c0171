//! Plan a pole network along a route.
//!
//! Loads a scenario (file or built-in), places anchors, assembles poles and
//! conductors, validates the project and prints the JSON report.
//!
//! Usage:
//!   cargo run -p poleplan-cli --bin plan_network -- --scenario crossing
//!   cargo run -p poleplan-cli --bin plan_network -- --input route.json --output plan.json

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use poleplan_cli::logging::init_tracing;
use poleplan_cli::{
    build_scenario, load_scenario, plan_report, write_json, CliConfig, ScenarioKind,
};
use poleplan_core::PlacementSettings;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Place poles along a routed distribution network")]
#[command(group(ArgGroup::new("source").required(true).args(["input", "scenario"])))]
struct Args {
    /// Scenario JSON file (route, terrain, project config)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Built-in scenario
    #[arg(long, value_enum)]
    scenario: Option<ScenarioKind>,

    /// Ideal span in meters, overrides POLEPLAN_IDEAL_SPAN_M and the file
    #[arg(long)]
    ideal_span: Option<f64>,

    /// Write the report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Single-line JSON
    #[arg(long, default_value_t = false)]
    compact: bool,
}

fn main() -> Result<()> {
    init_tracing("plan_network")?;
    let args = Args::parse();
    let config = CliConfig::from_env();

    let scenario = match (&args.input, args.scenario) {
        (Some(path), _) => load_scenario(path)?,
        (None, Some(kind)) => build_scenario(kind, config.seed),
        (None, None) => bail!("either --input or --scenario is required"),
    };
    tracing::info!(
        scenario = scenario.display_name(),
        route_points = scenario.route.len(),
        streets = scenario.terrain.streets.len(),
        buildings = scenario.terrain.buildings.len(),
        "Planning network"
    );

    let spans = scenario.span_targets(args.ideal_span.or(config.ideal_span_m));
    let report = plan_report(&scenario, spans, &PlacementSettings::default())
        .with_context(|| format!("Planning {} failed", scenario.display_name()))?;
    report.log_summary();

    write_json(&report, args.output.as_deref(), args.compact)
}
