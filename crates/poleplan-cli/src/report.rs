//! End-to-end planning run and its JSON report.

use crate::input::ScenarioFile;
use anyhow::Context;
use chrono::{DateTime, Utc};
use poleplan_core::terrain::classify_route;
use poleplan_core::{
    assemble_project, assess_area, detect_barriers, plan_placement, AreaAssessment,
    BarrierReport, Classification, PlacementOutcome, PlacementSettings, PlanError, ProjectConfig,
    ProjectLayout, ProjectValidation, SpanTargets,
};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub scenario: String,
    pub generated_at: DateTime<Utc>,
    pub config: ProjectConfig,
    /// Density of the scenario terrain, whether or not it set the area type.
    pub area: AreaAssessment,
    /// Targets after clamping.
    pub span_targets: SpanTargets,
    pub placement: PlacementOutcome,
    /// Terrain under each placed pole, in anchor order.
    pub pole_terrain: Vec<Classification>,
    pub layout: ProjectLayout,
    pub barriers: BarrierReport,
    pub validation: ProjectValidation,
}

impl PlanReport {
    pub fn log_summary(&self) {
        tracing::info!(
            scenario = %self.scenario,
            poles = self.layout.poles.len(),
            corners = self.placement.stats.total_corners,
            crossings = self.placement.stats.total_crossings,
            relocated = self.placement.stats.relocated_anchors,
            route_length_m = self.placement.stats.route_length_m,
            barriers = self.barriers.summary.total,
            critical_barriers = self.barriers.summary.critical,
            valid = self.validation.valid,
            "plan complete"
        );
        for finding in self.validation.errors() {
            tracing::warn!(field = %finding.field, "{}", finding.message);
        }
    }
}

/// Place, assemble and validate one scenario.
pub fn plan_report(
    scenario: &ScenarioFile,
    spans: SpanTargets,
    settings: &PlacementSettings,
) -> Result<PlanReport, PlanError> {
    let span_targets = spans.validate()?;
    let placement = plan_placement(&scenario.route, &scenario.terrain, span_targets, settings)?;
    let pole_terrain = classify_route(&placement.coordinates(), &scenario.terrain);
    let layout = assemble_project(&placement.anchors, &scenario.config, &scenario.assembly);
    let barriers = detect_barriers(&layout.poles, &scenario.terrain, &scenario.elevation_profile);
    let validation = layout.validate(&scenario.config);

    Ok(PlanReport {
        scenario: scenario.display_name().to_string(),
        generated_at: Utc::now(),
        config: scenario.config.clone(),
        area: assess_area(&scenario.terrain),
        span_targets,
        placement,
        pole_terrain,
        layout,
        barriers,
        validation,
    })
}

/// Write `value` as JSON to `path`, or to stdout when no path is given.
pub fn write_json<T: Serialize>(
    value: &T,
    path: Option<&Path>,
    compact: bool,
) -> anyhow::Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    match path {
        Some(path) => {
            fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}
