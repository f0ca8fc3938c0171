//! Scenario files: a route, its terrain and the project configuration.

use anyhow::{Context, Result};
use poleplan_core::terrain::ElevationSample;
use poleplan_core::{
    assess_area, AreaType, AssemblyOptions, Coordinate, ProjectConfig, SpanTargets,
    TerrainSnapshot,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub name: Option<String>,
    pub route: Vec<Coordinate>,
    pub terrain: TerrainSnapshot,
    #[serde(default)]
    pub config: ProjectConfig,
    #[serde(default)]
    pub ideal_span_m: Option<f64>,
    #[serde(default)]
    pub assembly: AssemblyOptions,
    #[serde(default)]
    pub elevation_profile: Vec<ElevationSample>,
}

impl ScenarioFile {
    /// Span targets for placement. `override_m` beats the file's own ideal
    /// span, which beats the one derived from the project configuration.
    pub fn span_targets(&self, override_m: Option<f64>) -> SpanTargets {
        let targets = SpanTargets::from_config(&self.config);
        match override_m.or(self.ideal_span_m) {
            Some(ideal_m) => targets.with_ideal(ideal_m),
            None => targets,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

/// The part of a scenario file that says whether it names its area type.
#[derive(Debug, Default, Deserialize)]
struct DeclaredArea {
    #[serde(default)]
    config: DeclaredAreaConfig,
}

#[derive(Debug, Default, Deserialize)]
struct DeclaredAreaConfig {
    #[serde(default)]
    area_type: Option<AreaType>,
}

/// Parse a scenario. A file that does not name an area type gets the one
/// its terrain density points to.
pub fn parse_scenario(raw: &str) -> Result<ScenarioFile> {
    let mut scenario: ScenarioFile = serde_json::from_str(raw).context("Invalid scenario JSON")?;
    let declared: DeclaredArea = serde_json::from_str(raw).context("Invalid scenario JSON")?;
    if declared.config.area_type.is_none() {
        let assessment = assess_area(&scenario.terrain);
        tracing::info!(
            area_type = ?assessment.area_type,
            confidence = assessment.confidence,
            buildings_per_km2 = assessment.buildings_per_km2,
            street_km_per_km2 = assessment.street_km_per_km2,
            "area type inferred from terrain"
        );
        scenario.config.area_type = assessment.area_type;
    }
    Ok(scenario)
}

pub fn load_scenario(path: &Path) -> Result<ScenarioFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    parse_scenario(&raw).with_context(|| format!("Failed to load {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use poleplan_core::NetworkType;

    const MINIMAL: &str = r#"{
        "route": [{"lat": -2.53, "lng": -44.30}, {"lat": -2.53, "lng": -44.299}],
        "terrain": {"bbox": {"south": -2.54, "west": -44.31, "north": -2.52, "east": -44.29}}
    }"#;

    #[test]
    fn minimal_file_uses_defaults() {
        let scenario = parse_scenario(MINIMAL).unwrap();
        assert_eq!(scenario.route.len(), 2);
        assert!(scenario.terrain.is_empty());
        assert_eq!(scenario.config, ProjectConfig::default());
        assert_eq!(scenario.display_name(), "unnamed");
        assert!(scenario.elevation_profile.is_empty());
    }

    #[test]
    fn partial_config_is_merged_with_defaults() {
        let raw = r#"{
            "name": "rua nova",
            "route": [],
            "terrain": {"bbox": {"south": 0, "west": 0, "north": 0, "east": 0}},
            "config": {"area_type": "urban", "with_low_voltage": true}
        }"#;
        let scenario = parse_scenario(raw).unwrap();
        assert_eq!(scenario.config.area_type, AreaType::Urban);
        assert_eq!(scenario.config.network_type, NetworkType::Conventional);
        assert!(scenario.config.with_low_voltage);
        assert_eq!(scenario.config.mv_conductor, "1/0 AWG");
    }

    #[test]
    fn ideal_span_precedence() {
        let mut scenario = parse_scenario(MINIMAL).unwrap();
        assert_eq!(scenario.span_targets(None).ideal_m, 100.0);

        scenario.ideal_span_m = Some(70.0);
        assert_eq!(scenario.span_targets(None).ideal_m, 70.0);
        assert_eq!(scenario.span_targets(Some(60.0)).ideal_m, 60.0);
    }

    fn dense_terrain(area_type: Option<&str>) -> String {
        // 60 houses on a 10 m grid inside a 0.2 km² box.
        let buildings: Vec<serde_json::Value> = (0..60)
            .map(|i| {
                let lat = -2.530 + (i / 10) as f64 * 0.0001;
                let lng = -44.300 + (i % 10) as f64 * 0.0001;
                serde_json::json!({
                    "id": i,
                    "polygon": [
                        {"lat": lat, "lng": lng},
                        {"lat": lat, "lng": lng + 0.00005},
                        {"lat": lat + 0.00005, "lng": lng + 0.00005}
                    ]
                })
            })
            .collect();
        let mut config = serde_json::json!({"network_type": "conventional"});
        if let Some(area_type) = area_type {
            config["area_type"] = serde_json::json!(area_type);
        }
        serde_json::json!({
            "route": [{"lat": -2.530, "lng": -44.300}, {"lat": -2.530, "lng": -44.298}],
            "terrain": {
                "buildings": buildings,
                "bbox": {"south": -2.532, "west": -44.302, "north": -2.528, "east": -44.298}
            },
            "config": config
        })
        .to_string()
    }

    #[test]
    fn missing_area_type_is_inferred_from_terrain() {
        let scenario = parse_scenario(&dense_terrain(None)).unwrap();
        assert_eq!(scenario.config.area_type, AreaType::Urban);
        assert_eq!(scenario.config.network_type, NetworkType::Conventional);
    }

    #[test]
    fn declared_area_type_wins_over_terrain() {
        let scenario = parse_scenario(&dense_terrain(Some("rural"))).unwrap();
        assert_eq!(scenario.config.area_type, AreaType::Rural);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_scenario("{\"route\": 3}").unwrap_err();
        assert!(err.to_string().contains("Invalid scenario JSON"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_scenario(Path::new("/nonexistent/scenario.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/scenario.json"));
    }
}
