//! Barriers along the assembled network, span by span.
//!
//! Each span between consecutive poles is checked against the terrain
//! obstacles it crosses, trees close to the conductor, vegetation under it and
//! the slope of the elevation profile beneath it.

use crate::models::{
    Coordinate, ObstacleGeometry, ObstacleKind, PoleRecord, Severity, TerrainSnapshot,
};
use crate::spatial::{
    haversine_distance, interpolate, point_to_segment_distance, segment_intersection,
};
use crate::terrain::{classify, slope_between, ElevationSample, TerrainCategory};
use serde::Serialize;

/// Trees closer than this to a span need trimming.
pub const TREE_CLEARANCE_M: f64 = 5.0;
/// Slopes above this percentage are reported.
pub const STEEP_SLOPE_PCT: f64 = 20.0;
/// Slopes above this percentage need a special structure.
pub const CRITICAL_SLOPE_PCT: f64 = 35.0;
/// Elevation samples within this distance of a span describe its ground.
const SLOPE_SAMPLE_RADIUS_M: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierKind {
    WaterCrossing,
    RailwayCrossing,
    RoadCrossing,
    PowerLineCrossing,
    VegetationClearing,
    TreeTrimming,
    SteepSlope,
}

/// What a barrier means for construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarrierImpact {
    pub min_height_m: Option<f64>,
    pub right_of_way_m: Option<f64>,
    pub requires_authorization: bool,
    pub authority: Option<&'static str>,
    pub note: &'static str,
}

impl BarrierKind {
    fn for_obstacle(kind: ObstacleKind) -> Self {
        match kind {
            ObstacleKind::River | ObstacleKind::Lake => BarrierKind::WaterCrossing,
            ObstacleKind::Railway => BarrierKind::RailwayCrossing,
            ObstacleKind::Road => BarrierKind::RoadCrossing,
            ObstacleKind::PowerLine => BarrierKind::PowerLineCrossing,
            ObstacleKind::Tree => BarrierKind::TreeTrimming,
            ObstacleKind::GreenArea => BarrierKind::VegetationClearing,
        }
    }

    pub const fn impact(self) -> BarrierImpact {
        match self {
            BarrierKind::WaterCrossing => BarrierImpact {
                min_height_m: Some(6.0),
                right_of_way_m: Some(15.0),
                requires_authorization: true,
                authority: Some("navy / water agency"),
                note: "water crossing needs 6 m clearance and authorization",
            },
            BarrierKind::RailwayCrossing => BarrierImpact {
                min_height_m: Some(9.0),
                right_of_way_m: Some(20.0),
                requires_authorization: true,
                authority: Some("rail regulator / concessionaire"),
                note: "railway crossing needs 9 m clearance and authorization",
            },
            BarrierKind::RoadCrossing => BarrierImpact {
                min_height_m: Some(7.0),
                right_of_way_m: Some(15.0),
                requires_authorization: true,
                authority: Some("highway department"),
                note: "road crossing clearance depends on the road class",
            },
            BarrierKind::PowerLineCrossing => BarrierImpact {
                min_height_m: Some(6.0),
                right_of_way_m: Some(25.0),
                requires_authorization: true,
                authority: Some("transmission line owner"),
                note: "crossing a transmission line needs a safety distance",
            },
            BarrierKind::VegetationClearing => BarrierImpact {
                min_height_m: None,
                right_of_way_m: Some(6.0),
                requires_authorization: false,
                authority: None,
                note: "clear vegetation 3 m to each side of the line",
            },
            BarrierKind::TreeTrimming => BarrierImpact {
                min_height_m: None,
                right_of_way_m: Some(4.0),
                requires_authorization: false,
                authority: None,
                note: "trim branches to keep the safety strip",
            },
            BarrierKind::SteepSlope => BarrierImpact {
                min_height_m: None,
                right_of_way_m: None,
                requires_authorization: false,
                authority: None,
                note: "slope above 20 %, check foundation and structure",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Barrier {
    pub id: String,
    pub kind: BarrierKind,
    pub description: String,
    pub pole_before: String,
    pub pole_after: String,
    pub coordinate: Option<Coordinate>,
    /// Distance from the first pole of the span.
    pub distance_m: Option<f64>,
    pub severity: Severity,
    pub impact: BarrierImpact,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BarrierSummary {
    pub total: usize,
    pub critical: usize,
    pub warnings: usize,
    pub infos: usize,
    pub water_crossings: usize,
    pub railway_crossings: usize,
    pub road_crossings: usize,
    pub power_line_crossings: usize,
    pub vegetation: usize,
    pub trees: usize,
    pub steep_slopes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BarrierReport {
    pub barriers: Vec<Barrier>,
    pub summary: BarrierSummary,
}

impl BarrierReport {
    pub fn from_barriers(barriers: Vec<Barrier>) -> Self {
        let mut summary = BarrierSummary {
            total: barriers.len(),
            ..BarrierSummary::default()
        };
        for barrier in &barriers {
            match barrier.severity {
                Severity::Error => summary.critical += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
            let counter = match barrier.kind {
                BarrierKind::WaterCrossing => &mut summary.water_crossings,
                BarrierKind::RailwayCrossing => &mut summary.railway_crossings,
                BarrierKind::RoadCrossing => &mut summary.road_crossings,
                BarrierKind::PowerLineCrossing => &mut summary.power_line_crossings,
                BarrierKind::VegetationClearing => &mut summary.vegetation,
                BarrierKind::TreeTrimming => &mut summary.trees,
                BarrierKind::SteepSlope => &mut summary.steep_slopes,
            };
            *counter += 1;
        }
        Self { barriers, summary }
    }
}

struct SpanContext<'a> {
    before: &'a PoleRecord,
    after: &'a PoleRecord,
}

impl SpanContext<'_> {
    fn barrier(
        &self,
        index: usize,
        kind: BarrierKind,
        description: String,
        severity: Severity,
    ) -> Barrier {
        Barrier {
            id: format!("barrier-{index}"),
            kind,
            description,
            pole_before: self.before.id.clone(),
            pole_after: self.after.id.clone(),
            coordinate: None,
            distance_m: None,
            severity,
            impact: kind.impact(),
            name: None,
        }
    }
}

/// Steepest slope between consecutive profile samples lying under the span.
fn span_slope_pct(a: Coordinate, b: Coordinate, profile: &[ElevationSample]) -> Option<f64> {
    let near = |sample: &ElevationSample| {
        point_to_segment_distance(sample.coordinate, a, b) <= SLOPE_SAMPLE_RADIUS_M
    };
    profile
        .windows(2)
        .filter(|pair| near(&pair[0]) && near(&pair[1]))
        .map(|pair| slope_between(&pair[0], &pair[1]))
        .max_by(|x, y| x.total_cmp(y))
}

/// Walk every span of `poles` and report what it crosses or passes.
///
/// Obstacle edges crossed by a span produce crossings: critical when they need
/// third-party authorization, warnings otherwise. Trees within
/// [`TREE_CLEARANCE_M`] are informational. A span whose midpoint sits in
/// vegetation without crossing its edge still needs clearing.
pub fn detect_barriers(
    poles: &[PoleRecord],
    terrain: &TerrainSnapshot,
    profile: &[ElevationSample],
) -> BarrierReport {
    let mut barriers = Vec::new();

    for pair in poles.windows(2) {
        let span = SpanContext {
            before: &pair[0],
            after: &pair[1],
        };
        let (a, b) = (span.before.coordinate, span.after.coordinate);
        let mut crossed_vegetation = false;

        for obstacle in &terrain.obstacles {
            let kind = BarrierKind::for_obstacle(obstacle.kind);
            for (start, end) in obstacle.geometry.segments() {
                let Some(intersection) = segment_intersection(a, b, start, end) else {
                    continue;
                };
                crossed_vegetation |= kind == BarrierKind::VegetationClearing;
                let impact = kind.impact();
                let severity = if impact.requires_authorization {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                let mut barrier = span.barrier(
                    barriers.len() + 1,
                    kind,
                    format!("crossing of {}", obstacle.display_name()),
                    severity,
                );
                barrier.coordinate = Some(intersection);
                barrier.distance_m = Some(haversine_distance(a, intersection));
                barrier.name = obstacle.name.clone();
                barriers.push(barrier);
            }

            if obstacle.kind == ObstacleKind::Tree {
                if let ObstacleGeometry::Point(tree) = &obstacle.geometry {
                    let tree = *tree;
                    let distance = point_to_segment_distance(tree, a, b);
                    if distance <= TREE_CLEARANCE_M {
                        let mut barrier = span.barrier(
                            barriers.len() + 1,
                            BarrierKind::TreeTrimming,
                            format!("tree {distance:.1} m from the line"),
                            Severity::Info,
                        );
                        barrier.coordinate = Some(tree);
                        barrier.distance_m = Some(distance);
                        barrier.name = obstacle.name.clone();
                        barriers.push(barrier);
                    }
                }
            }
        }

        if !crossed_vegetation {
            let midpoint = interpolate(a, b, 0.5);
            if classify(midpoint, terrain).category == TerrainCategory::Forest {
                let mut barrier = span.barrier(
                    barriers.len() + 1,
                    BarrierKind::VegetationClearing,
                    "span runs through vegetation".to_string(),
                    Severity::Warning,
                );
                barrier.coordinate = Some(midpoint);
                barriers.push(barrier);
            }
        }

        if let Some(slope) = span_slope_pct(a, b, profile).filter(|s| *s > STEEP_SLOPE_PCT) {
            let severity = if slope > CRITICAL_SLOPE_PCT {
                Severity::Error
            } else {
                Severity::Warning
            };
            barriers.push(span.barrier(
                barriers.len() + 1,
                BarrierKind::SteepSlope,
                format!("{slope:.1} % slope under the span"),
                severity,
            ));
        }
    }

    let report = BarrierReport::from_barriers(barriers);
    tracing::debug!(
        total = report.summary.total,
        critical = report.summary.critical,
        trees = report.summary.trees,
        "barrier detection complete"
    );
    report
}
