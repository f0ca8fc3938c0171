//! Route analysis: street corners, crossings and building exclusion zones.

use crate::models::{
    Building, Coordinate, Corner, Crossing, CrossingKind, ExclusionZone, Obstacle, ObstacleKind,
    Street, TerrainSnapshot, VoltageLevel,
};
use crate::rules::{crossing_clearance_height, CrossingLocation};
use crate::spatial::{
    haversine_distance, local_offset_m, offset_meters, point_to_polyline_distance,
    segment_intersection,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Road classes that need a highway-grade crossing.
const HIGHWAY_CLASSES: &[&str] = &["trunk", "motorway", "primary", "trunk_link", "motorway_link"];
/// Road classes crossed as avenues.
const AVENUE_CLASSES: &[&str] = &["primary", "secondary", "tertiary"];

/// Route segments shorter than this have no usable direction.
const MIN_SEGMENT_LENGTH_M: f64 = 1e-3;

/// Tunable parameters for route analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Street intersections further than this from the route are ignored.
    pub corner_search_radius_m: f64,
    /// Priority of a perfectly square corner.
    pub corner_base_priority: f64,
    /// Minimum clearance from a building facade.
    pub facade_clearance_m: f64,
    /// Distance between a crossing pole and the edge of what it crosses.
    pub crossing_pole_clearance_m: f64,
    pub highway_width_m: f64,
    pub avenue_width_m: f64,
    pub railway_width_m: f64,
    pub river_width_m: f64,
    pub river_clearance_height_m: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            corner_search_radius_m: 15.0,
            corner_base_priority: 80.0,
            facade_clearance_m: 1.5,
            crossing_pole_clearance_m: 5.0,
            highway_width_m: 20.0,
            avenue_width_m: 12.0,
            railway_width_m: 15.0,
            river_width_m: 20.0,
            river_clearance_height_m: 6.0,
        }
    }
}

impl AnalysisSettings {
    fn clearance_height(&self, kind: CrossingKind) -> f64 {
        let location = match kind {
            CrossingKind::Highway => CrossingLocation::FederalHighway,
            CrossingKind::Avenue => CrossingLocation::Avenue,
            CrossingKind::Railway => CrossingLocation::Railway,
            CrossingKind::River => return self.river_clearance_height_m,
        };
        crossing_clearance_height(location, VoltageLevel::Medium)
            .unwrap_or(self.river_clearance_height_m)
    }
}

/// Everything the placement step needs to know about the route's surroundings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteAnalysis {
    pub corners: Vec<Corner>,
    pub crossings: Vec<Crossing>,
    pub exclusion_zones: Vec<ExclusionZone>,
}

pub fn analyze_route(
    route: &[Coordinate],
    terrain: &TerrainSnapshot,
    settings: &AnalysisSettings,
) -> RouteAnalysis {
    let analysis = RouteAnalysis {
        corners: detect_corners(route, &terrain.streets, settings),
        crossings: detect_crossings(route, &terrain.streets, &terrain.obstacles, settings),
        exclusion_zones: exclusion_zones(&terrain.buildings, settings),
    };
    tracing::debug!(
        corners = analysis.corners.len(),
        crossings = analysis.crossings.len(),
        exclusion_zones = analysis.exclusion_zones.len(),
        "route analysis complete"
    );
    analysis
}

fn street_label(street: &Street) -> String {
    if street.name.trim().is_empty() {
        format!("street {}", street.id)
    } else {
        street.name.clone()
    }
}

fn rounded_key(coord: Coordinate) -> (i64, i64) {
    ((coord.lat * 1e6).round() as i64, (coord.lng * 1e6).round() as i64)
}

/// The segment endpoint further from `from`, so the direction vector is never empty.
fn far_end(from: Coordinate, a: Coordinate, b: Coordinate) -> Coordinate {
    if haversine_distance(from, a) >= haversine_distance(from, b) {
        a
    } else {
        b
    }
}

/// Angle in [0, 360) from the direction of `a` to the direction of `b`, seen from `center`.
fn corner_angle(center: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let (ax, ay) = local_offset_m(center, a);
    let (bx, by) = local_offset_m(center, b);
    let dot = ax * bx + ay * by;
    let cross = ax * by - ay * bx;
    let angle = cross.atan2(dot).to_degrees();
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Score a corner; square corners get `base`, straight or folded ones get `base - 45`.
pub fn corner_priority(angle_deg: f64, base: f64) -> f64 {
    let deviation = (90.0 - (angle_deg - 180.0).abs()).abs();
    base - deviation / 2.0
}

/// Intersections between pairs of streets that lie near the route.
///
/// Intersections are deduplicated on a 1e-6 degree grid.
pub fn detect_corners(
    route: &[Coordinate],
    streets: &[Street],
    settings: &AnalysisSettings,
) -> Vec<Corner> {
    let mut corners = Vec::new();
    if route.len() < 2 {
        return corners;
    }
    let mut seen = HashSet::new();

    for (i, first) in streets.iter().enumerate() {
        for second in streets.iter().skip(i + 1) {
            for a in first.points.windows(2) {
                for b in second.points.windows(2) {
                    let Some(point) = segment_intersection(a[0], a[1], b[0], b[1]) else {
                        continue;
                    };
                    if point_to_polyline_distance(point, route) > settings.corner_search_radius_m {
                        continue;
                    }
                    if !seen.insert(rounded_key(point)) {
                        continue;
                    }

                    let angle_deg = corner_angle(
                        point,
                        far_end(point, a[0], a[1]),
                        far_end(point, b[0], b[1]),
                    );
                    corners.push(Corner {
                        id: format!("corner-{}", corners.len() + 1),
                        coordinate: point,
                        streets: vec![street_label(first), street_label(second)],
                        angle_deg,
                        priority: corner_priority(angle_deg, settings.corner_base_priority),
                    });
                }
            }
        }
    }

    corners
}

fn street_crossing_kind(road_class: &str) -> Option<CrossingKind> {
    if HIGHWAY_CLASSES.contains(&road_class) {
        Some(CrossingKind::Highway)
    } else if AVENUE_CLASSES.contains(&road_class) {
        Some(CrossingKind::Avenue)
    } else {
        None
    }
}

struct CrossingTarget {
    key: (&'static str, i64),
    kind: CrossingKind,
    name: String,
    width_m: f64,
    edges: Vec<(Coordinate, Coordinate)>,
}

fn street_target(street: &Street, settings: &AnalysisSettings) -> Option<CrossingTarget> {
    let kind = street_crossing_kind(&street.road_class)?;
    let default_width = match kind {
        CrossingKind::Highway => settings.highway_width_m,
        _ => settings.avenue_width_m,
    };
    Some(CrossingTarget {
        key: ("street", street.id),
        kind,
        name: street_label(street),
        width_m: street
            .width_m
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(default_width),
        edges: street.points.windows(2).map(|w| (w[0], w[1])).collect(),
    })
}

/// Railways and rivers, as lines or as polygons whose banks the route crosses.
fn obstacle_target(obstacle: &Obstacle, settings: &AnalysisSettings) -> Option<CrossingTarget> {
    let (kind, width_m) = match obstacle.kind {
        ObstacleKind::Railway => (CrossingKind::Railway, settings.railway_width_m),
        ObstacleKind::River => (CrossingKind::River, settings.river_width_m),
        _ => return None,
    };
    let edges = obstacle.geometry.segments();
    if edges.is_empty() {
        return None;
    }
    Some(CrossingTarget {
        key: ("obstacle", obstacle.id),
        kind,
        name: obstacle.display_name(),
        width_m,
        edges,
    })
}

/// Places where the route crosses a major road, a railway or a river.
///
/// Each crossing gets a `before`/`after` pair straddling the intersection at
/// `width / 2 + clearance` meters along the route direction. Zero-length
/// route segments are skipped.
pub fn detect_crossings(
    route: &[Coordinate],
    streets: &[Street],
    obstacles: &[Obstacle],
    settings: &AnalysisSettings,
) -> Vec<Crossing> {
    let targets: Vec<CrossingTarget> = streets
        .iter()
        .filter_map(|street| street_target(street, settings))
        .chain(
            obstacles
                .iter()
                .filter_map(|obstacle| obstacle_target(obstacle, settings)),
        )
        .collect();

    let mut crossings = Vec::new();
    let mut seen = HashSet::new();

    for target in &targets {
        for segment in route.windows(2) {
            let (p1, p2) = (segment[0], segment[1]);
            let (east, north) = local_offset_m(p1, p2);
            let length = east.hypot(north);
            if length < MIN_SEGMENT_LENGTH_M {
                continue;
            }
            let (unit_east, unit_north) = (east / length, north / length);

            for &(a, b) in &target.edges {
                let Some(intersection) = segment_intersection(p1, p2, a, b) else {
                    continue;
                };
                if !seen.insert((target.key, rounded_key(intersection))) {
                    continue;
                }

                let offset = target.width_m / 2.0 + settings.crossing_pole_clearance_m;
                crossings.push(Crossing {
                    id: format!("crossing-{}", crossings.len() + 1),
                    kind: target.kind,
                    name: target.name.clone(),
                    intersection,
                    before: offset_meters(intersection, -unit_north * offset, -unit_east * offset),
                    after: offset_meters(intersection, unit_north * offset, unit_east * offset),
                    width_m: target.width_m,
                    min_clearance_height_m: settings.clearance_height(target.kind),
                    requires_pole_pair: true,
                });
            }
        }
    }

    crossings
}

/// One exclusion zone per building, buffered by the facade clearance.
pub fn exclusion_zones(buildings: &[Building], settings: &AnalysisSettings) -> Vec<ExclusionZone> {
    buildings
        .iter()
        .enumerate()
        .map(|(index, building)| ExclusionZone {
            id: format!("zone-{}", index + 1),
            building_id: building.id,
            polygon: building.polygon.clone(),
            buffer_m: settings.facade_clearance_m,
            name: building.name.clone(),
        })
        .collect()
}
