//! Pole placement along a routed polyline.
//!
//! The pipeline is deterministic: seed the mandatory anchors, order them
//! along the route, fill over-long gaps (preferring street corners), run a
//! bounded repair pass for spans that are still too long, and finally push
//! anchors out of building exclusion zones. Spans still above the maximum
//! after all of that are reported as warnings.

use crate::analysis::{analyze_route, AnalysisSettings, RouteAnalysis};
use crate::error::PlanError;
use crate::models::{
    Anchor, AnchorKind, AnchorSource, Coordinate, Corner, Crossing, ExclusionZone, Severity,
    TerrainSnapshot, ValidationFinding,
};
use crate::rules::SpanTargets;
use crate::spatial::{
    centroid, distance_along_route, haversine_distance, interpolate, local_offset_m,
    offset_meters, point_in_polygon, route_length, snap_to_polyline,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Distance in meters below which an anchor counts as sitting on a zone centroid.
const CENTROID_EPSILON_M: f64 = 1e-6;

/// Tunable parameters for placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    pub analysis: AnalysisSettings,
    pub endpoint_priority: f64,
    pub crossing_priority: f64,
    pub intermediate_priority: f64,
    /// Cap on span repair passes.
    pub max_repair_iterations: usize,
    /// Added to the zone buffer when pushing an anchor out of a building.
    pub exclusion_margin_m: f64,
    /// Cap on relocation steps for a single anchor.
    pub max_relocation_steps: usize,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            analysis: AnalysisSettings::default(),
            endpoint_priority: 100.0,
            crossing_priority: 90.0,
            intermediate_priority: 50.0,
            max_repair_iterations: 10,
            exclusion_margin_m: 2.0,
            max_relocation_steps: 25,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementStats {
    pub total_corners: usize,
    pub total_crossings: usize,
    pub total_exclusion_zones: usize,
    pub route_length_m: f64,
    pub corner_anchors: usize,
    pub crossing_anchors: usize,
    pub relocated_anchors: usize,
}

/// What the span repair pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    /// Passes that inserted at least one anchor.
    pub iterations: usize,
    pub inserted: usize,
    /// No span of the final placement exceeds the maximum.
    pub converged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementOutcome {
    /// Final anchors in route order.
    pub anchors: Vec<Anchor>,
    pub corners: Vec<Corner>,
    pub crossings: Vec<Crossing>,
    pub exclusion_zones: Vec<ExclusionZone>,
    pub stats: PlacementStats,
    pub repair: RepairReport,
    pub findings: Vec<ValidationFinding>,
}

impl PlacementOutcome {
    fn empty() -> Self {
        Self {
            anchors: Vec::new(),
            corners: Vec::new(),
            crossings: Vec::new(),
            exclusion_zones: Vec::new(),
            stats: PlacementStats::default(),
            repair: RepairReport {
                converged: true,
                ..RepairReport::default()
            },
            findings: Vec::new(),
        }
    }

    /// Lengths of the spans between consecutive anchors.
    pub fn span_lengths(&self) -> Vec<f64> {
        self.anchors
            .windows(2)
            .map(|w| haversine_distance(w[0].coordinate, w[1].coordinate))
            .collect()
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.anchors.iter().map(|anchor| anchor.coordinate).collect()
    }
}

/// Place poles along `route`.
///
/// Routes with fewer than two points yield an empty outcome. Non-finite
/// coordinates and invalid span targets are rejected.
pub fn plan_placement(
    route: &[Coordinate],
    terrain: &TerrainSnapshot,
    spans: SpanTargets,
    settings: &PlacementSettings,
) -> Result<PlacementOutcome, PlanError> {
    if let Some(bad) = route.iter().find(|c| !c.is_finite()) {
        return Err(PlanError::InvalidCoordinate {
            lat: bad.lat,
            lng: bad.lng,
        });
    }
    let spans = spans.validate()?;

    if route.len() < 2 {
        tracing::debug!(points = route.len(), "route too short, nothing to place");
        return Ok(PlacementOutcome::empty());
    }

    let RouteAnalysis {
        corners,
        crossings,
        exclusion_zones,
    } = analyze_route(route, terrain, &settings.analysis);

    let mut anchors = seed_anchors(route, &crossings, settings);
    sort_along_route(&mut anchors, route);
    let mut anchors = fill_gaps(&anchors, &corners, route, &spans, settings);
    tracing::debug!(anchors = anchors.len(), "gaps filled");

    let mut findings = Vec::new();
    let mut repair = repair_spans(&mut anchors, route, spans.max_m, settings);
    let relocated = resolve_exclusions(&mut anchors, &exclusion_zones, settings, &mut findings);

    // Relocation can stretch a span the repair pass already accepted.
    let over_max = violating_spans(&anchors, spans.max_m);
    repair.converged = over_max.is_empty();
    if !repair.converged {
        tracing::warn!(
            iterations = repair.iterations,
            spans = over_max.len(),
            "spans above the maximum remain after repair and relocation"
        );
        findings.push(ValidationFinding::new(
            "placement.repair",
            repair.iterations,
            format!("<= {} iterations", settings.max_repair_iterations),
            Severity::Warning,
            "span repair and relocation left spans above the maximum",
        ));
    }

    for index in over_max {
        let length = haversine_distance(anchors[index].coordinate, anchors[index + 1].coordinate);
        findings.push(ValidationFinding::new(
            format!("placement.span.{index}"),
            length,
            format!("<= {}", spans.max_m),
            Severity::Warning,
            format!(
                "span {index} is {length:.1} m, above the maximum of {} m",
                spans.max_m
            ),
        ));
    }

    let stats = PlacementStats {
        total_corners: corners.len(),
        total_crossings: crossings.len(),
        total_exclusion_zones: exclusion_zones.len(),
        route_length_m: route_length(route),
        corner_anchors: anchors
            .iter()
            .filter(|a| a.kind == AnchorKind::Corner)
            .count(),
        crossing_anchors: anchors.iter().filter(|a| a.kind.is_crossing()).count(),
        relocated_anchors: relocated,
    };
    tracing::debug!(
        anchors = anchors.len(),
        relocated,
        findings = findings.len(),
        "placement complete"
    );

    Ok(PlacementOutcome {
        anchors,
        corners,
        crossings,
        exclusion_zones,
        stats,
        repair,
        findings,
    })
}

/// Origin, both poles of every crossing, and destination.
pub fn seed_anchors(
    route: &[Coordinate],
    crossings: &[Crossing],
    settings: &PlacementSettings,
) -> Vec<Anchor> {
    let (Some(&origin), Some(&destination)) = (route.first(), route.last()) else {
        return Vec::new();
    };

    let mut anchors = Vec::with_capacity(crossings.len() * 2 + 2);
    anchors.push(Anchor {
        coordinate: origin,
        kind: AnchorKind::Origin,
        priority: settings.endpoint_priority,
        justification: "network origin".to_string(),
        source: None,
    });
    for (index, crossing) in crossings.iter().enumerate() {
        anchors.push(Anchor {
            coordinate: crossing.before,
            kind: AnchorKind::CrossingBefore,
            priority: settings.crossing_priority,
            justification: format!("before crossing: {}", crossing.name),
            source: Some(AnchorSource::Crossing(index)),
        });
        anchors.push(Anchor {
            coordinate: crossing.after,
            kind: AnchorKind::CrossingAfter,
            priority: settings.crossing_priority,
            justification: format!("after crossing: {}", crossing.name),
            source: Some(AnchorSource::Crossing(index)),
        });
    }
    anchors.push(Anchor {
        coordinate: destination,
        kind: AnchorKind::Destination,
        priority: settings.endpoint_priority,
        justification: "network destination".to_string(),
        source: None,
    });
    anchors
}

/// Stable sort by distance along the route.
pub fn sort_along_route(anchors: &mut Vec<Anchor>, route: &[Coordinate]) {
    let mut keyed: Vec<(f64, Anchor)> = anchors
        .drain(..)
        .map(|anchor| (distance_along_route(anchor.coordinate, route), anchor))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    anchors.extend(keyed.into_iter().map(|(_, anchor)| anchor));
}

fn nearest_corner(
    point: Coordinate,
    corners: &[Corner],
    radius_m: f64,
    used: &HashSet<usize>,
) -> Option<usize> {
    corners
        .iter()
        .enumerate()
        .filter(|(index, _)| !used.contains(index))
        .map(|(index, corner)| (index, haversine_distance(point, corner.coordinate)))
        .filter(|(_, distance)| *distance < radius_m)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

fn intermediate(coordinate: Coordinate, settings: &PlacementSettings) -> Anchor {
    Anchor {
        coordinate,
        kind: AnchorKind::Intermediate,
        priority: settings.intermediate_priority,
        justification: "intermediate pole to respect the maximum span".to_string(),
        source: None,
    }
}

/// Insert evenly spaced anchors into every gap longer than the maximum span.
///
/// Each new position snaps to the nearest unused corner within half the ideal
/// span, or otherwise onto the route.
pub fn fill_gaps(
    anchors: &[Anchor],
    corners: &[Corner],
    route: &[Coordinate],
    spans: &SpanTargets,
    settings: &PlacementSettings,
) -> Vec<Anchor> {
    let mut filled = Vec::with_capacity(anchors.len());
    let mut used_corners = HashSet::new();

    for (index, current) in anchors.iter().enumerate() {
        filled.push(current.clone());
        let Some(next) = anchors.get(index + 1) else {
            continue;
        };

        let distance = haversine_distance(current.coordinate, next.coordinate);
        if distance <= spans.max_m {
            continue;
        }

        let count = ((distance / spans.ideal_m).ceil() as usize).saturating_sub(1);
        for step in 1..=count {
            let fraction = step as f64 / (count + 1) as f64;
            let base = interpolate(current.coordinate, next.coordinate, fraction);

            match nearest_corner(base, corners, spans.ideal_m / 2.0, &used_corners) {
                Some(corner_index) => {
                    used_corners.insert(corner_index);
                    let corner = &corners[corner_index];
                    filled.push(Anchor {
                        coordinate: corner.coordinate,
                        kind: AnchorKind::Corner,
                        priority: corner.priority,
                        justification: format!("corner: {}", corner.streets.join(" x ")),
                        source: Some(AnchorSource::Corner(corner_index)),
                    });
                }
                None => filled.push(intermediate(snap_to_polyline(base, route), settings)),
            }
        }
    }

    filled
}

fn violating_spans(anchors: &[Anchor], max_m: f64) -> Vec<usize> {
    anchors
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| haversine_distance(pair[0].coordinate, pair[1].coordinate) > max_m)
        .map(|(index, _)| index)
        .collect()
}

/// Split every span still above `max_m` with a route-snapped midpoint, at most
/// `max_repair_iterations` times.
pub fn repair_spans(
    anchors: &mut Vec<Anchor>,
    route: &[Coordinate],
    max_m: f64,
    settings: &PlacementSettings,
) -> RepairReport {
    let mut report = RepairReport::default();

    while report.iterations < settings.max_repair_iterations {
        let violations = violating_spans(anchors, max_m);
        if violations.is_empty() {
            break;
        }
        report.iterations += 1;

        // Back to front so earlier indices stay valid.
        for &index in violations.iter().rev() {
            let midpoint = interpolate(anchors[index].coordinate, anchors[index + 1].coordinate, 0.5);
            anchors.insert(index + 1, intermediate(snap_to_polyline(midpoint, route), settings));
            report.inserted += 1;
        }
    }

    report.converged = violating_spans(anchors, max_m).is_empty();
    report
}

struct BufferedZone<'a> {
    zone: &'a ExclusionZone,
    polygon: Vec<Coordinate>,
    center: Coordinate,
}

/// Move `step_m` meters from `point` directly away from `center`, measured in
/// the local metric frame so the step length holds at any latitude.
fn step_outward(point: Coordinate, center: Coordinate, step_m: f64) -> Coordinate {
    let (east, north) = local_offset_m(center, point);
    let distance = east.hypot(north);
    if distance < CENTROID_EPSILON_M {
        return offset_meters(point, step_m, 0.0);
    }
    offset_meters(point, north / distance * step_m, east / distance * step_m)
}

/// Move anchors that fall inside a buffered building out of it.
///
/// Each step moves `buffer + margin` meters radially away from the zone's
/// centroid, or due north from the centroid itself. Returns the number of
/// anchors moved; anchors still inside after the step cap produce a finding.
pub fn resolve_exclusions(
    anchors: &mut [Anchor],
    zones: &[ExclusionZone],
    settings: &PlacementSettings,
    findings: &mut Vec<ValidationFinding>,
) -> usize {
    let buffered: Vec<BufferedZone> = zones
        .iter()
        .filter_map(|zone| {
            let polygon = zone.buffered_polygon();
            let center = centroid(&zone.polygon)?;
            (polygon.len() >= 3).then_some(BufferedZone {
                zone,
                polygon,
                center,
            })
        })
        .collect();
    if buffered.is_empty() {
        return 0;
    }

    let blocking_zone = |position: Coordinate| {
        buffered
            .iter()
            .find(|candidate| point_in_polygon(position, &candidate.polygon))
    };

    let mut relocated = 0;
    for (index, anchor) in anchors.iter_mut().enumerate() {
        let mut position = anchor.coordinate;
        let mut steps = 0;
        while let Some(zone) = blocking_zone(position) {
            if steps == settings.max_relocation_steps {
                break;
            }
            position = step_outward(
                position,
                zone.center,
                zone.zone.buffer_m + settings.exclusion_margin_m,
            );
            steps += 1;
        }
        if steps == 0 {
            continue;
        }

        relocated += 1;
        anchor.coordinate = position;
        anchor.justification.push_str(" (moved clear of building)");

        if let Some(zone) = blocking_zone(position) {
            tracing::warn!(
                anchor = index,
                zone = %zone.zone.id,
                "anchor could not be moved clear of exclusion zone"
            );
            findings.push(ValidationFinding::new(
                format!("placement.anchor.{index}"),
                zone.zone.id.clone(),
                "outside every exclusion zone",
                Severity::Warning,
                format!(
                    "anchor {index} is still inside exclusion zone {} after relocation",
                    zone.zone.id
                ),
            ));
        }
    }

    relocated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoundingBox, Street};

    const ORIGIN: Coordinate = Coordinate::new(-2.53, -44.30);

    fn spans(ideal_m: f64, max_m: f64) -> SpanTargets {
        SpanTargets {
            ideal_m,
            min_m: 30.0,
            max_m,
        }
    }

    fn empty_terrain() -> TerrainSnapshot {
        TerrainSnapshot::empty(BoundingBox {
            south: -3.0,
            west: -45.0,
            north: -2.0,
            east: -44.0,
        })
    }

    fn anchor_at(coordinate: Coordinate, kind: AnchorKind) -> Anchor {
        Anchor {
            coordinate,
            kind,
            priority: 50.0,
            justification: String::new(),
            source: None,
        }
    }

    #[test]
    fn short_route_needs_only_endpoints() {
        let route = vec![ORIGIN, offset_meters(ORIGIN, 60.0, 0.0)];
        let outcome = plan_placement(
            &route,
            &empty_terrain(),
            spans(50.0, 80.0),
            &PlacementSettings::default(),
        )
        .expect("valid input");
        let kinds: Vec<_> = outcome.anchors.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AnchorKind::Origin, AnchorKind::Destination]);
        assert!(outcome.repair.converged);
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn degenerate_route_gives_empty_outcome() {
        let outcome = plan_placement(
            &[ORIGIN],
            &empty_terrain(),
            spans(50.0, 80.0),
            &PlacementSettings::default(),
        )
        .expect("degenerate route is not an error");
        assert!(outcome.anchors.is_empty());
        assert!(outcome.repair.converged);
    }

    #[test]
    fn rejects_non_finite_input() {
        let route = vec![ORIGIN, Coordinate::new(f64::NAN, 0.0)];
        assert!(matches!(
            plan_placement(&route, &empty_terrain(), spans(50.0, 80.0), &PlacementSettings::default()),
            Err(PlanError::InvalidCoordinate { .. })
        ));
        let route = vec![ORIGIN, offset_meters(ORIGIN, 100.0, 0.0)];
        assert!(matches!(
            plan_placement(&route, &empty_terrain(), spans(0.0, 80.0), &PlacementSettings::default()),
            Err(PlanError::InvalidSpan { name: "ideal", .. })
        ));
    }

    #[test]
    fn sort_follows_route_not_insertion_order() {
        let route = vec![ORIGIN, offset_meters(ORIGIN, 0.0, 300.0)];
        let mut anchors = vec![
            anchor_at(offset_meters(ORIGIN, 0.0, 200.0), AnchorKind::CrossingAfter),
            anchor_at(ORIGIN, AnchorKind::Origin),
            anchor_at(offset_meters(ORIGIN, 0.0, 100.0), AnchorKind::CrossingBefore),
        ];
        sort_along_route(&mut anchors, &route);
        let kinds: Vec<_> = anchors.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AnchorKind::Origin, AnchorKind::CrossingBefore, AnchorKind::CrossingAfter]
        );
    }

    #[test]
    fn fill_prefers_nearby_corner() {
        let route = vec![ORIGIN, offset_meters(ORIGIN, 0.0, 190.0)];
        let anchors = vec![
            anchor_at(route[0], AnchorKind::Origin),
            anchor_at(route[1], AnchorKind::Destination),
        ];
        let corner = Corner {
            id: "corner-1".into(),
            coordinate: offset_meters(ORIGIN, 0.0, 45.0),
            streets: vec!["Rua A".into(), "Rua B".into()],
            angle_deg: 90.0,
            priority: 80.0,
        };
        let filled = fill_gaps(
            &anchors,
            std::slice::from_ref(&corner),
            &route,
            &spans(50.0, 80.0),
            &PlacementSettings::default(),
        );

        // 190 m / 50 m -> 3 new anchors; the first lands on the corner.
        assert_eq!(filled.len(), 5);
        assert_eq!(filled[1].kind, AnchorKind::Corner);
        assert_eq!(filled[1].source, Some(AnchorSource::Corner(0)));
        assert_eq!(filled[1].justification, "corner: Rua A x Rua B");
        assert_eq!(filled[2].kind, AnchorKind::Intermediate);
        assert_eq!(filled[3].kind, AnchorKind::Intermediate);
    }

    #[test]
    fn corner_snapping_is_repaired() {
        // A corner far back along the gap pulls the only new anchor away from
        // the middle, leaving the second half too long.
        let route = vec![ORIGIN, offset_meters(ORIGIN, 0.0, 140.0)];
        let anchors = vec![
            anchor_at(route[0], AnchorKind::Origin),
            anchor_at(route[1], AnchorKind::Destination),
        ];
        let corner = Corner {
            id: "corner-1".into(),
            coordinate: offset_meters(ORIGIN, 0.0, 40.0),
            streets: vec!["Rua A".into(), "Rua B".into()],
            angle_deg: 90.0,
            priority: 80.0,
        };
        let targets = spans(75.0, 80.0);
        let settings = PlacementSettings::default();
        let mut filled = fill_gaps(&anchors, &[corner], &route, &targets, &settings);
        assert_eq!(filled.len(), 3);

        let report = repair_spans(&mut filled, &route, targets.max_m, &settings);
        assert!(report.converged);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.inserted, 1);
        for pair in filled.windows(2) {
            assert!(haversine_distance(pair[0].coordinate, pair[1].coordinate) <= 80.0);
        }
    }

    #[test]
    fn repair_reports_cap_without_converging() {
        let route = vec![ORIGIN, offset_meters(ORIGIN, 0.0, 1000.0)];
        let mut anchors = vec![
            anchor_at(route[0], AnchorKind::Origin),
            anchor_at(route[1], AnchorKind::Destination),
        ];
        let settings = PlacementSettings {
            max_repair_iterations: 2,
            ..PlacementSettings::default()
        };
        // Two halvings of 1000 m leave 250 m spans.
        let report = repair_spans(&mut anchors, &route, 80.0, &settings);
        assert_eq!(report.iterations, 2);
        assert_eq!(report.inserted, 3);
        assert!(!report.converged);
    }

    #[test]
    fn anchor_on_centroid_moves_north() {
        let half = 4.0;
        let ring = vec![
            offset_meters(ORIGIN, -half, -half),
            offset_meters(ORIGIN, -half, half),
            offset_meters(ORIGIN, half, half),
            offset_meters(ORIGIN, half, -half),
        ];
        let center = centroid(&ring).expect("non-empty ring");
        let zone = ExclusionZone {
            id: "zone-1".into(),
            building_id: 1,
            polygon: ring,
            buffer_m: 1.5,
            name: None,
        };
        let mut anchors = vec![anchor_at(center, AnchorKind::Intermediate)];
        let mut findings = Vec::new();
        let moved = resolve_exclusions(
            &mut anchors,
            std::slice::from_ref(&zone),
            &PlacementSettings::default(),
            &mut findings,
        );

        assert_eq!(moved, 1);
        assert!(findings.is_empty());
        assert!(!zone.contains(anchors[0].coordinate));
        assert!(anchors[0].coordinate.lat > center.lat);
        assert!((anchors[0].coordinate.lng - center.lng).abs() < 1e-12);
        assert!(anchors[0].justification.ends_with("(moved clear of building)"));
    }

    #[test]
    fn outward_step_keeps_its_length_at_high_latitude() {
        let center = Coordinate::new(60.0, 10.0);
        for (north, east) in [(3.0, 0.0), (0.0, 3.0), (-2.0, 2.0), (1.0, -4.0)] {
            let point = offset_meters(center, north, east);
            let moved = step_outward(point, center, 3.5);
            let step = haversine_distance(point, moved);
            assert!((step - 3.5).abs() < 0.01, "step {step} from ({north}, {east})");
            let before = haversine_distance(center, point);
            let after = haversine_distance(center, moved);
            assert!((after - before - 3.5).abs() < 0.01, "radial gain {}", after - before);
        }
    }

    #[test]
    fn stuck_anchor_is_reported() {
        let ring = vec![
            offset_meters(ORIGIN, -50.0, -50.0),
            offset_meters(ORIGIN, -50.0, 50.0),
            offset_meters(ORIGIN, 50.0, 50.0),
            offset_meters(ORIGIN, 50.0, -50.0),
        ];
        let zone = ExclusionZone {
            id: "zone-9".into(),
            building_id: 9,
            polygon: ring,
            buffer_m: 1.5,
            name: None,
        };
        let settings = PlacementSettings {
            max_relocation_steps: 2,
            ..PlacementSettings::default()
        };
        let mut anchors = vec![anchor_at(offset_meters(ORIGIN, 1.0, 0.0), AnchorKind::Intermediate)];
        let mut findings = Vec::new();
        resolve_exclusions(&mut anchors, &[zone], &settings, &mut findings);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].field, "placement.anchor.0");
    }

    #[test]
    fn corners_become_anchors_end_to_end() {
        let route = vec![ORIGIN, offset_meters(ORIGIN, 0.0, 200.0)];
        let mut terrain = empty_terrain();
        terrain.streets = vec![
            Street {
                id: 1,
                name: "Rua Grande".into(),
                road_class: "residential".into(),
                points: route.clone(),
                width_m: None,
                one_way: None,
            },
            Street {
                id: 2,
                name: "Rua da Paz".into(),
                road_class: "residential".into(),
                points: vec![offset_meters(ORIGIN, -40.0, 52.0), offset_meters(ORIGIN, 40.0, 52.0)],
                width_m: None,
                one_way: None,
            },
        ];
        let outcome = plan_placement(
            &route,
            &terrain,
            spans(50.0, 80.0),
            &PlacementSettings::default(),
        )
        .expect("valid input");

        assert_eq!(outcome.corners.len(), 1);
        assert_eq!(outcome.stats.corner_anchors, 1);
        assert!(outcome.span_lengths().iter().all(|length| *length <= 80.0));
    }
}
