//! Geometry kernel: distances, projections and polygon tests on WGS84 coordinates.
//!
//! `haversine_distance` is the single source of truth for lengths in meters.
//! The degree/meter conversions below use the same spherical radius so that an
//! offset built from N meters measures back as N meters.

use crate::models::{BoundingBox, Coordinate};

/// Mean Earth radius used by every distance in the crate.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Length of one degree of latitude on the sphere of radius [`EARTH_RADIUS_M`].
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// Determinant below which two segments are treated as parallel.
const PARALLEL_EPSILON: f64 = 1e-10;

/// Squared degree length below which a vector is treated as a point.
const DEGENERATE_EPSILON: f64 = 1e-20;

/// Floor for cos(latitude) so longitude conversions stay finite at the poles.
const MIN_COS_LAT: f64 = 1e-6;

/// Calculate distance between two points in meters using the Haversine formula.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lng - a.lng).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

fn cos_lat(lat_deg: f64) -> f64 {
    lat_deg.to_radians().cos().abs().max(MIN_COS_LAT)
}

/// Convert a north/south distance in meters to degrees of latitude.
pub fn meters_to_degrees_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Convert an east/west distance in meters to degrees of longitude at `at_lat`.
pub fn meters_to_degrees_lng(meters: f64, at_lat: f64) -> f64 {
    meters / (METERS_PER_DEGREE * cos_lat(at_lat))
}

/// Convert degrees of latitude to meters.
pub fn degrees_lat_to_meters(deg: f64) -> f64 {
    deg * METERS_PER_DEGREE
}

/// Convert degrees of longitude at `at_lat` to meters.
pub fn degrees_lng_to_meters(deg: f64, at_lat: f64) -> f64 {
    deg * METERS_PER_DEGREE * cos_lat(at_lat)
}

/// Position of `p` relative to `origin` as (east_m, north_m) in a local flat frame.
pub fn local_offset_m(origin: Coordinate, p: Coordinate) -> (f64, f64) {
    (
        degrees_lng_to_meters(p.lng - origin.lng, origin.lat),
        degrees_lat_to_meters(p.lat - origin.lat),
    )
}

/// Offset a position by meters in the north and east directions.
pub fn offset_meters(origin: Coordinate, north_m: f64, east_m: f64) -> Coordinate {
    Coordinate::new(
        origin.lat + meters_to_degrees_lat(north_m),
        origin.lng + meters_to_degrees_lng(east_m, origin.lat),
    )
}

/// Initial bearing from `a` to `b` in degrees, normalized to [0, 360).
pub fn bearing_degrees(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Absolute turning angle at `p2` when travelling p1 -> p2 -> p3, in [0, 180].
pub fn deflection_angle(p1: Coordinate, p2: Coordinate, p3: Coordinate) -> f64 {
    let incoming = bearing_degrees(p1, p2);
    let outgoing = bearing_degrees(p2, p3);
    let angle = (outgoing - incoming).abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Linear interpolation in degree space; `fraction` 0 gives `a`, 1 gives `b`.
pub fn interpolate(a: Coordinate, b: Coordinate, fraction: f64) -> Coordinate {
    Coordinate::new(
        a.lat + (b.lat - a.lat) * fraction,
        a.lng + (b.lng - a.lng) * fraction,
    )
}

/// Closest point on segment `a`-`b` to `p`, with the clamped segment parameter.
///
/// The projection is done in degree space and the parameter clamped to [0, 1].
pub fn closest_point_on_segment(p: Coordinate, a: Coordinate, b: Coordinate) -> (Coordinate, f64) {
    let dlat = b.lat - a.lat;
    let dlng = b.lng - a.lng;
    let length_sq = dlat * dlat + dlng * dlng;
    if length_sq < DEGENERATE_EPSILON {
        return (a, 0.0);
    }

    let t = (((p.lat - a.lat) * dlat + (p.lng - a.lng) * dlng) / length_sq).clamp(0.0, 1.0);
    (interpolate(a, b, t), t)
}

/// Distance in meters from `p` to the segment `a`-`b`.
pub fn point_to_segment_distance(p: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let (closest, _) = closest_point_on_segment(p, a, b);
    haversine_distance(p, closest)
}

/// Distance in meters from `p` to the nearest segment of `line`.
///
/// Returns infinity for lines with fewer than two points.
pub fn point_to_polyline_distance(p: Coordinate, line: &[Coordinate]) -> f64 {
    line.windows(2)
        .map(|w| point_to_segment_distance(p, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Distance in meters from `p` to the boundary of a closed ring.
pub fn point_to_ring_distance(p: Coordinate, ring: &[Coordinate]) -> f64 {
    if ring.len() < 2 {
        return f64::INFINITY;
    }
    (0..ring.len())
        .map(|i| point_to_segment_distance(p, ring[i], ring[(i + 1) % ring.len()]))
        .fold(f64::INFINITY, f64::min)
}

/// Ray-casting containment test. Rings with fewer than 3 points contain nothing.
pub fn point_in_polygon(p: Coordinate, ring: &[Coordinate]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].lat, ring[i].lng);
        let (xj, yj) = (ring[j].lat, ring[j].lng);
        if (yi > p.lng) != (yj > p.lng) && p.lat < (xj - xi) * (p.lng - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Intersection point of segments `a1`-`a2` and `b1`-`b2`.
///
/// Returns `None` unless both parametric solutions lie in [0, 1], and for
/// parallel or near-parallel segments.
pub fn segment_intersection(
    a1: Coordinate,
    a2: Coordinate,
    b1: Coordinate,
    b2: Coordinate,
) -> Option<Coordinate> {
    let det = (b2.lng - b1.lng) * (a2.lat - a1.lat) - (b2.lat - b1.lat) * (a2.lng - a1.lng);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let num_a = (b2.lat - b1.lat) * (a1.lng - b1.lng) - (b2.lng - b1.lng) * (a1.lat - b1.lat);
    let num_b = (a2.lat - a1.lat) * (a1.lng - b1.lng) - (a2.lng - a1.lng) * (a1.lat - b1.lat);
    let ua = num_a / det;
    let ub = num_b / det;

    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(interpolate(a1, a2, ua))
    } else {
        None
    }
}

/// Vertex average of a ring. `None` for an empty ring.
pub fn centroid(ring: &[Coordinate]) -> Option<Coordinate> {
    if ring.is_empty() {
        return None;
    }
    let n = ring.len() as f64;
    let lat = ring.iter().map(|p| p.lat).sum::<f64>() / n;
    let lng = ring.iter().map(|p| p.lng).sum::<f64>() / n;
    Some(Coordinate::new(lat, lng))
}

/// Approximate outward buffer of a ring by `buffer_m` meters.
///
/// Every vertex is pushed away from the vertex centroid so that its degree
/// distance grows by the buffer converted with [`meters_to_degrees_lat`]. This
/// is close enough for compact, near-convex footprints. Concave or elongated
/// rings end up with a thinner buffer on their concave side.
pub fn expand_polygon(ring: &[Coordinate], buffer_m: f64) -> Vec<Coordinate> {
    if ring.len() < 3 {
        return ring.to_vec();
    }
    let Some(center) = centroid(ring) else {
        return ring.to_vec();
    };
    let buffer_deg = meters_to_degrees_lat(buffer_m);

    ring.iter()
        .map(|p| {
            let dx = p.lat - center.lat;
            let dy = p.lng - center.lng;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < PARALLEL_EPSILON {
                return *p;
            }
            let factor = (dist + buffer_deg) / dist;
            Coordinate::new(center.lat + dx * factor, center.lng + dy * factor)
        })
        .collect()
}

/// Where a point falls on a route polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteProjection {
    pub segment_index: usize,
    /// Segment parameter in [0, 1].
    pub t: f64,
    pub point: Coordinate,
    /// Distance from the queried point to `point`.
    pub offset_m: f64,
    /// Route length from the first vertex to `point`.
    pub along_m: f64,
}

/// Project `p` onto the nearest segment of `route`.
///
/// Ties keep the earliest segment. `None` for routes with fewer than two points.
pub fn project_onto_route(p: Coordinate, route: &[Coordinate]) -> Option<RouteProjection> {
    let mut best: Option<RouteProjection> = None;
    let mut cumulative = 0.0;

    for (index, w) in route.windows(2).enumerate() {
        let (point, t) = closest_point_on_segment(p, w[0], w[1]);
        let offset_m = haversine_distance(p, point);
        let replace = best
            .as_ref()
            .map(|current| offset_m < current.offset_m)
            .unwrap_or(true);
        if replace {
            best = Some(RouteProjection {
                segment_index: index,
                t,
                point,
                offset_m,
                along_m: cumulative + haversine_distance(w[0], point),
            });
        }
        cumulative += haversine_distance(w[0], w[1]);
    }

    best
}

/// Move `p` onto the nearest point of `route`. Returns `p` unchanged for degenerate routes.
pub fn snap_to_polyline(p: Coordinate, route: &[Coordinate]) -> Coordinate {
    project_onto_route(p, route)
        .map(|projection| projection.point)
        .unwrap_or(p)
}

/// Distance along `route` from its first vertex to the projection of `p`.
pub fn distance_along_route(p: Coordinate, route: &[Coordinate]) -> f64 {
    project_onto_route(p, route)
        .map(|projection| projection.along_m)
        .unwrap_or(0.0)
}

/// Total length of a polyline in meters.
pub fn route_length(route: &[Coordinate]) -> f64 {
    route
        .windows(2)
        .map(|w| haversine_distance(w[0], w[1]))
        .sum()
}

/// Bounding box of `coords` expanded by `margin_m` on every side.
pub fn bounding_box(coords: &[Coordinate], margin_m: f64) -> Option<BoundingBox> {
    let first = coords.first()?;
    let mut bbox = BoundingBox {
        south: first.lat,
        west: first.lng,
        north: first.lat,
        east: first.lng,
    };
    for c in coords.iter().skip(1) {
        bbox.south = bbox.south.min(c.lat);
        bbox.north = bbox.north.max(c.lat);
        bbox.west = bbox.west.min(c.lng);
        bbox.east = bbox.east.max(c.lng);
    }

    let mid_lat = (bbox.south + bbox.north) / 2.0;
    let margin_lat = meters_to_degrees_lat(margin_m);
    let margin_lng = meters_to_degrees_lng(margin_m, mid_lat);
    Some(BoundingBox {
        south: bbox.south - margin_lat,
        west: bbox.west - margin_lng,
        north: bbox.north + margin_lat,
        east: bbox.east + margin_lng,
    })
}
