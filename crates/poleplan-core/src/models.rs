//! Core data models for the pole placement system.

use serde::{Deserialize, Serialize};

/// WGS84 position in decimal degrees. No altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Axis-aligned box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn contains(&self, coord: &Coordinate) -> bool {
        coord.lat >= self.south
            && coord.lat <= self.north
            && coord.lng >= self.west
            && coord.lng <= self.east
    }

    /// True when the box has no area (or is inverted).
    pub fn is_degenerate(&self) -> bool {
        !(self.north > self.south && self.east > self.west)
    }
}

/// A street segment chain from the terrain provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Street {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// Road class tag (`primary`, `residential`, `track`, ...).
    pub road_class: String,
    pub points: Vec<Coordinate>,
    #[serde(default)]
    pub width_m: Option<f64>,
    #[serde(default)]
    pub one_way: Option<bool>,
}

/// A building footprint. The ring is closed implicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: i64,
    #[serde(default)]
    pub category: String,
    pub polygon: Vec<Coordinate>,
    #[serde(default)]
    pub height_m: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    River,
    Lake,
    Railway,
    Road,
    PowerLine,
    Tree,
    GreenArea,
}

impl ObstacleKind {
    pub fn label(&self) -> &'static str {
        match self {
            ObstacleKind::River => "river",
            ObstacleKind::Lake => "lake",
            ObstacleKind::Railway => "railway",
            ObstacleKind::Road => "road",
            ObstacleKind::PowerLine => "power line",
            ObstacleKind::Tree => "tree",
            ObstacleKind::GreenArea => "green area",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates", rename_all = "snake_case")]
pub enum ObstacleGeometry {
    Point(Coordinate),
    Line(Vec<Coordinate>),
    Polygon(Vec<Coordinate>),
}

impl ObstacleGeometry {
    /// Edges of the geometry. Polygons include the closing edge; points have none.
    pub fn segments(&self) -> Vec<(Coordinate, Coordinate)> {
        match self {
            ObstacleGeometry::Point(_) => Vec::new(),
            ObstacleGeometry::Line(points) => points.windows(2).map(|w| (w[0], w[1])).collect(),
            ObstacleGeometry::Polygon(ring) => {
                if ring.len() < 2 {
                    return Vec::new();
                }
                (0..ring.len())
                    .map(|i| (ring[i], ring[(i + 1) % ring.len()]))
                    .filter(|(a, b)| a != b)
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: i64,
    pub kind: ObstacleKind,
    #[serde(default)]
    pub name: Option<String>,
    pub geometry: ObstacleGeometry,
}

impl Obstacle {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.kind.label().to_string())
    }
}

/// Already-fetched terrain data around a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainSnapshot {
    #[serde(default)]
    pub streets: Vec<Street>,
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    pub bbox: BoundingBox,
}

impl TerrainSnapshot {
    pub fn empty(bbox: BoundingBox) -> Self {
        Self {
            streets: Vec::new(),
            buildings: Vec::new(),
            obstacles: Vec::new(),
            bbox,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.streets.is_empty() && self.buildings.is_empty() && self.obstacles.is_empty()
    }
}

/// Intersection of two streets near the route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corner {
    pub id: String,
    pub coordinate: Coordinate,
    /// Names of the two intersecting streets.
    pub streets: Vec<String>,
    pub angle_deg: f64,
    /// Higher is better for a pole; peaks at right angles.
    pub priority: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingKind {
    Avenue,
    Highway,
    Railway,
    River,
}

/// Point where the route crosses a major road, railway or waterway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crossing {
    pub id: String,
    pub kind: CrossingKind,
    pub name: String,
    /// True intersection of the route with the obstacle.
    pub intersection: Coordinate,
    pub before: Coordinate,
    pub after: Coordinate,
    pub width_m: f64,
    pub min_clearance_height_m: f64,
    pub requires_pole_pair: bool,
}

/// Buffered building footprint that poles must stay out of.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionZone {
    pub id: String,
    pub building_id: i64,
    pub polygon: Vec<Coordinate>,
    pub buffer_m: f64,
    #[serde(default)]
    pub name: Option<String>,
}

impl ExclusionZone {
    /// Footprint grown by the clearance buffer (centroid-radial approximation).
    pub fn buffered_polygon(&self) -> Vec<Coordinate> {
        crate::spatial::expand_polygon(&self.polygon, self.buffer_m)
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        crate::spatial::point_in_polygon(coord, &self.buffered_polygon())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    Origin,
    Destination,
    Corner,
    CrossingBefore,
    CrossingAfter,
    Intermediate,
}

impl AnchorKind {
    pub fn is_crossing(&self) -> bool {
        matches!(self, AnchorKind::CrossingBefore | AnchorKind::CrossingAfter)
    }
}

/// Index into the corner or crossing list of the same placement outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "index", rename_all = "snake_case")]
pub enum AnchorSource {
    Corner(usize),
    Crossing(usize),
}

/// Candidate or final pole location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anchor {
    pub coordinate: Coordinate,
    pub kind: AnchorKind,
    pub priority: f64,
    pub justification: String,
    #[serde(default)]
    pub source: Option<AnchorSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaType {
    Urban,
    Rural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrosionZone {
    /// More than 1.5 km from the sea.
    Normal,
    /// 0.5 to 1.5 km from the sea.
    P1,
    /// Less than 0.5 km from the sea.
    P2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    Compact,
    Conventional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkNature {
    Monophase,
    Biphase,
    Triphase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoltageLevel {
    Low,
    Medium,
}

/// Project-wide electrical configuration. Immutable for one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub area_type: AreaType,
    pub corrosion_zone: CorrosionZone,
    pub network_type: NetworkType,
    pub nature: NetworkNature,
    pub mv_voltage_kv: f64,
    pub lv_voltage_v: f64,
    pub mv_conductor: String,
    pub lv_conductor: String,
    /// Low-voltage line shares the medium-voltage poles.
    pub with_low_voltage: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            area_type: AreaType::Rural,
            corrosion_zone: CorrosionZone::Normal,
            network_type: NetworkType::Conventional,
            nature: NetworkNature::Triphase,
            mv_voltage_kv: 13.8,
            lv_voltage_v: 380.0,
            mv_conductor: "1/0 AWG".to_string(),
            lv_conductor: "35(35)".to_string(),
            with_low_voltage: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoleFunction {
    Tangent,
    Angle,
    Derivation,
    EndOfLine,
    Anchor,
    Equipment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single rule check result. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Dotted path of the checked field, e.g. `pole.P001.height`.
    pub field: String,
    pub actual: serde_json::Value,
    pub expected: String,
    pub severity: Severity,
    pub message: String,
}

impl ValidationFinding {
    pub fn new(
        field: impl Into<String>,
        actual: impl Into<serde_json::Value>,
        expected: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            actual: actual.into(),
            expected: expected.into(),
            severity,
            message: message.into(),
        }
    }
}

/// Pole as seen by the whole-project validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoleRecord {
    pub id: String,
    pub coordinate: Coordinate,
    pub function: PoleFunction,
    pub height_m: f64,
    pub resistance_dan: u32,
    pub structure: String,
    /// Low-voltage structure when the line is conjugated.
    #[serde(default)]
    pub lv_structure: Option<String>,
    pub annotation: String,
    #[serde(default)]
    pub grounded: bool,
    #[serde(default)]
    pub transformer_kva: Option<f64>,
    #[serde(default)]
    pub guyed: bool,
    #[serde(default)]
    pub justification: String,
}

/// Conductor span between two poles, in route order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConductorRecord {
    pub id: String,
    pub network: VoltageLevel,
    pub cable: String,
    pub length_m: f64,
    pub from_pole_id: String,
    pub to_pole_id: String,
}
