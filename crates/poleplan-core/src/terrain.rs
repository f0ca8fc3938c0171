//! Terrain classification and the diagnostic traversal cost grid.

use crate::error::PlanError;
use crate::models::{
    AreaType, BoundingBox, Coordinate, ObstacleGeometry, ObstacleKind, TerrainSnapshot,
};
use crate::spatial::{
    haversine_distance, meters_to_degrees_lat, meters_to_degrees_lng, point_in_polygon,
    point_to_polyline_distance, point_to_ring_distance, route_length,
};
use serde::{Deserialize, Serialize};

/// Points closer than this to a street are classified by its road class.
pub const STREET_PROXIMITY_M: f64 = 15.0;
/// Points closer than this to a linear obstacle count as inside it.
pub const OBSTACLE_PROXIMITY_M: f64 = 10.0;
/// Largest grid `build_cost_grid` will allocate.
pub const MAX_GRID_CELLS: usize = 4_000_000;
/// Elevation samples further than this from a cell do not affect it.
const SLOPE_SAMPLE_RADIUS_M: f64 = 500.0;

/// Buildings per km² at or above which an area is urban.
const URBAN_BUILDING_DENSITY: f64 = 100.0;
/// Buildings per km² at or below which an area may be rural.
const RURAL_BUILDING_DENSITY: f64 = 20.0;
/// Street km per km² at or above which an area is urban.
const URBAN_STREET_DENSITY: f64 = 10.0;
/// Street km per km² a rural area stays below.
const RURAL_STREET_DENSITY: f64 = 5.0;
/// Mixed areas above this building density are treated as urban.
const MIXED_BUILDING_DENSITY: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainCategory {
    PrincipalRoad,
    LocalRoad,
    RuralRoad,
    OpenField,
    PowerLineCorridor,
    Farmland,
    Forest,
    Railway,
    Water,
    Building,
}

impl TerrainCategory {
    /// Static traversal cost. Buildings are impassable.
    pub const fn cost(self) -> f64 {
        match self {
            TerrainCategory::PrincipalRoad => 1.0,
            TerrainCategory::LocalRoad => 1.5,
            TerrainCategory::RuralRoad => 2.0,
            TerrainCategory::OpenField => 3.0,
            TerrainCategory::PowerLineCorridor => 4.5,
            TerrainCategory::Farmland => 5.0,
            TerrainCategory::Forest => 15.0,
            TerrainCategory::Railway => 30.0,
            TerrainCategory::Water => 100.0,
            TerrainCategory::Building => f64::INFINITY,
        }
    }

    pub fn is_passable(self) -> bool {
        self.cost().is_finite()
    }

    fn for_obstacle(kind: ObstacleKind) -> Option<Self> {
        match kind {
            ObstacleKind::River | ObstacleKind::Lake => Some(TerrainCategory::Water),
            ObstacleKind::Railway => Some(TerrainCategory::Railway),
            ObstacleKind::GreenArea => Some(TerrainCategory::Forest),
            ObstacleKind::PowerLine => Some(TerrainCategory::PowerLineCorridor),
            ObstacleKind::Road | ObstacleKind::Tree => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub category: TerrainCategory,
    /// Infinite for buildings. JSON has no infinity, so an impassable cost
    /// serializes as `null`.
    pub cost: f64,
}

impl From<TerrainCategory> for Classification {
    fn from(category: TerrainCategory) -> Self {
        Self {
            category,
            cost: category.cost(),
        }
    }
}

/// Map a road class tag to its terrain category. Unknown tags count as local roads.
pub fn road_category(road_class: &str) -> TerrainCategory {
    match road_class {
        "motorway" | "trunk" | "primary" | "secondary" => TerrainCategory::PrincipalRoad,
        "tertiary" | "residential" => TerrainCategory::LocalRoad,
        "track" | "unclassified" | "service" | "path" | "footway" => TerrainCategory::RuralRoad,
        _ => TerrainCategory::LocalRoad,
    }
}

fn obstacle_touches(coord: Coordinate, geometry: &ObstacleGeometry) -> bool {
    match geometry {
        ObstacleGeometry::Point(_) => false,
        ObstacleGeometry::Line(points) => {
            point_to_polyline_distance(coord, points) < OBSTACLE_PROXIMITY_M
        }
        ObstacleGeometry::Polygon(ring) => {
            point_in_polygon(coord, ring) || point_to_ring_distance(coord, ring) < OBSTACLE_PROXIMITY_M
        }
    }
}

/// Classify a single coordinate.
///
/// Checks run in order: building footprints, obstacles (the costliest match
/// wins), the nearest street within [`STREET_PROXIMITY_M`], then open field.
pub fn classify(coord: Coordinate, terrain: &TerrainSnapshot) -> Classification {
    if terrain
        .buildings
        .iter()
        .any(|building| point_in_polygon(coord, &building.polygon))
    {
        return TerrainCategory::Building.into();
    }

    let obstacle_hit = terrain
        .obstacles
        .iter()
        .filter_map(|obstacle| {
            let category = TerrainCategory::for_obstacle(obstacle.kind)?;
            obstacle_touches(coord, &obstacle.geometry).then_some(category)
        })
        .max_by(|a, b| a.cost().total_cmp(&b.cost()));
    if let Some(category) = obstacle_hit {
        return category.into();
    }

    let nearest_street = terrain
        .streets
        .iter()
        .map(|street| (street, point_to_polyline_distance(coord, &street.points)))
        .filter(|(_, distance)| distance.is_finite())
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((street, distance)) = nearest_street {
        if distance < STREET_PROXIMITY_M {
            return road_category(&street.road_class).into();
        }
    }

    TerrainCategory::OpenField.into()
}

/// Classification of every route vertex, for reports.
pub fn classify_route(route: &[Coordinate], terrain: &TerrainSnapshot) -> Vec<Classification> {
    route.iter().map(|coord| classify(*coord, terrain)).collect()
}

/// How built-up a terrain snapshot is, and the area type that follows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AreaAssessment {
    pub area_type: AreaType,
    /// 0.5 for mixed areas, up to 0.9 for clear cases.
    pub confidence: f64,
    pub area_km2: f64,
    pub buildings_per_km2: f64,
    pub street_km_per_km2: f64,
    /// Rough share of the box covered by buildings, 0 to 100.
    pub built_up_pct: f64,
}

fn bbox_area_km2(bbox: &BoundingBox) -> f64 {
    if bbox.is_degenerate() {
        return 0.0;
    }
    let mid_lat = (bbox.south + bbox.north) / 2.0;
    let width_m = haversine_distance(
        Coordinate::new(mid_lat, bbox.west),
        Coordinate::new(mid_lat, bbox.east),
    );
    let height_m = haversine_distance(
        Coordinate::new(bbox.south, bbox.west),
        Coordinate::new(bbox.north, bbox.west),
    );
    width_m * height_m / 1e6
}

/// Measure building and street density over the snapshot's bounding box.
///
/// Dense building or street coverage makes an area urban; sparse coverage on
/// both counts makes it rural. Anything in between leans on building density
/// alone with low confidence. A degenerate box has no density and is rural.
pub fn assess_area(terrain: &TerrainSnapshot) -> AreaAssessment {
    let area_km2 = bbox_area_km2(&terrain.bbox);
    let street_km: f64 = terrain
        .streets
        .iter()
        .map(|street| route_length(&street.points) / 1000.0)
        .sum();
    let (buildings, streets) = if area_km2 > 0.0 {
        (terrain.buildings.len() as f64 / area_km2, street_km / area_km2)
    } else {
        (0.0, 0.0)
    };

    let (area_type, confidence) =
        if buildings >= URBAN_BUILDING_DENSITY || streets >= URBAN_STREET_DENSITY {
            let confidence = 0.5 + buildings / URBAN_BUILDING_DENSITY * 0.4;
            (AreaType::Urban, confidence.min(0.9))
        } else if buildings <= RURAL_BUILDING_DENSITY && streets < RURAL_STREET_DENSITY {
            let confidence = 0.7 + (1.0 - buildings / RURAL_BUILDING_DENSITY) * 0.2;
            (AreaType::Rural, confidence.min(0.9))
        } else if buildings > MIXED_BUILDING_DENSITY {
            (AreaType::Urban, 0.5)
        } else {
            (AreaType::Rural, 0.5)
        };

    AreaAssessment {
        area_type,
        confidence,
        area_km2,
        buildings_per_km2: buildings,
        street_km_per_km2: streets,
        built_up_pct: (buildings / 5.0).min(100.0),
    }
}

/// Urban or rural, judged from building and street density.
pub fn classify_area(terrain: &TerrainSnapshot) -> AreaType {
    assess_area(terrain).area_type
}

/// One elevation reading along the route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    pub coordinate: Coordinate,
    pub elevation_m: f64,
}

/// Cost multiplier for a slope given in percent.
pub fn slope_factor(slope_pct: f64) -> f64 {
    let slope = slope_pct.abs();
    if slope <= 10.0 {
        1.0
    } else if slope <= 20.0 {
        1.3
    } else if slope <= 30.0 {
        1.8
    } else {
        2.5
    }
}

/// Rasterized traversal costs over a bounding box, row 0 at the south edge.
///
/// `costs` is row-major. Impassable cells hold `f64::INFINITY`, which
/// serializes as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct CostGrid {
    cell_size_m: f64,
    bbox: BoundingBox,
    rows: usize,
    cols: usize,
    lat_step_deg: f64,
    lng_step_deg: f64,
    costs: Vec<f64>,
}

/// Build the cost grid by classifying every cell center.
///
/// A degenerate bounding box yields an empty grid.
pub fn build_cost_grid(
    terrain: &TerrainSnapshot,
    bbox: BoundingBox,
    cell_size_m: f64,
) -> Result<CostGrid, PlanError> {
    if !cell_size_m.is_finite() || cell_size_m <= 0.0 {
        return Err(PlanError::InvalidCellSize(cell_size_m));
    }

    let mid_lat = (bbox.south + bbox.north) / 2.0;
    let lat_step_deg = meters_to_degrees_lat(cell_size_m);
    let lng_step_deg = meters_to_degrees_lng(cell_size_m, mid_lat);

    let (rows, cols) = if bbox.is_degenerate() {
        (0, 0)
    } else {
        let south_west = Coordinate::new(bbox.south, bbox.west);
        let width_m = haversine_distance(south_west, Coordinate::new(bbox.south, bbox.east));
        let height_m = haversine_distance(south_west, Coordinate::new(bbox.north, bbox.west));
        (
            (height_m / cell_size_m).ceil() as usize,
            (width_m / cell_size_m).ceil() as usize,
        )
    };

    let cells = rows.saturating_mul(cols);
    if cells > MAX_GRID_CELLS {
        return Err(PlanError::GridTooLarge {
            cells,
            limit: MAX_GRID_CELLS,
        });
    }

    tracing::debug!(rows, cols, cell_size_m, "building terrain cost grid");

    let mut grid = CostGrid {
        cell_size_m,
        bbox,
        rows,
        cols,
        lat_step_deg,
        lng_step_deg,
        costs: Vec::with_capacity(cells),
    };
    for row in 0..rows {
        for col in 0..cols {
            let center = grid.cell_center(row, col);
            grid.costs.push(classify(center, terrain).cost);
        }
    }

    Ok(grid)
}

impl CostGrid {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_size_m(&self) -> f64 {
        self.cell_size_m
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn cell_center(&self, row: usize, col: usize) -> Coordinate {
        Coordinate::new(
            self.bbox.south + (row as f64 + 0.5) * self.lat_step_deg,
            self.bbox.west + (col as f64 + 0.5) * self.lng_step_deg,
        )
    }

    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.costs.get(row * self.cols + col).copied()
    }

    /// Cost of the cell containing `coord`; infinite outside the grid.
    pub fn cost_at(&self, coord: Coordinate) -> f64 {
        if !coord.is_finite() || !self.bbox.contains(&coord) {
            return f64::INFINITY;
        }
        let row = ((coord.lat - self.bbox.south) / self.lat_step_deg).floor();
        let col = ((coord.lng - self.bbox.west) / self.lng_step_deg).floor();
        if row < 0.0 || col < 0.0 {
            return f64::INFINITY;
        }
        self.value_at(row as usize, col as usize)
            .unwrap_or(f64::INFINITY)
    }

    /// New grid with each passable cell scaled by the local slope factor.
    ///
    /// The slope comes from the nearest sample within 500 m and its
    /// predecessor (or successor for the first sample).
    pub fn apply_slope_factors(&self, profile: &[ElevationSample]) -> CostGrid {
        let mut scaled = self.clone();
        if profile.len() < 2 {
            tracing::debug!("elevation profile too short, slope factors skipped");
            return scaled;
        }

        for row in 0..self.rows {
            for col in 0..self.cols {
                let index = row * self.cols + col;
                if !scaled.costs[index].is_finite() {
                    continue;
                }
                let center = self.cell_center(row, col);
                let nearest = profile
                    .iter()
                    .enumerate()
                    .map(|(i, sample)| (i, haversine_distance(center, sample.coordinate)))
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                let Some((idx, distance)) = nearest else {
                    continue;
                };
                if distance >= SLOPE_SAMPLE_RADIUS_M {
                    continue;
                }
                let neighbour = if idx > 0 { idx - 1 } else { idx + 1 };
                let slope = slope_between(&profile[idx], &profile[neighbour]);
                scaled.costs[index] *= slope_factor(slope);
            }
        }

        scaled
    }

    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats {
            total_cells: self.rows * self.cols,
            ..GridStats::default()
        };
        let mut sum = 0.0;
        let mut finite = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for &cost in &self.costs {
            if !cost.is_finite() {
                stats.impassable_cells += 1;
                stats.distribution.impassable += 1;
                continue;
            }
            sum += cost;
            finite += 1;
            min = min.min(cost);
            max = max.max(cost);
            let band = &mut stats.distribution;
            if cost <= 2.0 {
                band.very_low += 1;
            } else if cost <= 5.0 {
                band.low += 1;
            } else if cost <= 15.0 {
                band.medium += 1;
            } else if cost <= 50.0 {
                band.high += 1;
            } else {
                band.very_high += 1;
            }
        }

        if finite > 0 {
            stats.mean_cost = sum / finite as f64;
            stats.min_cost = min;
            stats.max_cost = max;
        }
        stats
    }
}

pub(crate) fn slope_between(a: &ElevationSample, b: &ElevationSample) -> f64 {
    let horizontal = haversine_distance(a.coordinate, b.coordinate);
    if horizontal <= 0.0 {
        return 0.0;
    }
    ((b.elevation_m - a.elevation_m) / horizontal).abs() * 100.0
}

/// Cell counts per cost band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CostBands {
    /// cost <= 2
    pub very_low: usize,
    /// cost <= 5
    pub low: usize,
    /// cost <= 15
    pub medium: usize,
    /// cost <= 50
    pub high: usize,
    pub very_high: usize,
    pub impassable: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GridStats {
    pub total_cells: usize,
    pub impassable_cells: usize,
    pub mean_cost: f64,
    pub min_cost: f64,
    pub max_cost: f64,
    pub distribution: CostBands,
}
