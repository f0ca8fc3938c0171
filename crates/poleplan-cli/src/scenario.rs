//! Pre-defined scenarios for demos and smoke runs.

use crate::input::ScenarioFile;
use clap::ValueEnum;
use poleplan_core::spatial::{bounding_box, offset_meters};
use poleplan_core::terrain::ElevationSample;
use poleplan_core::{
    AreaType, AssemblyOptions, BoundingBox, Building, Coordinate, NetworkType, Obstacle,
    ObstacleGeometry, ObstacleKind, ProjectConfig, Street, TerrainSnapshot,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Sao Luis city center.
pub const CITY_CENTER: Coordinate = Coordinate::new(-2.5307, -44.3068);

/// Terrain margin around the route.
const BBOX_MARGIN_M: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioKind {
    /// 500 m straight line, no terrain.
    Straight,
    /// Straight line with a house on the midpoint.
    Building,
    /// Straight line across a primary road.
    Crossing,
    /// Seeded street grid with houses, a river and an avenue.
    Suburb,
}

pub fn build_scenario(kind: ScenarioKind, seed: u64) -> ScenarioFile {
    match kind {
        ScenarioKind::Straight => straight_scenario(CITY_CENTER),
        ScenarioKind::Building => building_scenario(CITY_CENTER),
        ScenarioKind::Crossing => crossing_scenario(CITY_CENTER),
        ScenarioKind::Suburb => suburb_scenario(CITY_CENTER, seed),
    }
}

fn urban_config() -> ProjectConfig {
    ProjectConfig {
        area_type: AreaType::Urban,
        network_type: NetworkType::Conventional,
        ..ProjectConfig::default()
    }
}

fn street(id: i64, name: &str, road_class: &str, points: Vec<Coordinate>) -> Street {
    Street {
        id,
        name: name.to_string(),
        road_class: road_class.to_string(),
        points,
        width_m: None,
        one_way: None,
    }
}

fn house(id: i64, center: Coordinate, half_m: f64) -> Building {
    Building {
        id,
        category: "house".to_string(),
        polygon: vec![
            offset_meters(center, -half_m, -half_m),
            offset_meters(center, -half_m, half_m),
            offset_meters(center, half_m, half_m),
            offset_meters(center, half_m, -half_m),
        ],
        height_m: Some(6.0),
        name: None,
    }
}

fn scenario_file(name: &str, route: Vec<Coordinate>, terrain: TerrainParts) -> ScenarioFile {
    let bbox = bounding_box(&route, BBOX_MARGIN_M).unwrap_or(BoundingBox {
        south: CITY_CENTER.lat,
        west: CITY_CENTER.lng,
        north: CITY_CENTER.lat,
        east: CITY_CENTER.lng,
    });
    ScenarioFile {
        name: Some(name.to_string()),
        route,
        terrain: TerrainSnapshot {
            streets: terrain.streets,
            buildings: terrain.buildings,
            obstacles: terrain.obstacles,
            bbox,
        },
        config: urban_config(),
        ideal_span_m: None,
        assembly: AssemblyOptions::default(),
        elevation_profile: terrain.elevation_profile,
    }
}

#[derive(Default)]
struct TerrainParts {
    streets: Vec<Street>,
    buildings: Vec<Building>,
    obstacles: Vec<Obstacle>,
    elevation_profile: Vec<ElevationSample>,
}

pub fn straight_scenario(start: Coordinate) -> ScenarioFile {
    let route = vec![start, offset_meters(start, 0.0, 500.0)];
    scenario_file("straight", route, TerrainParts::default())
}

pub fn building_scenario(start: Coordinate) -> ScenarioFile {
    let route = vec![start, offset_meters(start, 0.0, 490.0)];
    let midpoint = offset_meters(start, 0.0, 245.0);
    let mut blocked = house(1, offset_meters(midpoint, 3.0, 0.0), 8.0);
    blocked.name = Some("Casa Amarela".to_string());
    scenario_file(
        "building",
        route,
        TerrainParts {
            buildings: vec![blocked],
            ..TerrainParts::default()
        },
    )
}

pub fn crossing_scenario(start: Coordinate) -> ScenarioFile {
    let route = vec![start, offset_meters(start, 0.0, 300.0)];
    let avenue = street(
        1,
        "Avenida Litoranea",
        "primary",
        vec![offset_meters(start, -120.0, 150.0), offset_meters(start, 120.0, 150.0)],
    );
    scenario_file(
        "crossing",
        route,
        TerrainParts {
            streets: vec![avenue],
            ..TerrainParts::default()
        },
    )
}

/// L-shaped route through a jittered street grid. Same seed, same scenario.
pub fn suburb_scenario(start: Coordinate, seed: u64) -> ScenarioFile {
    let mut rng = StdRng::seed_from_u64(seed);
    let turn = offset_meters(start, 0.0, 600.0);
    let end = offset_meters(turn, 400.0, 0.0);
    let route = vec![start, turn, end];

    let mut parts = TerrainParts::default();
    parts
        .streets
        .push(street(1, "Rua Principal", "residential", vec![start, turn]));
    parts
        .streets
        .push(street(2, "Rua do Comercio", "residential", vec![turn, end]));

    for block in 1..=5 {
        let east = block as f64 * 100.0 + rng.random_range(-15.0..15.0);
        parts.streets.push(street(
            10 + block,
            &format!("Travessa {block}"),
            "residential",
            vec![offset_meters(start, -80.0, east), offset_meters(start, 80.0, east)],
        ));
    }
    parts.streets.push(street(
        20,
        "Avenida dos Holandeses",
        "secondary",
        vec![offset_meters(turn, 200.0, -100.0), offset_meters(turn, 200.0, 100.0)],
    ));

    parts.obstacles.push(Obstacle {
        id: 30,
        kind: ObstacleKind::River,
        name: Some("Rio Anil".to_string()),
        geometry: ObstacleGeometry::Line(vec![
            offset_meters(start, -150.0, 430.0),
            offset_meters(start, 150.0, 470.0),
        ]),
    });

    let mut next_id = 100;
    for step in 0..30 {
        let along = 20.0 + step as f64 * 20.0 + rng.random_range(-4.0..4.0);
        if rng.random_range(0.0..1.0) < 0.5 {
            continue;
        }
        let side = if rng.random_range(0.0..1.0) < 0.5 { -1.0 } else { 1.0 };
        // Roughly one house in six sits right on the line.
        let setback = if rng.random_range(0..6) == 0 {
            rng.random_range(0.0..3.0)
        } else {
            rng.random_range(9.0..18.0)
        };
        parts
            .buildings
            .push(house(next_id, offset_meters(start, side * setback, along), 5.0));
        next_id += 1;
    }

    let mut elevation = 8.0;
    for step in 0..=20 {
        let along = step as f64 * 50.0;
        let coordinate = if along <= 600.0 {
            offset_meters(start, 0.0, along)
        } else {
            offset_meters(turn, along - 600.0, 0.0)
        };
        parts.elevation_profile.push(ElevationSample {
            coordinate,
            elevation_m: elevation,
        });
        elevation += rng.random_range(-1.0..3.0);
    }

    scenario_file("suburb", route, parts)
}
