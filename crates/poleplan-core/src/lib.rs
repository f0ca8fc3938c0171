pub mod analysis;
pub mod assembly;
pub mod barriers;
pub mod error;
pub mod models;
pub mod placement;
pub mod rules;
pub mod spatial;
pub mod terrain;

pub use analysis::{
    analyze_route, detect_corners, detect_crossings, exclusion_zones, AnalysisSettings,
    RouteAnalysis,
};
pub use assembly::{assemble_project, AssemblyOptions, ProjectLayout};
pub use barriers::{detect_barriers, Barrier, BarrierKind, BarrierReport, BarrierSummary};
pub use error::PlanError;
pub use models::{
    Anchor, AnchorKind, AnchorSource, AreaType, BoundingBox, Building, ConductorRecord,
    Coordinate, Corner, CorrosionZone, Crossing, CrossingKind, ExclusionZone, NetworkNature,
    NetworkType, Obstacle, ObstacleGeometry, ObstacleKind, PoleFunction, PoleRecord,
    ProjectConfig, Severity, Street, TerrainSnapshot, ValidationFinding, VoltageLevel,
};
pub use placement::{
    plan_placement, PlacementOutcome, PlacementSettings, PlacementStats, RepairReport,
};
pub use rules::{
    dimension_pole, ideal_span, max_span, min_span, select_structure, validate_project,
    PoleDimensioning, PoleOptions, ProjectValidation, SpanTargets,
};
pub use spatial::haversine_distance;
pub use terrain::{
    assess_area, build_cost_grid, classify, classify_area, AreaAssessment, Classification, CostGrid,
    TerrainCategory,
};
