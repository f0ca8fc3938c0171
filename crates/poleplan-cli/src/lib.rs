//! Poleplan CLI - command line drivers for the pole placement core.
//!
//! Binaries:
//! - plan_network: place poles along a scenario route and print a JSON report
//! - cost_grid: rasterize scenario terrain into a traversal cost grid

pub mod config;
pub mod input;
pub mod logging;
pub mod report;
pub mod scenario;

pub use config::CliConfig;
pub use input::{load_scenario, ScenarioFile};
pub use report::{plan_report, write_json, PlanReport};
pub use scenario::{build_scenario, ScenarioKind};
