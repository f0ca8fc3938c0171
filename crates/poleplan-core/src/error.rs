//! Hard errors raised by the planner.
//!
//! Only caller mistakes end up here. Degenerate routes, empty terrain and
//! rule violations are reported through empty results or findings instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("coordinate ({lat}, {lng}) is not finite")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("span target `{name}` must be a positive finite number of meters, got {value}")]
    InvalidSpan { name: &'static str, value: f64 },

    #[error("cell size must be a positive finite number of meters, got {0}")]
    InvalidCellSize(f64),

    #[error("cost grid of {cells} cells exceeds the limit of {limit}")]
    GridTooLarge { cells: usize, limit: usize },
}
