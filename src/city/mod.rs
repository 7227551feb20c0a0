//! City grid: static placement of roads, buildings and bus stops, plus the
//! walking-cost queries the commute simulation consumes.
//!
//! The grid is built once (programmatically or from a text map) and then only
//! queried. Movement is 4-connected with a uniform cost of 1 per step.

pub mod cells;
pub mod map_file;
pub mod pathing;

use thiserror::Error;

use crate::simulation::types::TileCoord;

pub use cells::{CellContent, CityGrid};
pub use map_file::{load_map, parse_map};
pub use pathing::{estimated_cost, shortest_path_length, PathCostSource};

/// Errors raised by grid construction and path queries.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("coordinate {coord} is outside the {width}x{height} grid")]
    OutOfBounds {
        coord: TileCoord,
        width: usize,
        height: usize,
    },

    #[error("coordinate {0} is blocked")]
    Blocked(TileCoord),

    #[error("malformed map: {0}")]
    MalformedMap(String),

    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),
}
