//! Fatal simulation errors

use thiserror::Error;

use crate::city::GridError;
use crate::simulation::config::ConfigError;
use crate::simulation::types::AgentId;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// An action label that no effect table knows
    #[error("unrecognized action `{0}`")]
    UnrecognizedAction(String),

    /// A path query broke the grid contract (endpoint out of bounds or blocked)
    #[error("path query for {agent} failed: {source}")]
    Path {
        agent: AgentId,
        #[source]
        source: GridError,
    },

    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
