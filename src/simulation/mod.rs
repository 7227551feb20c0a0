//! Commute Simulation System
//!
//! Employees with heterogeneous social tolerance commute between a house and
//! a workplace. Each tick they pick the action that best serves their most
//! urgent needs, within what their workplace's attendance policy allows.
//! Crowded buses wear down alone-time; running it or energy dry forces a
//! recovery period.
//!
//! # Module Structure
//!
//! - `types`: Core type definitions (AgentId, SimTick, Location, TileCoord)
//! - `params`: Simulation tuning parameters
//! - `config`: JSON run configuration (houses, workplaces, policies)
//! - `error`: Fatal run errors
//! - `activity_log`: Bounded log of notable events
//! - `employees`: Needs, action effects, policies and deliberation
//! - `simulation`: Main simulation state and tick loop
//! - `export`: Reports, Gini index and JSON export
//!
//! # Usage
//!
//! ```ignore
//! use commute_sim::simulation::{run_simulation, SimulationConfig, WorkplacePolicy};
//!
//! let config = SimulationConfig::load(Path::new("config/commute.json"))?;
//! let state = run_simulation(&config, WorkplacePolicy::Fixed, None, 42)?;
//! ```

pub mod types;
pub mod params;
pub mod config;
pub mod error;
pub mod activity_log;
pub mod employees;
pub mod simulation;
pub mod export;

// Re-export main types for convenience
pub use types::{AgentId, SimTick, Location, TileCoord};
pub use params::SimulationParams;
pub use config::{ConfigError, SimulationConfig};
pub use error::SimulationError;
pub use activity_log::{ActivityLog, ActivityCategory, ActivityEntry, ActivityStats};
pub use employees::{
    ActionKind, BurnoutKind, DeliberationEngine, DeliberationState, Employee, Need, NeedTable,
    NeedsState, TickOutcome, WorkplacePolicy,
};
pub use simulation::{run_simulation, setup_agents, SimulationState, SimulationStats};
pub use export::{build_report, export_report, generate_summary, gini_coefficient, PolicyReport};
