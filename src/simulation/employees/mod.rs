//! Commuting employees: needs, action effects, workplace policies and the
//! deliberation loop that ties them together.

pub mod actions;
pub mod deliberation;
pub mod needs;
pub mod policy;
pub mod types;

pub use actions::{ActionArgs, ActionCatalog, ActionContext, ActionKind, Fallback, SampledEffect};
pub use deliberation::{DeliberationEngine, TickOutcome};
pub use needs::{Need, NeedCategory, NeedSpec, NeedTable, NeedVector, NeedsState, NEED_COUNT};
pub use policy::{DayWindow, PolicyFilter, WorkplacePolicy};
pub use types::{BurnoutKind, DeliberationState, Employee};
