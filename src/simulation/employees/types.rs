//! Employee agent state

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::simulation::employees::actions::{ActionContext, ActionKind};
use crate::simulation::employees::needs::{NeedTable, NeedsState};
use crate::simulation::employees::policy::WorkplacePolicy;
use crate::simulation::types::{AgentId, Location, TileCoord};

/// Which threshold triggered a burnout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BurnoutKind {
    /// Alone-time ran out
    Social,
    /// Energy went negative
    Energy,
}

impl fmt::Display for BurnoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurnoutKind::Social => f.write_str("social"),
            BurnoutKind::Energy => f.write_str("energy"),
        }
    }
}

/// Deliberation state machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliberationState {
    #[default]
    Active,
    Recovering {
        kind: BurnoutKind,
        ticks_remaining: u32,
    },
}

impl DeliberationState {
    pub fn is_recovering(&self) -> bool {
        matches!(self, DeliberationState::Recovering { .. })
    }
}

/// A commuting employee
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Employee {
    pub id: AgentId,
    pub name: String,
    /// House name from the config
    pub home: String,
    /// Workplace name from the config
    pub workplace: String,
    pub home_coord: TileCoord,
    pub workplace_coord: TileCoord,
    /// Resolved policy of the workplace; `None` if the config label was invalid
    pub policy: Option<WorkplacePolicy>,

    pub location: Location,
    /// Unbounded accumulator, separate from the financial-security need
    pub wealth: f32,
    pub needs: NeedsState,
    /// Fixed at creation; scales crowd cost and social recovery
    pub social_tolerance: f32,
    pub state: DeliberationState,

    /// Ticks spent recovering from social burnout
    pub social_burnout_ticks: u32,
    /// Ticks spent recovering from energy burnout
    pub energy_burnout_ticks: u32,
    pub last_action: Option<ActionKind>,
}

impl Employee {
    /// New employee at home with every need satisfied
    pub fn new(
        id: AgentId,
        home: (String, TileCoord),
        workplace: (String, TileCoord),
        policy: Option<WorkplacePolicy>,
        social_tolerance: f32,
        needs: &NeedTable,
    ) -> Self {
        Employee {
            id,
            name: id.name(),
            home: home.0,
            workplace: workplace.0,
            home_coord: home.1,
            workplace_coord: workplace.1,
            policy,
            location: Location::Home,
            wealth: 0.0,
            needs: NeedsState::initialize(needs),
            social_tolerance,
            state: DeliberationState::Active,
            social_burnout_ticks: 0,
            energy_burnout_ticks: 0,
            last_action: None,
        }
    }

    pub fn action_context(&self) -> ActionContext {
        ActionContext {
            location: self.location,
            social_tolerance: self.social_tolerance,
        }
    }

    /// Water-tank decay, run once per tick after deliberation
    pub fn decay_needs(&mut self, table: &NeedTable) {
        self.needs.decay(table);
    }

    pub fn final_wealth(&self) -> f32 {
        self.wealth
    }

    pub fn total_burnout_ticks(&self) -> u32 {
        self.social_burnout_ticks + self.energy_burnout_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::employees::needs::Need;

    #[test]
    fn test_new_employee_starts_satisfied_at_home() {
        let table = NeedTable::default();
        let e = Employee::new(
            AgentId(3),
            ("house_a".to_string(), TileCoord::new(0, 0)),
            ("office".to_string(), TileCoord::new(4, 4)),
            Some(WorkplacePolicy::Fixed),
            2.0,
            &table,
        );
        assert_eq!(e.name, "A3");
        assert_eq!(e.location, Location::Home);
        assert_eq!(e.state, DeliberationState::Active);
        assert_eq!(e.needs.level(Need::Energy), 100.0);
        assert_eq!(e.total_burnout_ticks(), 0);
        assert_eq!(e.final_wealth(), 0.0);
    }
}
