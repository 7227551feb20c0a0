//! Workplace attendance policies and the actions they admit.
//!
//! The admissible set depends on the policy, where the employee is and the
//! tick within the day. Under `Fixed` the day is split into three windows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::simulation::employees::actions::ActionKind;
use crate::simulation::params::SimulationParams;
use crate::simulation::types::{Location, SimTick};

/// Attendance rule set by a workplace
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkplacePolicy {
    /// Office hours: commute in the morning, work, commute back
    Fixed,
    /// Anything, anywhere, anytime
    Free,
    /// Commute at any time, but work only happens at the workplace
    Flex,
}

impl WorkplacePolicy {
    pub const ALL: [WorkplacePolicy; 3] = [
        WorkplacePolicy::Fixed,
        WorkplacePolicy::Free,
        WorkplacePolicy::Flex,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WorkplacePolicy::Fixed => "fixed",
            WorkplacePolicy::Free => "free",
            WorkplacePolicy::Flex => "flex",
        }
    }
}

impl fmt::Display for WorkplacePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WorkplacePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(WorkplacePolicy::Fixed),
            "free" => Ok(WorkplacePolicy::Free),
            "flex" | "flexible" => Ok(WorkplacePolicy::Flex),
            other => Err(format!("unknown policy `{}`", other)),
        }
    }
}

/// Window of the day under the fixed schedule
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayWindow {
    BeforeWork,
    WorkHours,
    AfterWork,
}

impl DayWindow {
    pub fn from_time(time_of_day: u32, params: &SimulationParams) -> Self {
        if time_of_day < params.work_start {
            DayWindow::BeforeWork
        } else if time_of_day < params.work_end {
            DayWindow::WorkHours
        } else {
            DayWindow::AfterWork
        }
    }
}

const EVERYTHING: &[ActionKind] = &[
    ActionKind::TakeBus,
    ActionKind::Walk,
    ActionKind::Rest,
    ActionKind::Sleep,
    ActionKind::Work,
    ActionKind::Wait,
];
const FLEX_HOME: &[ActionKind] = &[
    ActionKind::TakeBus,
    ActionKind::Walk,
    ActionKind::Rest,
    ActionKind::Sleep,
    ActionKind::Wait,
];
const COMMUTE: &[ActionKind] = &[ActionKind::TakeBus, ActionKind::Walk];
const COMMUTE_OR_WAIT: &[ActionKind] = &[ActionKind::TakeBus, ActionKind::Walk, ActionKind::Wait];
const REST_OR_SLEEP: &[ActionKind] = &[ActionKind::Rest, ActionKind::Sleep];
const ON_SHIFT: &[ActionKind] = &[ActionKind::Rest, ActionKind::Work];

/// Restricts the action set per policy, location and time of day.
#[derive(Clone, Copy, Debug)]
pub struct PolicyFilter<'a> {
    params: &'a SimulationParams,
    day_length: u32,
}

impl<'a> PolicyFilter<'a> {
    pub fn new(params: &'a SimulationParams, day_length: u32) -> Self {
        PolicyFilter { params, day_length }
    }

    /// Admissible actions in canonical order. `None` stands for a policy the
    /// configuration could not resolve: a warning is logged and the set is
    /// empty, so the agent idles.
    pub fn admissible(
        &self,
        policy: Option<WorkplacePolicy>,
        location: Location,
        tick: SimTick,
    ) -> &'static [ActionKind] {
        let Some(policy) = policy else {
            warn!("{} no valid policy for agent at {}, idling", tick, location);
            return &[];
        };

        match policy {
            WorkplacePolicy::Free => EVERYTHING,
            WorkplacePolicy::Flex => match location {
                Location::Home => FLEX_HOME,
                Location::Workplace => EVERYTHING,
            },
            WorkplacePolicy::Fixed => {
                let window = DayWindow::from_time(tick.time_of_day(self.day_length), self.params);
                match (window, location) {
                    (DayWindow::BeforeWork, Location::Home) => REST_OR_SLEEP,
                    (DayWindow::BeforeWork, Location::Workplace) => COMMUTE_OR_WAIT,
                    (DayWindow::WorkHours, Location::Home) => COMMUTE,
                    (DayWindow::WorkHours, Location::Workplace) => ON_SHIFT,
                    (DayWindow::AfterWork, Location::Home) => REST_OR_SLEEP,
                    (DayWindow::AfterWork, Location::Workplace) => COMMUTE,
                }
            }
        }
    }
}
