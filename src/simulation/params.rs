//! Tunable parameters for the commute simulation

use serde::{Deserialize, Serialize};

use crate::simulation::employees::needs::{NeedCategory, NeedTable};

/// Main parameter set. Every field has a default so a config file only needs
/// to override what it changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    // Needs
    /// Category, capacity and decay for each need
    pub needs: NeedTable,
    /// Weight of physical needs in action scoring
    pub physical_importance: f32,
    /// Weight of psychological needs in action scoring
    pub psychological_importance: f32,
    /// Weight of economic needs in action scoring
    pub economic_importance: f32,
    /// Fixed urgency reported by unbounded needs
    pub unbounded_urgency: f32,

    // Fixed-policy schedule (ticks within a day)
    /// First tick of the commute/work window
    pub work_start: u32,
    /// First tick of the evening window
    pub work_end: u32,

    // Economy
    /// Wealth earned per tick of work
    pub income_per_tick: f32,
    /// Wealth paid per bus ride
    pub bus_fare: f32,

    // Bus
    /// Energy spent riding (applied as a negative delta)
    pub bus_energy_cost: f32,
    /// Alone-time lost at crowd level 1.0 for an agent with tolerance 1
    pub bus_crowd_cost: f32,
    /// Financial-security bonus for leaving home by bus
    pub bus_departure_bonus: f32,
    /// Crowd level assumed while weighing the bus
    pub expected_crowd_level: f32,
    /// Observed crowd level; when absent one is drawn per ride
    pub crowd_level: Option<f32>,

    // Walking
    /// Energy spent per hop walked
    pub walk_energy_per_step: f32,
    /// Alone-time gained on a walk
    pub walk_alone_gain: f32,
    /// Financial-security bonus for leaving home on foot
    pub walk_departure_bonus: f32,
    /// Range of substituted walk lengths when no map is available
    pub walk_length_min: u32,
    pub walk_length_max: u32,

    // Rest and sleep
    pub rest_energy_gain: f32,
    pub rest_alone_gain: f32,
    /// Financial-security lost resting at the workplace
    pub rest_work_penalty: f32,
    pub sleep_energy_gain: f32,
    pub sleep_alone_gain: f32,
    /// Financial-security lost sleeping at the workplace
    pub sleep_work_penalty: f32,

    // Work
    pub work_energy_cost: f32,
    /// Alone-time converted into socialization on an interaction
    pub work_social_conversion: f32,
    /// Chance of an involuntary interaction per tick of work
    pub work_social_chance: f64,
    pub work_financial_gain: f32,

    // Burnout
    pub meltdown_energy_cost: f32,
    pub meltdown_self_esteem_cost: f32,
    /// Ticks spent recovering after a burnout
    pub recovery_ticks: u32,
    /// Energy regained per recovery tick
    pub energy_recovery: f32,
    /// Alone-time regained per recovery tick per unit of tolerance
    pub social_recovery_rate: f32,
    /// Keeps social recovery positive for near-zero tolerance
    pub social_recovery_epsilon: f32,

    // Agents
    /// Inclusive range of social tolerance values handed out at setup
    pub min_tolerance: u32,
    pub max_tolerance: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            // Needs
            needs: NeedTable::default(),
            physical_importance: 1.0,
            psychological_importance: 1.0,
            economic_importance: 1.5,
            unbounded_urgency: 0.05,

            // Schedule
            work_start: 9,
            work_end: 17,

            // Economy
            income_per_tick: 1.0,
            bus_fare: 0.005,

            // Bus
            bus_energy_cost: 0.5,
            bus_crowd_cost: 5.0,
            bus_departure_bonus: 1.0,
            expected_crowd_level: 0.5,
            crowd_level: None,

            // Walking
            walk_energy_per_step: 0.2,
            walk_alone_gain: 0.5,
            walk_departure_bonus: 1.5,
            walk_length_min: 5,
            walk_length_max: 40,

            // Rest and sleep
            rest_energy_gain: 5.0,
            rest_alone_gain: 1.0,
            rest_work_penalty: 1.0,
            sleep_energy_gain: 15.0,
            sleep_alone_gain: 2.0,
            sleep_work_penalty: 3.0,

            // Work
            work_energy_cost: 8.0,
            work_social_conversion: 2.0,
            work_social_chance: 0.5,
            work_financial_gain: 3.0,

            // Burnout
            meltdown_energy_cost: 10.0,
            meltdown_self_esteem_cost: 3.0,
            recovery_ticks: 5,
            energy_recovery: 10.0,
            social_recovery_rate: 0.1,
            social_recovery_epsilon: 0.01,

            // Agents
            min_tolerance: 1,
            max_tolerance: 7,
        }
    }
}

impl SimulationParams {
    /// Create params for quick test runs: fixed crowding, short recovery
    pub fn fast_test() -> Self {
        let mut params = Self::default();
        params.crowd_level = Some(0.5);
        params.recovery_ticks = 2;
        params.walk_length_min = 4;
        params.walk_length_max = 12;
        params
    }

    /// Scoring weight for a need category
    pub fn importance(&self, category: NeedCategory) -> f32 {
        match category {
            NeedCategory::Physical => self.physical_importance,
            NeedCategory::Psychological => self.psychological_importance,
            NeedCategory::Economic => self.economic_importance,
        }
    }

    /// Params with a fixed, observed crowd level so bus rides draw no randomness
    pub fn with_crowd_level(mut self, level: f32) -> Self {
        self.crowd_level = Some(level);
        self
    }

    /// Expected walk length used when no map is available
    pub fn expected_walk_length(&self) -> u32 {
        (self.walk_length_min + self.walk_length_max) / 2
    }
}
