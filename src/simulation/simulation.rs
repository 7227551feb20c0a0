//! Main simulation state and tick loop

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::city::{CityGrid, PathCostSource};
use crate::simulation::activity_log::ActivityLog;
use crate::simulation::config::{ConfigError, SimulationConfig};
use crate::simulation::employees::actions::ActionKind;
use crate::simulation::employees::deliberation::{DeliberationEngine, TickOutcome};
use crate::simulation::employees::policy::WorkplacePolicy;
use crate::simulation::employees::types::Employee;
use crate::simulation::error::SimulationError;
use crate::simulation::params::SimulationParams;
use crate::simulation::types::{AgentId, SimTick};

/// State of one policy run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationState {
    /// Policy every agent's workplace runs
    pub policy: WorkplacePolicy,
    /// Next tick to simulate
    pub current_tick: SimTick,
    /// Agents in creation order; ticks visit them in this order
    pub employees: Vec<Employee>,
    pub activity_log: ActivityLog,
    pub stats: SimulationStats,
    /// Random seed used
    pub seed: u64,
    /// Whether walk lengths came from a city map
    pub used_map: bool,
}

/// Statistics tracked during simulation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub ticks_run: u64,
    pub actions_taken: u64,
    pub bus_rides: u64,
    pub walks: u64,
    pub idle_ticks: u64,
    pub recovery_ticks: u64,
    pub burnouts: u64,
}

impl SimulationState {
    pub fn new(policy: WorkplacePolicy, employees: Vec<Employee>, seed: u64, used_map: bool) -> Self {
        SimulationState {
            policy,
            current_tick: SimTick(0),
            employees,
            activity_log: ActivityLog::new(),
            stats: SimulationStats::default(),
            seed,
            used_map,
        }
    }

    /// Advance one tick: every employee deliberates, then their needs decay.
    pub fn tick<R: Rng>(
        &mut self,
        engine: &DeliberationEngine<'_>,
        params: &SimulationParams,
        rng: &mut R,
    ) -> Result<(), SimulationError> {
        let tick = self.current_tick;
        for employee in self.employees.iter_mut() {
            let outcome = engine.step(employee, tick, rng, &mut self.activity_log)?;
            match outcome {
                TickOutcome::Acted { action, .. } | TickOutcome::BurnedOut { action, .. } => {
                    self.stats.actions_taken += 1;
                    match action {
                        ActionKind::TakeBus => self.stats.bus_rides += 1,
                        ActionKind::Walk => self.stats.walks += 1,
                        _ => {}
                    }
                    if matches!(outcome, TickOutcome::BurnedOut { .. }) {
                        self.stats.burnouts += 1;
                    }
                }
                TickOutcome::Recovering { .. } => self.stats.recovery_ticks += 1,
                TickOutcome::Idled => self.stats.idle_ticks += 1,
            }
            employee.decay_needs(&params.needs);
        }

        self.stats.ticks_run += 1;
        self.current_tick = tick.next();
        Ok(())
    }

    pub fn total_wealth(&self) -> f32 {
        self.employees.iter().map(|e| e.wealth).sum()
    }
}

/// Create `num_agents` employees with a random house, a random workplace
/// running `policy`, and a random social tolerance.
pub fn setup_agents<R: Rng>(
    config: &SimulationConfig,
    policy: WorkplacePolicy,
    rng: &mut R,
) -> Result<Vec<Employee>, ConfigError> {
    let houses = config.houses();
    if houses.is_empty() {
        return Err(ConfigError::NoHouses);
    }
    let workplaces = config.workplaces_with_policy(policy)?;
    let params = &config.params;

    let employees = (0..config.simulation.num_agents)
        .map(|i| {
            let home = houses[rng.gen_range(0..houses.len())].clone();
            let workplace = workplaces[rng.gen_range(0..workplaces.len())].clone();
            let tolerance = rng.gen_range(params.min_tolerance..=params.max_tolerance) as f32;
            Employee::new(AgentId(i), home, workplace, Some(policy), tolerance, &params.needs)
        })
        .collect();
    Ok(employees)
}

/// Every house and workplace must sit on a passable cell of the map.
fn check_endpoints(grid: &CityGrid, employees: &[Employee]) -> Result<(), SimulationError> {
    for e in employees {
        for coord in [e.home_coord, e.workplace_coord] {
            grid.check_endpoint(coord)
                .map_err(|source| SimulationError::Path { agent: e.id, source })?;
        }
    }
    Ok(())
}

/// Run one policy to completion. Each run owns its RNG, seeded from `seed`,
/// so runs are reproducible and independent of each other.
pub fn run_simulation(
    config: &SimulationConfig,
    policy: WorkplacePolicy,
    grid: Option<&CityGrid>,
    seed: u64,
) -> Result<SimulationState, SimulationError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let params = &config.params;

    let employees = setup_agents(config, policy, &mut rng)?;
    if let Some(grid) = grid {
        check_endpoints(grid, &employees)?;
    }

    let paths = grid.map(|g| g as &dyn PathCostSource);
    let day_length = config.simulation.day_length;
    let engine = DeliberationEngine::new(params, day_length, paths);
    let mut state = SimulationState::new(policy, employees, seed, grid.is_some());

    info!(
        "Policy {}: {} agents, {} ticks, {}",
        policy,
        state.employees.len(),
        config.simulation.max_ticks,
        if grid.is_some() { "walks priced on the map" } else { "random walk lengths" }
    );

    for _ in 0..config.simulation.max_ticks {
        state.tick(&engine, params, &mut rng)?;

        let tick = state.current_tick;
        if tick.0 % day_length as u64 == 0 {
            debug!(
                "Policy {} day {}: total wealth {:.2}, {} burnouts so far",
                policy,
                tick.day(day_length),
                state.total_wealth(),
                state.stats.burnouts
            );
        }
    }

    info!(
        "Policy {} finished: {} actions, {} burnouts, {} idle ticks",
        policy, state.stats.actions_taken, state.stats.burnouts, state.stats.idle_ticks
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "simulation": { "max_ticks": 72, "num_agents": 6 },
        "houses": { "north": [0, 0], "south": [0, 4] },
        "workplace_locations": { "office": [4, 4], "cafe": [4, 0] },
        "policy": { "office": "fixed", "cafe": "free" }
    }"#;

    fn config() -> SimulationConfig {
        let mut config = SimulationConfig::from_json_str(CONFIG).unwrap();
        config.params = SimulationParams::fast_test();
        config
    }

    #[test]
    fn test_setup_agents_respects_policy() {
        let config = config();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let agents = setup_agents(&config, WorkplacePolicy::Fixed, &mut rng).unwrap();
        assert_eq!(agents.len(), 6);
        for (i, a) in agents.iter().enumerate() {
            assert_eq!(a.name, format!("A{}", i));
            assert_eq!(a.workplace, "office");
            assert!(a.social_tolerance >= 1.0 && a.social_tolerance <= 7.0);
        }
        assert!(matches!(
            setup_agents(&config, WorkplacePolicy::Flex, &mut rng),
            Err(ConfigError::NoWorkplaceForPolicy(WorkplacePolicy::Flex))
        ));
    }

    #[test]
    fn test_unknown_policy_label_is_never_staffed() {
        let json = CONFIG
            .replace(r#""cafe": [4, 0] }"#, r#""cafe": [4, 0], "lab": [2, 2] }"#)
            .replace(r#""cafe": "free" }"#, r#""cafe": "free", "lab": "hybrid" }"#);
        let config = SimulationConfig::from_json_str(&json).unwrap();
        assert_eq!(config.policy_for("lab"), None);

        let state = run_simulation(&config, WorkplacePolicy::Free, None, 3).unwrap();
        assert!(state.employees.iter().all(|e| e.workplace == "cafe"));
        assert!(state.employees.iter().all(|e| e.policy.is_some()));
        assert_eq!(state.stats.idle_ticks, 0);
        assert_eq!(state.activity_log.stats.config_warnings, 0);
    }

    #[test]
    fn test_run_is_deterministic() {
        let config = config();
        let a = run_simulation(&config, WorkplacePolicy::Free, None, 12).unwrap();
        let b = run_simulation(&config, WorkplacePolicy::Free, None, 12).unwrap();
        assert_eq!(a.current_tick, SimTick(72));
        assert_eq!(a.stats, b.stats);
        for (x, y) in a.employees.iter().zip(&b.employees) {
            assert_eq!(x.wealth, y.wealth);
            assert_eq!(x.needs, y.needs);
        }
    }

    #[test]
    fn test_fixed_policy_agents_earn_with_a_map() {
        let config = config();
        let grid = CityGrid::new(5, 5);
        let state = run_simulation(&config, WorkplacePolicy::Fixed, Some(&grid), 4).unwrap();
        assert!(state.used_map);
        assert_eq!(state.stats.ticks_run, 72);
        assert!(state.stats.actions_taken > 0);
        assert!(state.employees.iter().any(|e| e.wealth > 0.0));
        // The map supplies every walk length
        assert!(state
            .activity_log
            .recent_entries(usize::MAX)
            .iter()
            .all(|e| !e.message.contains("walk length")));
    }

    #[test]
    fn test_blocked_house_is_rejected() {
        let config = config();
        let grid = CityGrid::from_rows(&["@....", ".....", ".....", ".....", "@...."]).unwrap();
        let result = run_simulation(&config, WorkplacePolicy::Fixed, Some(&grid), 4);
        assert!(matches!(result, Err(SimulationError::Path { .. })));
    }
}
