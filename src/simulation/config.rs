//! Run configuration loaded from JSON
//!
//! ```json
//! {
//!   "simulation": { "day_length": 24, "max_ticks": 240, "num_agents": 20, "seed": 7 },
//!   "houses": { "house_a": [1, 1] },
//!   "workplace_locations": { "office": [10, 12] },
//!   "policy": { "office": "fixed" },
//!   "params": { "bus_fare": 0.01 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::simulation::employees::needs::Need;
use crate::simulation::employees::policy::WorkplacePolicy;
use crate::simulation::params::SimulationParams;
use crate::simulation::types::TileCoord;

/// Errors found while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no workplace uses the `{0}` policy")]
    NoWorkplaceForPolicy(WorkplacePolicy),

    #[error("workplace `{0}` has no policy entry")]
    MissingPolicy(String),

    #[error("policy entry for undeclared workplace `{0}`")]
    UnknownWorkplace(String),

    #[error("no houses declared")]
    NoHouses,

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Run length and population
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSection {
    /// Ticks per simulated day
    #[serde(default = "default_day_length")]
    pub day_length: u32,
    pub max_ticks: u64,
    pub num_agents: u32,
    /// Overridden by `--seed` on the command line
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_day_length() -> u32 {
    24
}

/// Full configuration file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub simulation: RunSection,
    pub houses: BTreeMap<String, (usize, usize)>,
    pub workplace_locations: BTreeMap<String, (usize, usize)>,
    /// Policy label per workplace, as written in the file
    pub policy: BTreeMap<String, String>,
    #[serde(default)]
    pub params: SimulationParams,
}

impl SimulationConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks. Unrecognized policy labels are not an error here:
    /// they are warned about once and their workplaces are never assigned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.houses.is_empty() {
            return Err(ConfigError::NoHouses);
        }
        for workplace in self.workplace_locations.keys() {
            if !self.policy.contains_key(workplace) {
                return Err(ConfigError::MissingPolicy(workplace.clone()));
            }
        }
        for workplace in self.policy.keys() {
            if !self.workplace_locations.contains_key(workplace) {
                return Err(ConfigError::UnknownWorkplace(workplace.clone()));
            }
        }

        for (workplace, label) in &self.policy {
            if let Err(e) = label.parse::<WorkplacePolicy>() {
                warn!("Workplace `{}` will not be staffed: {}", workplace, e);
            }
        }

        let params = &self.params;
        let day_length = self.simulation.day_length;
        if day_length == 0 {
            return Err(ConfigError::InvalidSchedule("day_length must be positive".to_string()));
        }
        if params.work_start >= params.work_end || params.work_end > day_length {
            return Err(ConfigError::InvalidSchedule(format!(
                "work window {}..{} does not fit a day of {} ticks",
                params.work_start, params.work_end, day_length
            )));
        }

        if params.recovery_ticks == 0 {
            return Err(ConfigError::InvalidParameter(
                "recovery_ticks must be at least 1".to_string(),
            ));
        }
        if params.min_tolerance == 0 || params.min_tolerance > params.max_tolerance {
            return Err(ConfigError::InvalidParameter(format!(
                "tolerance range {}..={} must be positive and non-empty",
                params.min_tolerance, params.max_tolerance
            )));
        }
        for need in Need::ALL {
            let spec = params.needs.spec(need);
            if let Some(cap) = spec.max_capacity {
                if !(cap > 0.0 && cap.is_finite()) {
                    return Err(ConfigError::InvalidParameter(format!(
                        "{} capacity {} must be positive and finite",
                        need, cap
                    )));
                }
            }
            if !(spec.decay_multiplier >= 0.0 && spec.decay_multiplier.is_finite()) {
                return Err(ConfigError::InvalidParameter(format!(
                    "{} decay multiplier {} must be non-negative and finite",
                    need, spec.decay_multiplier
                )));
            }
        }
        if !(0.0..=1.0).contains(&params.work_social_chance) {
            return Err(ConfigError::InvalidParameter(format!(
                "work_social_chance {} is not a probability",
                params.work_social_chance
            )));
        }
        Ok(())
    }

    /// Resolve a workplace's policy label; `None` for unknown labels.
    pub fn policy_for(&self, workplace: &str) -> Option<WorkplacePolicy> {
        self.policy.get(workplace)?.parse().ok()
    }

    /// Workplaces running the given policy, in name order. Fatal when empty.
    pub fn workplaces_with_policy(
        &self,
        policy: WorkplacePolicy,
    ) -> Result<Vec<(String, TileCoord)>, ConfigError> {
        let matches: Vec<(String, TileCoord)> = self
            .workplace_locations
            .iter()
            .filter(|(name, _)| self.policy_for(name) == Some(policy))
            .map(|(name, &xy)| (name.clone(), TileCoord::from(xy)))
            .collect();

        if matches.is_empty() {
            return Err(ConfigError::NoWorkplaceForPolicy(policy));
        }
        Ok(matches)
    }

    /// Houses in name order
    pub fn houses(&self) -> Vec<(String, TileCoord)> {
        self.houses
            .iter()
            .map(|(name, &xy)| (name.clone(), TileCoord::from(xy)))
            .collect()
    }

    /// Policies named by at least one workplace, in canonical order
    pub fn policies_in_use(&self) -> Vec<WorkplacePolicy> {
        WorkplacePolicy::ALL
            .into_iter()
            .filter(|p| {
                self.workplace_locations
                    .keys()
                    .any(|w| self.policy_for(w) == Some(*p))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "simulation": { "max_ticks": 48, "num_agents": 4, "seed": 3 },
        "houses": { "house_a": [0, 0], "house_b": [2, 3] },
        "workplace_locations": { "office": [4, 4], "studio": [1, 4], "lab": [3, 0] },
        "policy": { "office": "fixed", "studio": "Flexible", "lab": "hybrid" },
        "params": { "bus_fare": 0.01 }
    }"#;

    #[test]
    fn test_parse_and_defaults() {
        let config = SimulationConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.simulation.day_length, 24);
        assert_eq!(config.simulation.seed, Some(3));
        assert_eq!(config.params.bus_fare, 0.01);
        assert_eq!(config.params.work_end, 17);
        assert_eq!(config.houses()[1], ("house_b".to_string(), TileCoord::new(2, 3)));
    }

    #[test]
    fn test_policy_resolution() {
        let config = SimulationConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.policy_for("office"), Some(WorkplacePolicy::Fixed));
        assert_eq!(config.policy_for("studio"), Some(WorkplacePolicy::Flex));
        assert_eq!(config.policy_for("lab"), None);
        assert_eq!(
            config.policies_in_use(),
            vec![WorkplacePolicy::Fixed, WorkplacePolicy::Flex]
        );
    }

    #[test]
    fn test_no_workplace_for_policy_is_fatal() {
        let config = SimulationConfig::from_json_str(CONFIG).unwrap();
        let fixed = config.workplaces_with_policy(WorkplacePolicy::Fixed).unwrap();
        assert_eq!(fixed, vec![("office".to_string(), TileCoord::new(4, 4))]);
        assert!(matches!(
            config.workplaces_with_policy(WorkplacePolicy::Free),
            Err(ConfigError::NoWorkplaceForPolicy(WorkplacePolicy::Free))
        ));
    }

    #[test]
    fn test_need_capacity_must_be_positive() {
        for cap in ["-1.0", "0.0"] {
            let json = CONFIG.replace(
                r#""bus_fare": 0.01"#,
                &format!(
                    r#""needs": {{ "energy": {{ "category": "physical", "max_capacity": {}, "decay_multiplier": 0.98 }} }}"#,
                    cap
                ),
            );
            assert!(
                matches!(
                    SimulationConfig::from_json_str(&json),
                    Err(ConfigError::InvalidParameter(_))
                ),
                "capacity {} accepted",
                cap
            );
        }

        // Overriding one need keeps the others at their defaults
        let json = CONFIG.replace(
            r#""bus_fare": 0.01"#,
            r#""needs": { "energy": { "category": "physical", "max_capacity": 50.0, "decay_multiplier": 0.9 } }"#,
        );
        let config = SimulationConfig::from_json_str(&json).unwrap();
        assert_eq!(config.params.needs.energy.max_capacity, Some(50.0));
        assert_eq!(config.params.needs.self_esteem.max_capacity, Some(10.0));
    }

    #[test]
    fn test_validation_errors() {
        let missing = CONFIG.replace(r#", "lab": "hybrid""#, "");
        assert!(matches!(
            SimulationConfig::from_json_str(&missing),
            Err(ConfigError::MissingPolicy(w)) if w == "lab"
        ));

        let bad_window = CONFIG.replace(r#""bus_fare": 0.01"#, r#""work_start": 18"#);
        assert!(matches!(
            SimulationConfig::from_json_str(&bad_window),
            Err(ConfigError::InvalidSchedule(_))
        ));

        let no_recovery = CONFIG.replace(r#""bus_fare": 0.01"#, r#""recovery_ticks": 0"#);
        assert!(matches!(
            SimulationConfig::from_json_str(&no_recovery),
            Err(ConfigError::InvalidParameter(_))
        ));

        let bad_decay = CONFIG.replace(
            r#""bus_fare": 0.01"#,
            r#""needs": { "alone_time": { "category": "psychological", "max_capacity": 10.0, "decay_multiplier": -0.5 } }"#,
        );
        assert!(matches!(
            SimulationConfig::from_json_str(&bad_decay),
            Err(ConfigError::InvalidParameter(_))
        ));

        assert!(matches!(
            SimulationConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
