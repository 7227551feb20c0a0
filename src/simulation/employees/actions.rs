//! Action effect catalog.
//!
//! Maps an action and its context to a full delta over every need. There are
//! two entry points: `estimate` is pure and fills missing inputs with expected
//! values (used while weighing options), `sample` draws fresh randomness for
//! the effect that is actually applied. The two can and do disagree.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::simulation::employees::needs::{Need, NeedVector};
use crate::simulation::error::SimulationError;
use crate::simulation::params::SimulationParams;
use crate::simulation::types::Location;

/// Everything an employee can do in a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    TakeBus,
    Walk,
    Rest,
    Sleep,
    Work,
    /// Only ever synthesized on social burnout
    Meltdown,
    Wait,
}

impl ActionKind {
    /// Every action, in canonical order
    pub const ALL: [ActionKind; 7] = [
        ActionKind::TakeBus,
        ActionKind::Walk,
        ActionKind::Rest,
        ActionKind::Sleep,
        ActionKind::Work,
        ActionKind::Meltdown,
        ActionKind::Wait,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::TakeBus => "take_bus",
            ActionKind::Walk => "walk",
            ActionKind::Rest => "rest",
            ActionKind::Sleep => "sleep",
            ActionKind::Work => "work",
            ActionKind::Meltdown => "meltdown",
            ActionKind::Wait => "wait",
        }
    }

    /// Commute actions move the agent between home and workplace
    pub fn is_commute(&self) -> bool {
        matches!(self, ActionKind::TakeBus | ActionKind::Walk)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .iter()
            .copied()
            .find(|a| a.name() == s)
            .ok_or_else(|| SimulationError::UnrecognizedAction(s.to_string()))
    }
}

/// The parts of the agent's state an effect depends on
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionContext {
    pub location: Location,
    pub social_tolerance: f32,
}

/// Optional observations supplied by the caller
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActionArgs {
    /// Crowd level on the bus, 0.0 (empty) to 1.0 (packed)
    pub crowd_level: Option<f32>,
    /// Walk length in hops
    pub walk_length: Option<u32>,
}

/// A random value substituted for a missing observation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Fallback {
    RandomCrowdLevel(f32),
    RandomWalkLength(u32),
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::RandomCrowdLevel(level) => write!(f, "random crowd level {:.3}", level),
            Fallback::RandomWalkLength(length) => write!(f, "random walk length {}", length),
        }
    }
}

/// An applied effect together with any substituted input
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampledEffect {
    pub delta: NeedVector,
    pub fallback: Option<Fallback>,
}

/// Resolved inputs shared by estimation and sampling
struct EffectInputs {
    crowd_level: f32,
    walk_length: u32,
    /// 0.0..=1.0 share of a work interaction (expected value or a coin flip)
    interaction: f32,
}

/// Effect tables keyed by action
#[derive(Clone, Copy, Debug)]
pub struct ActionCatalog<'a> {
    params: &'a SimulationParams,
}

impl<'a> ActionCatalog<'a> {
    pub fn new(params: &'a SimulationParams) -> Self {
        ActionCatalog { params }
    }

    /// Deterministic estimate. Missing observations are replaced by their
    /// expected values and the work interaction by its expectation.
    pub fn estimate(&self, action: ActionKind, ctx: &ActionContext, args: &ActionArgs) -> NeedVector {
        let inputs = EffectInputs {
            crowd_level: args.crowd_level.unwrap_or(self.params.expected_crowd_level),
            walk_length: args
                .walk_length
                .unwrap_or_else(|| self.params.expected_walk_length()),
            interaction: self.params.work_social_chance as f32,
        };
        self.effect(action, ctx, &inputs)
    }

    /// Sampled effect with fresh random draws. Missing crowd levels and walk
    /// lengths are drawn at random and reported as a `Fallback`.
    pub fn sample<R: Rng>(
        &self,
        action: ActionKind,
        ctx: &ActionContext,
        args: &ActionArgs,
        rng: &mut R,
    ) -> SampledEffect {
        let mut fallback = None;

        let crowd_level = match (action, args.crowd_level) {
            (_, Some(level)) => level,
            (ActionKind::TakeBus, None) => {
                let level = rng.gen_range(0.0f32..1.0);
                fallback = Some(Fallback::RandomCrowdLevel(level));
                level
            }
            (_, None) => self.params.expected_crowd_level,
        };

        let walk_length = match (action, args.walk_length) {
            (_, Some(length)) => length,
            (ActionKind::Walk, None) => {
                let length = self.random_walk_length(rng);
                fallback = Some(Fallback::RandomWalkLength(length));
                length
            }
            (_, None) => self.params.expected_walk_length(),
        };

        let interaction = if action == ActionKind::Work && rng.gen_bool(self.params.work_social_chance) {
            1.0
        } else {
            0.0
        };

        let inputs = EffectInputs {
            crowd_level,
            walk_length,
            interaction,
        };
        SampledEffect {
            delta: self.effect(action, ctx, &inputs),
            fallback,
        }
    }

    /// Estimate by action label, for callers holding untyped action names
    pub fn estimate_label(
        &self,
        label: &str,
        ctx: &ActionContext,
        args: &ActionArgs,
    ) -> Result<NeedVector, SimulationError> {
        let action: ActionKind = label.parse()?;
        Ok(self.estimate(action, ctx, args))
    }

    /// Sample by action label
    pub fn sample_label<R: Rng>(
        &self,
        label: &str,
        ctx: &ActionContext,
        args: &ActionArgs,
        rng: &mut R,
    ) -> Result<SampledEffect, SimulationError> {
        let action: ActionKind = label.parse()?;
        Ok(self.sample(action, ctx, args, rng))
    }

    fn random_walk_length<R: Rng>(&self, rng: &mut R) -> u32 {
        let min = self.params.walk_length_min;
        let max = self.params.walk_length_max.max(min);
        rng.gen_range(min..=max)
    }

    /// Crowd cost on alone-time. Lower tolerance makes the same crowd costlier.
    fn crowd_cost(&self, social_tolerance: f32, crowd_level: f32) -> f32 {
        -self.params.bus_crowd_cost * crowd_level / social_tolerance
    }

    fn effect(&self, action: ActionKind, ctx: &ActionContext, inputs: &EffectInputs) -> NeedVector {
        let p = self.params;
        let from_home = ctx.location == Location::Home;
        let at_work = ctx.location == Location::Workplace;

        match action {
            ActionKind::TakeBus => {
                let mut delta = NeedVector::zero()
                    .with(Need::AloneTime, self.crowd_cost(ctx.social_tolerance, inputs.crowd_level))
                    .with(Need::Energy, -p.bus_energy_cost);
                if from_home {
                    delta[Need::FinancialSecurity] = p.bus_departure_bonus;
                }
                delta
            }
            ActionKind::Walk => {
                let mut delta = NeedVector::zero()
                    .with(Need::Energy, -p.walk_energy_per_step * inputs.walk_length as f32)
                    .with(Need::AloneTime, p.walk_alone_gain);
                if from_home {
                    delta[Need::FinancialSecurity] = p.walk_departure_bonus;
                }
                delta
            }
            ActionKind::Rest => {
                let mut delta = NeedVector::zero()
                    .with(Need::Energy, p.rest_energy_gain)
                    .with(Need::AloneTime, p.rest_alone_gain);
                if at_work {
                    delta[Need::FinancialSecurity] = -p.rest_work_penalty;
                }
                delta
            }
            ActionKind::Sleep => {
                let mut delta = NeedVector::zero()
                    .with(Need::Energy, p.sleep_energy_gain)
                    .with(Need::AloneTime, p.sleep_alone_gain);
                if at_work {
                    delta[Need::FinancialSecurity] = -p.sleep_work_penalty;
                }
                delta
            }
            ActionKind::Work => {
                let converted = p.work_social_conversion * inputs.interaction;
                NeedVector::zero()
                    .with(Need::Energy, -p.work_energy_cost)
                    .with(Need::AloneTime, -converted)
                    .with(Need::Socialization, converted)
                    .with(Need::FinancialSecurity, p.work_financial_gain)
            }
            ActionKind::Meltdown => NeedVector::zero()
                .with(Need::Energy, -p.meltdown_energy_cost)
                .with(Need::SelfEsteem, -p.meltdown_self_esteem_cost),
            ActionKind::Wait => NeedVector::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn home_ctx(tolerance: f32) -> ActionContext {
        ActionContext {
            location: Location::Home,
            social_tolerance: tolerance,
        }
    }

    fn work_ctx() -> ActionContext {
        ActionContext {
            location: Location::Workplace,
            social_tolerance: 1.0,
        }
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("take_bus".parse::<ActionKind>().unwrap(), ActionKind::TakeBus);
        assert_eq!("meltdown".parse::<ActionKind>().unwrap(), ActionKind::Meltdown);
        assert!(matches!(
            "teleport".parse::<ActionKind>(),
            Err(SimulationError::UnrecognizedAction(label)) if label == "teleport"
        ));
    }

    #[test]
    fn test_unknown_label_is_error() {
        let params = SimulationParams::default();
        let catalog = ActionCatalog::new(&params);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(catalog.estimate_label("fly", &home_ctx(1.0), &ActionArgs::default()).is_err());
        assert!(catalog
            .sample_label("fly", &home_ctx(1.0), &ActionArgs::default(), &mut rng)
            .is_err());
        assert!(catalog.estimate_label("rest", &home_ctx(1.0), &ActionArgs::default()).is_ok());
    }

    #[test]
    fn test_every_action_covers_every_need() {
        let params = SimulationParams::default();
        let catalog = ActionCatalog::new(&params);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for action in ActionKind::ALL {
            for ctx in [home_ctx(2.0), work_ctx()] {
                let estimate = catalog.estimate(action, &ctx, &ActionArgs::default());
                assert_eq!(estimate.iter().count(), Need::ALL.len());
                let sampled = catalog.sample(action, &ctx, &ActionArgs::default(), &mut rng);
                assert_eq!(sampled.delta.iter().count(), Need::ALL.len());
                assert!(sampled.delta.iter().all(|(_, v)| v.is_finite()));
            }
        }
    }

    #[test]
    fn test_wait_is_all_zero() {
        let params = SimulationParams::default();
        let catalog = ActionCatalog::new(&params);
        assert!(catalog
            .estimate(ActionKind::Wait, &work_ctx(), &ActionArgs::default())
            .is_zero());
    }

    #[test]
    fn test_bus_crowd_cost_scales_with_tolerance() {
        let params = SimulationParams::default();
        let catalog = ActionCatalog::new(&params);
        let args = ActionArgs {
            crowd_level: Some(0.8),
            walk_length: None,
        };
        let sensitive = catalog.estimate(ActionKind::TakeBus, &home_ctx(1.0), &args);
        let tolerant = catalog.estimate(ActionKind::TakeBus, &home_ctx(4.0), &args);

        assert!((sensitive[Need::AloneTime] - (-4.0)).abs() < 1e-6);
        assert!((tolerant[Need::AloneTime] - (-1.0)).abs() < 1e-6);
        assert_eq!(sensitive[Need::FinancialSecurity], params.bus_departure_bonus);
    }

    #[test]
    fn test_departure_bonus_only_from_home() {
        let params = SimulationParams::default();
        let catalog = ActionCatalog::new(&params);
        let args = ActionArgs {
            crowd_level: Some(0.0),
            walk_length: Some(10),
        };
        let bus = catalog.estimate(ActionKind::TakeBus, &work_ctx(), &args);
        let walk = catalog.estimate(ActionKind::Walk, &work_ctx(), &args);
        assert_eq!(bus[Need::FinancialSecurity], 0.0);
        assert_eq!(walk[Need::FinancialSecurity], 0.0);

        // Walking from home pays more than the bus
        let bus = catalog.estimate(ActionKind::TakeBus, &home_ctx(1.0), &args);
        let walk = catalog.estimate(ActionKind::Walk, &home_ctx(1.0), &args);
        assert!(walk[Need::FinancialSecurity] > bus[Need::FinancialSecurity]);
    }

    #[test]
    fn test_walk_energy_proportional_to_length() {
        let params = SimulationParams::default();
        let catalog = ActionCatalog::new(&params);
        let short = catalog.estimate(
            ActionKind::Walk,
            &home_ctx(1.0),
            &ActionArgs { crowd_level: None, walk_length: Some(10) },
        );
        let long = catalog.estimate(
            ActionKind::Walk,
            &home_ctx(1.0),
            &ActionArgs { crowd_level: None, walk_length: Some(20) },
        );
        assert!((long[Need::Energy] - 2.0 * short[Need::Energy]).abs() < 1e-5);
        assert_eq!(short[Need::AloneTime], params.walk_alone_gain);
    }

    #[test]
    fn test_rest_and_sleep_penalized_at_work() {
        let params = SimulationParams::default();
        let catalog = ActionCatalog::new(&params);
        let args = ActionArgs::default();
        let rest_home = catalog.estimate(ActionKind::Rest, &home_ctx(1.0), &args);
        let rest_work = catalog.estimate(ActionKind::Rest, &work_ctx(), &args);
        let sleep_work = catalog.estimate(ActionKind::Sleep, &work_ctx(), &args);

        assert_eq!(rest_home[Need::FinancialSecurity], 0.0);
        assert!(rest_work[Need::FinancialSecurity] < 0.0);
        assert!(sleep_work[Need::FinancialSecurity] < rest_work[Need::FinancialSecurity]);
        assert!(sleep_work[Need::Energy] > rest_work[Need::Energy]);
    }

    #[test]
    fn test_work_interaction_is_all_or_nothing_when_sampled() {
        let params = SimulationParams::default();
        let catalog = ActionCatalog::new(&params);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut saw_interaction = false;
        let mut saw_quiet = false;
        for _ in 0..64 {
            let effect = catalog.sample(ActionKind::Work, &work_ctx(), &ActionArgs::default(), &mut rng);
            let social = effect.delta[Need::Socialization];
            assert!(social == 0.0 || social == params.work_social_conversion);
            assert_eq!(effect.delta[Need::AloneTime], -social);
            assert_eq!(effect.delta[Need::Energy], -params.work_energy_cost);
            assert!(effect.fallback.is_none());
            saw_interaction |= social > 0.0;
            saw_quiet |= social == 0.0;
        }
        assert!(saw_interaction && saw_quiet);

        // The estimate uses the expectation instead
        let estimate = catalog.estimate(ActionKind::Work, &work_ctx(), &ActionArgs::default());
        assert!((estimate[Need::Socialization] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_observations_are_flagged() {
        let params = SimulationParams::default();
        let catalog = ActionCatalog::new(&params);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let bus = catalog.sample(ActionKind::TakeBus, &home_ctx(1.0), &ActionArgs::default(), &mut rng);
        match bus.fallback {
            Some(Fallback::RandomCrowdLevel(level)) => assert!((0.0..1.0).contains(&level)),
            other => panic!("expected crowd fallback, got {:?}", other),
        }

        let walk = catalog.sample(ActionKind::Walk, &home_ctx(1.0), &ActionArgs::default(), &mut rng);
        match walk.fallback {
            Some(Fallback::RandomWalkLength(length)) => {
                assert!(length >= params.walk_length_min && length <= params.walk_length_max)
            }
            other => panic!("expected walk fallback, got {:?}", other),
        }

        let observed = ActionArgs {
            crowd_level: Some(0.2),
            walk_length: Some(12),
        };
        assert!(catalog
            .sample(ActionKind::TakeBus, &home_ctx(1.0), &observed, &mut rng)
            .fallback
            .is_none());
        assert!(catalog
            .sample(ActionKind::Walk, &home_ctx(1.0), &observed, &mut rng)
            .fallback
            .is_none());
    }

    #[test]
    fn test_meltdown_effect() {
        let params = SimulationParams::default();
        let catalog = ActionCatalog::new(&params);
        let delta = catalog.estimate(ActionKind::Meltdown, &work_ctx(), &ActionArgs::default());
        assert_eq!(delta[Need::Energy], -params.meltdown_energy_cost);
        assert_eq!(delta[Need::SelfEsteem], -params.meltdown_self_esteem_cost);
        assert_eq!(delta[Need::AloneTime], 0.0);
        assert_eq!(delta[Need::FinancialSecurity], 0.0);
    }
}
