//! Per-agent deliberation and the burnout/recovery state machine.
//!
//! An active employee scores every admissible action by its estimated effect
//! weighted with need urgency and category importance, then applies a freshly
//! sampled effect of the winner. Driving alone-time to zero or energy below
//! zero forces a fixed number of recovery ticks during which nothing else
//! happens.

use rand::Rng;
use tracing::{debug, info, trace, warn};

use crate::city::PathCostSource;
use crate::simulation::activity_log::ActivityLog;
use crate::simulation::employees::actions::{
    ActionArgs, ActionCatalog, ActionKind, Fallback, SampledEffect,
};
use crate::simulation::employees::needs::{Need, NeedVector};
use crate::simulation::employees::policy::PolicyFilter;
use crate::simulation::employees::types::{BurnoutKind, DeliberationState, Employee};
use crate::simulation::error::SimulationError;
use crate::simulation::params::SimulationParams;
use crate::simulation::types::SimTick;

/// What an employee did during a tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Took an action and stayed active
    Acted {
        action: ActionKind,
        score: f32,
        fallback: Option<Fallback>,
    },
    /// Took an action that triggered a burnout
    BurnedOut {
        action: ActionKind,
        kind: BurnoutKind,
    },
    /// Spent the tick recovering; `ticks_remaining` is after this tick
    Recovering {
        kind: BurnoutKind,
        ticks_remaining: u32,
    },
    /// No admissible action
    Idled,
}

/// Scores, selects and applies actions for employees.
pub struct DeliberationEngine<'a> {
    params: &'a SimulationParams,
    catalog: ActionCatalog<'a>,
    filter: PolicyFilter<'a>,
    paths: Option<&'a dyn PathCostSource>,
}

impl<'a> DeliberationEngine<'a> {
    /// `paths` is the city grid; without one walk lengths are drawn at random.
    pub fn new(
        params: &'a SimulationParams,
        day_length: u32,
        paths: Option<&'a dyn PathCostSource>,
    ) -> Self {
        DeliberationEngine {
            params,
            catalog: ActionCatalog::new(params),
            filter: PolicyFilter::new(params, day_length),
            paths,
        }
    }

    pub fn catalog(&self) -> &ActionCatalog<'a> {
        &self.catalog
    }

    /// Run one tick of deliberation for an employee. Decay is not part of
    /// this; the caller runs it afterwards.
    pub fn step<R: Rng>(
        &self,
        employee: &mut Employee,
        tick: SimTick,
        rng: &mut R,
        log: &mut ActivityLog,
    ) -> Result<TickOutcome, SimulationError> {
        if let DeliberationState::Recovering { kind, ticks_remaining } = employee.state {
            return Ok(self.recover(employee, kind, ticks_remaining, tick, log));
        }

        if employee.policy.is_none() {
            log.log_config_warning(
                tick,
                employee.id,
                format!("workplace `{}` has no valid policy", employee.workplace),
            );
        }
        let available = self
            .filter
            .admissible(employee.policy, employee.location, tick);

        let Some((action, score)) = self.choose_action(employee, available) else {
            trace!("{} {} idles at {}", tick, employee.name, employee.location);
            return Ok(TickOutcome::Idled);
        };

        let args = self.observed_args(employee, action)?;
        let effect = self
            .catalog
            .sample(action, &employee.action_context(), &args, rng);
        if let Some(fallback) = effect.fallback {
            warn!("{} {} {}: {}", tick, employee.name, action, fallback);
            log.log_fallback(tick, employee.id, fallback);
        }

        trace!(
            "{} {} at {} chose {} (score {:.3})",
            tick,
            employee.name,
            employee.location,
            action,
            score
        );
        self.apply(employee, action, &effect);

        if let Some(kind) = self.check_burnout(employee) {
            self.enter_recovery(employee, kind, tick, rng, log);
            return Ok(TickOutcome::BurnedOut { action, kind });
        }

        employee.needs.clamp(&self.params.needs);
        Ok(TickOutcome::Acted {
            action,
            score,
            fallback: effect.fallback,
        })
    }

    /// Pick the admissible action with the strictly greatest score. Ties go
    /// to the earliest action in `available`.
    pub fn choose_action(
        &self,
        employee: &Employee,
        available: &[ActionKind],
    ) -> Option<(ActionKind, f32)> {
        let ctx = employee.action_context();
        let args = self.estimated_args(employee);

        let mut best: Option<(ActionKind, f32)> = None;
        for &action in available {
            let delta = self.catalog.estimate(action, &ctx, &args);
            let score = self.score(employee, &delta);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((action, score));
            }
        }
        best
    }

    /// Sum over needs of delta x urgency x category importance
    pub fn score(&self, employee: &Employee, delta: &NeedVector) -> f32 {
        let table = &self.params.needs;
        delta
            .iter()
            .map(|(need, d)| {
                let urgency = employee
                    .needs
                    .urgency(need, table, self.params.unbounded_urgency);
                let importance = self.params.importance(table.spec(need).category);
                d * urgency * importance
            })
            .sum()
    }

    /// Inputs for estimation: the Manhattan estimate stands in for the walk.
    fn estimated_args(&self, employee: &Employee) -> ActionArgs {
        ActionArgs {
            crowd_level: self.params.crowd_level,
            walk_length: self.paths.map(|p| {
                p.estimated_path_cost(employee.home_coord, employee.workplace_coord)
            }),
        }
    }

    /// Inputs for the applied effect: the real shortest path for walks.
    fn observed_args(
        &self,
        employee: &Employee,
        action: ActionKind,
    ) -> Result<ActionArgs, SimulationError> {
        let mut args = ActionArgs {
            crowd_level: self.params.crowd_level,
            walk_length: None,
        };

        if let (ActionKind::Walk, Some(paths)) = (action, self.paths) {
            let length = paths
                .shortest_path_length(employee.home_coord, employee.workplace_coord)
                .map_err(|source| SimulationError::Path {
                    agent: employee.id,
                    source,
                })?;
            if length.is_none() {
                warn!(
                    "{} has no walkable path from {} to {}",
                    employee.name, employee.home_coord, employee.workplace_coord
                );
            }
            args.walk_length = length;
        }

        Ok(args)
    }

    /// Apply an effect plus its wealth and location side effects.
    fn apply(&self, employee: &mut Employee, action: ActionKind, effect: &SampledEffect) {
        employee.needs.apply(&effect.delta);
        employee.last_action = Some(action);

        match action {
            ActionKind::Work => employee.wealth += self.params.income_per_tick,
            ActionKind::TakeBus => employee.wealth -= self.params.bus_fare,
            _ => {}
        }
        if action.is_commute() {
            employee.location = employee.location.toggled();
        }
    }

    /// Social burnout takes precedence over energy burnout.
    fn check_burnout(&self, employee: &Employee) -> Option<BurnoutKind> {
        if employee.needs.level(Need::AloneTime) <= 0.0 {
            Some(BurnoutKind::Social)
        } else if employee.needs.level(Need::Energy) < 0.0 {
            Some(BurnoutKind::Energy)
        } else {
            None
        }
    }

    /// Start recovery. Needs are left unclamped.
    fn enter_recovery<R: Rng>(
        &self,
        employee: &mut Employee,
        kind: BurnoutKind,
        tick: SimTick,
        rng: &mut R,
        log: &mut ActivityLog,
    ) {
        info!(
            "{} {} {} burnout (alone_time {:.2}, energy {:.2})",
            tick,
            employee.name,
            kind,
            employee.needs.level(Need::AloneTime),
            employee.needs.level(Need::Energy)
        );
        log.log_burnout(tick, employee.id, kind);
        employee.state = DeliberationState::Recovering {
            kind,
            ticks_remaining: self.params.recovery_ticks,
        };

        if kind == BurnoutKind::Social {
            let meltdown = self.catalog.sample(
                ActionKind::Meltdown,
                &employee.action_context(),
                &ActionArgs::default(),
                rng,
            );
            self.apply(employee, ActionKind::Meltdown, &meltdown);
            log.log_meltdown(tick, employee.id);
        }
    }

    /// One recovery tick: fixed increment, counter, timer.
    fn recover(
        &self,
        employee: &mut Employee,
        kind: BurnoutKind,
        ticks_remaining: u32,
        tick: SimTick,
        log: &mut ActivityLog,
    ) -> TickOutcome {
        match kind {
            BurnoutKind::Social => {
                let gain = self.params.social_recovery_rate
                    * (employee.social_tolerance + self.params.social_recovery_epsilon);
                let level = employee.needs.level(Need::AloneTime);
                employee.needs.set_level(Need::AloneTime, level + gain);
                employee.social_burnout_ticks += 1;
            }
            BurnoutKind::Energy => {
                let level = employee.needs.level(Need::Energy);
                employee
                    .needs
                    .set_level(Need::Energy, level + self.params.energy_recovery);
                employee.energy_burnout_ticks += 1;
            }
        }

        let remaining = ticks_remaining.saturating_sub(1);
        if remaining == 0 {
            employee.state = DeliberationState::Active;
            debug!("{} {} recovered from {} burnout", tick, employee.name, kind);
            log.log_recovered(tick, employee.id, kind);
        } else {
            employee.state = DeliberationState::Recovering {
                kind,
                ticks_remaining: remaining,
            };
        }

        TickOutcome::Recovering {
            kind,
            ticks_remaining: remaining,
        }
    }
}
