//! Per-policy reports: wealth inequality and burnout by social tolerance

use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::simulation::activity_log::ActivityStats;
use crate::simulation::simulation::{SimulationState, SimulationStats};
use crate::simulation::types::SimTick;

/// Bootstrap resamples for the Gini confidence interval
const GINI_BOOTSTRAP_SAMPLES: usize = 1000;

/// Final state of one agent
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentReport {
    pub name: String,
    pub home: String,
    pub workplace: String,
    pub social_tolerance: f32,
    pub final_wealth: f32,
    pub social_burnout_ticks: u32,
    pub energy_burnout_ticks: u32,
    pub needs: BTreeMap<String, f32>,
}

/// Mean, min and max of a metric within one tolerance group
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub count: usize,
    pub mean: f32,
    pub min: f32,
    pub max: f32,
    /// Half-width of the 95% confidence interval of the mean
    pub ci95: f32,
}

/// Metrics grouped by social tolerance
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToleranceGroup {
    pub tolerance: u32,
    pub wealth: GroupSummary,
    pub social_burnout: GroupSummary,
    pub energy_burnout: GroupSummary,
}

/// Report for one policy run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyReport {
    pub policy: String,
    pub seed: u64,
    pub final_tick: SimTick,
    pub used_map: bool,
    pub generated_at: String,
    pub wealth: Option<GroupSummary>,
    pub gini: f32,
    /// Half-width of the bootstrapped 95% interval around `gini`
    pub gini_ci95: f32,
    pub by_tolerance: Vec<ToleranceGroup>,
    pub stats: SimulationStats,
    pub events: ActivityStats,
    pub agents: Vec<AgentReport>,
}

/// Gini index of a set of values. Negative values are shifted up so the
/// minimum is zero; a tiny offset keeps an all-zero set defined.
pub fn gini_coefficient(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let min = values.iter().copied().fold(f64::INFINITY, |m, v| m.min(v as f64));
    let shift = if min < 0.0 { -min } else { 0.0 };

    let mut sorted: Vec<f64> = values.iter().map(|&v| v as f64 + shift + 1e-8).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len() as f64;
    let total: f64 = sorted.iter().sum();
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| (2.0 * (i as f64 + 1.0) - n - 1.0) * v)
        .sum();
    (weighted / (n * total)) as f32
}

/// 1.96 standard deviations of the Gini index over bootstrap resamples
pub fn gini_confidence<R: Rng>(values: &[f32], samples: usize, rng: &mut R) -> f32 {
    if values.len() < 2 || samples == 0 {
        return 0.0;
    }
    let ginis: Vec<f32> = (0..samples)
        .map(|_| {
            let resample: Vec<f32> = (0..values.len())
                .map(|_| values[rng.gen_range(0..values.len())])
                .collect();
            gini_coefficient(&resample)
        })
        .collect();
    1.96 * std_dev(&ginis)
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

fn std_dev(values: &[f32]) -> f32 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f32>() / values.len() as f32;
    var.sqrt()
}

/// Summary statistics; `None` for an empty slice
pub fn summarize(values: &[f32]) -> Option<GroupSummary> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    Some(GroupSummary {
        count: values.len(),
        mean: mean(values),
        min,
        max,
        ci95: 1.96 * std_dev(values) / (values.len() as f32).sqrt(),
    })
}

/// Group wealth and burnout by (integer) social tolerance, ascending.
pub fn tolerance_groups(state: &SimulationState) -> Vec<ToleranceGroup> {
    let mut groups: BTreeMap<u32, (Vec<f32>, Vec<f32>, Vec<f32>)> = BTreeMap::new();
    for e in &state.employees {
        let entry = groups.entry(e.social_tolerance.round() as u32).or_default();
        entry.0.push(e.final_wealth());
        entry.1.push(e.social_burnout_ticks as f32);
        entry.2.push(e.energy_burnout_ticks as f32);
    }

    groups
        .into_iter()
        .filter_map(|(tolerance, (wealth, social, energy))| {
            Some(ToleranceGroup {
                tolerance,
                wealth: summarize(&wealth)?,
                social_burnout: summarize(&social)?,
                energy_burnout: summarize(&energy)?,
            })
        })
        .collect()
}

/// Build the report for a finished run
pub fn build_report<R: Rng>(state: &SimulationState, rng: &mut R) -> PolicyReport {
    let wealths: Vec<f32> = state.employees.iter().map(|e| e.final_wealth()).collect();

    let agents = state
        .employees
        .iter()
        .map(|e| AgentReport {
            name: e.name.clone(),
            home: e.home.clone(),
            workplace: e.workplace.clone(),
            social_tolerance: e.social_tolerance,
            final_wealth: e.final_wealth(),
            social_burnout_ticks: e.social_burnout_ticks,
            energy_burnout_ticks: e.energy_burnout_ticks,
            needs: e
                .needs
                .levels()
                .iter()
                .map(|(need, level)| (need.name().to_string(), level))
                .collect(),
        })
        .collect();

    PolicyReport {
        policy: state.policy.to_string(),
        seed: state.seed,
        final_tick: state.current_tick,
        used_map: state.used_map,
        generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        wealth: summarize(&wealths),
        gini: gini_coefficient(&wealths),
        gini_ci95: gini_confidence(&wealths, GINI_BOOTSTRAP_SAMPLES, rng),
        by_tolerance: tolerance_groups(state),
        stats: state.stats.clone(),
        events: state.activity_log.stats.clone(),
        agents,
    }
}

/// Write `<results_dir>/<policy>/report.json`, creating directories as needed.
pub fn export_report(report: &PolicyReport, results_dir: &Path) -> std::io::Result<PathBuf> {
    let dir = results_dir.join(&report.policy);
    fs::create_dir_all(&dir)?;
    let path = dir.join("report.json");

    let json = serde_json::to_string_pretty(report)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let mut file = File::create(&path)?;
    file.write_all(json.as_bytes())?;
    Ok(path)
}

pub fn generate_summary(report: &PolicyReport) -> String {
    let mut summary = String::new();

    summary.push_str(&format!(
        "=== Policy: {} (Seed: {}) ===\n",
        report.policy, report.seed
    ));
    summary.push_str(&format!(
        "Duration: {} ticks, {}\n\n",
        report.final_tick.0,
        if report.used_map { "map walk costs" } else { "random walk costs" }
    ));

    summary.push_str("--- Wealth ---\n");
    if let Some(w) = &report.wealth {
        summary.push_str(&format!(
            "Agents: {} | mean {:.2} | min {:.2} | max {:.2}\n",
            w.count, w.mean, w.min, w.max
        ));
    }
    summary.push_str(&format!(
        "Gini: {:.3} +/- {:.3}\n\n",
        report.gini, report.gini_ci95
    ));

    summary.push_str("--- Events ---\n");
    summary.push_str(&format!(
        "Burnouts: {} social, {} energy | {} meltdowns | {} recoveries\n",
        report.events.social_burnouts,
        report.events.energy_burnouts,
        report.events.meltdowns,
        report.events.recoveries
    ));
    summary.push_str(&format!(
        "Commutes: {} bus rides, {} walks | {} random fallbacks\n\n",
        report.stats.bus_rides, report.stats.walks, report.events.fallbacks
    ));

    summary.push_str("--- By Social Tolerance ---\n");
    for group in &report.by_tolerance {
        summary.push_str(&format!(
            "  tol {}: n={} | wealth {:.2} | social burnout {:.1} | energy burnout {:.1}\n",
            group.tolerance,
            group.wealth.count,
            group.wealth.mean,
            group.social_burnout.mean,
            group.energy_burnout.mean
        ));
    }

    summary
}
