//! Activity Log System
//!
//! Keeps the notable things that happened during a run (fallback values,
//! burnouts, recoveries, configuration warnings) so they can be inspected and
//! counted after the fact. Regular per-tick actions go to `tracing` only.

use std::collections::VecDeque;
use serde::{Deserialize, Serialize};

use crate::simulation::employees::actions::Fallback;
use crate::simulation::employees::types::BurnoutKind;
use crate::simulation::types::{AgentId, SimTick};

/// Maximum number of entries to keep in the activity log
const MAX_ACTIVITY_ENTRIES: usize = 500;

/// Category of activity event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityCategory {
    /// A random value stood in for a missing observation
    Fallback,
    /// Agent entered forced recovery
    Burnout,
    /// Synthesized meltdown on social burnout
    Meltdown,
    /// Agent left recovery
    Recovery,
    /// Configuration problem degraded to a warning
    Config,
}

impl ActivityCategory {
    /// Get short label for display
    pub fn label(&self) -> &'static str {
        match self {
            ActivityCategory::Fallback => "RND",
            ActivityCategory::Burnout => "!!",
            ActivityCategory::Meltdown => "MLT",
            ActivityCategory::Recovery => "REC",
            ActivityCategory::Config => "CFG",
        }
    }
}

/// An activity log entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub tick: SimTick,
    pub agent: AgentId,
    pub category: ActivityCategory,
    pub message: String,
    /// Importance (higher = more important, shown first)
    pub importance: u8,
}

/// Counters per category. Not bounded by the entry cap.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityStats {
    pub total_events: u64,
    pub fallbacks: u64,
    pub social_burnouts: u64,
    pub energy_burnouts: u64,
    pub meltdowns: u64,
    pub recoveries: u64,
    pub config_warnings: u64,
}

/// The activity log store
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    pub stats: ActivityStats,
}

impl ActivityLog {
    pub fn new() -> Self {
        ActivityLog {
            entries: VecDeque::with_capacity(MAX_ACTIVITY_ENTRIES),
            stats: ActivityStats::default(),
        }
    }

    /// Add a new activity entry
    pub fn log(&mut self, entry: ActivityEntry) {
        self.stats.total_events += 1;
        match entry.category {
            ActivityCategory::Fallback => self.stats.fallbacks += 1,
            ActivityCategory::Meltdown => self.stats.meltdowns += 1,
            ActivityCategory::Recovery => self.stats.recoveries += 1,
            ActivityCategory::Config => self.stats.config_warnings += 1,
            ActivityCategory::Burnout => {}
        }

        self.entries.push_back(entry);
        while self.entries.len() > MAX_ACTIVITY_ENTRIES {
            self.entries.pop_front();
        }
    }

    pub fn log_fallback(&mut self, tick: SimTick, agent: AgentId, fallback: Fallback) {
        self.log(ActivityEntry {
            tick,
            agent,
            category: ActivityCategory::Fallback,
            message: format!("used {}", fallback),
            importance: 2,
        });
    }

    pub fn log_burnout(&mut self, tick: SimTick, agent: AgentId, kind: BurnoutKind) {
        match kind {
            BurnoutKind::Social => self.stats.social_burnouts += 1,
            BurnoutKind::Energy => self.stats.energy_burnouts += 1,
        }
        self.log(ActivityEntry {
            tick,
            agent,
            category: ActivityCategory::Burnout,
            message: format!("{} burnout", kind),
            importance: 10,
        });
    }

    pub fn log_meltdown(&mut self, tick: SimTick, agent: AgentId) {
        self.log(ActivityEntry {
            tick,
            agent,
            category: ActivityCategory::Meltdown,
            message: "meltdown".to_string(),
            importance: 8,
        });
    }

    pub fn log_recovered(&mut self, tick: SimTick, agent: AgentId, kind: BurnoutKind) {
        self.log(ActivityEntry {
            tick,
            agent,
            category: ActivityCategory::Recovery,
            message: format!("recovered from {} burnout", kind),
            importance: 4,
        });
    }

    pub fn log_config_warning(&mut self, tick: SimTick, agent: AgentId, message: String) {
        self.log(ActivityEntry {
            tick,
            agent,
            category: ActivityCategory::Config,
            message,
            importance: 6,
        });
    }

    /// Get recent entries (newest first)
    pub fn recent_entries(&self, count: usize) -> Vec<&ActivityEntry> {
        self.entries.iter().rev().take(count).collect()
    }

    /// Entries for one agent (newest first)
    pub fn entries_for(&self, agent: AgentId) -> Vec<&ActivityEntry> {
        self.entries.iter().rev().filter(|e| e.agent == agent).collect()
    }

    /// Get high-importance entries (burnouts first)
    pub fn important_entries(&self, count: usize) -> Vec<&ActivityEntry> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| b.importance.cmp(&a.importance));
        entries.into_iter().take(count).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
