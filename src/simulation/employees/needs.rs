//! Needs satisfaction ("water tank") model.
//!
//! Every employee carries the same fixed set of needs. Each need is a level
//! that is filled by actions, eroded every tick by a decay multiplier and kept
//! inside `[0, capacity]` by an explicit clamp. The clamp is deliberately not
//! part of `apply` or `decay`: burnout detection has to see the raw value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Number of declared needs
pub const NEED_COUNT: usize = 5;

/// A named internal need
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Need {
    Energy,
    AloneTime,
    Socialization,
    FinancialSecurity,
    SelfEsteem,
}

impl Need {
    /// All needs in declaration order
    pub const ALL: [Need; NEED_COUNT] = [
        Need::Energy,
        Need::AloneTime,
        Need::Socialization,
        Need::FinancialSecurity,
        Need::SelfEsteem,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Need::Energy => "energy",
            Need::AloneTime => "alone_time",
            Need::Socialization => "socialization",
            Need::FinancialSecurity => "financial_security",
            Need::SelfEsteem => "self_esteem",
        }
    }
}

impl fmt::Display for Need {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Broad grouping used to weight needs against each other
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedCategory {
    Physical,
    Psychological,
    Economic,
}

/// Static description of one need
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeedSpec {
    pub category: NeedCategory,
    /// Upper bound of the level; `None` means unbounded
    pub max_capacity: Option<f32>,
    /// Multiplier applied to the level every tick
    pub decay_multiplier: f32,
}

impl NeedSpec {
    pub fn bounded(category: NeedCategory, max_capacity: f32, decay_multiplier: f32) -> Self {
        NeedSpec {
            category,
            max_capacity: Some(max_capacity),
            decay_multiplier,
        }
    }

    pub fn unbounded(category: NeedCategory, decay_multiplier: f32) -> Self {
        NeedSpec {
            category,
            max_capacity: None,
            decay_multiplier,
        }
    }

    /// Level representing "fully satisfied" at time zero
    pub fn initial_level(&self) -> f32 {
        self.max_capacity.unwrap_or(0.0)
    }
}

/// The category/capacity/decay table for every need. A config may override
/// single needs; the rest keep their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedTable {
    pub energy: NeedSpec,
    pub alone_time: NeedSpec,
    pub socialization: NeedSpec,
    pub financial_security: NeedSpec,
    pub self_esteem: NeedSpec,
}

impl NeedTable {
    pub fn spec(&self, need: Need) -> &NeedSpec {
        match need {
            Need::Energy => &self.energy,
            Need::AloneTime => &self.alone_time,
            Need::Socialization => &self.socialization,
            Need::FinancialSecurity => &self.financial_security,
            Need::SelfEsteem => &self.self_esteem,
        }
    }
}

impl Default for NeedTable {
    fn default() -> Self {
        NeedTable {
            energy: NeedSpec::bounded(NeedCategory::Physical, 100.0, 0.98),
            alone_time: NeedSpec::bounded(NeedCategory::Psychological, 10.0, 0.99),
            socialization: NeedSpec::bounded(NeedCategory::Psychological, 10.0, 0.97),
            financial_security: NeedSpec::bounded(NeedCategory::Economic, 10.0, 0.95),
            self_esteem: NeedSpec::bounded(NeedCategory::Psychological, 10.0, 0.99),
        }
    }
}

/// One value per declared need, indexed by `Need`.
///
/// Used both for current levels and for action deltas. Because it is a fixed
/// array, a delta can never cover a different set of needs than the agent has.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NeedVector([f32; NEED_COUNT]);

impl NeedVector {
    pub fn zero() -> Self {
        NeedVector([0.0; NEED_COUNT])
    }

    /// Builder-style setter used by the effect tables
    pub fn with(mut self, need: Need, value: f32) -> Self {
        self[need] = value;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Need, f32)> + '_ {
        Need::ALL.iter().map(move |&n| (n, self[n]))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }

    pub fn add_assign(&mut self, delta: &NeedVector) {
        for (level, d) in self.0.iter_mut().zip(delta.0.iter()) {
            *level += d;
        }
    }
}

impl Index<Need> for NeedVector {
    type Output = f32;

    fn index(&self, need: Need) -> &f32 {
        &self.0[need.index()]
    }
}

impl IndexMut<Need> for NeedVector {
    fn index_mut(&mut self, need: Need) -> &mut f32 {
        &mut self.0[need.index()]
    }
}

/// An agent's current need levels
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeedsState {
    levels: NeedVector,
}

impl NeedsState {
    /// Bounded needs start full, unbounded needs start at zero.
    pub fn initialize(table: &NeedTable) -> Self {
        let mut levels = NeedVector::zero();
        for need in Need::ALL {
            levels[need] = table.spec(need).initial_level();
        }
        NeedsState { levels }
    }

    pub fn level(&self, need: Need) -> f32 {
        self.levels[need]
    }

    pub fn set_level(&mut self, need: Need, value: f32) {
        self.levels[need] = value;
    }

    pub fn levels(&self) -> &NeedVector {
        &self.levels
    }

    /// Add an effect delta. No clamping.
    pub fn apply(&mut self, delta: &NeedVector) {
        self.levels.add_assign(delta);
    }

    /// Multiply every level by its decay multiplier. No clamping.
    pub fn decay(&mut self, table: &NeedTable) {
        for need in Need::ALL {
            self.levels[need] *= table.spec(need).decay_multiplier;
        }
    }

    /// Restrict bounded needs to `[0, capacity]`. Unbounded needs are untouched.
    pub fn clamp(&mut self, table: &NeedTable) {
        for need in Need::ALL {
            if let Some(cap) = table.spec(need).max_capacity {
                self.levels[need] = self.levels[need].clamp(0.0, cap);
            }
        }
    }

    /// Normalized scarcity of a need: `1 - level/capacity` for bounded needs
    /// (1 when empty, 0 when full, negative when over capacity) and the fixed
    /// `unbounded_urgency` for unbounded ones.
    pub fn urgency(&self, need: Need, table: &NeedTable, unbounded_urgency: f32) -> f32 {
        match table.spec(need).max_capacity {
            Some(cap) => 1.0 - self.levels[need] / cap,
            None => unbounded_urgency,
        }
    }
}
