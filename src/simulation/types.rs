//! Core types for the commute simulation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an employee agent
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    /// Display name used in logs and reports (A0, A1, ...)
    pub fn name(&self) -> String {
        format!("A{}", self.0)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Simulation time unit. A day is `day_length` ticks long.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// Tick within the current day (`tick mod day_length`)
    pub fn time_of_day(&self, day_length: u32) -> u32 {
        (self.0 % day_length.max(1) as u64) as u32
    }

    pub fn day(&self, day_length: u32) -> u64 {
        self.0 / day_length.max(1) as u64
    }

    pub fn next(&self) -> SimTick {
        SimTick(self.0 + 1)
    }
}

impl fmt::Display for SimTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Where an employee currently is. The model only knows two places.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Home,
    Workplace,
}

impl Location {
    /// The other end of the commute
    pub fn toggled(&self) -> Location {
        match self {
            Location::Home => Location::Workplace,
            Location::Workplace => Location::Home,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Location::Home => "home",
            Location::Workplace => "workplace",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A coordinate on the city grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: usize,
    pub y: usize,
}

impl TileCoord {
    pub fn new(x: usize, y: usize) -> Self {
        TileCoord { x, y }
    }

    /// Manhattan distance to another coordinate
    pub fn distance_to(&self, other: &TileCoord) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(usize, usize)> for TileCoord {
    fn from((x, y): (usize, usize)) -> Self {
        TileCoord::new(x, y)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_wraps() {
        assert_eq!(SimTick(5).time_of_day(24), 5);
        assert_eq!(SimTick(29).time_of_day(24), 5);
        assert_eq!(SimTick(29).day(24), 1);
    }

    #[test]
    fn test_location_toggle() {
        assert_eq!(Location::Home.toggled(), Location::Workplace);
        assert_eq!(Location::Home.toggled().toggled(), Location::Home);
    }

    #[test]
    fn test_manhattan_distance() {
        let a = TileCoord::new(1, 4);
        let b = TileCoord::new(3, 0);
        assert_eq!(a.distance_to(&b), 6);
        assert_eq!(b.distance_to(&a), 6);
    }
}
