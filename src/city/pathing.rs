//! Walking cost between two cells: an O(1) admissible estimate and an exact
//! shortest-path length found with A*.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::city::cells::CityGrid;
use crate::city::GridError;
use crate::simulation::types::TileCoord;

/// Anything that can price a walk between two cells. The deliberation engine
/// only depends on this seam, so a run can go without a map at all.
pub trait PathCostSource {
    /// Cheap admissible estimate used while weighing options
    fn estimated_path_cost(&self, from: TileCoord, to: TileCoord) -> u32;

    /// Exact hop count, `Ok(None)` when the target cannot be reached
    fn shortest_path_length(&self, from: TileCoord, to: TileCoord)
        -> Result<Option<u32>, GridError>;
}

impl PathCostSource for CityGrid {
    fn estimated_path_cost(&self, from: TileCoord, to: TileCoord) -> u32 {
        estimated_cost(from, to)
    }

    fn shortest_path_length(
        &self,
        from: TileCoord,
        to: TileCoord,
    ) -> Result<Option<u32>, GridError> {
        shortest_path_length(self, from, to)
    }
}

/// Manhattan distance. Never overestimates on a 4-connected unit-cost grid.
pub fn estimated_cost(from: TileCoord, to: TileCoord) -> u32 {
    from.distance_to(&to) as u32
}

/// Node for A* search
#[derive(Clone, Copy, Eq, PartialEq)]
struct PathNode {
    coord: TileCoord,
    cost: u32,
    estimated_total: u32,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; prefer deeper nodes on ties
        other
            .estimated_total
            .cmp(&self.estimated_total)
            .then_with(|| self.cost.cmp(&other.cost))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Length of the cheapest 4-connected path between two free cells.
///
/// Both endpoints must be in bounds and passable. Returns `Ok(None)` when the
/// target is walled off from the start.
pub fn shortest_path_length(
    grid: &CityGrid,
    from: TileCoord,
    to: TileCoord,
) -> Result<Option<u32>, GridError> {
    grid.check_endpoint(from)?;
    grid.check_endpoint(to)?;

    if from == to {
        return Ok(Some(0));
    }

    let mut open_set = BinaryHeap::new();
    let mut g_score: HashMap<TileCoord, u32> = HashMap::new();

    g_score.insert(from, 0);
    open_set.push(PathNode {
        coord: from,
        cost: 0,
        estimated_total: estimated_cost(from, to),
    });

    while let Some(current) = open_set.pop() {
        if current.coord == to {
            return Ok(Some(current.cost));
        }

        // Stale heap entry
        if current.cost > *g_score.get(&current.coord).unwrap_or(&u32::MAX) {
            continue;
        }

        for neighbor in grid.passable_neighbors(current.coord) {
            let tentative_g = current.cost + 1;
            if tentative_g < *g_score.get(&neighbor).unwrap_or(&u32::MAX) {
                g_score.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    coord: neighbor,
                    cost: tentative_g,
                    estimated_total: tentative_g + estimated_cost(neighbor, to),
                });
            }
        }
    }

    Ok(None)
}
