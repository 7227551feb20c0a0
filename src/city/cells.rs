//! Cell contents and the immutable city grid.

use serde::{Deserialize, Serialize};

use crate::city::GridError;
use crate::simulation::types::TileCoord;
use crate::tilemap::Tilemap;

/// What occupies a grid cell. Entities are tagged values, not objects; an
/// owner id links a building to the house or workplace it represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellContent {
    #[default]
    Empty,
    Road,
    BusStop,
    Building { owner: Option<u32> },
    /// Impassable terrain or walls
    Obstacle,
}

impl CellContent {
    /// Only obstacles block walking.
    pub fn is_passable(&self) -> bool {
        !matches!(self, CellContent::Obstacle)
    }

    /// Map character used by the text map format
    pub fn map_char(&self) -> char {
        match self {
            CellContent::Empty => '.',
            CellContent::Road => '=',
            CellContent::BusStop => 'B',
            CellContent::Building { .. } => 'H',
            CellContent::Obstacle => '@',
        }
    }
}

/// Static 2D city map.
#[derive(Clone, Debug, PartialEq)]
pub struct CityGrid {
    cells: Tilemap<CellContent>,
}

impl CityGrid {
    /// An empty (fully walkable) grid.
    pub fn new(width: usize, height: usize) -> Self {
        CityGrid {
            cells: Tilemap::new(width, height),
        }
    }

    /// Build a grid from rows of map characters (see `CellContent::map_char`).
    /// Unknown characters are treated as obstacles.
    pub fn from_rows(rows: &[&str]) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(GridError::MalformedMap("grid has no cells".to_string()));
        }

        let mut grid = CityGrid::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            let row_width = row.chars().count();
            if row_width != width {
                return Err(GridError::MalformedMap(format!(
                    "row {} has width {}, expected {}",
                    y, row_width, width
                )));
            }
            for (x, ch) in row.chars().enumerate() {
                grid.cells.set(x, y, content_from_char(ch));
            }
        }
        Ok(grid)
    }

    /// Render the grid back into map rows.
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height())
            .map(|y| {
                (0..self.width())
                    .map(|x| self.cells.get(x, y).map_char())
                    .collect()
            })
            .collect()
    }

    pub fn width(&self) -> usize {
        self.cells.width
    }

    pub fn height(&self) -> usize {
        self.cells.height
    }

    /// Place an entity on a cell, replacing what was there.
    pub fn place(&mut self, coord: TileCoord, content: CellContent) -> Result<(), GridError> {
        self.check_bounds(coord)?;
        self.cells.set(coord.x, coord.y, content);
        Ok(())
    }

    pub fn content(&self, coord: TileCoord) -> Option<CellContent> {
        self.cells.try_get(coord.x, coord.y).copied()
    }

    pub fn in_bounds(&self, coord: TileCoord) -> bool {
        self.cells.in_bounds(coord.x, coord.y)
    }

    /// In bounds and not blocked
    pub fn is_free(&self, coord: TileCoord) -> bool {
        self.content(coord).map_or(false, |c| c.is_passable())
    }

    /// Validate that a coordinate can be used as a path endpoint.
    pub fn check_endpoint(&self, coord: TileCoord) -> Result<(), GridError> {
        self.check_bounds(coord)?;
        if !self.is_free(coord) {
            return Err(GridError::Blocked(coord));
        }
        Ok(())
    }

    fn check_bounds(&self, coord: TileCoord) -> Result<(), GridError> {
        if self.in_bounds(coord) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                coord,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    /// Passable 4-connected neighbors of a cell
    pub fn passable_neighbors(&self, coord: TileCoord) -> Vec<TileCoord> {
        self.cells
            .neighbors(coord.x, coord.y)
            .into_iter()
            .filter(|&(x, y)| self.cells.get(x, y).is_passable())
            .map(|(x, y)| TileCoord::new(x, y))
            .collect()
    }

    /// Count cells by passability: (free, blocked)
    pub fn cell_counts(&self) -> (usize, usize) {
        let free = self.cells.iter().filter(|(_, _, c)| c.is_passable()).count();
        (free, self.width() * self.height() - free)
    }
}

/// Character mapping shared by `from_rows` and the text map loader.
pub(crate) fn content_from_char(ch: char) -> CellContent {
    match ch {
        '.' | 'G' | 'S' => CellContent::Empty,
        '=' => CellContent::Road,
        'B' => CellContent::BusStop,
        'H' => CellContent::Building { owner: None },
        _ => CellContent::Obstacle,
    }
}
