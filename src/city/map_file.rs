//! Text map loader for grid benchmark maps (`.map` files).
//!
//! Layout:
//! ```text
//! type octile
//! height 4
//! width 5
//! map
//! .....
//! .@@@.
//! ...
//! ```
//! `.`, `G` and `S` are walkable ground; `=`, `B` and `H` are roads, bus stops
//! and buildings; anything else is an obstacle.

use std::path::Path;

use crate::city::cells::CityGrid;
use crate::city::GridError;

/// Read and parse a map file from disk.
pub fn load_map(path: &Path) -> Result<CityGrid, GridError> {
    let contents = std::fs::read_to_string(path)?;
    parse_map(&contents)
}

/// Parse the text of a map file.
pub fn parse_map(contents: &str) -> Result<CityGrid, GridError> {
    let mut lines = contents.lines();
    let mut width: Option<usize> = None;
    let mut height: Option<usize> = None;

    // Header lines until the `map` marker
    loop {
        let line = lines
            .next()
            .ok_or_else(|| GridError::MalformedMap("missing `map` marker".to_string()))?;
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("map") => break,
            Some("type") | None => {}
            Some("width") => width = Some(parse_dimension(parts.next(), "width")?),
            Some("height") => height = Some(parse_dimension(parts.next(), "height")?),
            Some(other) => {
                return Err(GridError::MalformedMap(format!(
                    "unexpected header field `{}`",
                    other
                )))
            }
        }
    }

    let width = width.ok_or_else(|| GridError::MalformedMap("missing width".to_string()))?;
    let height = height.ok_or_else(|| GridError::MalformedMap("missing height".to_string()))?;

    let rows: Vec<&str> = lines
        .map(|l| l.trim_end())
        .filter(|l| !l.is_empty())
        .collect();
    if rows.len() != height {
        return Err(GridError::MalformedMap(format!(
            "expected {} rows, found {}",
            height,
            rows.len()
        )));
    }
    if let Some(bad) = rows.iter().position(|r| r.chars().count() != width) {
        return Err(GridError::MalformedMap(format!(
            "row {} does not have width {}",
            bad, width
        )));
    }

    CityGrid::from_rows(&rows)
}

fn parse_dimension(value: Option<&str>, field: &str) -> Result<usize, GridError> {
    value
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .ok_or_else(|| GridError::MalformedMap(format!("invalid {}", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::types::TileCoord;

    const SMALL_MAP: &str = "type octile\nheight 3\nwidth 4\nmap\n....\n.@@.\nT...\n";

    #[test]
    fn test_parse_small_map() {
        let grid = parse_map(SMALL_MAP).unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert!(grid.is_free(TileCoord::new(0, 0)));
        assert!(!grid.is_free(TileCoord::new(1, 1)));
        assert!(!grid.is_free(TileCoord::new(0, 2)));
    }

    #[test]
    fn test_row_count_mismatch() {
        let text = "type octile\nheight 4\nwidth 4\nmap\n....\n";
        assert!(matches!(parse_map(text), Err(GridError::MalformedMap(_))));
    }

    #[test]
    fn test_missing_marker() {
        assert!(parse_map("height 2\nwidth 2\n").is_err());
    }

    #[test]
    fn test_load_map_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.map");
        std::fs::write(&path, SMALL_MAP).unwrap();
        let grid = load_map(&path).unwrap();
        assert_eq!(grid.cell_counts(), (9, 3));
    }
}
