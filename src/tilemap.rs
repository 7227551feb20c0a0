/// A bounded 2D tilemap grid. Unlike a planetary map, city maps do not wrap.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Check whether a coordinate lies inside the map.
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Get a cell. Panics when out of bounds; use `try_get` for unchecked input.
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn try_get(&self, x: usize, y: usize) -> Option<&T> {
        if self.in_bounds(x, y) {
            Some(self.get(x, y))
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Get in-bounds neighbors (4-connectivity): up, down, left, right.
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(4);

        if y > 0 {
            result.push((x, y - 1));
        }
        if y + 1 < self.height {
            result.push((x, y + 1));
        }
        if x > 0 {
            result.push((x - 1, y));
        }
        if x + 1 < self.width {
            result.push((x + 1, y));
        }

        result
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_do_not_wrap() {
        let map: Tilemap<u8> = Tilemap::new(3, 3);
        assert_eq!(map.neighbors(0, 0).len(), 2);
        assert_eq!(map.neighbors(1, 1).len(), 4);
        assert_eq!(map.neighbors(2, 1).len(), 3);
        assert!(!map.neighbors(0, 0).contains(&(2, 0)));
    }

    #[test]
    fn test_try_get_bounds() {
        let mut map = Tilemap::new_with(4, 2, 0u8);
        map.set(3, 1, 7);
        assert_eq!(map.try_get(3, 1), Some(&7));
        assert_eq!(map.try_get(4, 1), None);
        assert_eq!(map.try_get(0, 2), None);
    }
}
