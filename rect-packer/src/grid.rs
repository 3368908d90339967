use std::ops::Range;

use serde::{Serialize, Serializer};

/// Owner value of a cell nobody has claimed.
pub const EMPTY: u32 = 0;

/// Row-major cell ownership for a single bin.
///
/// Every cell holds either [`EMPTY`] or the id of the item covering it. The
/// grid also keeps a running count of empty cells so scoring a candidate
/// origin never needs a full rescan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<u32>,
    empty: u64,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        let area = width as u64 * height as u64;
        Self {
            width,
            height,
            cells: vec![EMPTY; area as usize],
            empty: area,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Owner of the cell at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        // chunks_exact panics on 0, and a zero-width grid has no cells anyway
        self.cells.chunks_exact(self.width.max(1) as usize)
    }

    pub fn empty_cells(&self) -> u64 {
        self.empty
    }

    /// Whether a `width`x`height` footprint with its top-left corner at
    /// `(x, y)` lies inside the grid and covers only empty cells.
    pub fn is_region_free(&self, x: u32, y: u32, width: u32, height: u32) -> bool {
        if !self.contains(x, y, width, height) {
            return false;
        }
        (y..y + height).all(|row| {
            self.cells[self.span(x, row, width)]
                .iter()
                .all(|&owner| owner == EMPTY)
        })
    }

    /// Writes `id` into every cell of the footprint.
    ///
    /// The footprint must be in bounds and free, see [`Grid::is_region_free`].
    pub fn claim(&mut self, x: u32, y: u32, width: u32, height: u32, id: u32) {
        debug_assert_ne!(id, EMPTY, "cannot claim a region for the empty id");
        debug_assert!(
            self.is_region_free(x, y, width, height),
            "claimed region {width}x{height} at ({x}, {y}) is not free"
        );
        for row in y..y + height {
            let span = self.span(x, row, width);
            for owner in &mut self.cells[span] {
                if *owner == EMPTY {
                    self.empty -= 1;
                }
                *owner = id;
            }
        }
    }

    /// Number of empty cells the whole grid would have if the footprint were
    /// claimed. The grid itself is left untouched.
    ///
    /// Parts of the footprint outside the grid are ignored.
    pub fn count_empty_if_claimed(&self, x: u32, y: u32, width: u32, height: u32) -> u64 {
        let x_end = (x as u64 + width as u64).min(self.width as u64) as u32;
        let y_end = (y as u64 + height as u64).min(self.height as u64) as u32;
        if x >= x_end || y >= y_end {
            return self.empty;
        }
        let covered = (y..y_end)
            .map(|row| {
                self.cells[self.span(x, row, x_end - x)]
                    .iter()
                    .filter(|&&owner| owner == EMPTY)
                    .count() as u64
            })
            .sum::<u64>();
        self.empty - covered
    }

    fn contains(&self, x: u32, y: u32, width: u32, height: u32) -> bool {
        x as u64 + width as u64 <= self.width as u64
            && y as u64 + height as u64 <= self.height as u64
    }

    #[inline(always)]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline(always)]
    fn span(&self, x: u32, y: u32, width: u32) -> Range<usize> {
        let start = self.index(x, y);
        start..start + width as usize
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The straightforward definition: copy the grid, claim, count.
    fn count_on_copy(grid: &Grid, x: u32, y: u32, width: u32, height: u32) -> u64 {
        let mut copy = grid.cells.clone();
        for row in y..(y + height).min(grid.height) {
            for col in x..(x + width).min(grid.width) {
                copy[(row * grid.width + col) as usize] = u32::MAX;
            }
        }
        copy.iter().filter(|&&owner| owner == EMPTY).count() as u64
    }

    #[test]
    fn new_grid_is_empty() {
        let grid = Grid::new(3, 2);
        assert_eq!(grid.empty_cells(), 6);
        assert!(grid.cells().iter().all(|&c| c == EMPTY));
        assert_eq!(grid.rows().count(), 2);
        assert!(grid.rows().all(|row| row.len() == 3));
    }

    #[test]
    fn get_outside_is_none() {
        let grid = Grid::new(3, 2);
        assert_eq!(grid.get(2, 1), Some(EMPTY));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn region_bounds() {
        let grid = Grid::new(4, 3);
        assert!(grid.is_region_free(0, 0, 4, 3));
        assert!(grid.is_region_free(2, 1, 2, 2));
        assert!(!grid.is_region_free(3, 0, 2, 1));
        assert!(!grid.is_region_free(0, 2, 1, 2));
        assert!(!grid.is_region_free(0, 0, 5, 1));
        assert!(!grid.is_region_free(u32::MAX, 0, 2, 1));
        assert!(!grid.is_region_free(0, u32::MAX, 1, u32::MAX));
    }

    #[test]
    fn claim_marks_cells() {
        let mut grid = Grid::new(4, 3);
        grid.claim(1, 1, 2, 2, 7);
        assert_eq!(grid.empty_cells(), 8);
        let rows = grid.rows().map(|r| r.to_vec()).collect::<Vec<_>>();
        assert_eq!(rows, vec![vec![0, 0, 0, 0], vec![0, 7, 7, 0], vec![0, 7, 7, 0]]);

        assert!(!grid.is_region_free(0, 0, 2, 2));
        assert!(!grid.is_region_free(2, 2, 1, 1));
        assert!(grid.is_region_free(3, 0, 1, 3));
        assert!(grid.is_region_free(0, 0, 4, 1));
    }

    #[test]
    fn scoring_leaves_grid_untouched() {
        let mut grid = Grid::new(5, 5);
        grid.claim(0, 0, 2, 3, 1);
        let before = grid.clone();

        let first = grid.count_empty_if_claimed(2, 0, 3, 3);
        for _ in 0..10 {
            assert_eq!(grid.count_empty_if_claimed(2, 0, 3, 3), first);
        }
        assert_eq!(first, 25 - 6 - 9);
        assert_eq!(grid, before);
    }

    #[test]
    fn scoring_matches_copy_semantics() {
        let mut grid = Grid::new(6, 4);
        grid.claim(1, 1, 3, 2, 1);
        grid.claim(5, 0, 1, 4, 2);

        for (x, y, w, h) in [
            (0, 0, 2, 2),
            (1, 1, 3, 2),
            (3, 0, 3, 4),
            (4, 3, 5, 5),
            (6, 0, 1, 1),
            (0, 0, 6, 4),
        ] {
            assert_eq!(
                grid.count_empty_if_claimed(x, y, w, h),
                count_on_copy(&grid, x, y, w, h),
                "footprint {w}x{h} at ({x}, {y})"
            );
        }
    }

    #[test]
    fn serializes_as_rows() {
        let mut grid = Grid::new(3, 2);
        grid.claim(1, 0, 2, 1, 4);
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, "[[0,4,4],[0,0,0]]");
    }
}
