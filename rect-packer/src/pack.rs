use std::{
    cmp::Reverse,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use glam::UVec2;
use serde::{Deserialize, Serialize};

use crate::{
    grid::{Grid, EMPTY},
    Error, Result,
};

#[derive(Deserialize)]
struct Dimensions {
    width: u32,
    height: u32,
}

/// The fixed rectangle items are packed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Dimensions")]
pub struct Bin {
    width: u32,
    height: u32,
}

impl Bin {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidBin { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl TryFrom<Dimensions> for Bin {
    type Error = Error;

    fn try_from(d: Dimensions) -> Result<Self> {
        Self::new(d.width, d.height)
    }
}

/// A rectangle to place. Items are never rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Dimensions")]
pub struct Item {
    width: u32,
    height: u32,
}

impl Item {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidItem { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl TryFrom<Dimensions> for Item {
    type Error = Error;

    fn try_from(d: Dimensions) -> Result<Self> {
        Self::new(d.width, d.height)
    }
}

/// An item committed to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    /// 1-based rank of the item in packing order, also its grid owner value.
    pub id: u32,
    /// Position of the item in the caller's input.
    pub index: usize,
    pub item: Item,
    /// Top-left corner.
    pub origin: UVec2,
}

/// An item no free region could hold at the time it was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Unplaced {
    pub id: u32,
    pub index: usize,
    pub item: Item,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackResult {
    pub bin: Bin,
    pub grid: Grid,
    /// In the order the items were placed.
    pub placements: Vec<Placement>,
    pub unplaced: Vec<Unplaced>,
    /// Empty cells left in the finished grid.
    pub waste: u64,
    /// Set when packing stopped early, in which case the items that were not
    /// attempted appear in neither `placements` nor `unplaced`.
    pub cancelled: bool,
}

impl PackResult {
    fn new(bin: Bin) -> Self {
        Self {
            bin,
            grid: Grid::new(bin.width, bin.height),
            placements: Vec::new(),
            unplaced: Vec::new(),
            waste: bin.area(),
            cancelled: false,
        }
    }

    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    pub fn all_placed(&self) -> bool {
        self.unplaced.is_empty() && !self.cancelled
    }

    /// Fraction of the bin covered by placed items.
    pub fn utilization(&self) -> f64 {
        let covered = self.bin.area() - self.grid.empty_cells();
        covered as f64 / self.bin.area() as f64
    }

    /// Counts the empty cells of the final grid cell by cell.
    pub fn empty_cells(&self) -> u64 {
        self.grid
            .cells()
            .iter()
            .filter(|&&owner| owner == EMPTY)
            .count() as u64
    }
}

/// Greedy best-fit packer for a single bin.
///
/// Items are attempted once each in descending area order. Every origin in
/// the bin is tried, rows first, and the feasible one leaving the fewest
/// empty cells wins; the first one scanned wins ties. Items that fit nowhere
/// are reported in [`PackResult::unplaced`] and the run goes on.
pub struct Packer {
    bin: Bin,
    cancelled: Arc<AtomicBool>,
}

impl Packer {
    pub fn new(bin: Bin) -> Self {
        Self {
            bin,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked before each item. Once set, packing stops at the next
    /// item and every later call returns immediately.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn pack(&self, items: &[Item]) -> PackResult {
        self.pack_with_progress(items, |_, _| {})
    }

    /// Like [`Packer::pack`], calling `progress(attempted, total)` after
    /// each item, placed or dropped.
    pub fn pack_with_progress(
        &self,
        items: &[Item],
        mut progress: impl FnMut(usize, usize),
    ) -> PackResult {
        let mut result = PackResult::new(self.bin);

        // sort_by_key is stable, equal areas keep their input order
        let mut order = (0..items.len()).collect::<Vec<_>>();
        order.sort_by_key(|&i| Reverse(items[i].area()));

        for (rank, index) in order.into_iter().enumerate() {
            if self.cancelled.load(Ordering::Relaxed) {
                log::debug!("packing cancelled after {} items", rank);
                result.cancelled = true;
                break;
            }

            let id = rank as u32 + 1;
            let item = items[index];
            match best_origin(&result.grid, item) {
                Some((origin, waste)) => {
                    result
                        .grid
                        .claim(origin.x, origin.y, item.width, item.height, id);
                    log::debug!(
                        "placed {}x{} (id {}) at ({}, {}), {} cells left",
                        item.width,
                        item.height,
                        id,
                        origin.x,
                        origin.y,
                        waste
                    );
                    result.placements.push(Placement {
                        id,
                        index,
                        item,
                        origin,
                    });
                    result.waste = waste;
                }
                None => {
                    log::warn!(
                        "could not place rectangle {}x{} (id {})",
                        item.width,
                        item.height,
                        id
                    );
                    result.unplaced.push(Unplaced { id, index, item });
                }
            }
            progress(rank + 1, items.len());
        }

        debug_assert_eq!(result.waste, result.grid.empty_cells());
        result
    }
}

/// Packs `items` into `bin`, see [`Packer`].
pub fn pack(bin: Bin, items: &[Item]) -> PackResult {
    Packer::new(bin).pack(items)
}

/// Feasible origin with the lowest resulting empty-cell count, along with
/// that count.
fn best_origin(grid: &Grid, item: Item) -> Option<(UVec2, u64)> {
    let max_x = grid.width().checked_sub(item.width)?;
    let max_y = grid.height().checked_sub(item.height)?;

    let mut best: Option<(UVec2, u64)> = None;
    for y in 0..=max_y {
        for x in 0..=max_x {
            if !grid.is_region_free(x, y, item.width, item.height) {
                continue;
            }
            let waste = grid.count_empty_if_claimed(x, y, item.width, item.height);
            // strict, so the earliest origin in scan order keeps a tie
            if best.map_or(true, |(_, min)| waste < min) {
                best = Some((UVec2::new(x, y), waste));
            }
        }
    }
    best
}
