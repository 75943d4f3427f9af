//! # Container Packing
//!
//! Placement of reward groups into the circle's grid.
//!
//! Real grid geometry (item footprints, rotation) belongs to the caller and
//! is plugged in through [`ContainerPacker`]. The engine only ever trial-packs a
//! clone of the caller's grid, so a failed trial leaves it untouched.
//!
//! [`SlotGridPacker`] is a reference packer where every group occupies a
//! single cell, filled row by row.

use crate::item::{ItemLocation, RewardGroup};

/// Grid placement collaborator.
pub trait ContainerPacker {
    /// Container geometry and occupancy.
    type Grid: Clone;

    /// Places every group into `grid`, returning false if any does not fit.
    ///
    /// Callers pass a scratch copy; its contents are unspecified on failure.
    fn can_place_all(&self, grid: &mut Self::Grid, groups: &[RewardGroup]) -> bool;

    /// Places one group's root, returning its location.
    fn place(&self, grid: &mut Self::Grid, group: &RewardGroup) -> Option<ItemLocation>;
}

/// Fixed-size grid of single-cell slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotGrid {
    width: u32,
    height: u32,
    occupied: Vec<bool>,
}

impl SlotGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let cells = width as usize * height as usize;
        Self {
            width,
            height,
            occupied: vec![false; cells],
        }
    }

    /// Grid width in cells.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn used_cells(&self) -> usize {
        self.occupied.iter().filter(|cell| **cell).count()
    }

    /// Number of free cells.
    #[must_use]
    pub fn free_cells(&self) -> usize {
        self.occupied.len() - self.used_cells()
    }

    /// Marks a cell as occupied. Out-of-range cells are ignored.
    pub fn occupy(&mut self, x: u32, y: u32) {
        if x < self.width && y < self.height {
            let index = y as usize * self.width as usize + x as usize;
            self.occupied[index] = true;
        }
    }

    /// Claims the first free cell in row-major order.
    #[allow(clippy::cast_possible_truncation)]
    fn claim_free_cell(&mut self) -> Option<ItemLocation> {
        let index = self.occupied.iter().position(|cell| !*cell)?;
        self.occupied[index] = true;

        let width = self.width as usize;
        Some(ItemLocation {
            x: (index % width) as u32,
            y: (index / width) as u32,
            rotated: false,
        })
    }
}

/// Packer for [`SlotGrid`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SlotGridPacker;

impl ContainerPacker for SlotGridPacker {
    type Grid = SlotGrid;

    fn can_place_all(&self, grid: &mut SlotGrid, groups: &[RewardGroup]) -> bool {
        groups.iter().all(|group| self.place(grid, group).is_some())
    }

    fn place(&self, grid: &mut SlotGrid, _group: &RewardGroup) -> Option<ItemLocation> {
        grid.claim_free_cell()
    }
}
