//! Occupancy and road queries over the grid.
//!
//! The movement model is discrete and per-face: an agent may cross between
//! two adjacent ground-supported cells only through a pair of mutually
//! walkable wall faces. Diagonal, vertical, and multi-cell moves are always
//! rejected in a single query.

use bevy::math::{IVec3, Vec3};

use crate::direction::{CarDirection, WallDirection};
use crate::grid::TileGrid;

impl TileGrid {
    /// A cell is supported when the tile one layer below exists and has a
    /// solid top surface. Layer 0 can never be supported, since there is no layer
    /// below it.
    pub fn has_ground_support(&self, pos: IVec3) -> bool {
        let below = IVec3::new(pos.x, pos.y, pos.z - 1);
        if below.z < 0 {
            return false;
        }
        match self.tile(below) {
            Some(tile) => tile.is_top_solid(),
            None => false,
        }
    }

    /// Whether an axis-aligned mover may travel the straight segment from
    /// `from` to `to` (world space).
    ///
    /// This evaluates a single step only. Callers resolving 2D movement must
    /// decompose the vector into separate X and Y sub-queries so that
    /// sliding along a blocking wall stays possible.
    pub fn can_occupy(&self, from: Vec3, to: Vec3) -> bool {
        let from_cell = self.world_to_grid(from);
        let to_cell = self.world_to_grid(to);

        if !self.is_valid_position(from_cell) || !self.is_valid_position(to_cell) {
            return false;
        }

        if from_cell == to_cell {
            return self.has_ground_support(to_cell);
        }

        let delta = to_cell - from_cell;
        if delta.z != 0 {
            return false;
        }
        if delta.x.abs() + delta.y.abs() > 1 {
            return false;
        }

        // Exactly one orthogonal horizontal step from here on.
        let Some(step) = WallDirection::from_step(delta) else {
            return false;
        };
        let (Some(from_tile), Some(to_tile)) = (self.tile(from_cell), self.tile(to_cell)) else {
            return false;
        };

        // Both facing walls must be open; one blocked side blocks the step.
        if !from_tile.is_wall_walkable(step) || !to_tile.is_wall_walkable(step.opposite()) {
            return false;
        }

        self.has_ground_support(to_cell)
    }

    /// True iff the tile carries traffic metadata on its top surface.
    pub fn is_road_tile(&self, pos: IVec3) -> bool {
        match self.tile(pos) {
            Some(tile) => tile.car_direction() != CarDirection::None,
            None => false,
        }
    }

    /// World-space variant of [`is_road_tile`](Self::is_road_tile).
    pub fn is_road_tile_world(&self, pos: Vec3) -> bool {
        self.is_road_tile(self.world_to_grid(pos))
    }
}
