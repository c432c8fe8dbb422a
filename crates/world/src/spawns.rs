//! Vehicle spawn registry.
//!
//! Spawns live in [`LevelData`], a host-owned resource separate from the
//! grid, so they survive grid rebuilds; only a full level reload clears and
//! repopulates them. The registry is expected to stay small relative to the
//! grid volume, so lookups are linear scans.

use bevy::math::{IVec3, Vec2};
use bevy::prelude::Resource;

use crate::config::DEFAULT_VEHICLE_SIZE;
use crate::grid::TileGrid;

/// Where and how a vehicle appears when the level starts.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSpawn {
    pub grid_position: IVec3,
    /// Heading in degrees, kept in `[0, 360)`.
    pub rotation_degrees: f32,
    /// Footprint in world units (width x length), both components > 0.
    pub size: Vec2,
    /// Resolved texture path; empty means "not set yet".
    pub texture: String,
}

impl Default for VehicleSpawn {
    fn default() -> Self {
        Self {
            grid_position: IVec3::ZERO,
            rotation_degrees: 0.0,
            size: DEFAULT_VEHICLE_SIZE,
            texture: String::new(),
        }
    }
}

/// World metadata that outlives the grid: currently the vehicle spawn list.
#[derive(Resource, Debug, Clone, Default)]
pub struct LevelData {
    pub vehicle_spawns: Vec<VehicleSpawn>,
}

impl LevelData {
    pub fn find_spawn(&self, pos: IVec3) -> Option<&VehicleSpawn> {
        self.vehicle_spawns.iter().find(|s| s.grid_position == pos)
    }

    pub fn find_spawn_mut(&mut self, pos: IVec3) -> Option<&mut VehicleSpawn> {
        self.vehicle_spawns
            .iter_mut()
            .find(|s| s.grid_position == pos)
    }

    /// Upserts a spawn keyed by grid position (at most one per cell,
    /// last-write-wins). Rotation is normalized into `[0, 360)`, non-positive
    /// size components fall back to the defaults, and an empty texture is
    /// resolved through the grid's `car` alias. Returns false (no-op) when
    /// the position is outside the grid.
    pub fn add_or_update_spawn(&mut self, spawn: VehicleSpawn, grid: &TileGrid) -> bool {
        if !grid.is_valid_position(spawn.grid_position) {
            return false;
        }

        let mut spawn = spawn;
        spawn.rotation_degrees = spawn.rotation_degrees.rem_euclid(360.0);
        if spawn.size.x <= 0.0 {
            spawn.size.x = DEFAULT_VEHICLE_SIZE.x;
        }
        if spawn.size.y <= 0.0 {
            spawn.size.y = DEFAULT_VEHICLE_SIZE.y;
        }
        if spawn.texture.is_empty() {
            spawn.texture = grid.resolve_texture_path("car");
        }

        if let Some(existing) = self.find_spawn_mut(spawn.grid_position) {
            *existing = spawn;
        } else {
            self.vehicle_spawns.push(spawn);
        }
        true
    }

    /// Removes the spawn at `pos`, reporting whether one existed.
    pub fn remove_spawn_at(&mut self, pos: IVec3) -> bool {
        let before = self.vehicle_spawns.len();
        self.vehicle_spawns.retain(|s| s.grid_position != pos);
        self.vehicle_spawns.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TileGrid {
        TileGrid::new(IVec3::new(4, 4, 2), 3.0)
    }

    #[test]
    fn test_upsert_is_idempotent_per_position() {
        let grid = grid();
        let mut data = LevelData::default();
        let pos = IVec3::new(1, 2, 0);

        assert!(data.add_or_update_spawn(
            VehicleSpawn {
                grid_position: pos,
                rotation_degrees: 90.0,
                ..Default::default()
            },
            &grid,
        ));
        assert!(data.add_or_update_spawn(
            VehicleSpawn {
                grid_position: pos,
                rotation_degrees: 180.0,
                ..Default::default()
            },
            &grid,
        ));

        assert_eq!(data.vehicle_spawns.len(), 1);
        assert_eq!(data.find_spawn(pos).unwrap().rotation_degrees, 180.0);
    }

    #[test]
    fn test_rotation_normalized_into_half_open_range() {
        let grid = grid();
        let mut data = LevelData::default();
        for (input, expected) in [(-90.0, 270.0), (360.0, 0.0), (725.0, 5.0), (0.0, 0.0)] {
            data.add_or_update_spawn(
                VehicleSpawn {
                    grid_position: IVec3::ZERO,
                    rotation_degrees: input,
                    ..Default::default()
                },
                &grid,
            );
            let got = data.find_spawn(IVec3::ZERO).unwrap().rotation_degrees;
            assert!((got - expected).abs() < 1e-4, "{input} -> {got}");
        }
    }

    #[test]
    fn test_degenerate_size_and_texture_are_defaulted() {
        let grid = grid();
        let mut data = LevelData::default();
        data.add_or_update_spawn(
            VehicleSpawn {
                grid_position: IVec3::ZERO,
                size: Vec2::new(-1.0, 0.0),
                texture: String::new(),
                ..Default::default()
            },
            &grid,
        );
        let spawn = data.find_spawn(IVec3::ZERO).unwrap();
        assert_eq!(spawn.size, DEFAULT_VEHICLE_SIZE);
        // Empty texture resolves through the seeded `car` alias.
        assert_eq!(spawn.texture, "assets/textures/car.png");
    }

    #[test]
    fn test_out_of_bounds_spawn_is_rejected() {
        let grid = grid();
        let mut data = LevelData::default();
        assert!(!data.add_or_update_spawn(
            VehicleSpawn {
                grid_position: IVec3::new(4, 0, 0),
                ..Default::default()
            },
            &grid,
        ));
        assert!(data.vehicle_spawns.is_empty());
    }

    #[test]
    fn test_remove_spawn_at() {
        let grid = grid();
        let mut data = LevelData::default();
        let pos = IVec3::new(2, 2, 1);
        data.add_or_update_spawn(
            VehicleSpawn {
                grid_position: pos,
                ..Default::default()
            },
            &grid,
        );
        assert!(data.remove_spawn_at(pos));
        assert!(!data.remove_spawn_at(pos));
        assert!(data.find_spawn(pos).is_none());
    }
}
