//! Tile-world core: a bounded, gravity-oriented 3D grid of wall/top-state
//! tiles with deterministic occupancy queries and a sparse vehicle-spawn
//! registry.
//!
//! The host (engine or editor) owns one [`TileGrid`] plus one [`LevelData`],
//! mutates them through the APIs here, and consults the read-only queries
//! every frame. Persistence lives in the `level_format` crate.

use bevy::prelude::{App, Plugin};

pub mod config;
pub mod direction;
pub mod geometry;
pub mod grid;
pub mod occupancy;
pub mod spawns;
pub mod tile;

pub use direction::{CarDirection, WallDirection};
pub use geometry::{RenderSink, SurfaceDraw, SurfaceGeometry, SurfaceKind};
pub use grid::{NullTextureSource, TextureSource, TileGrid};
pub use spawns::{LevelData, VehicleSpawn};
pub use tile::{Tile, TopSurface, WallState};

/// Registers the grid and level-data resources on the host app.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileGrid>();
        app.init_resource::<LevelData>();
    }
}
