use bevy::math::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::direction::{CarDirection, WallDirection};
use crate::geometry::{build_surfaces, SurfaceDraw};

/// State of one vertical tile face. A non-walkable wall blocks movement
/// across that face and is rendered as a solid quad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallState {
    pub walkable: bool,
    /// Resolved texture path, if any. Walkable walls may carry a texture for
    /// round-tripping even though they produce no geometry.
    pub texture: Option<String>,
}

impl Default for WallState {
    fn default() -> Self {
        Self {
            walkable: true,
            texture: None,
        }
    }
}

/// State of a tile's upward face. A solid top provides ground support to the
/// layer above and may carry traffic metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TopSurface {
    pub solid: bool,
    pub texture: Option<String>,
    pub car_direction: CarDirection,
}

/// One cell of the grid.
///
/// Grid layer `z` occupies the world-space vertical span
/// `[(z-1)*tile_size, z*tile_size]`, so a tile's top face sits at world-Z
/// `z*tile_size`. The offset is a deliberate convention other subsystems
/// depend on.
#[derive(Debug, Clone)]
pub struct Tile {
    grid_position: IVec3,
    world_position: Vec3,
    tile_size: f32,
    walls: [WallState; 4],
    top: TopSurface,
    // None marks the cached geometry stale; rebuilt lazily on the render walk.
    surfaces: Option<Vec<SurfaceDraw>>,
}

impl Tile {
    pub fn new(grid_position: IVec3, tile_size: f32) -> Self {
        let world_position = Vec3::new(
            grid_position.x as f32 * tile_size,
            grid_position.y as f32 * tile_size,
            (grid_position.z - 1) as f32 * tile_size,
        );
        Self {
            grid_position,
            world_position,
            tile_size,
            walls: Default::default(),
            top: TopSurface::default(),
            surfaces: None,
        }
    }

    #[inline]
    pub fn grid_position(&self) -> IVec3 {
        self.grid_position
    }

    #[inline]
    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    // -----------------------------------------------------------------
    // Walls
    // -----------------------------------------------------------------

    #[inline]
    pub fn wall(&self, dir: WallDirection) -> &WallState {
        &self.walls[dir.index()]
    }

    #[inline]
    pub fn is_wall_walkable(&self, dir: WallDirection) -> bool {
        self.walls[dir.index()].walkable
    }

    pub fn set_wall(&mut self, dir: WallDirection, walkable: bool, texture: Option<String>) {
        self.walls[dir.index()] = WallState { walkable, texture };
        self.mark_dirty();
    }

    pub fn set_wall_walkable(&mut self, dir: WallDirection, walkable: bool) {
        self.walls[dir.index()].walkable = walkable;
        self.mark_dirty();
    }

    pub fn set_wall_texture(&mut self, dir: WallDirection, texture: Option<String>) {
        self.walls[dir.index()].texture = texture;
        self.mark_dirty();
    }

    // -----------------------------------------------------------------
    // Top surface
    // -----------------------------------------------------------------

    #[inline]
    pub fn top_surface(&self) -> &TopSurface {
        &self.top
    }

    #[inline]
    pub fn is_top_solid(&self) -> bool {
        self.top.solid
    }

    #[inline]
    pub fn car_direction(&self) -> CarDirection {
        self.top.car_direction
    }

    pub fn set_top_surface(
        &mut self,
        solid: bool,
        texture: Option<String>,
        car_direction: CarDirection,
    ) {
        self.top = TopSurface {
            solid,
            texture,
            car_direction,
        };
        self.mark_dirty();
    }

    pub fn set_top_solid(&mut self, solid: bool) {
        self.top.solid = solid;
        self.mark_dirty();
    }

    pub fn set_top_texture(&mut self, texture: Option<String>) {
        self.top.texture = texture;
        self.mark_dirty();
    }

    pub fn set_car_direction(&mut self, dir: CarDirection) {
        self.top.car_direction = dir;
        self.mark_dirty();
    }

    /// Copies wall and top-surface content from another tile, keeping this
    /// tile's grid identity. Used by grid resizes and editor hosts.
    pub fn copy_content_from(&mut self, other: &Tile) {
        self.walls = other.walls.clone();
        self.top = other.top.clone();
        self.mark_dirty();
    }

    /// True when any wall or the top surface differs from a freshly built
    /// tile. The level writer skips default tiles entirely.
    pub fn is_default_state(&self) -> bool {
        self.top == TopSurface::default() && self.walls.iter().all(|w| *w == WallState::default())
    }

    // -----------------------------------------------------------------
    // Geometry cache
    // -----------------------------------------------------------------

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.surfaces = None;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.surfaces.is_none()
    }

    /// Renderable faces for this tile, rebuilt on first access after any
    /// mutation. Geometry is tile-local; pair with a translation to
    /// `world_position` when drawing.
    pub fn surfaces(&mut self) -> &[SurfaceDraw] {
        if self.surfaces.is_none() {
            let built = build_surfaces(self);
            self.surfaces = Some(built);
        }
        self.surfaces.as_deref().unwrap_or(&[])
    }
}
