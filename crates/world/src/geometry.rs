//! Tile-face quad construction and the render-sink seam.
//!
//! Geometry is a pure function of a tile's wall/top state: non-walkable
//! walls produce one vertical quad each, a solid top produces one horizontal
//! quad. Quads are tile-local (centered on the XY origin, base at local Z 0)
//! and are positioned at draw time with a translation to the tile's world
//! position.

use bevy::color::Color;
use bevy::math::Mat4;
use bevy::prelude::{Handle, Image};

use crate::direction::WallDirection;
use crate::tile::Tile;

/// A single textured quad: four vertices, two triangles.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGeometry {
    pub positions: [[f32; 3]; 4],
    pub normals: [[f32; 3]; 4],
    pub uvs: [[f32; 2]; 4],
    pub indices: [u32; 6],
}

/// Which face of the tile a surface belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Top,
    Wall(WallDirection),
}

/// One renderable face plus its texture reference (resolved path).
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceDraw {
    pub kind: SurfaceKind,
    pub geometry: SurfaceGeometry,
    pub texture: Option<String>,
}

/// Consumer of tile geometry. The core hands opaque quads plus a model
/// transform; how they are drawn is the host's business. A `None` texture
/// means "use a fallback visual", never an error.
pub trait RenderSink {
    fn render_surface(
        &mut self,
        geometry: &SurfaceGeometry,
        transform: Mat4,
        texture: Option<Handle<Image>>,
        tint: Color,
    );
}

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];
const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Builds the full face list for a tile's current state.
pub fn build_surfaces(tile: &Tile) -> Vec<SurfaceDraw> {
    let mut surfaces = Vec::new();
    let half = tile.tile_size() / 2.0;
    let height = tile.tile_size();

    for dir in WallDirection::ALL {
        let wall = tile.wall(dir);
        if wall.walkable {
            continue;
        }
        surfaces.push(SurfaceDraw {
            kind: SurfaceKind::Wall(dir),
            geometry: wall_quad(dir, half, height),
            texture: wall.texture.clone(),
        });
    }

    if tile.top_surface().solid {
        surfaces.push(SurfaceDraw {
            kind: SurfaceKind::Top,
            geometry: top_quad(half, height),
            texture: tile.top_surface().texture.clone(),
        });
    }

    surfaces
}

fn wall_quad(dir: WallDirection, half: f32, height: f32) -> SurfaceGeometry {
    let (positions, normal) = match dir {
        // +Y face
        WallDirection::North => (
            [
                [-half, half, 0.0],
                [half, half, 0.0],
                [half, half, height],
                [-half, half, height],
            ],
            [0.0, 1.0, 0.0],
        ),
        // -Y face
        WallDirection::South => (
            [
                [-half, -half, 0.0],
                [half, -half, 0.0],
                [half, -half, height],
                [-half, -half, height],
            ],
            [0.0, -1.0, 0.0],
        ),
        // +X face
        WallDirection::East => (
            [
                [half, -half, 0.0],
                [half, half, 0.0],
                [half, half, height],
                [half, -half, height],
            ],
            [1.0, 0.0, 0.0],
        ),
        // -X face
        WallDirection::West => (
            [
                [-half, half, 0.0],
                [-half, -half, 0.0],
                [-half, -half, height],
                [-half, half, height],
            ],
            [-1.0, 0.0, 0.0],
        ),
    };

    SurfaceGeometry {
        positions,
        normals: [normal; 4],
        uvs: QUAD_UVS,
        indices: QUAD_INDICES,
    }
}

fn top_quad(half: f32, height: f32) -> SurfaceGeometry {
    SurfaceGeometry {
        positions: [
            [-half, -half, height],
            [half, -half, height],
            [half, half, height],
            [-half, half, height],
        ],
        normals: [[0.0, 0.0, 1.0]; 4],
        uvs: QUAD_UVS,
        indices: QUAD_INDICES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::CarDirection;
    use bevy::math::IVec3;

    #[test]
    fn test_default_tile_has_no_surfaces() {
        let tile = Tile::new(IVec3::ZERO, 3.0);
        assert!(build_surfaces(&tile).is_empty());
    }

    #[test]
    fn test_solid_top_emits_one_quad_at_tile_height() {
        let mut tile = Tile::new(IVec3::ZERO, 3.0);
        tile.set_top_surface(true, Some("assets/textures/road.png".into()), CarDirection::None);

        let surfaces = build_surfaces(&tile);
        assert_eq!(surfaces.len(), 1);
        assert_eq!(surfaces[0].kind, SurfaceKind::Top);
        assert_eq!(surfaces[0].texture.as_deref(), Some("assets/textures/road.png"));
        // Top face sits one full tile size above the local base.
        assert!(surfaces[0].geometry.positions.iter().all(|p| p[2] == 3.0));
    }

    #[test]
    fn test_only_blocked_walls_emit_quads() {
        let mut tile = Tile::new(IVec3::ZERO, 3.0);
        tile.set_wall(WallDirection::North, false, None);
        tile.set_wall(WallDirection::East, false, Some("wall.png".into()));
        // Walkable but textured: no geometry, texture survives for the writer.
        tile.set_wall_texture(WallDirection::South, Some("wall.png".into()));

        let surfaces = build_surfaces(&tile);
        assert_eq!(surfaces.len(), 2);
        assert!(surfaces
            .iter()
            .any(|s| s.kind == SurfaceKind::Wall(WallDirection::North)));
        assert!(surfaces
            .iter()
            .any(|s| s.kind == SurfaceKind::Wall(WallDirection::East)
                && s.texture.as_deref() == Some("wall.png")));
    }

    #[test]
    fn test_wall_quads_sit_on_their_face() {
        let half = 1.5;
        for dir in WallDirection::ALL {
            let quad = wall_quad(dir, half, 3.0);
            let offset = dir.offset();
            for p in quad.positions {
                if offset.x != 0 {
                    assert_eq!(p[0], offset.x as f32 * half);
                } else {
                    assert_eq!(p[1], offset.y as f32 * half);
                }
            }
            let n = quad.normals[0];
            assert_eq!([n[0] as i32, n[1] as i32, n[2] as i32], [offset.x, offset.y, 0]);
        }
    }
}
