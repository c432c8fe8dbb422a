//! Dense 3D tile storage with bounds-safe access, coordinate transforms, and
//! the texture alias/cache tables.

use std::collections::HashMap;

use bevy::math::{IVec3, Vec3};
use bevy::prelude::{warn, Color, Handle, Image, Mat4, Resource};

use crate::config::{DEFAULT_GRID_SIZE, DEFAULT_TEXTURE_ALIASES, DEFAULT_TILE_SIZE};
use crate::geometry::RenderSink;
use crate::tile::Tile;

/// Backing loader for the texture cache. Implemented by the host (typically
/// over its asset server); returns `None` when the resource cannot be loaded.
pub trait TextureSource {
    fn load_from_path(&mut self, path: &str) -> Option<Handle<Image>>;
}

/// A `TextureSource` that never resolves anything. Handy for headless hosts
/// and tests.
#[derive(Debug, Default)]
pub struct NullTextureSource;

impl TextureSource for NullTextureSource {
    fn load_from_path(&mut self, _path: &str) -> Option<Handle<Image>> {
        None
    }
}

/// The world: a dense grid of tiles stored in a flat vector indexed by
/// `x + y*W + z*W*H`, plus the texture alias table and resource cache shared
/// by every tile.
///
/// All dimensions stay >= 1 and the tile size stays > 0; every mutation path
/// (`new`, `resize`, `reconfigure`) enforces this before touching storage.
#[derive(Resource)]
pub struct TileGrid {
    size: IVec3,
    tile_size: f32,
    tiles: Vec<Tile>,
    texture_aliases: HashMap<String, String>,
    texture_cache: HashMap<String, Option<Handle<Image>>>,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE, DEFAULT_TILE_SIZE)
    }
}

impl TileGrid {
    /// Builds a grid of default tiles. Non-positive dimensions are clamped to
    /// 1 and a non-positive tile size falls back to the default, so the grid
    /// invariants hold from the start.
    pub fn new(size: IVec3, tile_size: f32) -> Self {
        let size = size.max(IVec3::ONE);
        let tile_size = if tile_size > 0.0 {
            tile_size
        } else {
            DEFAULT_TILE_SIZE
        };

        let mut grid = Self {
            size,
            tile_size,
            tiles: Vec::new(),
            texture_aliases: HashMap::new(),
            texture_cache: HashMap::new(),
        };
        for &(alias, path) in DEFAULT_TEXTURE_ALIASES {
            grid.register_texture_alias(alias, path);
        }
        grid.rebuild();
        grid
    }

    #[inline]
    pub fn grid_size(&self) -> IVec3 {
        self.size
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    #[inline]
    fn index(&self, pos: IVec3) -> usize {
        (pos.x + pos.y * self.size.x + pos.z * self.size.x * self.size.y) as usize
    }

    #[inline]
    pub fn is_valid_position(&self, pos: IVec3) -> bool {
        pos.x >= 0
            && pos.x < self.size.x
            && pos.y >= 0
            && pos.y < self.size.y
            && pos.z >= 0
            && pos.z < self.size.z
    }

    pub fn tile(&self, pos: IVec3) -> Option<&Tile> {
        if !self.is_valid_position(pos) {
            return None;
        }
        let index = self.index(pos);
        self.tiles.get(index)
    }

    pub fn tile_mut(&mut self, pos: IVec3) -> Option<&mut Tile> {
        if !self.is_valid_position(pos) {
            return None;
        }
        let index = self.index(pos);
        self.tiles.get_mut(index)
    }

    // -----------------------------------------------------------------
    // Coordinate transforms
    // -----------------------------------------------------------------

    /// World position of a tile's base corner. Layer `z` is shifted down one
    /// tile so its top face lands exactly on `z * tile_size`.
    pub fn grid_to_world(&self, pos: IVec3) -> Vec3 {
        Vec3::new(
            pos.x as f32 * self.tile_size,
            pos.y as f32 * self.tile_size,
            (pos.z - 1) as f32 * self.tile_size,
        )
    }

    /// Inverse of [`grid_to_world`](Self::grid_to_world): cells are centered
    /// on integer multiples of the tile size in X/Y, and the Z term undoes
    /// the one-layer vertical shift.
    pub fn world_to_grid(&self, pos: Vec3) -> IVec3 {
        let half = self.tile_size * 0.5;
        IVec3::new(
            ((pos.x + half) / self.tile_size).floor() as i32,
            ((pos.y + half) / self.tile_size).floor() as i32,
            ((pos.z + self.tile_size) / self.tile_size).floor() as i32,
        )
    }

    // -----------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------

    /// Reallocates at `new_size`, copying wall/top content from the
    /// overlapping sub-region of the old grid. Cells outside the overlap get
    /// default state. Fails (grid untouched) on any non-positive dimension.
    pub fn resize(&mut self, new_size: IVec3) -> bool {
        if new_size.x <= 0 || new_size.y <= 0 || new_size.z <= 0 {
            warn!("rejecting grid resize to invalid size {new_size}");
            return false;
        }

        let total = (new_size.x * new_size.y * new_size.z) as usize;
        let mut tiles = Vec::with_capacity(total);
        for z in 0..new_size.z {
            for y in 0..new_size.y {
                for x in 0..new_size.x {
                    let pos = IVec3::new(x, y, z);
                    let mut tile = Tile::new(pos, self.tile_size);
                    if let Some(old) = self.tile(pos) {
                        tile.copy_content_from(old);
                    }
                    tiles.push(tile);
                }
            }
        }

        self.tiles = tiles;
        self.size = new_size;
        true
    }

    /// Full-reload semantics for the level parser: swap in a new size and
    /// tile size, then rebuild every tile from scratch. All-or-nothing; on
    /// invalid input the grid is left unchanged.
    pub fn reconfigure(&mut self, size: IVec3, tile_size: f32) -> bool {
        if size.x <= 0 || size.y <= 0 || size.z <= 0 || tile_size <= 0.0 {
            warn!("rejecting grid reconfigure to size {size}, tile size {tile_size}");
            return false;
        }
        self.size = size;
        self.tile_size = tile_size;
        self.rebuild();
        true
    }

    /// Discards all tiles and reallocates default ones at the current size,
    /// in x-fastest, then y, then z order. Vehicle spawns live in the
    /// host-owned level data and are not touched here.
    pub fn rebuild(&mut self) {
        let total = (self.size.x * self.size.y * self.size.z) as usize;
        self.tiles.clear();
        self.tiles.reserve(total);
        for z in 0..self.size.z {
            for y in 0..self.size.y {
                for x in 0..self.size.x {
                    self.tiles.push(Tile::new(IVec3::new(x, y, z), self.tile_size));
                }
            }
        }
    }

    // -----------------------------------------------------------------
    // Texture aliases and cache
    // -----------------------------------------------------------------

    /// Maps a symbolic name to a resource path. Empty names or paths are
    /// ignored.
    pub fn register_texture_alias(&mut self, alias: &str, path: &str) {
        if alias.is_empty() || path.is_empty() {
            return;
        }
        self.texture_aliases
            .insert(alias.to_owned(), path.to_owned());
    }

    pub fn texture_aliases(&self) -> &HashMap<String, String> {
        &self.texture_aliases
    }

    /// Alias target if `identifier` is a registered alias, else the
    /// identifier unchanged; names and raw paths are interchangeable.
    pub fn resolve_texture_path(&self, identifier: &str) -> String {
        match self.texture_aliases.get(identifier) {
            Some(path) => path.clone(),
            None => identifier.to_owned(),
        }
    }

    /// Resolves `identifier` and loads through the cache.
    pub fn load_texture(
        &mut self,
        identifier: &str,
        source: &mut dyn TextureSource,
    ) -> Option<Handle<Image>> {
        let path = self.resolve_texture_path(identifier);
        self.load_texture_from_path(&path, source)
    }

    /// Cache-or-load by resolved path. Failures are cached as `None` so a
    /// missing resource is only ever requested once; callers treat `None` as
    /// "use a fallback visual".
    pub fn load_texture_from_path(
        &mut self,
        path: &str,
        source: &mut dyn TextureSource,
    ) -> Option<Handle<Image>> {
        cache_or_load(&mut self.texture_cache, path, source)
    }

    /// Cached handle for a resolved path, if a load was attempted and
    /// succeeded.
    pub fn cached_texture(&self, path: &str) -> Option<Handle<Image>> {
        self.texture_cache.get(path).cloned().flatten()
    }

    // -----------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------

    /// Walks every tile, lazily regenerating stale geometry, and hands each
    /// face to the sink with its model transform and cached texture.
    pub fn render(&mut self, sink: &mut dyn RenderSink, textures: &mut dyn TextureSource) {
        let cache = &mut self.texture_cache;
        for tile in &mut self.tiles {
            let transform = Mat4::from_translation(tile.world_position());
            for surface in tile.surfaces() {
                let texture = surface
                    .texture
                    .as_deref()
                    .and_then(|path| cache_or_load(cache, path, textures));
                sink.render_surface(&surface.geometry, transform, texture, Color::WHITE);
            }
        }
    }
}

fn cache_or_load(
    cache: &mut HashMap<String, Option<Handle<Image>>>,
    path: &str,
    source: &mut dyn TextureSource,
) -> Option<Handle<Image>> {
    if path.is_empty() {
        return None;
    }
    if let Some(entry) = cache.get(path) {
        return entry.clone();
    }
    let handle = source.load_from_path(path);
    if handle.is_none() {
        warn!("failed to load texture: {path}");
    }
    cache.insert(path.to_owned(), handle.clone());
    handle
}
