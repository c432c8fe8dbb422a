//! Level writer: emits the line-oriented format the parser reads back.
//!
//! Output order: header comment, `grid`, `tile_size`, sorted `texture`
//! aliases, `vehicle` lines, then one `tile` line per non-default cell.
//! Default cells are omitted entirely to keep files compact and
//! hand-editable. The whole document is assembled in memory before the
//! output file is touched.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use bevy::math::IVec3;
use bevy::prelude::info;

use world::{CarDirection, LevelData, TileGrid, WallDirection};

use crate::error::LevelFileError;

/// Serializes grid and level data to `path`. The only failure mode is the
/// file itself; callers wanting crash-safe replacement should write to a
/// temp path and rename.
pub fn save_level(
    path: impl AsRef<Path>,
    grid: &TileGrid,
    data: &LevelData,
) -> Result<(), LevelFileError> {
    let path = path.as_ref();
    let contents = write_level_string(grid, data);
    fs::write(path, contents).map_err(|source| LevelFileError::Write {
        path: path.display().to_string(),
        source,
    })?;
    info!("saved level to {}", path.display());
    Ok(())
}

/// Builds the full level document as a string.
pub fn write_level_string(grid: &TileGrid, data: &LevelData) -> String {
    let mut out = String::new();
    out.push_str("# Tile grid exported by editor\n");

    let size = grid.grid_size();
    out.push_str(&format!("grid {} {} {}\n", size.x, size.y, size.z));
    out.push_str(&format!("tile_size {}\n", grid.tile_size()));

    let mut aliases: Vec<(&str, &str)> = grid
        .texture_aliases()
        .iter()
        .filter(|(alias, path)| !alias.is_empty() && !path.is_empty())
        .map(|(alias, path)| (alias.as_str(), path.as_str()))
        .collect();
    aliases.sort_by(|a, b| a.0.cmp(b.0));

    for (alias, path) in &aliases {
        out.push_str(&format!("texture {alias} {path}\n"));
    }

    // Reverse lookup for writing paths back as their alias names. With
    // several aliases for one path, the alphabetically last one wins.
    let mut path_to_alias: HashMap<&str, &str> = HashMap::new();
    for &(alias, path) in &aliases {
        path_to_alias.insert(path, alias);
    }
    let identifier_for_save = |value: &str| -> String {
        if value.is_empty() {
            return String::new();
        }
        if grid.texture_aliases().contains_key(value) {
            return value.to_owned();
        }
        match path_to_alias.get(value) {
            Some(alias) => (*alias).to_owned(),
            None => value.to_owned(),
        }
    };

    for spawn in &data.vehicle_spawns {
        let pos = spawn.grid_position;
        out.push_str(&format!("vehicle {} {} {}", pos.x, pos.y, pos.z));
        out.push_str(&format!(" rotation={:.2}", spawn.rotation_degrees));
        if !spawn.texture.is_empty() {
            out.push_str(&format!(" texture={}", identifier_for_save(&spawn.texture)));
        }
        out.push_str(&format!(" size={:.2}x{:.2}\n", spawn.size.x, spawn.size.y));
    }

    for z in 0..size.z {
        for y in 0..size.y {
            for x in 0..size.x {
                let Some(tile) = grid.tile(IVec3::new(x, y, z)) else {
                    continue;
                };

                let mut properties: Vec<String> = Vec::new();
                let top = tile.top_surface();

                if top.solid {
                    let mut prop = String::from("top=solid");
                    let id = identifier_for_save(top.texture.as_deref().unwrap_or(""));
                    if !id.is_empty() {
                        prop.push(':');
                        prop.push_str(&id);
                    }
                    properties.push(prop);
                }

                if top.car_direction != CarDirection::None {
                    properties.push(format!("car={}", top.car_direction.key()));
                }

                for dir in WallDirection::ALL {
                    let wall = tile.wall(dir);
                    if wall.walkable && wall.texture.is_none() {
                        continue;
                    }
                    let state = if wall.walkable { "walkable" } else { "solid" };
                    let mut entry = format!("{}={}", dir.key(), state);
                    let id = identifier_for_save(wall.texture.as_deref().unwrap_or(""));
                    if !id.is_empty() {
                        entry.push(':');
                        entry.push_str(&id);
                    }
                    properties.push(entry);
                }

                if properties.is_empty() {
                    continue;
                }

                out.push_str(&format!("tile {x} {y} {z} {}\n", properties.join(" ")));
            }
        }
    }

    out
}
