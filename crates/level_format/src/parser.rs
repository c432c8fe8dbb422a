//! Two-pass parser for the line-oriented level format.
//!
//! Pass 1 collects `grid` / `tile_size` / `texture` directives, then the grid
//! is reconfigured exactly once and the spawn list cleared. Pass 2 applies
//! `tile` and `fill` lines in file order, then `vehicle` lines: spawns need
//! a solid tile under them, and the writer emits vehicles ahead of tiles, so
//! support has to exist before spawns are validated.
//!
//! Bad lines never abort a load: each problem becomes one line-numbered
//! diagnostic and only that line's effect is dropped. The only hard failure
//! is an unreadable file, which leaves grid and level data untouched.

use std::fs;
use std::path::Path;

use bevy::math::{IVec3, Vec2};
use bevy::prelude::info;

use world::{CarDirection, LevelData, TileGrid, VehicleSpawn, WallDirection};

use crate::diagnostics::LoadReport;
use crate::error::LevelFileError;

/// Loads a level file into an existing grid and level-data value.
pub fn load_level(
    path: impl AsRef<Path>,
    grid: &mut TileGrid,
    data: &mut LevelData,
) -> Result<LoadReport, LevelFileError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LevelFileError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let report = parse_level_str(&text, grid, data);
    info!(
        "loaded level from {} ({} diagnostics)",
        path.display(),
        report.diagnostics.len()
    );
    Ok(report)
}

/// Parses level text that is already in memory. Used by `load_level` and by
/// hosts that keep level sources elsewhere (tests, embedded assets).
pub fn parse_level_str(text: &str, grid: &mut TileGrid, data: &mut LevelData) -> LoadReport {
    let mut report = LoadReport::default();
    let lines = sanitize_lines(text);

    // ---- Pass 1: structural directives and aliases ----
    let mut pending_size = grid.grid_size();
    let mut pending_tile_size = grid.tile_size();
    let mut pending_aliases: Vec<(String, String)> = Vec::new();

    for line in &lines {
        let mut tokens = line.content.split_whitespace();
        let Some(command) = tokens.next() else {
            continue;
        };
        match command.to_ascii_lowercase().as_str() {
            "grid" => {
                let dims: Vec<Option<i32>> = tokens.by_ref().take(3).map(parse_int).collect();
                match dims.as_slice() {
                    [Some(w), Some(h), Some(d)] => {
                        if *w <= 0 || *h <= 0 || *d <= 0 {
                            report.error(
                                line.number,
                                format!("grid dimensions must be positive: {w} {h} {d}"),
                            );
                        } else {
                            pending_size = IVec3::new(*w, *h, *d);
                        }
                    }
                    _ => report.error(line.number, "expected three integers after 'grid'"),
                }
            }
            "tile_size" | "tilesize" => {
                let Some(value) = tokens.next() else {
                    report.error(line.number, "expected a numeric value after 'tile_size'");
                    continue;
                };
                match parse_float(value) {
                    Some(size) if size > 0.0 => pending_tile_size = size,
                    _ => report.error(line.number, format!("invalid tile size value: {value}")),
                }
            }
            "texture" | "alias" => {
                let (Some(alias), Some(path)) = (tokens.next(), tokens.next()) else {
                    report.error(line.number, "expected 'texture <alias> <path>'");
                    continue;
                };
                // Later lines override earlier ones with the same alias.
                pending_aliases.push((alias.to_owned(), path.to_owned()));
            }
            _ => {}
        }
    }

    for (alias, path) in &pending_aliases {
        grid.register_texture_alias(alias, path);
    }
    // Full-reload semantics: one rebuild, then repopulate from scratch.
    grid.reconfigure(pending_size, pending_tile_size);
    data.vehicle_spawns.clear();

    // ---- Pass 2: tile and fill lines, in file order ----
    for line in &lines {
        let mut tokens = line.content.split_whitespace();
        let Some(command) = tokens.next() else {
            continue;
        };
        let lower = command.to_ascii_lowercase();
        match lower.as_str() {
            "grid" | "tile_size" | "tilesize" | "texture" | "alias" | "vehicle" => {}
            "tile" => apply_tile_line(tokens, line.number, grid, &mut report),
            "fill" => apply_fill_line(tokens, line.number, grid, &mut report),
            other => report.error(line.number, format!("unknown command '{other}'")),
        }
    }

    // ---- Pass 2, continued: vehicle lines after all tiles exist ----
    for line in &lines {
        let mut tokens = line.content.split_whitespace();
        let Some(command) = tokens.next() else {
            continue;
        };
        if command.eq_ignore_ascii_case("vehicle") {
            apply_vehicle_line(tokens, line.number, grid, data, &mut report);
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Line scanning
// ---------------------------------------------------------------------------

struct SourceLine<'a> {
    /// 1-based line number in the original file.
    number: usize,
    content: &'a str,
}

fn sanitize_lines(text: &str) -> Vec<SourceLine<'_>> {
    text.lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let stripped = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let content = stripped.trim();
            (!content.is_empty()).then_some(SourceLine {
                number: index + 1,
                content,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Strict token parsing
// ---------------------------------------------------------------------------

fn parse_int(text: &str) -> Option<i32> {
    text.trim().parse().ok()
}

fn parse_float(text: &str) -> Option<f32> {
    text.trim().parse().ok()
}

fn parse_coords<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<IVec3> {
    let x = parse_int(tokens.next()?)?;
    let y = parse_int(tokens.next()?)?;
    let z = parse_int(tokens.next()?)?;
    Some(IVec3::new(x, y, z))
}

/// An inclusive range token: either a single value or `a-b` (endpoints
/// swapped when reversed).
fn parse_range(text: &str) -> Option<(i32, i32)> {
    let trimmed = text.trim();
    match trimmed.split_once('-') {
        None => parse_int(trimmed).map(|v| (v, v)),
        Some((first, second)) => {
            let start = parse_int(first)?;
            let end = parse_int(second)?;
            Some(if start <= end { (start, end) } else { (end, start) })
        }
    }
}

fn parse_size(value: &str) -> Result<Vec2, String> {
    let trimmed = value.trim();
    let Some(sep) = trimmed.find(['x', 'X', ',']) else {
        return Err(format!("invalid size format: {value}"));
    };
    let first = trimmed[..sep].trim();
    let second = trimmed[sep + 1..].trim();
    let (Some(width), Some(length)) = (parse_float(first), parse_float(second)) else {
        return Err(format!("invalid size values: {value}"));
    };
    if width <= 0.0 || length <= 0.0 {
        return Err("vehicle size must be positive".to_string());
    }
    Ok(Vec2::new(width, length))
}

// ---------------------------------------------------------------------------
// Tile property grammar
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct TileUpdate {
    top: Option<TopSetting>,
    car: Option<CarDirection>,
    walls: [Option<WallSetting>; 4],
}

#[derive(Debug)]
struct TopSetting {
    solid: bool,
    texture: Option<String>,
}

#[derive(Debug)]
struct WallSetting {
    walkable: bool,
    texture: Option<String>,
}

fn parse_tile_property(key: &str, value: &str, update: &mut TileUpdate) -> Result<(), String> {
    let lower_key = key.trim().to_ascii_lowercase();
    match lower_key.as_str() {
        "top" => {
            let trimmed = value.trim();
            let lower = trimmed.to_ascii_lowercase();
            if lower == "none" || lower == "off" || lower == "false" {
                update.top = Some(TopSetting {
                    solid: false,
                    texture: None,
                });
                Ok(())
            } else if lower.starts_with("solid") {
                let texture = trimmed
                    .split_once(':')
                    .map(|(_, id)| id.trim().to_owned())
                    .filter(|id| !id.is_empty());
                update.top = Some(TopSetting {
                    solid: true,
                    texture,
                });
                Ok(())
            } else {
                Err(format!("unknown top configuration: {value}"))
            }
        }
        "car" | "cardirection" | "traffic" => {
            update.car = Some(parse_car_direction(value)?);
            Ok(())
        }
        _ => {
            if let Some(dir) = wall_key_direction(&lower_key) {
                update.walls[dir.index()] = Some(parse_wall_value(value)?);
                Ok(())
            } else {
                Err(format!("unknown property key: {key}"))
            }
        }
    }
}

fn parse_car_direction(value: &str) -> Result<CarDirection, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "none" | "off" => Ok(CarDirection::None),
        "north" => Ok(CarDirection::North),
        "south" => Ok(CarDirection::South),
        "east" => Ok(CarDirection::East),
        "west" => Ok(CarDirection::West),
        "northsouth" | "north_south" | "ns" => Ok(CarDirection::NorthSouth),
        "eastwest" | "east_west" | "ew" => Ok(CarDirection::EastWest),
        _ => Err(format!("unknown car direction: {value}")),
    }
}

/// Accepts `north`/`n` (etc.), optionally prefixed with `wall`, with `_` and
/// `-` separators stripped: `wall_north`, `wall-n`, and `North` all work.
fn wall_key_direction(lower_key: &str) -> Option<WallDirection> {
    let cleaned: String = lower_key
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect();
    let cleaned = cleaned.strip_prefix("wall").unwrap_or(&cleaned);
    match cleaned {
        "n" | "north" => Some(WallDirection::North),
        "s" | "south" => Some(WallDirection::South),
        "e" | "east" => Some(WallDirection::East),
        "w" | "west" => Some(WallDirection::West),
        _ => None,
    }
}

fn parse_wall_value(value: &str) -> Result<WallSetting, String> {
    let trimmed = value.trim();
    let (state, texture) = match trimmed.split_once(':') {
        Some((state, id)) => (state.trim(), Some(id.trim())),
        None => (trimmed, None),
    };
    let walkable = match state.to_ascii_lowercase().as_str() {
        "walkable" | "open" | "passable" => true,
        "solid" | "blocked" | "wall" | "closed" => false,
        _ => return Err(format!("unknown wall state: {state}")),
    };
    Ok(WallSetting {
        walkable,
        texture: texture.filter(|id| !id.is_empty()).map(str::to_owned),
    })
}

/// Parses all remaining tokens of a `tile`/`fill` line as tile properties.
/// Any bad token poisons the whole line (all-or-nothing per line).
fn collect_tile_update<'a>(
    tokens: impl Iterator<Item = &'a str>,
    line: usize,
    report: &mut LoadReport,
) -> Option<TileUpdate> {
    let mut update = TileUpdate::default();
    let mut ok = true;
    for token in tokens {
        match token.split_once('=') {
            None => {
                report.error(line, format!("expected key=value pair but found '{token}'"));
                ok = false;
            }
            Some((key, value)) => {
                if let Err(message) = parse_tile_property(key, value, &mut update) {
                    report.error(line, message);
                    ok = false;
                }
            }
        }
    }
    ok.then_some(update)
}

/// Applies a parsed update to one cell. Texture identifiers resolve through
/// the grid's alias table; a solid top resets the car direction before any
/// `car=` key re-applies it.
fn apply_tile_update(grid: &mut TileGrid, pos: IVec3, update: &TileUpdate) {
    let top = update.top.as_ref().map(|top| {
        let texture = top
            .texture
            .as_deref()
            .map(|id| grid.resolve_texture_path(id));
        (top.solid, texture)
    });
    let mut walls: [Option<(bool, Option<String>)>; 4] = Default::default();
    for (index, wall) in update.walls.iter().enumerate() {
        if let Some(wall) = wall {
            let texture = wall
                .texture
                .as_deref()
                .map(|id| grid.resolve_texture_path(id));
            walls[index] = Some((wall.walkable, texture));
        }
    }

    let Some(tile) = grid.tile_mut(pos) else {
        return;
    };
    if let Some((solid, texture)) = top {
        if solid {
            tile.set_top_surface(true, texture, CarDirection::None);
        } else {
            tile.set_top_surface(false, None, CarDirection::None);
        }
    }
    if let Some(car) = update.car {
        tile.set_car_direction(car);
    }
    for dir in WallDirection::ALL {
        if let Some((walkable, texture)) = walls[dir.index()].take() {
            tile.set_wall(dir, walkable, texture);
        }
    }
}

// ---------------------------------------------------------------------------
// Line handlers
// ---------------------------------------------------------------------------

fn apply_tile_line<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    line: usize,
    grid: &mut TileGrid,
    report: &mut LoadReport,
) {
    let Some(pos) = parse_coords(&mut tokens) else {
        report.error(line, "expected coordinates after 'tile'");
        return;
    };
    let Some(update) = collect_tile_update(tokens, line, report) else {
        return;
    };
    if !grid.is_valid_position(pos) {
        report.warning(
            line,
            format!(
                "tile coordinates out of bounds: ({}, {}, {})",
                pos.x, pos.y, pos.z
            ),
        );
        return;
    }
    apply_tile_update(grid, pos, &update);
}

fn apply_fill_line<'a>(
    tokens: impl Iterator<Item = &'a str>,
    line: usize,
    grid: &mut TileGrid,
    report: &mut LoadReport,
) {
    let mut ranges: [Option<(i32, i32)>; 3] = [None; 3];
    let mut update = TileUpdate::default();
    let mut ok = true;

    for token in tokens {
        let Some((key, value)) = token.split_once('=') else {
            report.error(line, format!("expected key=value pair but found '{token}'"));
            ok = false;
            continue;
        };
        let lower_key = key.trim().to_ascii_lowercase();
        let axis = match lower_key.as_str() {
            "x" => Some(0),
            "y" => Some(1),
            "z" => Some(2),
            _ => None,
        };
        if let Some(axis) = axis {
            match parse_range(value) {
                Some(range) => ranges[axis] = Some(range),
                None => {
                    report.error(line, format!("invalid {lower_key} range: {value}"));
                    ok = false;
                }
            }
        } else if let Err(message) = parse_tile_property(key, value, &mut update) {
            report.error(line, message);
            ok = false;
        }
    }

    // Partial fills are a hard error: all three ranges or nothing.
    let (Some(x_range), Some(y_range), Some(z_range)) = (ranges[0], ranges[1], ranges[2]) else {
        report.error(line, "fill command requires x=, y=, and z= ranges");
        return;
    };
    if !ok {
        return;
    }

    for z in z_range.0..=z_range.1 {
        for y in y_range.0..=y_range.1 {
            for x in x_range.0..=x_range.1 {
                let pos = IVec3::new(x, y, z);
                if !grid.is_valid_position(pos) {
                    report.warning(line, format!("fill target out of bounds: ({x}, {y}, {z})"));
                    continue;
                }
                apply_tile_update(grid, pos, &update);
            }
        }
    }
}

fn apply_vehicle_line<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    line: usize,
    grid: &TileGrid,
    data: &mut LevelData,
    report: &mut LoadReport,
) {
    let Some(pos) = parse_coords(&mut tokens) else {
        report.error(line, "expected coordinates after 'vehicle'");
        return;
    };

    let mut spawn = VehicleSpawn {
        grid_position: pos,
        ..Default::default()
    };
    let mut texture_id: Option<String> = None;
    let mut ok = true;

    for token in tokens {
        let Some((key, value)) = token.split_once('=') else {
            report.error(line, format!("expected key=value pair but found '{token}'"));
            ok = false;
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "rotation" | "angle" | "yaw" => match parse_float(value) {
                Some(rotation) => spawn.rotation_degrees = rotation,
                None => {
                    report.error(line, format!("invalid rotation value: {value}"));
                    ok = false;
                }
            },
            "texture" | "tex" => texture_id = Some(value.trim().to_owned()),
            "size" | "dimensions" => match parse_size(value) {
                Ok(size) => spawn.size = size,
                Err(message) => {
                    report.error(line, message);
                    ok = false;
                }
            },
            _ => {
                report.error(line, format!("unknown vehicle property: {key}"));
                ok = false;
            }
        }
    }

    if !ok {
        return;
    }
    if !grid.is_valid_position(pos) {
        report.error(
            line,
            format!(
                "vehicle coordinates out of bounds: ({}, {}, {})",
                pos.x, pos.y, pos.z
            ),
        );
        return;
    }
    // Support is checked at definition time; later edits may remove it.
    if !grid.tile(pos).is_some_and(|tile| tile.is_top_solid()) {
        report.error(line, "vehicle spawn requires a solid tile at the target position");
        return;
    }

    if let Some(id) = texture_id {
        if !id.is_empty() {
            spawn.texture = grid.resolve_texture_path(&id);
        }
    }
    data.add_or_update_spawn(spawn, grid);
}
