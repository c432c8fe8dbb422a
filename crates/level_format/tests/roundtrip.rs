//! Save/load round-trip tests over real files.
//!
//! The contract: `save_level` followed by `load_level` reproduces an
//! equivalent grid (size, tile size, per-tile wall/top/car state) and an
//! equivalent vehicle spawn set. Equivalence is on content; alias names may
//! differ from raw paths as long as they resolve identically.
//!
//! Run: cargo test -p level_format --test roundtrip

use std::fs;

use bevy::math::{IVec3, Vec2};
use level_format::{load_level, parse_level_str, save_level, write_level_string};
use world::{CarDirection, LevelData, TileGrid, VehicleSpawn, WallDirection};

/// Unique temp directory per test.
fn test_dir(name: &str) -> String {
    let dir = format!("/tmp/gridlock_roundtrip_test_{name}");
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn assert_grids_equivalent(a: &TileGrid, b: &TileGrid) {
    assert_eq!(a.grid_size(), b.grid_size());
    assert_eq!(a.tile_size(), b.tile_size());
    let size = a.grid_size();
    for z in 0..size.z {
        for y in 0..size.y {
            for x in 0..size.x {
                let pos = IVec3::new(x, y, z);
                let left = a.tile(pos).unwrap();
                let right = b.tile(pos).unwrap();
                assert_eq!(left.top_surface(), right.top_surface(), "top at {pos}");
                for dir in WallDirection::ALL {
                    assert_eq!(left.wall(dir), right.wall(dir), "{dir:?} wall at {pos}");
                }
            }
        }
    }
}

fn build_sample_world() -> (TileGrid, LevelData) {
    let mut grid = TileGrid::new(IVec3::new(5, 4, 2), 3.0);
    grid.register_texture_alias("brick", "assets/textures/brick.png");

    // Ground floor with a two-lane road through the middle.
    for y in 0..4 {
        for x in 0..5 {
            let tile = grid.tile_mut(IVec3::new(x, y, 0)).unwrap();
            tile.set_top_surface(true, Some("assets/textures/grass.png".into()), CarDirection::None);
        }
    }
    for x in 0..5 {
        let tile = grid.tile_mut(IVec3::new(x, 2, 0)).unwrap();
        tile.set_top_surface(true, Some("assets/textures/road.png".into()), CarDirection::None);
        tile.set_car_direction(CarDirection::EastWest);
    }

    // A walled building footprint on the upper layer.
    let tile = grid.tile_mut(IVec3::new(1, 1, 1)).unwrap();
    tile.set_wall(WallDirection::North, false, Some("assets/textures/wall.png".into()));
    tile.set_wall(WallDirection::West, false, Some("assets/textures/brick.png".into()));
    tile.set_wall_texture(WallDirection::East, Some("custom/unaliased.png".into()));

    let mut data = LevelData::default();
    data.add_or_update_spawn(
        VehicleSpawn {
            grid_position: IVec3::new(0, 2, 0),
            rotation_degrees: 90.0,
            size: Vec2::new(1.5, 3.0),
            texture: String::new(),
        },
        &grid,
    );
    data.add_or_update_spawn(
        VehicleSpawn {
            grid_position: IVec3::new(4, 2, 0),
            rotation_degrees: 270.25,
            size: Vec2::new(2.0, 4.5),
            texture: "custom/taxi.png".into(),
        },
        &grid,
    );

    (grid, data)
}

#[test]
fn test_save_then_load_reproduces_world() {
    let dir = test_dir("reproduces_world");
    let path = format!("{dir}/city.level");

    let (grid, data) = build_sample_world();
    save_level(&path, &grid, &data).unwrap();

    let mut reloaded_grid = TileGrid::default();
    let mut reloaded_data = LevelData::default();
    let report = load_level(&path, &mut reloaded_grid, &mut reloaded_data).unwrap();
    assert!(report.is_clean(), "{:?}", report.diagnostics);

    assert_grids_equivalent(&grid, &reloaded_grid);

    assert_eq!(reloaded_data.vehicle_spawns.len(), 2);
    let first = reloaded_data.find_spawn(IVec3::new(0, 2, 0)).unwrap();
    assert_eq!(first.rotation_degrees, 90.0);
    assert_eq!(first.texture, "assets/textures/car.png");
    let second = reloaded_data.find_spawn(IVec3::new(4, 2, 0)).unwrap();
    assert_eq!(second.rotation_degrees, 270.25);
    assert_eq!(second.size, Vec2::new(2.0, 4.5));
    assert_eq!(second.texture, "custom/taxi.png");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_round_trip_is_stable_after_one_cycle() {
    // Write -> parse -> write must yield the same document: the first cycle
    // canonicalizes alias choices, after which output is a fixed point.
    let (grid, data) = build_sample_world();
    let first = write_level_string(&grid, &data);

    let mut grid2 = TileGrid::default();
    let mut data2 = LevelData::default();
    let report = parse_level_str(&first, &mut grid2, &mut data2);
    assert!(report.is_clean(), "{:?}", report.diagnostics);
    let second = write_level_string(&grid2, &data2);

    assert_eq!(first, second);
}

#[test]
fn test_load_replaces_previous_world() {
    let dir = test_dir("replaces_previous");
    let path = format!("{dir}/small.level");
    fs::write(&path, "grid 2 2 1\ntile_size 1.5\ntile 0 0 0 top=solid\n").unwrap();

    let (mut grid, mut data) = build_sample_world();
    let report = load_level(&path, &mut grid, &mut data).unwrap();
    assert!(report.is_clean());

    assert_eq!(grid.grid_size(), IVec3::new(2, 2, 1));
    assert_eq!(grid.tile_size(), 1.5);
    assert!(grid.tile(IVec3::ZERO).unwrap().is_top_solid());
    // The old spawn list is gone: only the new file's contents remain.
    assert!(data.vehicle_spawns.is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_failed_save_reports_write_error() {
    let (grid, data) = build_sample_world();
    let result = save_level("/nonexistent_dir/city.level", &grid, &data);
    assert!(result.is_err());
}

#[test]
fn test_scenario_road_round_trip() {
    // Concrete scenario from the collision/persistence contract: a 3x3x1
    // world with one road tile must survive a full save/load cycle.
    let dir = test_dir("scenario_road");
    let path = format!("{dir}/road.level");
    fs::write(
        &path,
        "grid 3 3 1\ntile_size 3.0\ntile 1 1 0 top=solid:road car=north_south\n",
    )
    .unwrap();

    let mut grid = TileGrid::default();
    let mut data = LevelData::default();
    load_level(&path, &mut grid, &mut data).unwrap();

    let saved = format!("{dir}/road_out.level");
    save_level(&saved, &grid, &data).unwrap();

    let mut grid2 = TileGrid::default();
    let mut data2 = LevelData::default();
    let report = load_level(&saved, &mut grid2, &mut data2).unwrap();
    assert!(report.is_clean());

    let tile = grid2.tile(IVec3::new(1, 1, 0)).unwrap();
    assert!(tile.is_top_solid());
    assert_eq!(tile.car_direction(), CarDirection::NorthSouth);
    assert_eq!(
        tile.top_surface().texture.as_deref(),
        Some("assets/textures/road.png")
    );

    // The road tile's solid top grants ground support to the cell above it.
    assert!(grid2.has_ground_support(IVec3::new(1, 1, 1)));

    let _ = fs::remove_dir_all(&dir);
}
