use bevy::math::{IVec3, Vec2};

/// Dimensions of a freshly constructed grid (width, height, depth).
pub const DEFAULT_GRID_SIZE: IVec3 = IVec3::new(16, 16, 4);

/// World units per tile edge.
pub const DEFAULT_TILE_SIZE: f32 = 3.0;

/// Footprint of a spawned vehicle in world units (width x length).
pub const DEFAULT_VEHICLE_SIZE: Vec2 = Vec2::new(1.5, 3.0);

/// Texture aliases every fresh grid starts with. Level files may override
/// these or add their own.
pub const DEFAULT_TEXTURE_ALIASES: &[(&str, &str)] = &[
    ("grass", "assets/textures/grass.png"),
    ("road", "assets/textures/road.png"),
    ("wall", "assets/textures/wall.png"),
    ("car", "assets/textures/car.png"),
];
