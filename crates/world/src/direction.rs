use bevy::math::IVec3;
use serde::{Deserialize, Serialize};

/// One of the four vertical faces of a tile.
///
/// The discriminants double as indices into a tile's wall array, so the
/// variant order is load-bearing. North faces +Y, South faces -Y, East faces
/// +X, West faces -X; serialization keys and occupancy queries share this
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallDirection {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
}

impl WallDirection {
    pub const ALL: [WallDirection; 4] = [
        WallDirection::North,
        WallDirection::South,
        WallDirection::East,
        WallDirection::West,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Self {
        match self {
            WallDirection::North => WallDirection::South,
            WallDirection::South => WallDirection::North,
            WallDirection::East => WallDirection::West,
            WallDirection::West => WallDirection::East,
        }
    }

    /// Grid-space offset of the neighbor behind this wall.
    pub fn offset(self) -> IVec3 {
        match self {
            WallDirection::North => IVec3::new(0, 1, 0),
            WallDirection::South => IVec3::new(0, -1, 0),
            WallDirection::East => IVec3::new(1, 0, 0),
            WallDirection::West => IVec3::new(-1, 0, 0),
        }
    }

    /// Direction of travel for a single orthogonal horizontal step, or None
    /// for anything that is not exactly one such step.
    pub fn from_step(delta: IVec3) -> Option<Self> {
        match (delta.x, delta.y, delta.z) {
            (1, 0, 0) => Some(WallDirection::East),
            (-1, 0, 0) => Some(WallDirection::West),
            (0, 1, 0) => Some(WallDirection::North),
            (0, -1, 0) => Some(WallDirection::South),
            _ => None,
        }
    }

    /// Canonical key used by the level file format.
    pub fn key(self) -> &'static str {
        match self {
            WallDirection::North => "north",
            WallDirection::South => "south",
            WallDirection::East => "east",
            WallDirection::West => "west",
        }
    }
}

/// Permitted traffic flow across a tile's top surface. Anything other than
/// `None` marks the tile as a road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CarDirection {
    #[default]
    None,
    North,
    South,
    East,
    West,
    /// Bidirectional along Y.
    NorthSouth,
    /// Bidirectional along X.
    EastWest,
}

impl CarDirection {
    /// Canonical key used by the level file format.
    pub fn key(self) -> &'static str {
        match self {
            CarDirection::None => "none",
            CarDirection::North => "north",
            CarDirection::South => "south",
            CarDirection::East => "east",
            CarDirection::West => "west",
            CarDirection::NorthSouth => "north_south",
            CarDirection::EastWest => "east_west",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_are_symmetric() {
        for dir in WallDirection::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn test_offsets_are_unit_horizontal_steps() {
        for dir in WallDirection::ALL {
            let offset = dir.offset();
            assert_eq!(offset.z, 0);
            assert_eq!(offset.x.abs() + offset.y.abs(), 1);
            assert_eq!(dir.opposite().offset(), -offset);
        }
    }

    #[test]
    fn test_from_step_matches_offset_table() {
        for dir in WallDirection::ALL {
            assert_eq!(WallDirection::from_step(dir.offset()), Some(dir));
        }
        assert_eq!(WallDirection::from_step(IVec3::new(1, 1, 0)), None);
        assert_eq!(WallDirection::from_step(IVec3::new(0, 0, 1)), None);
        assert_eq!(WallDirection::from_step(IVec3::new(2, 0, 0)), None);
        assert_eq!(WallDirection::from_step(IVec3::ZERO), None);
    }

    #[test]
    fn test_indices_cover_wall_array() {
        let mut seen = [false; 4];
        for dir in WallDirection::ALL {
            seen[dir.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
