//! Grid cell coordinates, axis directions, and replication sides.
//!
//! These are the canonical spatial types every other crate builds on.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Position of a cell in the world grid.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
    /// Padding for alignment.
    pub _pad: i32,
}

impl GridPos {
    /// Creates a new grid position.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z, _pad: 0 }
    }

    /// The cell adjacent to this one in the given direction.
    #[inline]
    #[must_use]
    pub const fn neighbor(self, dir: Direction) -> Self {
        let [dx, dy, dz] = dir.unit();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Which replica of the world a piece of state lives on.
///
/// The SERVER side is authoritative: structural mutation is only permitted
/// there. The CLIENT side is a passive replica that mirrors server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Authoritative simulation side.
    Server,
    /// Passive replica side.
    Client,
}

impl Side {
    /// Returns true on the authoritative side.
    #[inline]
    #[must_use]
    pub const fn is_authoritative(self) -> bool {
        matches!(self, Self::Server)
    }
}

/// The three grid axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// East-west axis.
    X,
    /// Up-down axis.
    Y,
    /// North-south axis.
    Z,
}

/// One of the six axis directions.
///
/// Variant order is the canonical iteration order; geometry synthesis relies
/// on it for deterministic output.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Negative Y.
    Down = 0,
    /// Positive Y.
    Up = 1,
    /// Negative Z.
    North = 2,
    /// Positive Z.
    South = 3,
    /// Negative X.
    West = 4,
    /// Positive X.
    East = 5,
}

impl Direction {
    /// All six directions in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Down,
        Self::Up,
        Self::North,
        Self::South,
        Self::West,
        Self::East,
    ];

    /// The unit step along this direction.
    #[inline]
    #[must_use]
    pub const fn unit(self) -> [i32; 3] {
        match self {
            Self::Down => [0, -1, 0],
            Self::Up => [0, 1, 0],
            Self::North => [0, 0, -1],
            Self::South => [0, 0, 1],
            Self::West => [-1, 0, 0],
            Self::East => [1, 0, 0],
        }
    }

    /// The axis this direction lies on.
    #[inline]
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Down | Self::Up => Axis::Y,
            Self::North | Self::South => Axis::Z,
            Self::West | Self::East => Axis::X,
        }
    }

    /// The opposite direction.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Up => Self::Down,
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }

    /// Stable index in `[0, 6)`, matching the canonical order.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A packed set of directions.
///
/// One bit per direction; cheap to copy and compare, never allocates.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct DirectionSet(u8);

impl DirectionSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Creates a set from the given directions.
    #[must_use]
    pub fn from_dirs(dirs: &[Direction]) -> Self {
        let mut set = Self::EMPTY;
        for dir in dirs {
            set.insert(*dir);
        }
        set
    }

    /// The raw bit representation, one bit per direction.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reconstructs a set from its bit representation.
    ///
    /// Bits beyond the six directions are discarded.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x3F)
    }

    /// Adds a direction to the set.
    #[inline]
    pub fn insert(&mut self, dir: Direction) {
        self.0 |= 1 << dir.index();
    }

    /// Removes a direction from the set.
    #[inline]
    pub fn remove(&mut self, dir: Direction) {
        self.0 &= !(1 << dir.index());
    }

    /// Returns true if the set contains the direction.
    #[inline]
    #[must_use]
    pub const fn contains(self, dir: Direction) -> bool {
        self.0 & (1 << dir.index()) != 0
    }

    /// The union of two sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Number of directions in the set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns true if the set is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained directions in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor() {
        let pos = GridPos::new(1, 2, 3);
        assert_eq!(pos.neighbor(Direction::East), GridPos::new(2, 2, 3));
        assert_eq!(pos.neighbor(Direction::Down), GridPos::new(1, 1, 3));
    }

    #[test]
    fn test_direction_opposites() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.axis(), dir.opposite().axis());
        }
    }

    #[test]
    fn test_direction_set() {
        let mut set = DirectionSet::EMPTY;
        assert!(set.is_empty());

        set.insert(Direction::North);
        set.insert(Direction::East);
        assert_eq!(set.len(), 2);
        assert!(set.contains(Direction::North));
        assert!(!set.contains(Direction::South));

        set.remove(Direction::North);
        assert_eq!(set.len(), 1);

        let dirs: Vec<Direction> = DirectionSet::from_dirs(&[Direction::Up, Direction::Down])
            .iter()
            .collect();
        assert_eq!(dirs, vec![Direction::Down, Direction::Up]);
    }
}
