//! Integer 2D math: positions, vectors, sizes and the four grid orientations.
//!
//! Grid coordinates grow east (+x) and south (+y), so north is `(0, -1)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Facing direction of a piece or viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Orientation {
    pub fn all() -> [Orientation; 4] {
        [
            Orientation::North,
            Orientation::East,
            Orientation::South,
            Orientation::West,
        ]
    }

    /// Index in clockwise order starting at north.
    pub fn index(self) -> u32 {
        match self {
            Orientation::North => 0,
            Orientation::East => 1,
            Orientation::South => 2,
            Orientation::West => 3,
        }
    }

    pub fn from_index(index: u32) -> Self {
        match index % 4 {
            0 => Orientation::North,
            1 => Orientation::East,
            2 => Orientation::South,
            _ => Orientation::West,
        }
    }

    /// Returns `object` as seen by a viewer facing `viewer`.
    pub fn from_view(viewer: Orientation, object: Orientation) -> Orientation {
        object + (Orientation::North - viewer)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Orientation::North => 'N',
            Orientation::East => 'E',
            Orientation::South => 'S',
            Orientation::West => 'W',
        };
        write!(f, "{}", c)
    }
}

/// Clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotate {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotate {
    pub fn index(self) -> u32 {
        match self {
            Rotate::R0 => 0,
            Rotate::R90 => 1,
            Rotate::R180 => 2,
            Rotate::R270 => 3,
        }
    }

    pub fn from_index(index: u32) -> Self {
        match index % 4 {
            0 => Rotate::R0,
            1 => Rotate::R90,
            2 => Rotate::R180,
            _ => Rotate::R270,
        }
    }
}

impl Add<Rotate> for Orientation {
    type Output = Orientation;

    fn add(self, rhs: Rotate) -> Orientation {
        Orientation::from_index(self.index() + rhs.index())
    }
}

impl Sub<Rotate> for Orientation {
    type Output = Orientation;

    fn sub(self, rhs: Rotate) -> Orientation {
        Orientation::from_index(self.index() + 4 - rhs.index())
    }
}

impl Sub for Orientation {
    type Output = Rotate;

    /// The rotation that takes `rhs` to `self`.
    fn sub(self, rhs: Orientation) -> Rotate {
        Rotate::from_index(self.index() + 4 - rhs.index())
    }
}

impl Add for Rotate {
    type Output = Rotate;

    fn add(self, rhs: Rotate) -> Rotate {
        Rotate::from_index(self.index() + rhs.index())
    }
}

impl Sub for Rotate {
    type Output = Rotate;

    fn sub(self, rhs: Rotate) -> Rotate {
        Rotate::from_index(self.index() + 4 - rhs.index())
    }
}

/// Displacement between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0, y: 0 };
    pub const NORTH: Vector = Vector { x: 0, y: -1 };
    pub const EAST: Vector = Vector { x: 1, y: 0 };
    pub const SOUTH: Vector = Vector { x: 0, y: 1 };
    pub const WEST: Vector = Vector { x: -1, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn from_orientation(orientation: Orientation) -> Self {
        match orientation {
            Orientation::North => Vector::NORTH,
            Orientation::East => Vector::EAST,
            Orientation::South => Vector::SOUTH,
            Orientation::West => Vector::WEST,
        }
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

impl Mul<i32> for Vector {
    type Output = Vector;

    fn mul(self, rhs: i32) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vector> for i32 {
    type Output = Vector;

    fn mul(self, rhs: Vector) -> Vector {
        rhs * self
    }
}

impl Mul<Rotate> for Vector {
    type Output = Vector;

    /// Rotates clockwise in grid coordinates.
    fn mul(self, rhs: Rotate) -> Vector {
        match rhs {
            Rotate::R0 => self,
            Rotate::R90 => Vector::new(-self.y, self.x),
            Rotate::R180 => Vector::new(-self.x, -self.y),
            Rotate::R270 => Vector::new(self.y, -self.x),
        }
    }
}

impl MulAssign<Rotate> for Vector {
    fn mul_assign(&mut self, rhs: Rotate) {
        *self = *self * rhs;
    }
}

/// 2D position on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Apply toroidal wrapping for given grid dimensions
    pub fn wrap(&self, width: i32, height: i32) -> Self {
        Self {
            x: self.x.rem_euclid(width),
            y: self.y.rem_euclid(height),
        }
    }

    /// Manhattan distance to another position
    pub fn manhattan_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add<Vector> for Position {
    type Output = Position;

    fn add(self, rhs: Vector) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign<Vector> for Position {
    fn add_assign(&mut self, rhs: Vector) {
        *self = *self + rhs;
    }
}

impl Sub<Vector> for Position {
    type Output = Position;

    fn sub(self, rhs: Vector) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign<Vector> for Position {
    fn sub_assign(&mut self, rhs: Vector) {
        *self = *self - rhs;
    }
}

impl Sub for Position {
    type Output = Vector;

    fn sub(self, rhs: Position) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        0 <= pos.x && pos.x < self.width && 0 <= pos.y && pos.y < self.height
    }
}

/// Position plus facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Position,
    pub orientation: Orientation,
}

impl Transform {
    pub const fn new(position: Position, orientation: Orientation) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_wrap() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.wrap(10, 10), Position::new(5, 5));

        let pos = Position::new(-1, -1);
        assert_eq!(pos.wrap(10, 10), Position::new(9, 9));

        let pos = Position::new(10, 10);
        assert_eq!(pos.wrap(10, 10), Position::new(0, 0));
    }

    #[test]
    fn test_manhattan_distance() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, 4);
        assert_eq!(pos1.manhattan_distance(&pos2), 7);
    }

    #[test]
    fn test_orientation_arithmetic() {
        assert_eq!(Orientation::West + Rotate::R90, Orientation::North);
        assert_eq!(Orientation::North - Rotate::R90, Orientation::West);
        assert_eq!(Orientation::East - Orientation::North, Rotate::R90);
        assert_eq!(Orientation::North - Orientation::East, Rotate::R270);
        assert_eq!(Rotate::R270 + Rotate::R180, Rotate::R90);
    }

    #[test]
    fn test_vector_rotation() {
        assert_eq!(Vector::NORTH * Rotate::R90, Vector::EAST);
        assert_eq!(Vector::NORTH * Rotate::R180, Vector::SOUTH);
        assert_eq!(Vector::NORTH * Rotate::R270, Vector::WEST);
        for orientation in Orientation::all() {
            assert_eq!(
                Vector::NORTH * (orientation - Orientation::North),
                Vector::from_orientation(orientation)
            );
        }
    }

    #[test]
    fn test_from_view() {
        // A north-facing object seen by an east-facing viewer points left.
        assert_eq!(
            Orientation::from_view(Orientation::East, Orientation::North),
            Orientation::West
        );
        assert_eq!(
            Orientation::from_view(Orientation::South, Orientation::South),
            Orientation::North
        );
    }

    #[test]
    fn test_size_contains() {
        let size = Size::new(5, 3);
        assert!(size.contains(Position::new(4, 2)));
        assert!(!size.contains(Position::new(5, 0)));
        assert!(!size.contains(Position::new(-1, 0)));
        assert_eq!(size.area(), 15);
    }
}
