//! Grid coordinates and cardinal directions.
//!
//! The world uses screen-style coordinates: `x` grows rightward, `y` grows
//! downward, so [`Direction::North`] is `(0, -1)`. [`Point`] is a cell within
//! one zone; [`Position`] adds the zone id and is the value used as a set/map
//! key throughout the agent's memory.
use core::fmt;

use crate::ids::ZoneId;

/// A cell within a single zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance (`|dx| + |dy|`) to another cell.
    pub fn manhattan_distance(self, other: Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The cell one step in `direction`.
    pub const fn step(self, direction: Direction) -> Point {
        let (dx, dy) = direction.delta();
        Point::new(self.x + dx, self.y + dy)
    }

    /// True when `other` is exactly one orthogonal step away.
    pub fn is_adjacent(self, other: Point) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A zone-qualified cell: the identity the agent remembers places by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub zone: ZoneId,
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(zone: ZoneId, x: i32, y: i32) -> Self {
        Self { zone, x, y }
    }

    pub const fn from_point(zone: ZoneId, point: Point) -> Self {
        Self::new(zone, point.x, point.y)
    }

    /// The in-zone cell, dropping the zone id.
    pub const fn point(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn step(self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.zone, self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@({}, {})", self.zone, self.x, self.y)
    }
}

/// One of the four cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions, in world-map scan order (N, S, E, W).
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Coordinate delta for one step. Screen orientation: north decreases y.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// The cardinal direction pointing from `from` toward `to`, or `None` if
    /// the cells are equal. The dominant axis wins; an exact diagonal prefers
    /// the horizontal axis.
    pub fn between(from: Point, to: Point) -> Option<Direction> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0 && dy == 0 {
            return None;
        }
        if dx.abs() >= dy.abs() {
            if dx > 0 {
                Some(Direction::East)
            } else if dx < 0 {
                Some(Direction::West)
            } else if dy > 0 {
                Some(Direction::South)
            } else {
                Some(Direction::North)
            }
        } else if dy > 0 {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = Point::new(1, 2);
        let b = Point::new(4, -1);
        assert_eq!(a.manhattan_distance(b), 6);
        assert_eq!(b.manhattan_distance(a), 6);
    }

    #[test]
    fn step_follows_screen_orientation() {
        let p = Point::new(3, 3);
        assert_eq!(p.step(Direction::North), Point::new(3, 2));
        assert_eq!(p.step(Direction::South), Point::new(3, 4));
        assert_eq!(p.step(Direction::East), Point::new(4, 3));
        assert_eq!(p.step(Direction::West), Point::new(2, 3));
    }

    #[test]
    fn direction_between_picks_dominant_axis() {
        let origin = Point::ORIGIN;
        assert_eq!(
            Direction::between(origin, Point::new(5, 2)),
            Some(Direction::East)
        );
        assert_eq!(
            Direction::between(origin, Point::new(-1, -4)),
            Some(Direction::North)
        );
        // Exact diagonal prefers the horizontal axis.
        assert_eq!(
            Direction::between(origin, Point::new(3, 3)),
            Some(Direction::East)
        );
        assert_eq!(Direction::between(origin, origin), None);
    }

    #[test]
    fn opposite_round_trips() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }
}
