//! Map coordinates and compass directions.
//!
//! The map is a rectangular grid with the origin in the north-west corner;
//! `y` grows southward.

use serde::{Deserialize, Serialize};

/// A square on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// The neighboring coordinate in the given direction (may be off-map).
    pub const fn moved(self, direction: Direction) -> Coord {
        let (dx, dy) = direction.delta();
        Coord {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Chebyshev distance, i.e. the number of king moves between squares.
    pub fn distance(self, other: Coord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Returns the direction leading from `self` to an adjacent `other`.
    pub fn direction_to(self, other: Coord) -> Option<Direction> {
        ALL_DIRECTIONS
            .iter()
            .copied()
            .find(|d| self.moved(*d) == other)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the eight compass directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::N,
    Direction::NE,
    Direction::E,
    Direction::SE,
    Direction::S,
    Direction::SW,
    Direction::W,
    Direction::NW,
];

impl Direction {
    /// The (dx, dy) offset of a single step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::N => (0, -1),
            Direction::NE => (1, -1),
            Direction::E => (1, 0),
            Direction::SE => (1, 1),
            Direction::S => (0, 1),
            Direction::SW => (-1, 1),
            Direction::W => (-1, 0),
            Direction::NW => (-1, -1),
        }
    }

    pub const fn reverse(self) -> Direction {
        match self {
            Direction::N => Direction::S,
            Direction::NE => Direction::SW,
            Direction::E => Direction::W,
            Direction::SE => Direction::NW,
            Direction::S => Direction::N,
            Direction::SW => Direction::NE,
            Direction::W => Direction::E,
            Direction::NW => Direction::SE,
        }
    }

    /// Lowercase abbreviation used by the console protocol.
    pub const fn abbr(self) -> &'static str {
        match self {
            Direction::N => "n",
            Direction::NE => "ne",
            Direction::E => "e",
            Direction::SE => "se",
            Direction::S => "s",
            Direction::SW => "sw",
            Direction::W => "w",
            Direction::NW => "nw",
        }
    }

    pub fn from_abbr(s: &str) -> Option<Direction> {
        ALL_DIRECTIONS
            .iter()
            .copied()
            .find(|d| d.abbr().eq_ignore_ascii_case(s))
    }
}
