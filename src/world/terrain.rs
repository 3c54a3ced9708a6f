//! Terrain squares and the terrain map.
//!
//! Squares are stored row-major in a flat vector indexed by
//! `y * width + x`, so lookups are O(1).

use serde::{Deserialize, Serialize};

use super::coord::Coord;

/// Whether a square is land or water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Surface {
    Land,
    Water,
}

/// Base terrain kind of a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Ocean,
    Grassland,
    Plains,
    Prairie,
    Savannah,
    Desert,
    Tundra,
    Forest,
    Marsh,
    Swamp,
    Hills,
    Mountains,
}

pub const LAND_TERRAINS: [Terrain; 11] = [
    Terrain::Grassland,
    Terrain::Plains,
    Terrain::Prairie,
    Terrain::Savannah,
    Terrain::Desert,
    Terrain::Tundra,
    Terrain::Forest,
    Terrain::Marsh,
    Terrain::Swamp,
    Terrain::Hills,
    Terrain::Mountains,
];

impl Terrain {
    pub const fn surface(self) -> Surface {
        match self {
            Terrain::Ocean => Surface::Water,
            _ => Surface::Land,
        }
    }

    /// Whole movement points needed to enter a square of this terrain.
    pub const fn movement_cost(self) -> i32 {
        match self {
            Terrain::Ocean
            | Terrain::Grassland
            | Terrain::Plains
            | Terrain::Prairie
            | Terrain::Savannah
            | Terrain::Desert
            | Terrain::Tundra => 1,
            Terrain::Forest | Terrain::Marsh | Terrain::Swamp | Terrain::Hills => 2,
            Terrain::Mountains => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Terrain::Ocean => "ocean",
            Terrain::Grassland => "grassland",
            Terrain::Plains => "plains",
            Terrain::Prairie => "prairie",
            Terrain::Savannah => "savannah",
            Terrain::Desert => "desert",
            Terrain::Tundra => "tundra",
            Terrain::Forest => "forest",
            Terrain::Marsh => "marsh",
            Terrain::Swamp => "swamp",
            Terrain::Hills => "hills",
            Terrain::Mountains => "mountains",
        }
    }

    /// Single character used when printing the map.
    pub const fn glyph(self) -> char {
        match self {
            Terrain::Ocean => '~',
            Terrain::Grassland => '"',
            Terrain::Plains => '.',
            Terrain::Prairie => ',',
            Terrain::Savannah => ';',
            Terrain::Desert => ':',
            Terrain::Tundra => '_',
            Terrain::Forest => 'f',
            Terrain::Marsh => 'm',
            Terrain::Swamp => 'w',
            Terrain::Hills => 'h',
            Terrain::Mountains => '^',
        }
    }
}

/// A single map square with its overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Square {
    pub terrain: Terrain,
    /// Water squares from which ships can reach the high seas.
    pub sea_lane: bool,
    pub road: bool,
    pub river: bool,
    pub plowed: bool,
}

impl Square {
    pub const fn new(terrain: Terrain) -> Self {
        Square {
            terrain,
            sea_lane: false,
            road: false,
            river: false,
            plowed: false,
        }
    }

    pub const fn surface(&self) -> Surface {
        self.terrain.surface()
    }

    pub const fn is_land(&self) -> bool {
        matches!(self.terrain.surface(), Surface::Land)
    }
}

/// The terrain of the whole map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainMap {
    width: i32,
    height: i32,
    squares: Vec<Square>,
}

impl TerrainMap {
    /// Creates a map filled with the given square.
    pub fn filled(width: i32, height: i32, square: Square) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        TerrainMap {
            width,
            height,
            squares: vec![square; len],
        }
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    pub const fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.contains(coord) {
            Some((coord.y * self.width + coord.x) as usize)
        } else {
            None
        }
    }

    pub fn square(&self, coord: Coord) -> Option<&Square> {
        self.index(coord).map(|i| &self.squares[i])
    }

    pub fn square_mut(&mut self, coord: Coord) -> Option<&mut Square> {
        self.index(coord).map(|i| &mut self.squares[i])
    }

    pub fn is_land(&self, coord: Coord) -> bool {
        self.square(coord).is_some_and(Square::is_land)
    }

    pub fn is_water(&self, coord: Coord) -> bool {
        self.square(coord).is_some_and(|s| !s.is_land())
    }

    pub fn is_sea_lane(&self, coord: Coord) -> bool {
        self.square(coord).is_some_and(|s| s.sea_lane)
    }

    /// True if `to` lies past the western or eastern map edge. Squares
    /// beyond only the northern or southern edge do not count.
    pub const fn beyond_east_west_edge(&self, to: Coord) -> bool {
        to.x < 0 || to.x >= self.width
    }

    /// True if any square adjacent to `coord` is water.
    pub fn is_coastal(&self, coord: Coord) -> bool {
        super::coord::ALL_DIRECTIONS
            .iter()
            .any(|d| self.is_water(coord.moved(*d)))
    }

    /// All on-map coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Coord::new(x, y)))
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    /// Flat index of an on-map coordinate, used by per-square layers.
    pub fn flat_index(&self, coord: Coord) -> Option<usize> {
        self.index(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_surfaces() {
        assert_eq!(Terrain::Ocean.surface(), Surface::Water);
        for t in LAND_TERRAINS {
            assert_eq!(t.surface(), Surface::Land);
        }
    }

    #[test]
    fn movement_costs() {
        assert_eq!(Terrain::Grassland.movement_cost(), 1);
        assert_eq!(Terrain::Forest.movement_cost(), 2);
        assert_eq!(Terrain::Mountains.movement_cost(), 3);
    }

    #[test]
    fn map_bounds_and_lookup() {
        let mut map = TerrainMap::filled(4, 3, Square::new(Terrain::Ocean));
        assert!(map.contains(Coord::new(3, 2)));
        assert!(!map.contains(Coord::new(4, 2)));
        assert!(!map.contains(Coord::new(-1, 0)));
        assert!(map.square(Coord::new(0, 3)).is_none());

        map.square_mut(Coord::new(1, 1)).unwrap().terrain = Terrain::Plains;
        assert!(map.is_land(Coord::new(1, 1)));
        assert!(map.is_water(Coord::new(0, 0)));
        assert!(map.is_coastal(Coord::new(1, 1)));
        assert_eq!(map.coords().count(), 12);
    }

    #[test]
    fn east_west_edge() {
        let map = TerrainMap::filled(5, 5, Square::new(Terrain::Ocean));
        assert!(map.beyond_east_west_edge(Coord::new(-1, 2)));
        assert!(map.beyond_east_west_edge(Coord::new(5, -1)));
        assert!(!map.beyond_east_west_edge(Coord::new(0, -1)));
        assert!(!map.beyond_east_west_edge(Coord::new(4, 5)));
    }
}
