//! Per-nation visibility layers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::coord::Coord;
use super::nation::Nation;
use super::terrain::TerrainMap;

/// What one nation currently sees and has ever seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FogLayer {
    visible: Vec<bool>,
    explored: Vec<bool>,
}

impl FogLayer {
    pub fn new(len: usize) -> Self {
        FogLayer {
            visible: vec![false; len],
            explored: vec![false; len],
        }
    }

    pub fn clear_visible(&mut self) {
        self.visible.fill(false);
    }

    /// Marks every on-map square within `radius` of `center` as visible
    /// and explored.
    pub fn reveal(&mut self, map: &TerrainMap, center: Coord, radius: i32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let c = Coord::new(center.x + dx, center.y + dy);
                if let Some(i) = map.flat_index(c) {
                    if i < self.visible.len() {
                        self.visible[i] = true;
                        self.explored[i] = true;
                    }
                }
            }
        }
    }

    pub fn is_visible(&self, map: &TerrainMap, coord: Coord) -> bool {
        map.flat_index(coord)
            .and_then(|i| self.visible.get(i).copied())
            .unwrap_or(false)
    }

    pub fn is_explored(&self, map: &TerrainMap, coord: Coord) -> bool {
        map.flat_index(coord)
            .and_then(|i| self.explored.get(i).copied())
            .unwrap_or(false)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }
}

/// Visibility for every nation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fog {
    layers: BTreeMap<Nation, FogLayer>,
}

impl Fog {
    pub fn layer(&self, nation: Nation) -> Option<&FogLayer> {
        self.layers.get(&nation)
    }

    /// Returns the nation's layer, creating it sized to the map if missing.
    pub fn layer_mut(&mut self, nation: Nation, map: &TerrainMap) -> &mut FogLayer {
        self.layers
            .entry(nation)
            .or_insert_with(|| FogLayer::new(map.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::terrain::{Square, Terrain};

    #[test]
    fn reveal_marks_radius_and_explored_persists() {
        let map = TerrainMap::filled(6, 6, Square::new(Terrain::Plains));
        let mut fog = Fog::default();
        let layer = fog.layer_mut(Nation::French, &map);
        layer.reveal(&map, Coord::new(0, 0), 1);
        assert_eq!(layer.visible_count(), 4);
        assert!(layer.is_visible(&map, Coord::new(1, 1)));
        assert!(!layer.is_visible(&map, Coord::new(2, 2)));

        layer.clear_visible();
        assert_eq!(layer.visible_count(), 0);
        assert!(layer.is_explored(&map, Coord::new(1, 1)));
    }
}
