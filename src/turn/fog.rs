//! Visibility updates.
//!
//! Moves reveal squares as they happen; the full recompute at the end of
//! each cycle clears stale visibility.

use crate::world::{ColonyId, FoundingFather, Nation, UnitId, UnitRole, WorldError, WorldState};

const UNIT_SIGHT: i32 = 1;
const SCOUT_SIGHT: i32 = 2;
const COLONY_SIGHT: i32 = 2;

fn bonus(world: &WorldState, nation: Nation) -> i32 {
    i32::from(world.has_father(nation, FoundingFather::HernandoDeSoto))
}

fn unit_sight(world: &WorldState, nation: Nation, role: UnitRole) -> i32 {
    let base = if role == UnitRole::Scout { SCOUT_SIGHT } else { UNIT_SIGHT };
    base + bonus(world, nation)
}

/// Reveals the squares around a unit standing on the map.
pub fn reveal_around(world: &mut WorldState, unit: UnitId) {
    let Some(u) = world.units.get(&unit) else {
        return;
    };
    let Some(center) = u.coord_if_on_map() else {
        return;
    };
    let nation = u.nation;
    let radius = unit_sight(world, nation, u.role());
    let map = &world.map;
    world.fog.layer_mut(nation, map).reveal(map, center, radius);
}

pub fn reveal_colony(world: &mut WorldState, colony: ColonyId) -> Result<(), WorldError> {
    let c = world.colony(colony)?;
    let (nation, center) = (c.nation, c.coord);
    let radius = COLONY_SIGHT + bonus(world, nation);
    let map = &world.map;
    world.fog.layer_mut(nation, map).reveal(map, center, radius);
    Ok(())
}

/// Rebuilds every nation's visible set from its map units and colonies.
/// Explored squares stay explored.
pub fn recompute_fog(world: &mut WorldState) {
    let mut sources = Vec::new();
    for u in world.units.values() {
        if let Some(center) = u.coord_if_on_map() {
            sources.push((u.nation, center, unit_sight(world, u.nation, u.role())));
        }
    }
    for c in world.colonies.values() {
        sources.push((c.nation, c.coord, COLONY_SIGHT + bonus(world, c.nation)));
    }

    let nations: Vec<Nation> = world.nations.keys().copied().collect();
    let map = &world.map;
    for nation in nations {
        world.fog.layer_mut(nation, map).clear_visible();
    }
    for (nation, center, radius) in sources {
        world.fog.layer_mut(nation, map).reveal(map, center, radius);
    }
    log::trace!("fog recomputed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use crate::world::{Composition, Coord};

    #[test]
    fn scouts_see_further() {
        let mut h = Harness::plains(9, 9);
        let scout = h.unit(Nation::English, Composition::scout(), Coord::new(4, 4));
        reveal_around(&mut h.world, scout);
        assert_eq!(h.world.fog.layer(Nation::English).unwrap().visible_count(), 25);
    }

    #[test]
    fn recompute_forgets_vacated_squares() {
        let mut h = Harness::plains(9, 9);
        let id = h.unit(Nation::English, Composition::colonist(), Coord::new(1, 1));
        reveal_around(&mut h.world, id);
        h.world.relocate(id, Coord::new(7, 7)).unwrap();
        recompute_fog(&mut h.world);
        let layer = h.world.fog.layer(Nation::English).unwrap();
        assert!(!layer.is_visible(&h.world.map, Coord::new(1, 1)));
        assert!(layer.is_explored(&h.world.map, Coord::new(1, 1)));
        assert!(layer.is_visible(&h.world.map, Coord::new(8, 8)));
    }

    #[test]
    fn de_soto_widens_sight() {
        let mut h = Harness::plains(9, 9);
        h.world
            .nation_mut(Nation::English)
            .unwrap()
            .fathers
            .push(FoundingFather::HernandoDeSoto);
        let id = h.unit(Nation::English, Composition::colonist(), Coord::new(4, 4));
        reveal_around(&mut h.world, id);
        assert_eq!(h.world.fog.layer(Nation::English).unwrap().visible_count(), 25);
    }
}
