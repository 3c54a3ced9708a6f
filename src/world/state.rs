//! The mutable world store.
//!
//! Holds every unit, colony, nation and the terrain, and exposes the narrow
//! mutation surface the engine uses. Writes are visible immediately. Unit
//! ownership changes always go through `disown` first, so a unit is owned by
//! exactly one holder at any time.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::colony::{Colony, ColonyId, Job};
use super::coord::Coord;
use super::fog::Fog;
use super::market::Market;
use super::nation::{FoundingFather, Nation, NationState};
use super::terrain::TerrainMap;
use super::unit::{CargoItem, Composition, MovementPoints, Ownership, PortStatus, Unit, UnitId, UnitOrders};
use crate::turn::TurnState;

/// Violations of the world store's ownership and lookup rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("unit {0} does not exist")]
    NoSuchUnit(UnitId),

    #[error("colony {0} does not exist")]
    NoSuchColony(ColonyId),

    #[error("unit {0} must be disowned before it can be re-owned")]
    NotFree(UnitId),

    #[error("coordinate {0} is off the map")]
    OffMap(Coord),

    #[error("unit {holder} cannot take {unit} as cargo")]
    NoCargoSpace { holder: UnitId, unit: UnitId },

    #[error("a colony already exists at {0}")]
    ColonyExists(Coord),

    #[error("nation {0} is not part of this game")]
    NoSuchNation(Nation),
}

/// Complete game state at a phase boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub map: TerrainMap,
    pub units: BTreeMap<UnitId, Unit>,
    pub colonies: BTreeMap<ColonyId, Colony>,
    pub nations: BTreeMap<Nation, NationState>,
    pub fog: Fog,
    pub market: Market,
    pub turn: TurnState,
    next_unit_id: u32,
    next_colony_id: u32,
    /// Units standing on each map square; rebuilt by `reindex` after loading.
    #[serde(skip)]
    units_at: BTreeMap<Coord, BTreeSet<UnitId>>,
}

impl WorldState {
    /// Creates a world with the given terrain and no units.
    pub fn new(map: TerrainMap, turn: TurnState) -> Self {
        WorldState {
            map,
            units: BTreeMap::new(),
            colonies: BTreeMap::new(),
            nations: BTreeMap::new(),
            fog: Fog::default(),
            market: Market::default(),
            turn,
            next_unit_id: 1,
            next_colony_id: 1,
            units_at: BTreeMap::new(),
        }
    }

    /// Rebuilds derived indexes. Must be called after deserializing.
    pub fn reindex(&mut self) {
        self.units_at.clear();
        for unit in self.units.values() {
            if let Ownership::World { coord } = unit.ownership {
                self.units_at.entry(coord).or_default().insert(unit.id);
            }
        }
    }

    // -- nations ----------------------------------------------------------

    pub fn add_nation(&mut self, nation: Nation, human: bool) {
        self.nations.insert(nation, NationState::new(nation, human));
    }

    pub fn nation(&self, nation: Nation) -> Result<&NationState, WorldError> {
        self.nations.get(&nation).ok_or(WorldError::NoSuchNation(nation))
    }

    pub fn nation_mut(&mut self, nation: Nation) -> Result<&mut NationState, WorldError> {
        self.nations
            .get_mut(&nation)
            .ok_or(WorldError::NoSuchNation(nation))
    }

    pub fn is_human(&self, nation: Nation) -> bool {
        self.nations.get(&nation).is_some_and(|n| n.human)
    }

    pub fn has_father(&self, nation: Nation, father: FoundingFather) -> bool {
        self.nations
            .get(&nation)
            .is_some_and(|n| n.has_father(father))
    }

    /// A nation takes part in the turn while it has any unit or colony.
    pub fn nation_alive(&self, nation: Nation) -> bool {
        self.nations.contains_key(&nation)
            && (self.units.values().any(|u| u.nation == nation)
                || self.colonies.values().any(|c| c.nation == nation))
    }

    // -- units: queries ---------------------------------------------------

    pub fn unit(&self, id: UnitId) -> Result<&Unit, WorldError> {
        self.units.get(&id).ok_or(WorldError::NoSuchUnit(id))
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit, WorldError> {
        self.units.get_mut(&id).ok_or(WorldError::NoSuchUnit(id))
    }

    pub fn unit_exists(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    /// Ids of a nation's units in ascending order.
    pub fn unit_ids_of(&self, nation: Nation) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| u.nation == nation)
            .map(|u| u.id)
            .collect()
    }

    /// Units standing directly on a map square, in ascending id order.
    pub fn units_at(&self, coord: Coord) -> Vec<UnitId> {
        self.units_at
            .get(&coord)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// The map square a unit is effectively on: its own square, its
    /// holder's square when carried, or its colony's square.
    pub fn unit_coord(&self, id: UnitId) -> Option<Coord> {
        let mut current = id;
        // Cargo nesting is at most one level deep; the bound guards cycles.
        for _ in 0..4 {
            let unit = self.units.get(&current)?;
            match unit.ownership {
                Ownership::World { coord } => return Some(coord),
                Ownership::Cargo { holder } => current = holder,
                Ownership::Colony { colony, .. } => {
                    return self.colonies.get(&colony).map(|c| c.coord)
                }
                Ownership::Harbor { .. } | Ownership::Free => return None,
            }
        }
        None
    }

    /// Movement allotment for a unit at the start of a turn.
    pub fn movement_allotment(&self, unit: &Unit) -> MovementPoints {
        let base = unit.composition.movement_points();
        if unit.is_ship() && self.has_father(unit.nation, FoundingFather::FerdinandMagellan) {
            base + MovementPoints::whole(1)
        } else {
            base
        }
    }

    // -- units: ownership changes -----------------------------------------

    /// Creates a unit in the `Free` state. The caller must place it.
    pub fn create_unit(&mut self, nation: Nation, composition: Composition) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        let mut unit = Unit {
            id,
            nation,
            composition,
            mv_pts: MovementPoints::ZERO,
            orders: UnitOrders::None,
            ownership: Ownership::Free,
            cargo: Vec::new(),
            evolved: false,
        };
        unit.mv_pts = self.movement_allotment(&unit);
        self.units.insert(id, unit);
        log::trace!("created {} {} for {}", composition.name(), id, nation);
        id
    }

    pub fn create_unit_on_map(
        &mut self,
        nation: Nation,
        composition: Composition,
        coord: Coord,
    ) -> Result<UnitId, WorldError> {
        if !self.map.contains(coord) {
            return Err(WorldError::OffMap(coord));
        }
        let id = self.create_unit(nation, composition);
        self.place_on_map(id, coord)?;
        Ok(id)
    }

    /// Detaches a unit from whatever currently owns it.
    pub fn disown(&mut self, id: UnitId) -> Result<(), WorldError> {
        let ownership = self.unit(id)?.ownership;
        match ownership {
            Ownership::Free | Ownership::Colony { .. } | Ownership::Harbor { .. } => {}
            Ownership::World { coord } => {
                if let Some(set) = self.units_at.get_mut(&coord) {
                    set.remove(&id);
                    if set.is_empty() {
                        self.units_at.remove(&coord);
                    }
                }
            }
            Ownership::Cargo { holder } => {
                if let Some(h) = self.units.get_mut(&holder) {
                    h.cargo.retain(|c| *c != CargoItem::Unit(id));
                }
            }
        }
        self.unit_mut(id)?.ownership = Ownership::Free;
        Ok(())
    }

    fn require_free(&self, id: UnitId) -> Result<(), WorldError> {
        match self.unit(id)?.ownership {
            Ownership::Free => Ok(()),
            _ => Err(WorldError::NotFree(id)),
        }
    }

    pub fn place_on_map(&mut self, id: UnitId, coord: Coord) -> Result<(), WorldError> {
        self.require_free(id)?;
        if !self.map.contains(coord) {
            return Err(WorldError::OffMap(coord));
        }
        self.unit_mut(id)?.ownership = Ownership::World { coord };
        self.units_at.entry(coord).or_default().insert(id);
        Ok(())
    }

    pub fn board(&mut self, id: UnitId, holder: UnitId) -> Result<(), WorldError> {
        self.require_free(id)?;
        let h = self.unit(holder)?;
        if id == holder || !h.composition.carries_units() || !h.has_free_slot() {
            return Err(WorldError::NoCargoSpace { holder, unit: id });
        }
        self.unit_mut(holder)?.cargo.push(CargoItem::Unit(id));
        self.unit_mut(id)?.ownership = Ownership::Cargo { holder };
        Ok(())
    }

    pub fn join_colony(&mut self, id: UnitId, colony: ColonyId, job: Job) -> Result<(), WorldError> {
        self.require_free(id)?;
        if !self.colonies.contains_key(&colony) {
            return Err(WorldError::NoSuchColony(colony));
        }
        let unit = self.unit_mut(id)?;
        unit.ownership = Ownership::Colony { colony, job };
        unit.orders = UnitOrders::None;
        Ok(())
    }

    pub fn send_to_harbor(
        &mut self,
        id: UnitId,
        status: PortStatus,
        sailed_from: Option<Coord>,
    ) -> Result<(), WorldError> {
        self.require_free(id)?;
        self.unit_mut(id)?.ownership = Ownership::Harbor {
            status,
            sailed_from,
        };
        Ok(())
    }

    /// Disowns and places a unit on a map square in one step.
    pub fn relocate(&mut self, id: UnitId, coord: Coord) -> Result<(), WorldError> {
        self.disown(id)?;
        self.place_on_map(id, coord)
    }

    /// Destroys a unit and, recursively, every unit in its cargo.
    /// Returns the ids of all destroyed units, the unit itself first.
    pub fn destroy_unit(&mut self, id: UnitId) -> Result<Vec<UnitId>, WorldError> {
        self.disown(id)?;
        let unit = self.units.remove(&id).ok_or(WorldError::NoSuchUnit(id))?;
        let mut destroyed = vec![id];
        for passenger in unit.cargo_units() {
            if let Some(p) = self.units.get_mut(&passenger) {
                // Already detached from its holder, which no longer exists.
                p.ownership = Ownership::Free;
            }
            destroyed.extend(self.destroy_unit(passenger)?);
        }
        log::trace!("destroyed {:?}", destroyed);
        Ok(destroyed)
    }

    /// Changes a unit's nation together with everything it carries.
    pub fn change_nation(&mut self, id: UnitId, nation: Nation) -> Result<(), WorldError> {
        let passengers: Vec<UnitId> = self.unit(id)?.cargo_units().collect();
        self.unit_mut(id)?.nation = nation;
        for p in passengers {
            self.change_nation(p, nation)?;
        }
        Ok(())
    }

    // -- colonies ---------------------------------------------------------

    pub fn colony(&self, id: ColonyId) -> Result<&Colony, WorldError> {
        self.colonies.get(&id).ok_or(WorldError::NoSuchColony(id))
    }

    pub fn colony_mut(&mut self, id: ColonyId) -> Result<&mut Colony, WorldError> {
        self.colonies.get_mut(&id).ok_or(WorldError::NoSuchColony(id))
    }

    pub fn colony_at(&self, coord: Coord) -> Option<&Colony> {
        self.colonies.values().find(|c| c.coord == coord)
    }

    pub fn colony_ids_of(&self, nation: Nation) -> Vec<ColonyId> {
        self.colonies
            .values()
            .filter(|c| c.nation == nation)
            .map(|c| c.id)
            .collect()
    }

    pub fn colony_name_taken(&self, name: &str) -> bool {
        self.colonies
            .values()
            .any(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Workers inside a colony, in ascending id order.
    pub fn colony_workers(&self, id: ColonyId) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| matches!(u.ownership, Ownership::Colony { colony, .. } if colony == id))
            .map(|u| u.id)
            .collect()
    }

    pub fn create_colony(
        &mut self,
        nation: Nation,
        name: String,
        coord: Coord,
    ) -> Result<ColonyId, WorldError> {
        if !self.map.contains(coord) {
            return Err(WorldError::OffMap(coord));
        }
        if self.colony_at(coord).is_some() {
            return Err(WorldError::ColonyExists(coord));
        }
        let id = ColonyId(self.next_colony_id);
        self.next_colony_id += 1;
        self.colonies.insert(id, Colony::new(id, name, nation, coord));
        if let Some(square) = self.map.square_mut(coord) {
            square.road = true;
        }
        Ok(id)
    }


    /// Hands a colony, its workers, and every unit on its square to `nation`.
    /// Returns the ids of all transferred units.
    pub fn transfer_colony(&mut self, id: ColonyId, nation: Nation) -> Result<Vec<UnitId>, WorldError> {
        let coord = self.colony(id)?.coord;
        self.colony_mut(id)?.nation = nation;
        let mut moved = self.colony_workers(id);
        moved.extend(self.units_at(coord));
        for unit in &moved {
            self.change_nation(*unit, nation)?;
        }
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::TurnState;
    use crate::world::terrain::{Square, Terrain};
    use crate::world::unit::BaseType;

    fn world() -> WorldState {
        let mut w = WorldState::new(
            TerrainMap::filled(8, 8, Square::new(Terrain::Plains)),
            TurnState::default(),
        );
        w.add_nation(Nation::English, true);
        w.add_nation(Nation::French, false);
        w
    }

    #[test]
    fn place_requires_disown() {
        let mut w = world();
        let id = w
            .create_unit_on_map(Nation::English, Composition::colonist(), Coord::new(1, 1))
            .unwrap();
        assert_eq!(w.place_on_map(id, Coord::new(2, 2)), Err(WorldError::NotFree(id)));
        w.relocate(id, Coord::new(2, 2)).unwrap();
        assert_eq!(w.units_at(Coord::new(2, 2)), vec![id]);
        assert!(w.units_at(Coord::new(1, 1)).is_empty());
    }

    #[test]
    fn boarding_and_cargo_coord() {
        let mut w = world();
        let ship = w
            .create_unit_on_map(Nation::English, Composition::of(BaseType::Caravel), Coord::new(3, 3))
            .unwrap();
        let colonist = w
            .create_unit_on_map(Nation::English, Composition::colonist(), Coord::new(2, 3))
            .unwrap();
        w.disown(colonist).unwrap();
        w.board(colonist, ship).unwrap();
        assert_eq!(w.unit_coord(colonist), Some(Coord::new(3, 3)));
        assert_eq!(w.unit(ship).unwrap().cargo_units().collect::<Vec<_>>(), vec![colonist]);
        assert!(w.units_at(Coord::new(2, 3)).is_empty());
    }

    #[test]
    fn cargo_capacity_enforced() {
        let mut w = world();
        let ship = w
            .create_unit_on_map(Nation::English, Composition::of(BaseType::Caravel), Coord::new(3, 3))
            .unwrap();
        for _ in 0..2 {
            let c = w.create_unit(Nation::English, Composition::colonist());
            w.board(c, ship).unwrap();
        }
        let extra = w.create_unit(Nation::English, Composition::colonist());
        assert!(matches!(w.board(extra, ship), Err(WorldError::NoCargoSpace { .. })));
    }

    #[test]
    fn destroy_cascades_to_cargo() {
        let mut w = world();
        let ship = w
            .create_unit_on_map(Nation::English, Composition::of(BaseType::Galleon), Coord::new(3, 3))
            .unwrap();
        let a = w.create_unit(Nation::English, Composition::colonist());
        let b = w.create_unit(Nation::English, Composition::soldier());
        w.board(a, ship).unwrap();
        w.board(b, ship).unwrap();
        let destroyed = w.destroy_unit(ship).unwrap();
        assert_eq!(destroyed, vec![ship, a, b]);
        assert!(w.units.is_empty());
        assert!(w.units_at(Coord::new(3, 3)).is_empty());
    }

    #[test]
    fn transfer_colony_moves_workers_and_garrison() {
        let mut w = world();
        let coord = Coord::new(4, 4);
        let colony = w.create_colony(Nation::English, "Plymouth".into(), coord).unwrap();
        let worker = w.create_unit(Nation::English, Composition::colonist());
        w.join_colony(worker, colony, Job::Farmer).unwrap();
        let wagon = w
            .create_unit_on_map(Nation::English, Composition::of(BaseType::WagonTrain), coord)
            .unwrap();

        let moved = w.transfer_colony(colony, Nation::French).unwrap();
        assert_eq!(moved.len(), 2);
        assert_eq!(w.colony(colony).unwrap().nation, Nation::French);
        assert_eq!(w.unit(worker).unwrap().nation, Nation::French);
        assert_eq!(w.unit(wagon).unwrap().nation, Nation::French);
    }

    #[test]
    fn reindex_restores_square_index() {
        let mut w = world();
        let id = w
            .create_unit_on_map(Nation::French, Composition::soldier(), Coord::new(5, 5))
            .unwrap();
        let json = serde_json::to_string(&w).unwrap();
        let mut loaded: WorldState = serde_json::from_str(&json).unwrap();
        assert!(loaded.units_at(Coord::new(5, 5)).is_empty());
        loaded.reindex();
        assert_eq!(loaded.units_at(Coord::new(5, 5)), vec![id]);
    }
}
