//! Colonies, their buildings, stock, and jobs.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::coord::Coord;
use super::nation::Nation;

/// Stable identity of a colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColonyId(pub u32);

impl std::fmt::Display for ColonyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "colony#{}", self.0)
    }
}

/// A tradeable good stored in colonies or carried as cargo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Commodity {
    Food,
    Lumber,
    Ore,
    Furs,
    Tools,
    Muskets,
    Horses,
}

pub const ALL_COMMODITIES: [Commodity; 7] = [
    Commodity::Food,
    Commodity::Lumber,
    Commodity::Ore,
    Commodity::Furs,
    Commodity::Tools,
    Commodity::Muskets,
    Commodity::Horses,
];

impl Commodity {
    pub const fn name(self) -> &'static str {
        match self {
            Commodity::Food => "food",
            Commodity::Lumber => "lumber",
            Commodity::Ore => "ore",
            Commodity::Furs => "furs",
            Commodity::Tools => "tools",
            Commodity::Muskets => "muskets",
            Commodity::Horses => "horses",
        }
    }
}

/// What a colonist does inside a colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Job {
    Farmer,
    Fisherman,
    Lumberjack,
    Carpenter,
    Statesman,
    FurTrapper,
    OreMiner,
}

/// Colony buildings that can be constructed with hammers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Building {
    Stockade,
    Docks,
    Warehouse,
    Drydock,
}

impl Building {
    /// Hammers needed to complete construction.
    pub const fn hammer_cost(self) -> i32 {
        match self {
            Building::Stockade => 64,
            Building::Docks => 52,
            Building::Warehouse => 80,
            Building::Drydock => 120,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Building::Stockade => "stockade",
            Building::Docks => "docks",
            Building::Warehouse => "warehouse",
            Building::Drydock => "drydock",
        }
    }
}

/// A colony on the map. Its workers are the units whose ownership
/// points at this colony; they are not duplicated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colony {
    pub id: ColonyId,
    pub name: String,
    pub nation: Nation,
    pub coord: Coord,
    pub buildings: BTreeSet<Building>,
    pub stock: BTreeMap<Commodity, i32>,
    pub construction: Option<Building>,
    pub hammers: i32,
}

impl Colony {
    pub fn new(id: ColonyId, name: String, nation: Nation, coord: Coord) -> Self {
        Colony {
            id,
            name,
            nation,
            coord,
            buildings: BTreeSet::new(),
            stock: BTreeMap::new(),
            construction: None,
            hammers: 0,
        }
    }

    pub fn has(&self, building: Building) -> bool {
        self.buildings.contains(&building)
    }

    pub fn quantity(&self, commodity: Commodity) -> i32 {
        self.stock.get(&commodity).copied().unwrap_or(0)
    }

    pub fn add(&mut self, commodity: Commodity, quantity: i32) {
        *self.stock.entry(commodity).or_insert(0) += quantity;
    }

    /// Storage limit for goods other than food.
    pub fn warehouse_capacity(&self) -> i32 {
        if self.has(Building::Warehouse) {
            200
        } else {
            100
        }
    }
}
