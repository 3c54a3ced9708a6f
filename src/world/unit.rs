//! Unit types, composition, movement points, and unit state.
//!
//! A unit's role (soldier, dragoon, scout, pioneer, ...) is not stored; it
//! is derived from its base type plus the equipment it carries, so that
//! demotion and capture are plain composition changes.

use serde::{Deserialize, Serialize};

use super::colony::{ColonyId, Commodity, Job};
use super::coord::Coord;
use super::nation::Nation;

/// Stable identity of a unit for the lifetime of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Movement points, stored in thirds of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementPoints(i32);

impl MovementPoints {
    pub const ZERO: MovementPoints = MovementPoints(0);

    pub const fn whole(points: i32) -> Self {
        MovementPoints(points * 3)
    }

    pub const fn thirds(thirds: i32) -> Self {
        MovementPoints(thirds)
    }

    pub const fn atoms(self) -> i32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 <= 0
    }

    /// True when the value is not a whole number of points.
    pub const fn has_fraction(self) -> bool {
        self.0 % 3 != 0
    }

    pub fn saturating_sub(self, other: MovementPoints) -> MovementPoints {
        MovementPoints((self.0 - other.0).max(0))
    }
}

impl std::ops::Add for MovementPoints {
    type Output = MovementPoints;
    fn add(self, rhs: MovementPoints) -> MovementPoints {
        MovementPoints(self.0 + rhs.0)
    }
}

impl std::fmt::Display for MovementPoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / 3;
        let frac = self.0 % 3;
        match (whole, frac) {
            (_, 0) => write!(f, "{}", whole),
            (0, n) => write!(f, "{}/3", n),
            (w, n) => write!(f, "{} {}/3", w, n),
        }
    }
}

/// The base type of a unit, before equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    FreeColonist,
    IndenturedServant,
    ExpertFarmer,
    ExpertFisherman,
    ExpertLumberjack,
    ElderStatesman,
    VeteranSoldier,
    Artillery,
    DamagedArtillery,
    WagonTrain,
    Caravel,
    Merchantman,
    Galleon,
    Privateer,
    Frigate,
}

impl BaseType {
    /// Human units can carry muskets, horses and tools, and work in colonies.
    pub const fn is_human(self) -> bool {
        matches!(
            self,
            BaseType::FreeColonist
                | BaseType::IndenturedServant
                | BaseType::ExpertFarmer
                | BaseType::ExpertFisherman
                | BaseType::ExpertLumberjack
                | BaseType::ElderStatesman
                | BaseType::VeteranSoldier
        )
    }

    pub const fn is_ship(self) -> bool {
        matches!(
            self,
            BaseType::Caravel
                | BaseType::Merchantman
                | BaseType::Galleon
                | BaseType::Privateer
                | BaseType::Frigate
        )
    }

    /// The colony job this base type is an expert at, if any.
    pub const fn expertise(self) -> Option<Job> {
        match self {
            BaseType::ExpertFarmer => Some(Job::Farmer),
            BaseType::ExpertFisherman => Some(Job::Fisherman),
            BaseType::ExpertLumberjack => Some(Job::Lumberjack),
            BaseType::ElderStatesman => Some(Job::Statesman),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BaseType::FreeColonist => "Free Colonist",
            BaseType::IndenturedServant => "Indentured Servant",
            BaseType::ExpertFarmer => "Expert Farmer",
            BaseType::ExpertFisherman => "Expert Fisherman",
            BaseType::ExpertLumberjack => "Expert Lumberjack",
            BaseType::ElderStatesman => "Elder Statesman",
            BaseType::VeteranSoldier => "Veteran Colonist",
            BaseType::Artillery => "Artillery",
            BaseType::DamagedArtillery => "Damaged Artillery",
            BaseType::WagonTrain => "Wagon Train",
            BaseType::Caravel => "Caravel",
            BaseType::Merchantman => "Merchantman",
            BaseType::Galleon => "Galleon",
            BaseType::Privateer => "Privateer",
            BaseType::Frigate => "Frigate",
        }
    }
}

/// The role a unit currently plays, derived from its composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitRole {
    Colonist,
    Soldier,
    Dragoon,
    Scout,
    Pioneer,
    Artillery,
    DamagedArtillery,
    WagonTrain,
    Ship,
}

/// Base type plus carried equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Composition {
    pub base: BaseType,
    pub muskets: bool,
    pub horses: bool,
    /// Tools carried, 0..=100 in steps of 20.
    pub tools: u8,
}

/// Tools consumed by one completed plow or road job.
pub const TOOLS_PER_JOB: u8 = 20;

/// Quantity of muskets or horses that one unit of equipment represents.
pub const EQUIPMENT_QUANTITY: i32 = 50;

impl Composition {
    pub const fn of(base: BaseType) -> Self {
        Composition {
            base,
            muskets: false,
            horses: false,
            tools: 0,
        }
    }

    pub const fn colonist() -> Self {
        Composition::of(BaseType::FreeColonist)
    }

    pub const fn soldier() -> Self {
        Composition {
            muskets: true,
            ..Composition::colonist()
        }
    }

    pub const fn dragoon() -> Self {
        Composition {
            muskets: true,
            horses: true,
            ..Composition::colonist()
        }
    }

    pub const fn scout() -> Self {
        Composition {
            horses: true,
            ..Composition::colonist()
        }
    }

    pub const fn pioneer(tools: u8) -> Self {
        Composition {
            tools,
            ..Composition::colonist()
        }
    }

    pub const fn with_base(self, base: BaseType) -> Self {
        Composition { base, ..self }
    }

    pub const fn role(&self) -> UnitRole {
        match self.base {
            BaseType::Artillery => UnitRole::Artillery,
            BaseType::DamagedArtillery => UnitRole::DamagedArtillery,
            BaseType::WagonTrain => UnitRole::WagonTrain,
            b if b.is_ship() => UnitRole::Ship,
            _ => {
                if self.muskets && self.horses {
                    UnitRole::Dragoon
                } else if self.muskets {
                    UnitRole::Soldier
                } else if self.horses {
                    UnitRole::Scout
                } else if self.tools > 0 {
                    UnitRole::Pioneer
                } else {
                    UnitRole::Colonist
                }
            }
        }
    }

    pub const fn is_ship(&self) -> bool {
        self.base.is_ship()
    }

    pub const fn is_land(&self) -> bool {
        !self.base.is_ship()
    }

    /// Units that defend a colony square and guard stacks.
    pub fn is_military(&self) -> bool {
        matches!(
            self.role(),
            UnitRole::Soldier | UnitRole::Dragoon | UnitRole::Artillery | UnitRole::DamagedArtillery
        ) || (self.is_ship() && self.attack_base() > 0)
    }

    fn is_veteran(&self) -> bool {
        matches!(self.base, BaseType::VeteranSoldier)
            && matches!(self.role(), UnitRole::Soldier | UnitRole::Dragoon)
    }

    fn attack_base(&self) -> u32 {
        match self.role() {
            UnitRole::Soldier => 2,
            UnitRole::Dragoon => 3,
            UnitRole::Artillery => 5,
            UnitRole::DamagedArtillery => 3,
            UnitRole::Ship => match self.base {
                BaseType::Privateer => 8,
                BaseType::Frigate => 16,
                _ => 0,
            },
            _ => 0,
        }
    }

    fn defense_base(&self) -> u32 {
        match self.role() {
            UnitRole::Soldier => 2,
            UnitRole::Dragoon => 3,
            UnitRole::Artillery => 3,
            UnitRole::DamagedArtillery => 2,
            UnitRole::Ship => match self.base {
                BaseType::Caravel => 2,
                BaseType::Merchantman => 6,
                BaseType::Galleon => 10,
                BaseType::Privateer => 8,
                BaseType::Frigate => 16,
                _ => 1,
            },
            _ => 1,
        }
    }

    /// Attack strength in hundredths.
    pub fn attack(&self) -> u32 {
        let base = self.attack_base() * 100;
        if self.is_veteran() {
            base * 3 / 2
        } else {
            base
        }
    }

    /// Defense strength in hundredths, before terrain or fortification.
    pub fn defense(&self) -> u32 {
        let base = self.defense_base() * 100;
        if self.is_veteran() {
            base * 3 / 2
        } else {
            base
        }
    }

    pub fn can_attack(&self) -> bool {
        self.attack_base() > 0
    }

    /// Movement allotment at the start of each turn, without father bonuses.
    pub fn movement_points(&self) -> MovementPoints {
        let whole = match self.role() {
            UnitRole::Dragoon | UnitRole::Scout => 4,
            UnitRole::WagonTrain => 2,
            UnitRole::Ship => match self.base {
                BaseType::Caravel => 4,
                BaseType::Merchantman => 5,
                BaseType::Galleon => 6,
                BaseType::Privateer => 8,
                BaseType::Frigate => 6,
                _ => 4,
            },
            _ => 1,
        };
        MovementPoints::whole(whole)
    }

    /// Number of cargo slots; zero for units that cannot carry anything.
    pub const fn cargo_slots(&self) -> usize {
        match self.base {
            BaseType::WagonTrain | BaseType::Caravel | BaseType::Privateer => 2,
            BaseType::Merchantman | BaseType::Frigate => 4,
            BaseType::Galleon => 6,
            _ => 0,
        }
    }

    /// Whether this unit may carry other units (wagon trains carry goods only).
    pub const fn carries_units(&self) -> bool {
        self.base.is_ship()
    }

    /// Composition after losing a fight, or `None` if the unit is destroyed.
    pub fn demoted(&self) -> Option<Composition> {
        match self.role() {
            UnitRole::Dragoon => Some(Composition {
                horses: false,
                ..*self
            }),
            UnitRole::Soldier => Some(Composition {
                muskets: false,
                ..*self
            }),
            UnitRole::Artillery => Some(Composition::of(BaseType::DamagedArtillery)),
            _ => None,
        }
    }

    /// Composition after a promotion-worthy victory, if any.
    pub fn promoted(&self) -> Option<Composition> {
        match (self.role(), self.base) {
            (UnitRole::Soldier | UnitRole::Dragoon, BaseType::FreeColonist) => {
                Some(self.with_base(BaseType::VeteranSoldier))
            }
            _ => None,
        }
    }

    /// The bare unit plus the equipment it was carrying, as commodities.
    pub fn stripped(&self) -> (Composition, Vec<(Commodity, i32)>) {
        let mut goods = Vec::new();
        if self.muskets {
            goods.push((Commodity::Muskets, EQUIPMENT_QUANTITY));
        }
        if self.horses {
            goods.push((Commodity::Horses, EQUIPMENT_QUANTITY));
        }
        if self.tools > 0 {
            goods.push((Commodity::Tools, i32::from(self.tools)));
        }
        (Composition::of(self.base), goods)
    }

    pub fn name(&self) -> String {
        let veteran = matches!(self.base, BaseType::VeteranSoldier);
        match self.role() {
            UnitRole::Soldier if veteran => "Veteran Soldier".to_string(),
            UnitRole::Dragoon if veteran => "Veteran Dragoon".to_string(),
            UnitRole::Soldier => "Soldier".to_string(),
            UnitRole::Dragoon => "Dragoon".to_string(),
            UnitRole::Scout => "Scout".to_string(),
            UnitRole::Pioneer => "Pioneer".to_string(),
            _ => self.base.name().to_string(),
        }
    }
}

/// The per-turn order state a unit carries between activations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitOrders {
    #[default]
    None,
    Fortifying,
    Fortified,
    Sentry,
    Plow {
        turns_worked: u8,
    },
    Road {
        turns_worked: u8,
    },
    Damaged {
        turns_until_repair: u8,
    },
}

/// Progress of a ship between the map and its home harbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortStatus {
    Outbound { turns_remaining: u8 },
    InPort,
    Inbound { turns_remaining: u8 },
}

/// Where a unit currently lives. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ownership {
    /// Transient state between disowning and re-owning.
    Free,
    World {
        coord: Coord,
    },
    Cargo {
        holder: UnitId,
    },
    Colony {
        colony: ColonyId,
        job: Job,
    },
    Harbor {
        status: PortStatus,
        /// Where the ship left the map, used to place it on return.
        sailed_from: Option<Coord>,
    },
}

/// One occupied cargo slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CargoItem {
    Unit(UnitId),
    Goods { commodity: Commodity, quantity: i32 },
}

/// A unit in the world store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub nation: Nation,
    pub composition: Composition,
    pub mv_pts: MovementPoints,
    pub orders: UnitOrders,
    pub ownership: Ownership,
    pub cargo: Vec<CargoItem>,
    /// Set once the automatic per-turn effects have been applied.
    pub evolved: bool,
}

impl Unit {
    pub fn is_ship(&self) -> bool {
        self.composition.is_ship()
    }

    pub fn role(&self) -> UnitRole {
        self.composition.role()
    }

    pub fn name(&self) -> String {
        self.composition.name()
    }

    pub fn cargo_units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.cargo.iter().filter_map(|c| match c {
            CargoItem::Unit(id) => Some(*id),
            CargoItem::Goods { .. } => None,
        })
    }

    pub fn has_free_slot(&self) -> bool {
        self.cargo.len() < self.composition.cargo_slots()
    }

    pub fn coord_if_on_map(&self) -> Option<Coord> {
        match self.ownership {
            Ownership::World { coord } => Some(coord),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_follow_equipment() {
        assert_eq!(Composition::colonist().role(), UnitRole::Colonist);
        assert_eq!(Composition::soldier().role(), UnitRole::Soldier);
        assert_eq!(Composition::dragoon().role(), UnitRole::Dragoon);
        assert_eq!(Composition::scout().role(), UnitRole::Scout);
        assert_eq!(Composition::pioneer(40).role(), UnitRole::Pioneer);
        assert_eq!(Composition::of(BaseType::Galleon).role(), UnitRole::Ship);
    }

    #[test]
    fn demotion_chain() {
        let dragoon = Composition::dragoon();
        let soldier = dragoon.demoted().unwrap();
        assert_eq!(soldier.role(), UnitRole::Soldier);
        let colonist = soldier.demoted().unwrap();
        assert_eq!(colonist.role(), UnitRole::Colonist);
        assert!(colonist.demoted().is_none());

        let art = Composition::of(BaseType::Artillery);
        let damaged = art.demoted().unwrap();
        assert_eq!(damaged.role(), UnitRole::DamagedArtillery);
        assert!(damaged.demoted().is_none());
    }

    #[test]
    fn veterans_are_stronger() {
        let soldier = Composition::soldier();
        let veteran = soldier.promoted().unwrap();
        assert_eq!(soldier.attack(), 200);
        assert_eq!(veteran.attack(), 300);
        assert_eq!(veteran.name(), "Veteran Soldier");
        assert!(veteran.promoted().is_none());
    }

    #[test]
    fn scouts_and_merchants_cannot_attack() {
        assert!(!Composition::scout().can_attack());
        assert!(!Composition::of(BaseType::Merchantman).can_attack());
        assert!(Composition::of(BaseType::Privateer).can_attack());
    }

    #[test]
    fn stripping_returns_goods() {
        let (bare, goods) = Composition::dragoon().stripped();
        assert_eq!(bare, Composition::colonist());
        assert_eq!(
            goods,
            vec![(Commodity::Muskets, 50), (Commodity::Horses, 50)]
        );
    }

    #[test]
    fn movement_points_display() {
        assert_eq!(MovementPoints::whole(2).to_string(), "2");
        assert_eq!(MovementPoints::thirds(1).to_string(), "1/3");
        assert_eq!(MovementPoints::thirds(5).to_string(), "1 2/3");
        assert!(MovementPoints::thirds(2).has_fraction());
        assert!(!MovementPoints::whole(1).has_fraction());
    }
}
