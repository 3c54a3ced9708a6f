//! Travel verdicts: what happens when a unit is ordered one square over.
//!
//! The destination is classified along three axes (surface, relationship
//! of its occupants to the mover, and what occupies it) and the outcome is
//! read from a fixed table, one for land units and one for ships. Entries
//! marked `Unreachable` are combinations the world cannot produce; hitting
//! one is an engine error.
//!
//! Every verdict that lets the unit act passes through the movement ledger
//! first. The resolver records whether it did and checks that against
//! `TravelVerdict::requires_mv_check` before returning.

use crate::error::EngineError;
use crate::resolve::attack::AttackHandler;
use crate::resolve::handler::OrderHandler;
use crate::resolve::movement::{movement_cost, settle, Exemption, PointsOutcome};
use crate::session::{Animation, AnimationSequence, Session};
use crate::turn::fog::reveal_around;
use crate::world::{
    ColonyId, Coord, Direction, MovementPoints, Ownership, PortStatus, Surface, TerrainMap, UnitId,
    UnitOrders, WorldState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    Neutral,
    Friendly,
    Foreign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Empty,
    Unit,
    Colony,
}

pub const ALL_RELATIONSHIPS: [Relationship; 3] =
    [Relationship::Neutral, Relationship::Friendly, Relationship::Foreign];
pub const ALL_ENTITIES: [Entity; 3] = [Entity::Empty, Entity::Unit, Entity::Colony];

/// One entry of the travel tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelRule {
    Unreachable,
    Move,
    Board,
    Port,
    LandFall,
    Attack,
    LandForbidden,
    WaterForbidden,
}

use TravelRule::{Attack, Board, LandFall, LandForbidden, Move, Port, Unreachable, WaterForbidden};

/// Land units, indexed `[surface][relationship][entity]`.
const LAND_UNIT_RULES: [[[TravelRule; 3]; 3]; 2] = [
    // land
    [
        [Move, Unreachable, Unreachable],
        [Unreachable, Move, Move],
        [Unreachable, Attack, Attack],
    ],
    // water
    [
        [WaterForbidden, Unreachable, Unreachable],
        [Unreachable, Board, Unreachable],
        [Unreachable, Attack, Unreachable],
    ],
];

/// Ships, indexed `[surface][relationship][entity]`.
const SHIP_RULES: [[[TravelRule; 3]; 3]; 2] = [
    // land
    [
        [LandFall, Unreachable, Unreachable],
        [Unreachable, LandFall, Port],
        [Unreachable, Attack, Attack],
    ],
    // water
    [
        [Move, Unreachable, Unreachable],
        [Unreachable, Move, Unreachable],
        [Unreachable, Attack, Unreachable],
    ],
];

pub fn travel_rule(is_ship: bool, surface: Surface, relationship: Relationship, entity: Entity) -> TravelRule {
    let table = if is_ship { &SHIP_RULES } else { &LAND_UNIT_RULES };
    let s = match surface {
        Surface::Land => 0,
        Surface::Water => 1,
    };
    let r = match relationship {
        Relationship::Neutral => 0,
        Relationship::Friendly => 1,
        Relationship::Foreign => 2,
    };
    let e = match entity {
        Entity::Empty => 0,
        Entity::Unit => 1,
        Entity::Colony => 2,
    };
    table[s][r][e]
}

/// The classified contents of a destination square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub surface: Surface,
    pub relationship: Relationship,
    pub entity: Entity,
    pub colony: Option<ColonyId>,
    pub units: Vec<UnitId>,
}

pub fn classify(world: &WorldState, nation: crate::world::Nation, coord: Coord) -> Destination {
    let surface = world
        .map
        .square(coord)
        .map_or(Surface::Water, |s| s.surface());
    let colony = world.colony_at(coord);
    let units = world.units_at(coord);
    let owner = match colony {
        Some(c) => Some(c.nation),
        None => units
            .first()
            .and_then(|id| world.units.get(id))
            .map(|u| u.nation),
    };
    let relationship = match owner {
        None => Relationship::Neutral,
        Some(n) if n == nation => Relationship::Friendly,
        Some(_) => Relationship::Foreign,
    };
    let entity = if colony.is_some() {
        Entity::Colony
    } else if !units.is_empty() {
        Entity::Unit
    } else {
        Entity::Empty
    };
    Destination {
        surface,
        relationship,
        entity,
        colony: colony.map(|c| c.id),
        units,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TravelVerdict {
    /// Off the map where there is no way to the high seas.
    MapEdge,
    /// Off the east or west edge, confirmed; the ship heads for the harbor.
    MapEdgeHighSeas,
    LandForbidden,
    WaterForbidden,
    BoardShip { ship: UnitId },
    BoardShipFull,
    MapToMap,
    OffboardShip,
    ShipIntoPort { colony: ColonyId },
    LandFall { passengers: Vec<UnitId> },
    SailHighSeas,
    /// No points left; the unit stays put.
    ConsumeRemainingPoints,
    Cancelled,
}

impl TravelVerdict {
    pub const fn name(&self) -> &'static str {
        match self {
            TravelVerdict::MapEdge => "map_edge",
            TravelVerdict::MapEdgeHighSeas => "map_edge_high_seas",
            TravelVerdict::LandForbidden => "land_forbidden",
            TravelVerdict::WaterForbidden => "water_forbidden",
            TravelVerdict::BoardShip { .. } => "board_ship",
            TravelVerdict::BoardShipFull => "board_ship_full",
            TravelVerdict::MapToMap => "map_to_map",
            TravelVerdict::OffboardShip => "offboard_ship",
            TravelVerdict::ShipIntoPort { .. } => "ship_into_port",
            TravelVerdict::LandFall { .. } => "land_fall",
            TravelVerdict::SailHighSeas => "sail_high_seas",
            TravelVerdict::ConsumeRemainingPoints => "consume_remaining_points",
            TravelVerdict::Cancelled => "cancelled",
        }
    }

    /// Whether reaching this verdict must have gone through the ledger.
    pub const fn requires_mv_check(&self) -> bool {
        match self {
            TravelVerdict::MapEdgeHighSeas
            | TravelVerdict::BoardShip { .. }
            | TravelVerdict::MapToMap
            | TravelVerdict::OffboardShip
            | TravelVerdict::ShipIntoPort { .. }
            | TravelVerdict::LandFall { .. }
            | TravelVerdict::SailHighSeas
            | TravelVerdict::ConsumeRemainingPoints => true,
            TravelVerdict::MapEdge
            | TravelVerdict::LandForbidden
            | TravelVerdict::WaterForbidden
            | TravelVerdict::BoardShipFull
            | TravelVerdict::Cancelled => false,
        }
    }

    /// Whether the order goes ahead to `perform`.
    pub const fn proceeds(&self) -> bool {
        self.requires_mv_check()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelResolution {
    pub verdict: TravelVerdict,
    pub from: Coord,
    pub to: Coord,
    pub direction: Direction,
    pub subtract: MovementPoints,
    pub exemption: Option<Exemption>,
    pub mv_checked: bool,
}

/// Result of classifying a move order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Travel(TravelResolution),
    /// The destination holds a foreign unit or colony.
    Attack,
}

/// Whether moving a ship from `from` to the sea-lane square `to` asks to
/// sail for the high seas. On the east half both squares must be sea lane
/// and the ship must head NE, E or SE; on the west half only the
/// destination must be sea lane and the ship must head NW, W or SW.
pub fn asks_high_seas(map: &TerrainMap, from: Coord, to: Coord, direction: Direction) -> bool {
    if !map.is_sea_lane(to) {
        return false;
    }
    if from.x >= map.width() / 2 {
        map.is_sea_lane(from) && matches!(direction, Direction::NE | Direction::E | Direction::SE)
    } else {
        matches!(direction, Direction::NW | Direction::W | Direction::SW)
    }
}

struct Ledger {
    checked: bool,
    subtract: MovementPoints,
    exemption: Option<Exemption>,
}

impl Ledger {
    /// Runs the movement check and maps its outcome onto `on_success`.
    fn pay(
        &mut self,
        session: &mut Session<'_>,
        unit: UnitId,
        cost: MovementPoints,
        on_success: TravelVerdict,
    ) -> Result<TravelVerdict, EngineError> {
        match settle(session, unit, cost)? {
            PointsOutcome::Proceed { subtract, exemption } => {
                self.checked = true;
                self.subtract = subtract;
                self.exemption = exemption;
                Ok(on_success)
            }
            PointsOutcome::Forfeit => {
                self.checked = true;
                Ok(TravelVerdict::ConsumeRemainingPoints)
            }
            PointsOutcome::Cancelled => Ok(TravelVerdict::Cancelled),
        }
    }
}

/// Classifies a move order. May prompt; never mutates the world.
pub fn resolve_travel(session: &mut Session<'_>, unit: UnitId, direction: Direction) -> Result<Classified, EngineError> {
    let u = session.world.unit(unit)?;
    let nation = u.nation;
    let is_ship = u.is_ship();
    let in_cargo = matches!(u.ownership, Ownership::Cargo { .. });
    let from = session
        .world
        .unit_coord(unit)
        .ok_or_else(|| EngineError::Invariant(format!("{} is not on the map", unit)))?;
    let to = from.moved(direction);
    let mut ledger = Ledger {
        checked: false,
        subtract: MovementPoints::ZERO,
        exemption: None,
    };

    let verdict = if !session.world.map.contains(to) {
        if !is_ship || in_cargo || !session.world.map.beyond_east_west_edge(to) {
            TravelVerdict::MapEdge
        } else if session.ask(nation, "Sail to the high seas?", true) {
            ledger.pay(session, unit, MovementPoints::whole(1), TravelVerdict::MapEdgeHighSeas)?
        } else {
            TravelVerdict::Cancelled
        }
    } else {
        let dest = classify(session.world, nation, to);
        let cost = movement_cost(session.world, nation, from, to);
        match travel_rule(is_ship, dest.surface, dest.relationship, dest.entity) {
            TravelRule::Unreachable => {
                return Err(EngineError::UnreachableTravel(format!(
                    "ship={} {:?}/{:?}/{:?} at {}",
                    is_ship, dest.surface, dest.relationship, dest.entity, to
                )))
            }
            TravelRule::Attack => return Ok(Classified::Attack),
            TravelRule::LandForbidden => TravelVerdict::LandForbidden,
            TravelRule::WaterForbidden => TravelVerdict::WaterForbidden,
            TravelRule::Board => {
                let ship = dest.units.iter().copied().find(|id| {
                    session
                        .world
                        .units
                        .get(id)
                        .is_some_and(|s| s.composition.carries_units() && s.has_free_slot())
                });
                match ship {
                    Some(ship) => ledger.pay(session, unit, cost, TravelVerdict::BoardShip { ship })?,
                    None => TravelVerdict::BoardShipFull,
                }
            }
            TravelRule::Move => {
                let sail = is_ship && asks_high_seas(&session.world.map, from, to, direction);
                if sail && session.ask(nation, "Sail to the high seas?", false) {
                    ledger.pay(session, unit, cost, TravelVerdict::SailHighSeas)?
                } else if in_cargo {
                    ledger.pay(session, unit, cost, TravelVerdict::OffboardShip)?
                } else {
                    ledger.pay(session, unit, cost, TravelVerdict::MapToMap)?
                }
            }
            TravelRule::Port => match dest.colony {
                Some(colony) => ledger.pay(session, unit, cost, TravelVerdict::ShipIntoPort { colony })?,
                None => return Err(EngineError::Invariant(format!("no colony at port {}", to))),
            },
            TravelRule::LandFall => {
                let aboard: Vec<UnitId> = session
                    .world
                    .unit(unit)?
                    .cargo_units()
                    .filter(|p| session.world.units.get(p).is_some_and(|p| !p.mv_pts.is_zero()))
                    .collect();
                if aboard.is_empty() {
                    TravelVerdict::LandForbidden
                } else if session.ask(nation, "Make landfall?", true) {
                    let mut passengers = Vec::with_capacity(aboard.len());
                    for p in aboard {
                        match settle(session, p, cost)? {
                            PointsOutcome::Proceed { .. } => passengers.push(p),
                            PointsOutcome::Forfeit | PointsOutcome::Cancelled => {
                                log::debug!("{} stays aboard {}", p, unit);
                            }
                        }
                    }
                    if passengers.is_empty() {
                        TravelVerdict::Cancelled
                    } else {
                        // Going ashore spends whatever the passengers have left.
                        ledger.checked = true;
                        TravelVerdict::LandFall { passengers }
                    }
                } else {
                    TravelVerdict::Cancelled
                }
            }
        }
    };

    if ledger.checked != verdict.requires_mv_check() {
        return Err(EngineError::MovementCheckMismatch {
            verdict: verdict.name(),
            checked: ledger.checked,
        });
    }
    log::debug!("{} {} move {}: {}", nation, unit, direction.abbr(), verdict.name());
    Ok(Classified::Travel(TravelResolution {
        verdict,
        from,
        to,
        direction,
        subtract: ledger.subtract,
        exemption: ledger.exemption,
        mv_checked: ledger.checked,
    }))
}

fn refusal_text(verdict: &TravelVerdict) -> Option<&'static str> {
    match verdict {
        TravelVerdict::MapEdge => Some("We cannot leave the map here."),
        TravelVerdict::LandForbidden => Some("Ships cannot sail onto land."),
        TravelVerdict::WaterForbidden => Some("Land units need a ship to cross water."),
        TravelVerdict::BoardShipFull => Some("There is no room aboard that ship."),
        _ => None,
    }
}

/// Handler for `Order::Move`.
pub struct TravelHandler {
    unit: UnitId,
    direction: Direction,
    resolution: Option<TravelResolution>,
    attack: bool,
}

impl TravelHandler {
    pub fn new(unit: UnitId, direction: Direction) -> Self {
        TravelHandler {
            unit,
            direction,
            resolution: None,
            attack: false,
        }
    }

    pub fn resolution(&self) -> Option<&TravelResolution> {
        self.resolution.as_ref()
    }

    fn spend(world: &mut WorldState, unit: UnitId, points: MovementPoints) -> Result<(), EngineError> {
        let u = world.unit_mut(unit)?;
        u.mv_pts = u.mv_pts.saturating_sub(points);
        u.orders = UnitOrders::None;
        Ok(())
    }
}

impl OrderHandler for TravelHandler {
    fn unit(&self) -> UnitId {
        self.unit
    }

    fn confirm(&mut self, session: &mut Session<'_>) -> Result<bool, EngineError> {
        match resolve_travel(session, self.unit, self.direction)? {
            Classified::Attack => {
                self.attack = true;
                Ok(true)
            }
            Classified::Travel(resolution) => {
                if let Some(text) = refusal_text(&resolution.verdict) {
                    let nation = session.world.unit(self.unit)?.nation;
                    session.message(nation, text);
                }
                let proceeds = resolution.verdict.proceeds();
                self.resolution = Some(resolution);
                Ok(proceeds)
            }
        }
    }

    fn switch_handler(&mut self) -> Option<Box<dyn OrderHandler>> {
        if self.attack {
            self.attack = false;
            Some(Box::new(AttackHandler::new(self.unit, self.direction)))
        } else {
            None
        }
    }

    fn animate(&self, session: &mut Session<'_>) -> Result<(), EngineError> {
        let Some(res) = &self.resolution else {
            return Ok(());
        };
        let slide = |unit| Animation::Slide {
            unit,
            from: res.from,
            direction: res.direction,
        };
        let sequence = match &res.verdict {
            TravelVerdict::MapToMap
            | TravelVerdict::OffboardShip
            | TravelVerdict::BoardShip { .. }
            | TravelVerdict::ShipIntoPort { .. } => AnimationSequence::single(slide(self.unit)),
            TravelVerdict::SailHighSeas | TravelVerdict::MapEdgeHighSeas => AnimationSequence {
                steps: vec![slide(self.unit), Animation::Depixelate { unit: self.unit }],
            },
            TravelVerdict::LandFall { passengers } => AnimationSequence {
                steps: passengers.iter().map(|p| slide(*p)).collect(),
            },
            _ => AnimationSequence::default(),
        };
        session.play(sequence);
        Ok(())
    }

    fn perform(&mut self, session: &mut Session<'_>) -> Result<(), EngineError> {
        let Some(res) = self.resolution.take() else {
            return Err(EngineError::Invariant("travel performed without a verdict".into()));
        };
        let unit = self.unit;
        let world = &mut *session.world;
        match &res.verdict {
            TravelVerdict::MapToMap | TravelVerdict::OffboardShip | TravelVerdict::ShipIntoPort { .. } => {
                world.relocate(unit, res.to)?;
                Self::spend(world, unit, res.subtract)?;
                reveal_around(world, unit);
            }
            TravelVerdict::BoardShip { ship } => {
                if !world.unit_exists(*ship) {
                    return Err(EngineError::UnitVanished(*ship));
                }
                world.disown(unit)?;
                world.board(unit, *ship)?;
                Self::spend(world, unit, res.subtract)?;
                world.unit_mut(unit)?.orders = UnitOrders::Sentry;
            }
            TravelVerdict::LandFall { passengers } => {
                for p in passengers {
                    let aboard = world
                        .units
                        .get(p)
                        .is_some_and(|u| u.ownership == Ownership::Cargo { holder: unit });
                    if !aboard {
                        log::warn!("{} left {} before landfall", p, unit);
                        continue;
                    }
                    world.relocate(*p, res.to)?;
                    let u = world.unit_mut(*p)?;
                    u.mv_pts = MovementPoints::ZERO;
                    u.orders = UnitOrders::None;
                    reveal_around(world, *p);
                }
            }
            TravelVerdict::SailHighSeas | TravelVerdict::MapEdgeHighSeas => {
                world.disown(unit)?;
                world.send_to_harbor(
                    unit,
                    PortStatus::Outbound {
                        turns_remaining: session.config.high_seas_turns,
                    },
                    Some(res.from),
                )?;
                let u = world.unit_mut(unit)?;
                u.mv_pts = MovementPoints::ZERO;
                u.orders = UnitOrders::None;
                log::info!("{} {} sails for the high seas", u.nation, unit);
            }
            TravelVerdict::ConsumeRemainingPoints => {
                world.unit_mut(unit)?.mv_pts = MovementPoints::ZERO;
                let nation = world.unit(unit)?.nation;
                session.message(nation, "The unit could not make the move and loses its remaining movement points.");
            }
            TravelVerdict::MapEdge
            | TravelVerdict::LandForbidden
            | TravelVerdict::WaterForbidden
            | TravelVerdict::BoardShipFull
            | TravelVerdict::Cancelled => {
                return Err(EngineError::Invariant(format!(
                    "perform reached for refused travel {}",
                    res.verdict.name()
                )))
            }
        }
        self.resolution = Some(res);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::handler::{run_order, OrderOutcome};
    use crate::testing::Harness;
    use crate::world::{BaseType, Composition, Nation, Order, Terrain, ALL_DIRECTIONS};

    fn is_impossible(surface: Surface, rel: Relationship, entity: Entity) -> bool {
        let neutral = rel == Relationship::Neutral;
        let empty = entity == Entity::Empty;
        neutral != empty || (surface == Surface::Water && entity == Entity::Colony)
    }

    #[test]
    fn tables_cover_every_combination() {
        for is_ship in [false, true] {
            for surface in [Surface::Land, Surface::Water] {
                for rel in ALL_RELATIONSHIPS {
                    for entity in ALL_ENTITIES {
                        let rule = travel_rule(is_ship, surface, rel, entity);
                        assert_eq!(
                            rule == TravelRule::Unreachable,
                            is_impossible(surface, rel, entity),
                            "ship={} {:?}/{:?}/{:?} -> {:?}",
                            is_ship,
                            surface,
                            rel,
                            entity,
                            rule
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn foreign_occupants_always_mean_attack() {
        for is_ship in [false, true] {
            assert_eq!(
                travel_rule(is_ship, Surface::Land, Relationship::Foreign, Entity::Unit),
                TravelRule::Attack
            );
            assert_eq!(
                travel_rule(is_ship, Surface::Water, Relationship::Foreign, Entity::Unit),
                TravelRule::Attack
            );
        }
    }

    fn travel(h: &mut Harness, unit: UnitId, direction: Direction) -> TravelResolution {
        match resolve_travel(&mut h.session(), unit, direction).unwrap() {
            Classified::Travel(r) => r,
            Classified::Attack => panic!("unexpected attack"),
        }
    }

    #[test]
    fn colonist_moves_one_square() {
        let mut h = Harness::plains(6, 6);
        let id = h.unit(Nation::English, Composition::colonist(), Coord::new(2, 2));
        let outcome = run_order(&mut h.session(), id, Order::Move { direction: Direction::E }).unwrap();
        assert_eq!(outcome, OrderOutcome::Performed);
        let u = h.world.unit(id).unwrap();
        assert_eq!(u.coord_if_on_map(), Some(Coord::new(3, 2)));
        assert!(u.mv_pts.is_zero());
        assert_eq!(h.world.units_at(Coord::new(3, 2)), vec![id]);
    }

    #[test]
    fn land_unit_refused_at_water() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(4..6, false);
        let id = h.unit(Nation::English, Composition::colonist(), Coord::new(3, 2));
        let before = h.world.clone();
        let res = travel(&mut h, id, Direction::E);
        assert_eq!(res.verdict, TravelVerdict::WaterForbidden);
        assert!(!res.mv_checked);
        let outcome = run_order(&mut h.session(), id, Order::Move { direction: Direction::E }).unwrap();
        assert_eq!(outcome, OrderOutcome::Cancelled);
        assert_eq!(h.world.units, before.units);
        assert_eq!(h.ui.messages().len(), 1);
    }

    #[test]
    fn land_unit_boards_friendly_ship() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(4..6, false);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(4, 2));
        let id = h.unit(Nation::English, Composition::soldier(), Coord::new(3, 2));
        let res = travel(&mut h, id, Direction::E);
        assert_eq!(res.verdict, TravelVerdict::BoardShip { ship });
        assert!(res.mv_checked);

        run_order(&mut h.session(), id, Order::Move { direction: Direction::E }).unwrap();
        assert_eq!(h.world.unit(id).unwrap().ownership, Ownership::Cargo { holder: ship });
        assert_eq!(h.world.unit(id).unwrap().orders, UnitOrders::Sentry);
    }

    #[test]
    fn full_ship_refuses_boarding() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(4..6, false);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(4, 2));
        h.passenger(Nation::English, Composition::colonist(), ship);
        h.passenger(Nation::English, Composition::colonist(), ship);
        let id = h.unit(Nation::English, Composition::soldier(), Coord::new(3, 2));
        assert_eq!(travel(&mut h, id, Direction::E).verdict, TravelVerdict::BoardShipFull);
    }

    #[test]
    fn passenger_goes_ashore() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(4..6, false);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(4, 2));
        let id = h.passenger(Nation::English, Composition::colonist(), ship);
        assert_eq!(travel(&mut h, id, Direction::W).verdict, TravelVerdict::OffboardShip);
        run_order(&mut h.session(), id, Order::Move { direction: Direction::W }).unwrap();
        assert_eq!(h.world.unit(id).unwrap().coord_if_on_map(), Some(Coord::new(3, 2)));
        assert!(h.world.unit(ship).unwrap().cargo.is_empty());
    }

    #[test]
    fn landfall_unloads_passengers_with_points() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(4..6, false);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(4, 2));
        let ready = h.passenger(Nation::English, Composition::colonist(), ship);
        let tired = h.passenger(Nation::English, Composition::soldier(), ship);
        h.world.unit_mut(tired).unwrap().mv_pts = MovementPoints::ZERO;

        h.ui.answer_confirm(true);
        let outcome = run_order(&mut h.session(), ship, Order::Move { direction: Direction::W }).unwrap();
        assert_eq!(outcome, OrderOutcome::Performed);
        assert_eq!(h.world.unit(ready).unwrap().coord_if_on_map(), Some(Coord::new(3, 2)));
        assert!(h.world.unit(ready).unwrap().mv_pts.is_zero());
        assert_eq!(h.world.unit(tired).unwrap().ownership, Ownership::Cargo { holder: ship });
        assert_eq!(h.world.unit(ship).unwrap().coord_if_on_map(), Some(Coord::new(4, 2)));
    }

    #[test]
    fn empty_ship_cannot_land() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(4..6, false);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(4, 2));
        assert_eq!(travel(&mut h, ship, Direction::W).verdict, TravelVerdict::LandForbidden);
    }

    #[test]
    fn ship_enters_friendly_port() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(4..6, false);
        let colony = h
            .world
            .create_colony(Nation::English, "Boston".into(), Coord::new(3, 2))
            .unwrap();
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(4, 2));
        assert_eq!(travel(&mut h, ship, Direction::W).verdict, TravelVerdict::ShipIntoPort { colony });
    }

    #[test]
    fn map_edge_high_seas_prompt() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(0..2, true);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(0, 3));
        let before = h.world.clone();

        h.ui.answer_confirm(false);
        let outcome = run_order(&mut h.session(), ship, Order::Move { direction: Direction::W }).unwrap();
        assert_eq!(outcome, OrderOutcome::Cancelled);
        assert_eq!(h.world.units, before.units);

        h.ui.answer_confirm(true);
        let res = travel(&mut h, ship, Direction::W);
        assert_eq!(res.verdict, TravelVerdict::MapEdgeHighSeas);

        h.ui.answer_confirm(true);
        run_order(&mut h.session(), ship, Order::Move { direction: Direction::W }).unwrap();
        match h.world.unit(ship).unwrap().ownership {
            Ownership::Harbor {
                status: PortStatus::Outbound { turns_remaining },
                sailed_from,
            } => {
                assert_eq!(turns_remaining, h.config.high_seas_turns);
                assert_eq!(sailed_from, Some(Coord::new(0, 3)));
            }
            other => panic!("unexpected ownership {:?}", other),
        }
        assert!(h.world.units_at(Coord::new(0, 3)).is_empty());
    }

    #[test]
    fn map_edge_away_from_borders_is_refused() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(0..6, false);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(3, 0));
        let res = travel(&mut h, ship, Direction::N);
        assert_eq!(res.verdict, TravelVerdict::MapEdge);
        assert!(h.ui.questions().is_empty());
    }

    #[test]
    fn high_seas_heuristic_by_hemisphere() {
        let mut h = Harness::plains(10, 4);
        h.flood_columns(0..10, false);
        for x in [0, 1, 7, 8, 9] {
            for y in 0..4 {
                h.world.map.square_mut(Coord::new(x, y)).unwrap().sea_lane = true;
            }
        }
        let map = &h.world.map;
        // east half: both squares lane, heading east
        assert!(asks_high_seas(map, Coord::new(8, 1), Coord::new(9, 1), Direction::E));
        assert!(!asks_high_seas(map, Coord::new(8, 1), Coord::new(7, 1), Direction::W));
        // east half: source must be lane too
        assert!(!asks_high_seas(map, Coord::new(6, 1), Coord::new(7, 1), Direction::E));
        // west half: only destination lane, heading west
        assert!(asks_high_seas(map, Coord::new(2, 1), Coord::new(1, 1), Direction::W));
        assert!(asks_high_seas(map, Coord::new(2, 1), Coord::new(1, 2), Direction::SW));
        assert!(!asks_high_seas(map, Coord::new(1, 1), Coord::new(1, 2), Direction::S));
    }

    #[test]
    fn declining_high_seas_moves_normally() {
        let mut h = Harness::plains(10, 4);
        h.flood_columns(5..10, true);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(7, 1));
        h.ui.answer_confirm(false);
        assert_eq!(travel(&mut h, ship, Direction::E).verdict, TravelVerdict::MapToMap);
        h.ui.answer_confirm(true);
        assert_eq!(travel(&mut h, ship, Direction::E).verdict, TravelVerdict::SailHighSeas);
    }

    #[test]
    fn insufficient_points_forfeit() {
        let mut h = Harness::plains(6, 6);
        h.set_terrain(Coord::new(3, 2), Terrain::Mountains);
        let id = h.unit(Nation::English, Composition::soldier(), Coord::new(2, 2));
        h.world.unit_mut(id).unwrap().mv_pts = MovementPoints::ZERO;
        let res = travel(&mut h, id, Direction::E);
        assert_eq!(res.verdict, TravelVerdict::ConsumeRemainingPoints);
        assert!(res.mv_checked);

        run_order(&mut h.session(), id, Order::Move { direction: Direction::E }).unwrap();
        let u = h.world.unit(id).unwrap();
        assert!(u.mv_pts.is_zero());
        assert_eq!(u.coord_if_on_map(), Some(Coord::new(2, 2)));
    }

    #[test]
    fn overdraw_onto_mountains() {
        let mut h = Harness::plains(6, 6);
        h.set_terrain(Coord::new(3, 2), Terrain::Mountains);
        let id = h.unit(Nation::English, Composition::soldier(), Coord::new(2, 2));
        h.world.unit_mut(id).unwrap().mv_pts = MovementPoints::thirds(2);
        h.ui.answer_confirm(true);
        let outcome = run_order(&mut h.session(), id, Order::Move { direction: Direction::E }).unwrap();
        assert_eq!(outcome, OrderOutcome::Performed);
        let u = h.world.unit(id).unwrap();
        assert!(u.mv_pts.is_zero());
        assert_eq!(u.coord_if_on_map(), Some(Coord::new(3, 2)));
    }

    #[test]
    fn landfall_checks_each_passenger() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(4..6, false);
        h.set_terrain(Coord::new(3, 2), Terrain::Hills);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(4, 2));
        h.world.unit_mut(ship).unwrap().mv_pts = MovementPoints::ZERO;
        let fresh = h.passenger(Nation::English, Composition::colonist(), ship);
        let short = h.passenger(Nation::English, Composition::soldier(), ship);
        h.world.unit_mut(short).unwrap().mv_pts = MovementPoints::thirds(1);

        // Make landfall, then decline the overdraw for the tired soldier.
        h.ui.answer_confirm(true);
        h.ui.answer_confirm(false);
        let res = travel(&mut h, ship, Direction::W);
        assert_eq!(res.verdict, TravelVerdict::LandFall { passengers: vec![fresh] });
        assert!(res.mv_checked);
        assert_eq!(h.ui.questions().len(), 2);
    }

    #[test]
    fn landfall_with_every_passenger_held_back_is_cancelled() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(4..6, false);
        h.set_terrain(Coord::new(3, 2), Terrain::Hills);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(4, 2));
        let short = h.passenger(Nation::English, Composition::colonist(), ship);
        h.world.unit_mut(short).unwrap().mv_pts = MovementPoints::thirds(1);
        let before = h.world.clone();

        h.ui.answer_confirm(true);
        h.ui.answer_confirm(false);
        let outcome = run_order(&mut h.session(), ship, Order::Move { direction: Direction::W }).unwrap();
        assert_eq!(outcome, OrderOutcome::Cancelled);
        assert_eq!(h.world.units, before.units);
        assert_eq!(h.world.unit(short).unwrap().ownership, Ownership::Cargo { holder: ship });
    }

    #[test]
    fn north_off_a_border_column_never_asks_for_high_seas() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(0..2, true);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(0, 0));
        assert_eq!(travel(&mut h, ship, Direction::N).verdict, TravelVerdict::MapEdge);
        assert!(h.ui.questions().is_empty());

        h.ui.answer_confirm(true);
        assert_eq!(travel(&mut h, ship, Direction::NW).verdict, TravelVerdict::MapEdgeHighSeas);
    }

    #[test]
    fn verdicts_agree_with_ledger_everywhere() {
        let mut h = Harness::plains(8, 8);
        h.flood_columns(5..8, true);
        h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(5, 4));
        h.unit(Nation::French, Composition::soldier(), Coord::new(3, 2));
        let mover = h.unit(Nation::English, Composition::dragoon(), Coord::new(4, 3));
        for d in ALL_DIRECTIONS {
            h.ui.answer_confirm(true);
            if let Classified::Travel(res) = resolve_travel(&mut h.session(), mover, d).unwrap() {
                assert_eq!(res.mv_checked, res.verdict.requires_mv_check(), "{:?}", d);
            }
        }
    }
}
