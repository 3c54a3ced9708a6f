//! Attack verdicts and the attack handler.
//!
//! A move into a square held by a foreign unit or colony is redirected
//! here. The resolver picks the defender, refuses attacks the rules do not
//! allow, and describes the fight for the combat oracle. The oracle is
//! consulted at the end of `confirm` so that the animation knows who won.

use crate::error::EngineError;
use crate::resolve::combat::{
    Fight, FightResult, LandOutcome, LandSide, LossRule, NavalOutcome, NavalSide, RepairPort,
};
use crate::resolve::handler::OrderHandler;
use crate::resolve::outcome::{apply_land, apply_naval, capture_colony};
use crate::session::{Animation, AnimationSequence, Session};
use crate::world::{
    Building, Colony, ColonyId, Coord, Direction, MovementPoints, Ownership, Unit, UnitId,
    UnitOrders, WorldState, ALL_DIRECTIONS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackVerdict {
    AttackFromShip,
    UnitCannotAttack,
    LandUnitAttackShip,
    ShipAttackLandUnit,
    Cancelled,
    EuLandUnit { defender: UnitId },
    ColonyDefended { colony: ColonyId, defender: UnitId },
    ColonyUndefended { colony: ColonyId, defender: UnitId },
    ShipOnShip { defender: UnitId },
    /// A ship left stranded on land; the attacker wins outright.
    LandUnitAttackShipOnLand { defender: UnitId },
}

impl AttackVerdict {
    pub const fn name(&self) -> &'static str {
        match self {
            AttackVerdict::AttackFromShip => "attack_from_ship",
            AttackVerdict::UnitCannotAttack => "unit_cannot_attack",
            AttackVerdict::LandUnitAttackShip => "land_unit_attack_ship",
            AttackVerdict::ShipAttackLandUnit => "ship_attack_land_unit",
            AttackVerdict::Cancelled => "cancelled",
            AttackVerdict::EuLandUnit { .. } => "eu_land_unit",
            AttackVerdict::ColonyDefended { .. } => "colony_defended",
            AttackVerdict::ColonyUndefended { .. } => "colony_undefended",
            AttackVerdict::ShipOnShip { .. } => "ship_on_ship",
            AttackVerdict::LandUnitAttackShipOnLand { .. } => "land_unit_attack_ship_on_land",
        }
    }

    pub const fn is_allowed(&self) -> bool {
        matches!(
            self,
            AttackVerdict::EuLandUnit { .. }
                | AttackVerdict::ColonyDefended { .. }
                | AttackVerdict::ColonyUndefended { .. }
                | AttackVerdict::ShipOnShip { .. }
                | AttackVerdict::LandUnitAttackShipOnLand { .. }
        )
    }

    pub const fn defender(&self) -> Option<UnitId> {
        match self {
            AttackVerdict::EuLandUnit { defender }
            | AttackVerdict::ColonyDefended { defender, .. }
            | AttackVerdict::ColonyUndefended { defender, .. }
            | AttackVerdict::ShipOnShip { defender }
            | AttackVerdict::LandUnitAttackShipOnLand { defender } => Some(*defender),
            _ => None,
        }
    }
}

/// Defense in hundredths including fortification and stockade bonuses.
pub fn effective_defense(unit: &Unit, colony: Option<&Colony>) -> u32 {
    let mut defense = unit.composition.defense();
    if unit.orders == UnitOrders::Fortified {
        defense = defense * 3 / 2;
    }
    if !unit.is_ship() && colony.is_some_and(|c| c.has(Building::Stockade)) {
        defense *= 2;
    }
    defense
}

/// Attack in hundredths, scaled down when less than a whole point is left.
pub fn effective_attack(unit: &Unit) -> u32 {
    let attack = unit.composition.attack();
    let thirds = unit.mv_pts.atoms().clamp(0, 3) as u32;
    attack * thirds / 3
}

/// Highest effective defense wins; ties go to the lowest unit id.
pub fn select_defender(world: &WorldState, candidates: &[UnitId], colony: Option<&Colony>) -> Option<UnitId> {
    let mut ids: Vec<UnitId> = candidates.to_vec();
    ids.sort();
    let mut best: Option<(UnitId, u32)> = None;
    for id in ids {
        let Some(unit) = world.units.get(&id) else {
            continue;
        };
        let defense = effective_defense(unit, colony);
        if best.map_or(true, |(_, d)| defense > d) {
            best = Some((id, defense));
        }
    }
    best.map(|(id, _)| id)
}

/// Nearest colony of the ship's nation with a drydock, else the harbor.
pub fn repair_port(world: &WorldState, ship: &Unit, at: Coord) -> RepairPort {
    world
        .colonies
        .values()
        .filter(|c| c.nation == ship.nation && c.has(Building::Drydock))
        .min_by_key(|c| (c.coord.distance(at), c.id))
        .map_or(RepairPort::Harbor, |c| RepairPort::Colony {
            colony: c.id,
            coord: c.coord,
        })
}

/// A free water square next to `at` a non-combat ship could escape to.
fn evade_square(world: &WorldState, at: Coord, attacker_at: Coord) -> Option<Coord> {
    ALL_DIRECTIONS
        .iter()
        .map(|d| at.moved(*d))
        .find(|c| *c != attacker_at && world.map.is_water(*c) && world.units_at(*c).is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackResolution {
    pub verdict: AttackVerdict,
    pub from: Coord,
    pub to: Coord,
    pub direction: Direction,
    pub result: Option<FightResult>,
}

/// Classifies an attack and, when allowed, consults the oracle. May prompt;
/// never mutates the world.
pub fn resolve_attack(session: &mut Session<'_>, unit: UnitId, direction: Direction) -> Result<AttackResolution, EngineError> {
    let world = &*session.world;
    let attacker = world.unit(unit)?;
    let nation = attacker.nation;
    let from = world
        .unit_coord(unit)
        .ok_or_else(|| EngineError::Invariant(format!("attacker {} is not on the map", unit)))?;
    let to = from.moved(direction);
    let colony = world.colony_at(to).filter(|c| c.nation != nation);
    let occupants: Vec<UnitId> = world
        .units_at(to)
        .into_iter()
        .filter(|id| world.units.get(id).is_some_and(|u| u.nation != nation))
        .collect();

    let verdict = if matches!(attacker.ownership, Ownership::Cargo { .. }) {
        AttackVerdict::AttackFromShip
    } else if !attacker.composition.can_attack() {
        AttackVerdict::UnitCannotAttack
    } else if attacker.is_ship() {
        if world.map.is_land(to) {
            AttackVerdict::ShipAttackLandUnit
        } else {
            match select_defender(world, &occupants, None) {
                Some(defender) => AttackVerdict::ShipOnShip { defender },
                None => return Err(EngineError::Invariant(format!("no defender at {}", to))),
            }
        }
    } else if world.map.is_water(to) {
        AttackVerdict::LandUnitAttackShip
    } else if let Some(colony) = colony {
        let military: Vec<UnitId> = occupants
            .iter()
            .copied()
            .filter(|id| {
                world
                    .units
                    .get(id)
                    .is_some_and(|u| !u.is_ship() && u.composition.is_military())
            })
            .collect();
        if let Some(defender) = select_defender(world, &military, Some(colony)) {
            AttackVerdict::ColonyDefended {
                colony: colony.id,
                defender,
            }
        } else {
            match world.colony_workers(colony.id).first() {
                Some(worker) => AttackVerdict::ColonyUndefended {
                    colony: colony.id,
                    defender: *worker,
                },
                None => {
                    return Err(EngineError::Invariant(format!(
                        "colony {} has no workers",
                        colony.name
                    )))
                }
            }
        }
    } else {
        let land: Vec<UnitId> = occupants
            .iter()
            .copied()
            .filter(|id| world.units.get(id).is_some_and(|u| !u.is_ship()))
            .collect();
        if let Some(defender) = select_defender(world, &land, None) {
            AttackVerdict::EuLandUnit { defender }
        } else {
            match occupants.iter().min() {
                Some(ship) => AttackVerdict::LandUnitAttackShipOnLand { defender: *ship },
                None => return Err(EngineError::Invariant(format!("no defender at {}", to))),
            }
        }
    };

    let reduced = attacker.mv_pts.atoms() < 3 && attacker.mv_pts.has_fraction();
    let attacker_name = attacker.name();
    let verdict = if verdict.is_allowed() && reduced && session.is_human(nation) {
        let question = format!(
            "{} has only part of a movement point left and will attack at reduced strength. Attack anyway?",
            attacker_name
        );
        if session.ask(nation, &question, true) {
            verdict
        } else {
            AttackVerdict::Cancelled
        }
    } else {
        verdict
    };

    let fight = describe_fight(session.world, unit, from, to, &verdict)?;
    let result = match fight {
        Some(fight) => Some(session.oracle.fight(&fight, &mut *session.rng)),
        None => None,
    };
    log::debug!("{} {} attacks {}: {}", nation, unit, to, verdict.name());
    Ok(AttackResolution {
        verdict,
        from,
        to,
        direction,
        result,
    })
}

fn describe_fight(
    world: &WorldState,
    unit: UnitId,
    from: Coord,
    to: Coord,
    verdict: &AttackVerdict,
) -> Result<Option<Fight>, EngineError> {
    let attacker = world.unit(unit)?;
    let land_attacker = || LandSide {
        unit,
        nation: attacker.nation,
        coord: from,
        strength: effective_attack(attacker),
        loss: LossRule::for_attacker(&attacker.composition),
        promotion: attacker.composition.promoted(),
    };
    let fight = match *verdict {
        AttackVerdict::EuLandUnit { defender } | AttackVerdict::ColonyDefended { defender, .. } => {
            let d = world.unit(defender)?;
            let colony = world.colony_at(to);
            Fight::Land {
                attacker: land_attacker(),
                defender: LandSide {
                    unit: defender,
                    nation: d.nation,
                    coord: to,
                    strength: effective_defense(d, colony),
                    loss: LossRule::for_defender(&d.composition),
                    promotion: d.composition.promoted(),
                },
            }
        }
        AttackVerdict::ColonyUndefended { colony, defender } => {
            let worker = world.unit(defender)?;
            let strength = effective_defense(worker, Some(world.colony(colony)?));
            Fight::ColonyWorker {
                attacker: land_attacker(),
                colony,
                worker: defender,
                strength,
            }
        }
        AttackVerdict::ShipOnShip { defender } => {
            let d = world.unit(defender)?;
            Fight::Naval {
                attacker: NavalSide {
                    unit,
                    nation: attacker.nation,
                    coord: from,
                    strength: effective_attack(attacker),
                    repair: repair_port(world, attacker, from),
                    evade_to: None,
                },
                defender: NavalSide {
                    unit: defender,
                    nation: d.nation,
                    coord: to,
                    strength: d.composition.defense(),
                    repair: repair_port(world, d, to),
                    evade_to: if d.composition.can_attack() {
                        None
                    } else {
                        evade_square(world, to, from)
                    },
                },
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(fight))
}

fn refusal_text(verdict: &AttackVerdict) -> Option<&'static str> {
    match verdict {
        AttackVerdict::AttackFromShip => Some("Units cannot attack from aboard a ship. Make landfall first."),
        AttackVerdict::UnitCannotAttack => Some("This unit cannot attack."),
        AttackVerdict::LandUnitAttackShip => Some("Land units cannot attack ships at sea."),
        AttackVerdict::ShipAttackLandUnit => Some("Ships cannot attack units on land."),
        _ => None,
    }
}

pub struct AttackHandler {
    unit: UnitId,
    direction: Direction,
    resolution: Option<AttackResolution>,
    captured: Option<ColonyId>,
}

impl AttackHandler {
    pub fn new(unit: UnitId, direction: Direction) -> Self {
        AttackHandler {
            unit,
            direction,
            resolution: None,
            captured: None,
        }
    }

    pub fn resolution(&self) -> Option<&AttackResolution> {
        self.resolution.as_ref()
    }
}

impl OrderHandler for AttackHandler {
    fn unit(&self) -> UnitId {
        self.unit
    }

    fn confirm(&mut self, session: &mut Session<'_>) -> Result<bool, EngineError> {
        let resolution = resolve_attack(session, self.unit, self.direction)?;
        if let Some(text) = refusal_text(&resolution.verdict) {
            let nation = session.world.unit(self.unit)?.nation;
            session.message(nation, text);
        }
        let allowed = resolution.verdict.is_allowed();
        self.resolution = Some(resolution);
        Ok(allowed)
    }

    fn animate(&self, session: &mut Session<'_>) -> Result<(), EngineError> {
        let Some(res) = &self.resolution else {
            return Ok(());
        };
        let Some(defender) = res.verdict.defender() else {
            return Ok(());
        };
        let attacker_wins = res.result.map_or(true, |r| r.attacker_wins());
        let mut steps = vec![Animation::Attack {
            attacker: self.unit,
            defender,
            attacker_wins,
        }];
        match res.result {
            Some(FightResult::Land {
                attacker, defender: d, ..
            }) => {
                if attacker == LandOutcome::Destroyed {
                    steps.push(Animation::Depixelate { unit: self.unit });
                }
                if d == LandOutcome::Destroyed {
                    steps.push(Animation::Depixelate { unit: defender });
                }
            }
            Some(FightResult::Naval {
                attacker, defender: d, ..
            }) => {
                if attacker == NavalOutcome::Sunk {
                    steps.push(Animation::Depixelate { unit: self.unit });
                }
                if d == NavalOutcome::Sunk {
                    steps.push(Animation::Depixelate { unit: defender });
                }
            }
            Some(FightResult::ColonyWorker { .. }) => {}
            None => steps.push(Animation::Depixelate { unit: defender }),
        }
        session.play(AnimationSequence { steps });
        Ok(())
    }

    fn perform(&mut self, session: &mut Session<'_>) -> Result<(), EngineError> {
        let Some(res) = self.resolution.clone() else {
            return Err(EngineError::Invariant("attack performed without a verdict".into()));
        };
        let unit = self.unit;
        // Attacking ends the attacker's turn.
        {
            let u = session.world.unit_mut(unit)?;
            u.mv_pts = MovementPoints::ZERO;
            u.orders = UnitOrders::None;
        }
        match (res.verdict, res.result) {
            (AttackVerdict::LandUnitAttackShipOnLand { defender }, _) => {
                apply_naval(session, defender, NavalOutcome::Sunk)?;
            }
            (
                AttackVerdict::EuLandUnit { defender } | AttackVerdict::ColonyDefended { defender, .. },
                Some(FightResult::Land {
                    attacker, defender: d, ..
                }),
            ) => {
                apply_land(session, defender, d)?;
                apply_land(session, unit, attacker)?;
            }
            (
                AttackVerdict::ColonyUndefended { colony, .. },
                Some(FightResult::ColonyWorker {
                    attacker_wins, attacker, ..
                }),
            ) => {
                if attacker_wins {
                    capture_colony(session, unit, colony, res.direction)?;
                    self.captured = Some(colony);
                    apply_land(session, unit, attacker)?;
                } else {
                    apply_land(session, unit, attacker)?;
                }
            }
            (
                AttackVerdict::ShipOnShip { defender },
                Some(FightResult::Naval {
                    attacker, defender: d, ..
                }),
            ) => {
                apply_naval(session, defender, d)?;
                apply_naval(session, unit, attacker)?;
            }
            (verdict, result) => {
                return Err(EngineError::Invariant(format!(
                    "attack {} has no matching result {:?}",
                    verdict.name(),
                    result
                )))
            }
        }
        Ok(())
    }

    fn post(&mut self, session: &mut Session<'_>) -> Result<(), EngineError> {
        if let Some(colony) = self.captured {
            let Ok(c) = session.world.colony(colony) else {
                return Ok(());
            };
            if session.is_human(c.nation) {
                session.show_colony(colony)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::handler::{run_order, OrderOutcome};
    use crate::testing::Harness;
    use crate::world::{BaseType, Composition, Job, Nation, Order};

    fn attack(h: &mut Harness, unit: UnitId, direction: Direction) -> AttackResolution {
        resolve_attack(&mut h.session(), unit, direction).unwrap()
    }

    #[test]
    fn strongest_defender_chosen_ties_to_lowest_id() {
        let mut h = Harness::plains(6, 6);
        let at = Coord::new(3, 2);
        let a = h.unit(Nation::French, Composition::soldier(), at);
        let b = h.unit(Nation::French, Composition::soldier(), at);
        h.unit(Nation::French, Composition::colonist(), at);
        let attacker = h.unit(Nation::English, Composition::dragoon(), Coord::new(2, 2));
        assert_eq!(
            attack(&mut h, attacker, Direction::E).verdict,
            AttackVerdict::EuLandUnit { defender: a }
        );
        h.world.unit_mut(b).unwrap().orders = UnitOrders::Fortified;
        assert_eq!(
            attack(&mut h, attacker, Direction::E).verdict,
            AttackVerdict::EuLandUnit { defender: b }
        );
    }

    #[test]
    fn refusals() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(4..6, false);
        h.unit(Nation::French, Composition::of(BaseType::Merchantman), Coord::new(4, 1));
        h.unit(Nation::French, Composition::colonist(), Coord::new(2, 3));

        let scout = h.unit(Nation::English, Composition::scout(), Coord::new(1, 3));
        assert_eq!(attack(&mut h, scout, Direction::E).verdict, AttackVerdict::UnitCannotAttack);

        let soldier = h.unit(Nation::English, Composition::soldier(), Coord::new(3, 1));
        assert_eq!(attack(&mut h, soldier, Direction::E).verdict, AttackVerdict::LandUnitAttackShip);

        h.unit(Nation::French, Composition::colonist(), Coord::new(3, 4));
        let frigate = h.unit(Nation::English, Composition::of(BaseType::Frigate), Coord::new(4, 4));
        assert_eq!(attack(&mut h, frigate, Direction::W).verdict, AttackVerdict::ShipAttackLandUnit);

        let ship = h.unit(Nation::English, Composition::of(BaseType::Galleon), Coord::new(4, 2));
        let rider = h.passenger(Nation::English, Composition::soldier(), ship);
        assert_eq!(attack(&mut h, rider, Direction::N).verdict, AttackVerdict::AttackFromShip);
        assert!(h.oracle.fights.is_empty());
    }

    #[test]
    fn ships_fight_ships() {
        let mut h = Harness::plains(6, 6);
        h.flood_columns(3..6, false);
        let target = h.unit(Nation::French, Composition::of(BaseType::Merchantman), Coord::new(4, 1));
        let frigate = h.unit(Nation::English, Composition::of(BaseType::Frigate), Coord::new(4, 2));
        let res = attack(&mut h, frigate, Direction::N);
        assert_eq!(res.verdict, AttackVerdict::ShipOnShip { defender: target });
        assert_eq!(h.oracle.fights.len(), 1);
    }

    #[test]
    fn fractional_points_prompt_human_only() {
        let mut h = Harness::plains(6, 6);
        h.unit(Nation::French, Composition::colonist(), Coord::new(3, 2));
        let attacker = h.unit(Nation::English, Composition::soldier(), Coord::new(2, 2));
        h.world.unit_mut(attacker).unwrap().mv_pts = MovementPoints::thirds(1);
        let before = h.world.clone();

        h.ui.answer_confirm(false);
        let outcome = run_order(&mut h.session(), attacker, Order::Move { direction: Direction::E }).unwrap();
        assert_eq!(outcome, OrderOutcome::Cancelled);
        assert_eq!(h.world.units, before.units);
        assert_eq!(h.ui.questions().len(), 1);
        assert!(h.animator.played.is_empty());

        h.ui.answer_confirm(true);
        let res = attack(&mut h, attacker, Direction::E);
        assert!(res.verdict.is_allowed());
        match h.oracle.fights.last() {
            Some(Fight::Land { attacker, .. }) => assert_eq!(attacker.strength, 200 / 3),
            other => panic!("unexpected fight {:?}", other),
        }
    }

    #[test]
    fn winning_attack_captures_colonist() {
        let mut h = Harness::plains(6, 6);
        let victim = h.unit(Nation::French, Composition::colonist(), Coord::new(3, 2));
        let attacker = h.unit(Nation::English, Composition::soldier(), Coord::new(2, 2));
        h.oracle.attacker_wins();
        run_order(&mut h.session(), attacker, Order::Move { direction: Direction::E }).unwrap();
        let v = h.world.unit(victim).unwrap();
        assert_eq!(v.nation, Nation::English);
        assert_eq!(v.coord_if_on_map(), Some(Coord::new(2, 2)));
        assert!(v.mv_pts.is_zero());
        assert_eq!(v.orders, UnitOrders::None);
        assert!(h.world.unit(attacker).unwrap().mv_pts.is_zero());
    }

    #[test]
    fn colony_with_garrison_is_defended() {
        let mut h = Harness::plains(6, 6);
        let at = Coord::new(3, 2);
        let colony = h.world.create_colony(Nation::French, "Quebec".into(), at).unwrap();
        let worker = h.world.create_unit(Nation::French, Composition::colonist());
        h.world.join_colony(worker, colony, Job::Farmer).unwrap();
        let guard = h.unit(Nation::French, Composition::soldier(), at);
        let attacker = h.unit(Nation::English, Composition::dragoon(), Coord::new(2, 2));
        assert_eq!(
            attack(&mut h, attacker, Direction::E).verdict,
            AttackVerdict::ColonyDefended {
                colony,
                defender: guard
            }
        );
    }

    #[test]
    fn stockade_doubles_colony_defense() {
        let mut h = Harness::plains(6, 6);
        let at = Coord::new(3, 2);
        let colony = h.world.create_colony(Nation::French, "Quebec".into(), at).unwrap();
        h.world.colony_mut(colony).unwrap().buildings.insert(Building::Stockade);
        let guard = h.unit(Nation::French, Composition::soldier(), at);
        h.world.unit_mut(guard).unwrap().orders = UnitOrders::Fortified;
        let u = h.world.unit(guard).unwrap();
        assert_eq!(effective_defense(u, h.world.colony_at(at)), 600);
    }

    #[test]
    fn stranded_ship_loses_outright() {
        let mut h = Harness::plains(6, 6);
        let ship = h.unit(Nation::French, Composition::of(BaseType::Caravel), Coord::new(3, 2));
        let attacker = h.unit(Nation::English, Composition::soldier(), Coord::new(2, 2));
        assert_eq!(
            attack(&mut h, attacker, Direction::E).verdict,
            AttackVerdict::LandUnitAttackShipOnLand { defender: ship }
        );
        assert!(h.oracle.fights.is_empty());
        run_order(&mut h.session(), attacker, Order::Move { direction: Direction::E }).unwrap();
        assert!(!h.world.unit_exists(ship));
    }
}
