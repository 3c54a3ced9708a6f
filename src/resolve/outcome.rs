//! Applying combat outcomes to the world.
//!
//! Messages go to the nation the outcome affects and are shown only when
//! that nation is played by a human.

use crate::error::EngineError;
use crate::resolve::combat::{LandOutcome, NavalOutcome, RepairPort};
use crate::session::{Animation, AnimationSequence, Session};
use crate::world::{
    CargoItem, ColonyId, Coord, Direction, MovementPoints, Nation, Ownership, PortStatus, UnitId,
    UnitOrders, UnitRole, WorldState,
};

/// Turns a damaged ship spends under repair.
pub const REPAIR_TURNS: u8 = 3;

/// Hands a unit to `by`, moves it to `at`, and ends its turn.
fn capture(world: &mut WorldState, unit: UnitId, by: Nation, at: Coord) -> Result<(), EngineError> {
    world.change_nation(unit, by)?;
    world.relocate(unit, at)?;
    let u = world.unit_mut(unit)?;
    u.mv_pts = MovementPoints::ZERO;
    u.orders = UnitOrders::None;
    u.evolved = true;
    Ok(())
}

pub fn apply_land(session: &mut Session<'_>, unit: UnitId, outcome: LandOutcome) -> Result<(), EngineError> {
    let u = session.world.unit(unit)?;
    let nation = u.nation;
    let name = u.name();
    let role = u.role();
    match outcome {
        LandOutcome::NoChange => {}
        LandOutcome::Destroyed => {
            session.world.destroy_unit(unit)?;
            let text = if role == UnitRole::Scout {
                "Our Scout has been lost! Its reports of the interior are lost with it.".to_string()
            } else {
                format!("Our {} has been destroyed.", name)
            };
            session.message(nation, &text);
        }
        LandOutcome::Captured { by, at } => {
            capture(session.world, unit, by, at)?;
            session.message(nation, &format!("Our {} has been captured by the {}.", name, by));
            session.message(by, &format!("We have captured a {} from the {}.", name, nation));
        }
        LandOutcome::CapturedAndDemoted { by, at, to } => {
            session.world.unit_mut(unit)?.composition = to;
            capture(session.world, unit, by, at)?;
            session.message(nation, &format!("Our {} has been captured by the {}.", name, by));
            session.message(by, &format!("We have captured a {} from the {}.", to.name(), nation));
        }
        LandOutcome::Demoted { to } => {
            session.world.unit_mut(unit)?.composition = to;
            session.message(nation, &format!("Our {} has been demoted to {}.", name, to.name()));
        }
        LandOutcome::Promoted { to } => {
            session.world.unit_mut(unit)?.composition = to;
            session.message(nation, &format!("Our {} has been promoted to {}!", name, to.name()));
        }
    }
    log::info!("{} {} {}: {:?}", nation, name, unit, outcome);
    Ok(())
}

/// Destroys everything a ship carries. Returns the number of units lost.
fn lose_cargo(world: &mut WorldState, ship: UnitId) -> Result<usize, EngineError> {
    let passengers: Vec<UnitId> = world.unit(ship)?.cargo_units().collect();
    let mut lost = 0;
    for p in passengers {
        lost += world.destroy_unit(p)?.len();
    }
    world
        .unit_mut(ship)?
        .cargo
        .retain(|c| !matches!(c, CargoItem::Goods { .. }));
    Ok(lost)
}

pub fn apply_naval(session: &mut Session<'_>, unit: UnitId, outcome: NavalOutcome) -> Result<(), EngineError> {
    let u = session.world.unit(unit)?;
    let nation = u.nation;
    let name = u.name();
    match outcome {
        NavalOutcome::NoChange => {}
        NavalOutcome::Damaged { port } => {
            let here = session.world.unit_coord(unit);
            let lost = lose_cargo(session.world, unit)?;
            let place = match port {
                RepairPort::Colony { colony, coord } => {
                    session.world.relocate(unit, coord)?;
                    session.world.colony(colony)?.name.clone()
                }
                RepairPort::Harbor => {
                    session.world.disown(unit)?;
                    session.world.send_to_harbor(unit, PortStatus::InPort, here)?;
                    "the harbor".to_string()
                }
            };
            let ship = session.world.unit_mut(unit)?;
            ship.orders = UnitOrders::Damaged {
                turns_until_repair: REPAIR_TURNS,
            };
            ship.mv_pts = MovementPoints::ZERO;
            let mut text = format!("Our {} has been damaged and is under repair in {}.", name, place);
            if lost > 0 {
                text.push_str(&format!(" {} units aboard were lost.", lost));
            }
            session.message(nation, &text);
        }
        NavalOutcome::Sunk => {
            let lost = session.world.destroy_unit(unit)?.len() - 1;
            session.message(
                nation,
                &format!("Our {} has been sunk with {} units aboard.", name, lost),
            );
        }
        NavalOutcome::Moved { to } => {
            session.world.relocate(unit, to)?;
            session.message(nation, &format!("Our {} evaded the attack.", name));
        }
    }
    log::info!("{} {} {}: {:?}", nation, name, unit, outcome);
    Ok(())
}

/// Transfers a colony to the attacker and moves the attacker in. Animations
/// are interleaved with the mutations here. The workers change hands with
/// the colony, so it is never left empty.
pub fn capture_colony(
    session: &mut Session<'_>,
    attacker: UnitId,
    colony: ColonyId,
    direction: Direction,
) -> Result<(), EngineError> {
    let by = session.world.unit(attacker)?.nation;
    let from = session
        .world
        .unit_coord(attacker)
        .ok_or(EngineError::UnitVanished(attacker))?;
    let (old, name, coord) = {
        let c = session.world.colony(colony)?;
        (c.nation, c.name.clone(), c.coord)
    };

    session.play(AnimationSequence::single(Animation::ColonyCapture { colony }));
    let moved = session.world.transfer_colony(colony, by)?;
    for id in &moved {
        let u = session.world.unit_mut(*id)?;
        if matches!(u.ownership, Ownership::World { .. }) {
            u.mv_pts = MovementPoints::ZERO;
            u.orders = UnitOrders::None;
            u.evolved = true;
        }
    }

    session.play(AnimationSequence::single(Animation::Slide {
        unit: attacker,
        from,
        direction,
    }));
    session.world.relocate(attacker, coord)?;

    log::info!("{} captured {} from {} ({} units)", by, name, old, moved.len());
    session.message(old, &format!("{} has been captured by the {}!", name, by));
    session.message(by, &format!("We have captured {}!", name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use crate::world::{BaseType, Composition, Job};

    #[test]
    fn destroyed_scout_gets_scout_message() {
        let mut h = Harness::plains(4, 4);
        let scout = h.unit(Nation::English, Composition::scout(), Coord::new(1, 1));
        apply_land(&mut h.session(), scout, LandOutcome::Destroyed).unwrap();
        assert_eq!(h.ui.messages().len(), 1);
        assert!(h.ui.messages()[0].contains("Scout has been lost"));
        assert!(!h.world.unit_exists(scout));
    }

    #[test]
    fn destroyed_soldier_gets_generic_message() {
        let mut h = Harness::plains(4, 4);
        let art = h.unit(Nation::English, Composition::of(BaseType::DamagedArtillery), Coord::new(1, 1));
        apply_land(&mut h.session(), art, LandOutcome::Destroyed).unwrap();
        assert_eq!(h.ui.messages(), ["Our Damaged Artillery has been destroyed.".to_string()]);
    }

    #[test]
    fn ai_losses_are_silent() {
        let mut h = Harness::plains(4, 4);
        let scout = h.unit(Nation::French, Composition::scout(), Coord::new(1, 1));
        apply_land(&mut h.session(), scout, LandOutcome::Destroyed).unwrap();
        assert!(h.ui.messages().is_empty());
    }

    #[test]
    fn capture_and_demote_strips_tools() {
        let mut h = Harness::plains(4, 4);
        let pioneer = h.unit(Nation::French, Composition::pioneer(80), Coord::new(1, 1));
        let outcome = LandOutcome::CapturedAndDemoted {
            by: Nation::English,
            at: Coord::new(2, 1),
            to: Composition::colonist(),
        };
        apply_land(&mut h.session(), pioneer, outcome).unwrap();
        let u = h.world.unit(pioneer).unwrap();
        assert_eq!(u.nation, Nation::English);
        assert_eq!(u.composition, Composition::colonist());
        assert_eq!(u.coord_if_on_map(), Some(Coord::new(2, 1)));
        assert!(u.mv_pts.is_zero());
        assert!(u.evolved);
    }

    #[test]
    fn sinking_reports_casualties() {
        let mut h = Harness::plains(4, 4);
        h.flood_columns(0..4, false);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Galleon), Coord::new(1, 1));
        let a = h.passenger(Nation::English, Composition::colonist(), ship);
        let b = h.passenger(Nation::English, Composition::soldier(), ship);
        apply_naval(&mut h.session(), ship, NavalOutcome::Sunk).unwrap();
        assert!(!h.world.unit_exists(ship));
        assert!(!h.world.unit_exists(a));
        assert!(!h.world.unit_exists(b));
        assert_eq!(h.ui.messages(), ["Our Galleon has been sunk with 2 units aboard.".to_string()]);
    }

    #[test]
    fn damaged_ship_goes_to_harbor() {
        let mut h = Harness::plains(4, 4);
        h.flood_columns(0..4, false);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Merchantman), Coord::new(1, 1));
        h.passenger(Nation::English, Composition::colonist(), ship);
        apply_naval(
            &mut h.session(),
            ship,
            NavalOutcome::Damaged {
                port: RepairPort::Harbor,
            },
        )
        .unwrap();
        let u = h.world.unit(ship).unwrap();
        assert!(u.cargo.is_empty());
        assert_eq!(
            u.orders,
            UnitOrders::Damaged {
                turns_until_repair: REPAIR_TURNS
            }
        );
        assert!(matches!(
            u.ownership,
            Ownership::Harbor {
                status: PortStatus::InPort,
                ..
            }
        ));
    }

    #[test]
    fn colony_capture_transfers_everything() {
        let mut h = Harness::plains(6, 6);
        let at = Coord::new(3, 2);
        let colony = h.world.create_colony(Nation::French, "Quebec".into(), at).unwrap();
        let worker = h.world.create_unit(Nation::French, Composition::colonist());
        h.world.join_colony(worker, colony, Job::Farmer).unwrap();
        let wagon = h.unit(Nation::French, Composition::of(BaseType::WagonTrain), at);
        let attacker = h.unit(Nation::English, Composition::soldier(), Coord::new(2, 2));

        capture_colony(&mut h.session(), attacker, colony, Direction::E).unwrap();
        assert_eq!(h.world.colony(colony).unwrap().nation, Nation::English);
        assert_eq!(h.world.colony_workers(colony), [worker]);
        assert_eq!(h.world.unit(worker).unwrap().nation, Nation::English);
        assert_eq!(h.ui.messages(), ["We have captured Quebec!".to_string()]);
        assert_eq!(h.world.unit(wagon).unwrap().nation, Nation::English);
        assert_eq!(h.world.unit(attacker).unwrap().coord_if_on_map(), Some(at));
        assert_eq!(h.animator.played.len(), 2);
    }
}
