//! Per-unit turn evolution and the units phase.
//!
//! Each unit evolves once per turn before it is first asked for orders:
//! fortifying units become fortified, damaged ships count down their
//! repairs, pioneers advance their work and ships in transit advance toward
//! the harbor or the map.

use crate::error::EngineError;
use crate::resolve::handler::{run_order, OrderOutcome};
use crate::resolve::improve::{complete, spend_tools, Improvement};
use crate::session::Session;
use crate::turn::fog::reveal_around;
use crate::turn::queue::ActivationQueue;
use crate::turn::{MenuAction, Suspension, TurnInput, UnitInput};
use crate::world::{Coord, MovementPoints, Nation, Ownership, PortStatus, UnitId, UnitOrders, WorldState};

/// Units of `nation` that still have something to do this turn: either
/// they have not evolved yet, or they are waiting for orders.
pub fn build_queue(world: &WorldState, nation: Nation) -> ActivationQueue {
    ActivationQueue::from_units(
        world
            .units
            .values()
            .filter(|u| u.nation == nation && !matches!(u.ownership, Ownership::Colony { .. }))
            .filter(|u| !u.evolved || needs_orders(world, u.id))
            .map(|u| u.id),
    )
}

/// Whether a unit should be asked for orders now.
pub fn needs_orders(world: &WorldState, unit: UnitId) -> bool {
    let Some(u) = world.units.get(&unit) else {
        return false;
    };
    let reachable = match u.ownership {
        Ownership::World { .. } => true,
        Ownership::Cargo { holder } => world
            .units
            .get(&holder)
            .is_some_and(|h| h.coord_if_on_map().is_some()),
        _ => false,
    };
    reachable && u.orders == UnitOrders::None && !u.mv_pts.is_zero()
}

/// A water square on the east edge to return a ship to when it has no
/// remembered departure point.
fn fallback_arrival(world: &WorldState) -> Option<Coord> {
    let x = world.map.width() - 1;
    let water: Vec<Coord> = (0..world.map.height())
        .map(|y| Coord::new(x, y))
        .filter(|c| world.map.is_water(*c))
        .collect();
    water
        .iter()
        .find(|c| world.map.is_sea_lane(**c))
        .or(water.first())
        .copied()
}

/// Applies the automatic effects of a new turn to one unit.
pub fn advance_unit(session: &mut Session<'_>, unit: UnitId) -> Result<(), EngineError> {
    let world = &mut *session.world;
    let u = world.unit_mut(unit)?;
    u.evolved = true;
    let nation = u.nation;
    let name = u.name();
    let coord = u.coord_if_on_map();
    log::trace!("evolving {} {} ({:?})", name, unit, u.orders);

    match u.orders {
        UnitOrders::Fortifying => u.orders = UnitOrders::Fortified,
        UnitOrders::Damaged { turns_until_repair } => {
            u.mv_pts = MovementPoints::ZERO;
            if turns_until_repair <= 1 {
                u.orders = UnitOrders::None;
                session.message(nation, &format!("Our {} has been repaired.", name));
            } else {
                u.orders = UnitOrders::Damaged {
                    turns_until_repair: turns_until_repair - 1,
                };
            }
        }
        UnitOrders::Plow { turns_worked } | UnitOrders::Road { turns_worked } => {
            let improvement = if matches!(u.orders, UnitOrders::Plow { .. }) {
                Improvement::Plow
            } else {
                Improvement::Road
            };
            let worked = turns_worked + 1;
            u.mv_pts = MovementPoints::ZERO;
            if worked < improvement.turns() {
                u.orders = match improvement {
                    Improvement::Plow => UnitOrders::Plow { turns_worked: worked },
                    Improvement::Road => UnitOrders::Road { turns_worked: worked },
                };
            } else {
                u.orders = UnitOrders::None;
                u.composition = spend_tools(u.composition);
                if let Some(coord) = coord {
                    complete(&mut world.map, coord, improvement);
                    log::debug!("{} finished {} at {}", unit, improvement.name(), coord);
                }
                session.message(nation, &format!("Our {} has finished its work.", name));
            }
        }
        _ => {}
    }

    let Ownership::Harbor { status, sailed_from } = session.world.unit(unit)?.ownership else {
        return Ok(());
    };
    let world = &mut *session.world;
    match status {
        PortStatus::Outbound { turns_remaining } if turns_remaining > 1 => {
            world.unit_mut(unit)?.ownership = Ownership::Harbor {
                status: PortStatus::Outbound {
                    turns_remaining: turns_remaining - 1,
                },
                sailed_from,
            };
        }
        PortStatus::Outbound { .. } => {
            world.unit_mut(unit)?.ownership = Ownership::Harbor {
                status: PortStatus::InPort,
                sailed_from,
            };
            log::debug!("{} {} reached the harbor", nation, unit);
            session.message(nation, &format!("Our {} has arrived in the harbor.", name));
        }
        PortStatus::Inbound { turns_remaining } if turns_remaining > 1 => {
            world.unit_mut(unit)?.ownership = Ownership::Harbor {
                status: PortStatus::Inbound {
                    turns_remaining: turns_remaining - 1,
                },
                sailed_from,
            };
        }
        PortStatus::Inbound { .. } => {
            let Some(at) = sailed_from.or_else(|| fallback_arrival(world)) else {
                return Err(EngineError::Invariant(format!("no water on the map edge for {}", unit)));
            };
            world.relocate(unit, at)?;
            reveal_around(world, unit);
            log::debug!("{} {} arrived at {}", nation, unit, at);
            session.message(nation, &format!("Our {} has arrived in the New World.", name));
        }
        PortStatus::InPort => {}
    }
    Ok(())
}

/// Applies a menu action for `nation`. Returns the unit that should be
/// moved to the front of the queue, if any.
pub fn apply_menu(session: &mut Session<'_>, nation: Nation, action: MenuAction) -> Result<Option<UnitId>, EngineError> {
    match action {
        MenuAction::ActivateUnit(id) => {
            let Some(u) = session.world.units.get_mut(&id).filter(|u| u.nation == nation) else {
                log::warn!("{} cannot activate {}", nation, id);
                return Ok(None);
            };
            if matches!(u.ownership, Ownership::Colony { .. } | Ownership::Harbor { .. }) {
                log::warn!("{} is not on the map", id);
                return Ok(None);
            }
            if matches!(u.orders, UnitOrders::Fortifying | UnitOrders::Fortified | UnitOrders::Sentry) {
                u.orders = UnitOrders::None;
            }
            Ok(Some(id))
        }
        MenuAction::SailFromHarbor(id) => {
            let ready = session.world.units.get(&id).is_some_and(|u| {
                u.nation == nation
                    && u.is_ship()
                    && !matches!(u.orders, UnitOrders::Damaged { .. })
                    && matches!(
                        u.ownership,
                        Ownership::Harbor {
                            status: PortStatus::InPort,
                            ..
                        }
                    )
            });
            if !ready {
                log::warn!("{} cannot sail {} from the harbor", nation, id);
                return Ok(None);
            }
            let turns = session.config.high_seas_turns;
            let u = session.world.unit_mut(id)?;
            if let Ownership::Harbor { sailed_from, .. } = u.ownership {
                u.ownership = Ownership::Harbor {
                    status: PortStatus::Inbound { turns_remaining: turns },
                    sailed_from,
                };
            }
            log::info!("{} {} sails for the New World", nation, id);
            Ok(None)
        }
    }
}

fn handle_input(
    session: &mut Session<'_>,
    nation: Nation,
    queue: &mut ActivationQueue,
    unit: UnitId,
    input: UnitInput,
) -> Result<(), EngineError> {
    match input {
        UnitInput::Order(order) => {
            run_order(session, unit, order)?;
        }
        UnitInput::QueueOrders(orders) => session.pending.push(unit, orders),
        UnitInput::Prioritize(units) => {
            for id in units.into_iter().rev() {
                if let Some(id) = apply_menu(session, nation, MenuAction::ActivateUnit(id))? {
                    queue.prioritize(id);
                }
            }
        }
        UnitInput::Wait => queue.append(unit),
        UnitInput::NoOrders => {
            session.pending.clear(unit);
            session.world.unit_mut(unit)?.mv_pts = MovementPoints::ZERO;
        }
        UnitInput::Menu(action) => {
            if let Some(id) = apply_menu(session, nation, action)? {
                queue.prioritize(id);
            }
        }
    }
    Ok(())
}

/// Runs the units phase for `nation` until it either needs input or every
/// unit is done. Returns `None` once the phase is over. An end-of-turn
/// input ends the phase early and is left in `input`.
pub fn run_units(
    session: &mut Session<'_>,
    nation: Nation,
    queue: &mut ActivationQueue,
    input: &mut Option<TurnInput>,
) -> Result<Option<Suspension>, EngineError> {
    loop {
        let Some(unit) = queue.front() else {
            let rebuilt = build_queue(session.world, nation);
            if rebuilt.is_empty() {
                log::debug!("{} has no units left to move", nation);
                return Ok(None);
            }
            *queue = rebuilt;
            continue;
        };

        let current = session.world.units.get(&unit).is_some_and(|u| u.nation == nation);
        if !current {
            queue.pop_front();
            continue;
        }
        if !session.world.unit(unit)?.evolved {
            advance_unit(session, unit)?;
        }
        if !needs_orders(session.world, unit) {
            queue.pop_front();
            continue;
        }

        if let Some(order) = session.pending.pop(unit) {
            if run_order(session, unit, order)? == OrderOutcome::Cancelled {
                session.pending.clear(unit);
            }
            continue;
        }

        match input.take() {
            None => return Ok(Some(Suspension::NeedsOrders { nation, unit })),
            Some(TurnInput::Unit(answer)) => handle_input(session, nation, queue, unit, answer)?,
            Some(end @ TurnInput::EndOfTurn(_)) => {
                // Ending the turn early; the end-of-turn state consumes it.
                log::debug!("{} ends its units phase with {} still waiting", nation, unit);
                *input = Some(end);
                return Ok(None);
            }
        }
    }
}
