//! A random-but-legal agent for AI nations.
//!
//! Picks a plausible order for the unit in front of the queue. Orders the
//! engine refuses leave the unit's points untouched, so the agent counts
//! attempts at the same point total and gives up with `NoOrders` after a
//! few tries.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::turn::{EndOfTurnInput, MenuAction, UnitInput};
use crate::world::{
    MovementPoints, Nation, Order, Ownership, PortStatus, UnitId, UnitOrders, UnitRole, WorldState,
    ALL_DIRECTIONS, TOOLS_PER_JOB,
};

/// Attempts at one unit before it is told to stand down.
pub const MAX_ATTEMPTS: u8 = 3;

/// Supplies input for AI-controlled nations.
pub trait Agent {
    fn unit_input<R: Rng + ?Sized>(&mut self, world: &WorldState, unit: UnitId, rng: &mut R) -> UnitInput;

    fn end_of_turn(&mut self, world: &WorldState, nation: Nation) -> EndOfTurnInput;
}

#[derive(Debug, Default, Clone)]
pub struct RandomAgent {
    last: Option<(UnitId, MovementPoints)>,
    attempts: u8,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self::default()
    }

    fn random_order<R: Rng + ?Sized>(world: &WorldState, unit: UnitId, rng: &mut R) -> Order {
        let Ok(u) = world.unit(unit) else {
            return Order::Sentry;
        };
        let on_land = u
            .coord_if_on_map()
            .is_some_and(|c| world.map.is_land(c) && world.colony_at(c).is_none());
        if on_land {
            match u.role() {
                UnitRole::Colonist if rng.gen_bool(0.15) => return Order::BuildColony,
                UnitRole::Pioneer if u.composition.tools >= TOOLS_PER_JOB && rng.gen_bool(0.2) => {
                    return if rng.gen_bool(0.5) { Order::Plow } else { Order::BuildRoad };
                }
                UnitRole::Soldier | UnitRole::Artillery if rng.gen_bool(0.05) => return Order::Fortify,
                _ => {}
            }
        }
        match ALL_DIRECTIONS.choose(rng) {
            Some(&direction) => Order::Move { direction },
            None => Order::Sentry,
        }
    }
}

impl Agent for RandomAgent {
    fn unit_input<R: Rng + ?Sized>(&mut self, world: &WorldState, unit: UnitId, rng: &mut R) -> UnitInput {
        let mv = world.unit(unit).map_or(MovementPoints::ZERO, |u| u.mv_pts);
        if self.last == Some((unit, mv)) {
            self.attempts += 1;
        } else {
            self.last = Some((unit, mv));
            self.attempts = 1;
        }
        if self.attempts > MAX_ATTEMPTS {
            log::trace!("{} gives up after {} attempts", unit, MAX_ATTEMPTS);
            self.last = None;
            return UnitInput::NoOrders;
        }
        UnitInput::Order(Self::random_order(world, unit, rng))
    }

    /// Sends every ship waiting in port back to sea, then ends the turn.
    fn end_of_turn(&mut self, world: &WorldState, nation: Nation) -> EndOfTurnInput {
        self.last = None;
        let waiting = world.units.values().find(|u| {
            u.nation == nation
                && !matches!(u.orders, UnitOrders::Damaged { .. })
                && matches!(
                    u.ownership,
                    Ownership::Harbor {
                        status: PortStatus::InPort,
                        ..
                    }
                )
        });
        match waiting {
            Some(ship) => EndOfTurnInput::Menu(MenuAction::SailFromHarbor(ship.id)),
            None => EndOfTurnInput::NextTurn,
        }
    }
}
