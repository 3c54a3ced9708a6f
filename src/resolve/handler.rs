//! The order-handler protocol.
//!
//! Every order kind runs through the same lifecycle:
//!
//! 1. `confirm` classifies the order and asks any questions. Returning
//!    `false` aborts with the world untouched.
//! 2. `switch_handler` may hand the order to a more specific handler
//!    (a move that turns out to be an attack), which is confirmed in turn.
//! 3. `animate` plays the visual sequence; it never mutates the world.
//! 4. `perform` applies the order. It never prompts.
//! 5. `post` handles follow-up interaction, such as opening a captured
//!    colony.
//!
//! Anything that could stop `perform` from succeeding must be ruled out in
//! `confirm`.

use crate::error::EngineError;
use crate::resolve::cargo::DumpCargoHandler;
use crate::resolve::colony::BuildColonyHandler;
use crate::resolve::disband::DisbandHandler;
use crate::resolve::fortify::{FortifyHandler, SentryHandler};
use crate::resolve::improve::{Improvement, ImproveHandler};
use crate::resolve::travel::TravelHandler;
use crate::session::Session;
use crate::world::{Order, UnitId};

pub trait OrderHandler {
    /// The unit the order was issued to.
    fn unit(&self) -> UnitId;

    fn confirm(&mut self, session: &mut Session<'_>) -> Result<bool, EngineError>;

    fn switch_handler(&mut self) -> Option<Box<dyn OrderHandler>> {
        None
    }

    fn animate(&self, _session: &mut Session<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    fn perform(&mut self, session: &mut Session<'_>) -> Result<(), EngineError>;

    fn post(&mut self, _session: &mut Session<'_>) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Builds the handler for an order.
pub fn handler_for(unit: UnitId, order: Order) -> Box<dyn OrderHandler> {
    match order {
        Order::Move { direction } => Box::new(TravelHandler::new(unit, direction)),
        Order::BuildColony => Box::new(BuildColonyHandler::new(unit)),
        Order::Fortify => Box::new(FortifyHandler::new(unit)),
        Order::Sentry => Box::new(SentryHandler::new(unit)),
        Order::Disband => Box::new(DisbandHandler::new(unit)),
        Order::Plow => Box::new(ImproveHandler::new(unit, Improvement::Plow)),
        Order::BuildRoad => Box::new(ImproveHandler::new(unit, Improvement::Road)),
        Order::DumpCargo => Box::new(DumpCargoHandler::new(unit)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    /// Refused or declined; nothing changed.
    Cancelled,
    Performed,
}

/// Maximum number of handler switches for one order.
const MAX_SWITCHES: usize = 4;

/// Runs one order through the full handler lifecycle.
pub fn run_order(session: &mut Session<'_>, unit: UnitId, order: Order) -> Result<OrderOutcome, EngineError> {
    if !session.world.unit_exists(unit) {
        return Err(EngineError::UnitVanished(unit));
    }
    log::debug!("{} ordered to {}", unit, order.describe());
    let mut handler = handler_for(unit, order);
    let mut switches = 0;
    loop {
        if !handler.confirm(session)? {
            return Ok(OrderOutcome::Cancelled);
        }
        match handler.switch_handler() {
            Some(next) => {
                switches += 1;
                if switches > MAX_SWITCHES {
                    return Err(EngineError::Invariant(format!(
                        "order {} for {} keeps switching handlers",
                        order.describe(),
                        unit
                    )));
                }
                handler = next;
            }
            None => break,
        }
    }
    handler.animate(session)?;
    // The unit may have been lost while dialogs or animations were up.
    if !session.world.unit_exists(handler.unit()) {
        return Err(EngineError::UnitVanished(handler.unit()));
    }
    handler.perform(session)?;
    handler.post(session)?;
    Ok(OrderOutcome::Performed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use crate::world::{Composition, Coord, Direction, Nation};

    #[test]
    fn unknown_unit_is_an_error() {
        let mut h = Harness::plains(4, 4);
        let result = run_order(&mut h.session(), UnitId(99), Order::Fortify);
        assert!(matches!(result, Err(EngineError::UnitVanished(UnitId(99)))));
    }

    #[test]
    fn move_into_enemy_switches_to_attack() {
        let mut h = Harness::plains(6, 6);
        let attacker = h.unit(Nation::English, Composition::soldier(), Coord::new(2, 2));
        h.unit(Nation::French, Composition::colonist(), Coord::new(3, 2));
        h.oracle.attacker_wins();
        let outcome = run_order(&mut h.session(), attacker, Order::Move { direction: Direction::E }).unwrap();
        assert_eq!(outcome, OrderOutcome::Performed);
        assert_eq!(h.oracle.fights.len(), 1);
        // attackers do not advance onto the square
        assert_eq!(
            h.world.unit(attacker).unwrap().coord_if_on_map(),
            Some(Coord::new(2, 2))
        );
    }

    #[test]
    fn animation_precedes_mutation() {
        let mut h = Harness::plains(6, 6);
        let id = h.unit(Nation::English, Composition::colonist(), Coord::new(2, 2));
        run_order(&mut h.session(), id, Order::Move { direction: Direction::S }).unwrap();
        assert_eq!(h.animator.played.len(), 1);
    }
}
