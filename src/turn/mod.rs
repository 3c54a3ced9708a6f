//! Turn processing.
//!
//! A turn cycle runs the natives, then every nation in a fixed order, then
//! end-of-cycle bookkeeping. Both the cycle and each nation's turn are
//! explicit state machines stored in `WorldState::turn`, so a saved game
//! resumes at the phase it was saved in.
//!
//! The engine suspends by returning a `Suspension` to the driver. The
//! driver answers with the matching `TurnInput` on the next call to
//! `cycle::advance`.

pub mod calendar;
pub mod colonies;
pub mod cycle;
pub mod fog;
pub mod nation;
pub mod queue;
pub mod unit_turn;

use serde::{Deserialize, Serialize};

use crate::world::{Nation, Order, UnitId};

pub use calendar::{Season, TurnTime};
pub use cycle::{advance, TurnCycle};
pub use nation::NationTurnState;
pub use queue::ActivationQueue;

/// Persisted turn progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub time: TurnTime,
    pub cycle: TurnCycle,
    pub turns_played: u32,
}

impl TurnState {
    pub fn starting(year: i32) -> Self {
        TurnState {
            time: TurnTime::new(year),
            cycle: TurnCycle::NotStarted,
            turns_played: 0,
        }
    }
}

impl Default for TurnState {
    fn default() -> Self {
        TurnState::starting(1492)
    }
}

/// Why the engine stopped and what it is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspension {
    /// `unit` of `nation` is waiting for a `TurnInput::Unit`.
    NeedsOrders { nation: Nation, unit: UnitId },
    /// `nation` has no units left to move and waits for a
    /// `TurnInput::EndOfTurn`.
    EndOfTurn { nation: Nation },
    /// A whole cycle has been played.
    CycleFinished,
}

/// Actions available from the menus at any suspension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Wake a unit and move it to the front of the queue.
    ActivateUnit(UnitId),
    /// Send a ship waiting in the harbor back toward the map.
    SailFromHarbor(UnitId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitInput {
    Order(Order),
    /// Orders to carry out one after another on later activations.
    QueueOrders(Vec<Order>),
    /// Move these units to the front of the queue, first one first.
    Prioritize(Vec<UnitId>),
    /// Move the unit to the back of the queue.
    Wait,
    /// The unit does nothing more this turn.
    NoOrders,
    Menu(MenuAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfTurnInput {
    NextTurn,
    ReturnToUnits,
    Menu(MenuAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnInput {
    Unit(UnitInput),
    EndOfTurn(EndOfTurnInput),
}
