//! Order resolution.
//!
//! Classifies each order against the world into a verdict, then runs it
//! through the handler lifecycle (confirm, animate, perform, post). Combat
//! outcomes are applied by `outcome`.

pub mod attack;
pub mod cargo;
pub mod colony;
pub mod combat;
pub mod disband;
pub mod fortify;
pub mod handler;
pub mod improve;
pub mod movement;
pub mod outcome;
pub mod travel;

pub use attack::{AttackHandler, AttackVerdict};
pub use combat::{CombatOracle, Fight, FightResult, StandardOracle};
pub use handler::{handler_for, run_order, OrderHandler, OrderOutcome};
pub use travel::{TravelHandler, TravelVerdict};
