//! Orders a player or agent can issue to a single unit.
//!
//! An order is an immutable value issued once per resolution attempt. It
//! carries only what the issuer chose; anything else (colony names, which
//! cargo to dump) is asked for while the order is being confirmed.

use serde::{Deserialize, Serialize};

use super::coord::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Order {
    /// Move (or attack, board, make landfall, ...) one square.
    Move { direction: Direction },
    /// Found a colony on the unit's square.
    BuildColony,
    Fortify,
    Sentry,
    Disband,
    /// Plow the square, or clear its forest.
    Plow,
    BuildRoad,
    /// Throw goods overboard.
    DumpCargo,
}

impl Order {
    pub fn describe(&self) -> String {
        match self {
            Order::Move { direction } => format!("move {}", direction.abbr()),
            Order::BuildColony => "found colony".to_string(),
            Order::Fortify => "fortify".to_string(),
            Order::Sentry => "sentry".to_string(),
            Order::Disband => "disband".to_string(),
            Order::Plow => "plow".to_string(),
            Order::BuildRoad => "build road".to_string(),
            Order::DumpCargo => "dump cargo".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_move() {
        let order = Order::Move {
            direction: Direction::SW,
        };
        assert_eq!(order.describe(), "move sw");
    }

    #[test]
    fn order_variants_are_distinct() {
        assert_ne!(Order::Fortify, Order::Sentry);
        assert_ne!(
            Order::Move { direction: Direction::N },
            Order::Move { direction: Direction::S }
        );
    }
}
