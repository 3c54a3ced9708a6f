//! Fatal engine errors.
//!
//! Refusals and cancellations are ordinary verdicts and never show up here.
//! An `EngineError` means a verdict table or the resolution pipeline reached
//! a state it does not handle; the driver logs it and stops the game.

use crate::save::SaveError;
use crate::world::{UnitId, WorldError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Save(#[from] SaveError),

    /// A travel verdict was reached without the movement-point check it
    /// requires, or after one it must not have.
    #[error("travel verdict {verdict} reached with movement check = {checked}")]
    MovementCheckMismatch { verdict: &'static str, checked: bool },

    #[error("travel table has no rule for {0}")]
    UnreachableTravel(String),

    #[error("unit {0} vanished while its order was being resolved")]
    UnitVanished(UnitId),

    #[error("invariant violated: {0}")]
    Invariant(String),
}
