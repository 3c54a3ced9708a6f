//! Movement costs and the movement-point ledger.
//!
//! Costs are computed in thirds of a point. A move with enough points left
//! simply pays its cost. A move without enough points may still happen once
//! per turn: either as the unit's first move of the turn (start-of-turn
//! exemption, pays everything left) or as an overdraw, which spends the rest
//! of the unit's points and leaves it unable to move again this turn. A unit
//! with no points left forfeits the move.

use crate::error::EngineError;
use crate::session::Session;
use crate::world::{Coord, MovementPoints, Nation, UnitId, WorldState};

/// Which rule let an insufficient-points move through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    /// The unit still had its full allotment.
    StartOfTurn,
    /// The unit moved into a deficit.
    Overdraw,
}

/// Result of the pure sufficiency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsCheck {
    Allowed {
        subtract: MovementPoints,
        exemption: Option<Exemption>,
    },
    Insufficient {
        has: MovementPoints,
        needed: MovementPoints,
    },
}

/// Final outcome once the overdraw prompt is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsOutcome {
    Proceed {
        subtract: MovementPoints,
        exemption: Option<Exemption>,
    },
    /// No points left to overdraw with.
    Forfeit,
    /// The player declined to attempt the move.
    Cancelled,
}

/// Points needed for a unit of `nation` to step from `from` to `to`.
pub fn movement_cost(world: &WorldState, nation: Nation, from: Coord, to: Coord) -> MovementPoints {
    let one = MovementPoints::whole(1);
    let Some(dst) = world.map.square(to) else {
        return one;
    };
    if !dst.is_land() {
        return one;
    }
    let mut cost = MovementPoints::whole(dst.terrain.movement_cost());
    if let Some(src) = world.map.square(from) {
        if (src.road && dst.road) || (src.river && dst.river) {
            cost = MovementPoints::thirds(1);
        }
    }
    if world.colony_at(to).is_some_and(|c| c.nation == nation) {
        cost = cost.min(one);
    }
    cost
}

pub fn check_points(has: MovementPoints, allotment: MovementPoints, needed: MovementPoints) -> PointsCheck {
    if has >= needed {
        PointsCheck::Allowed {
            subtract: needed,
            exemption: None,
        }
    } else if has >= allotment && !has.is_zero() {
        PointsCheck::Allowed {
            subtract: has,
            exemption: Some(Exemption::StartOfTurn),
        }
    } else {
        PointsCheck::Insufficient { has, needed }
    }
}

/// Runs the sufficiency check for `unit`, prompting a human before an
/// overdraw. Mutates nothing.
pub fn settle(session: &mut Session<'_>, unit: UnitId, needed: MovementPoints) -> Result<PointsOutcome, EngineError> {
    let u = session.world.unit(unit)?;
    let nation = u.nation;
    let name = u.name();
    let allotment = session.world.movement_allotment(u);
    match check_points(u.mv_pts, allotment, needed) {
        PointsCheck::Allowed { subtract, exemption } => Ok(PointsOutcome::Proceed { subtract, exemption }),
        PointsCheck::Insufficient { has, .. } if has.is_zero() => {
            log::debug!("{} {} has no points left", nation, unit);
            Ok(PointsOutcome::Forfeit)
        }
        PointsCheck::Insufficient { has, needed } => {
            if session.prompts_overdraw(nation) {
                let question = format!(
                    "{} has {} movement points left but the move needs {}. Attempt it anyway?",
                    name, has, needed
                );
                if !session.ask(nation, &question, true) {
                    return Ok(PointsOutcome::Cancelled);
                }
            }
            log::debug!("{} {} overdraws {} of {}", nation, unit, has, needed);
            Ok(PointsOutcome::Proceed {
                subtract: has,
                exemption: Some(Exemption::Overdraw),
            })
        }
    }
}
