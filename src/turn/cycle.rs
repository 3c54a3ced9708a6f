//! The turn cycle: natives, every nation in a fixed order, then end-of-cycle
//! bookkeeping.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::session::Session;
use crate::turn::fog::recompute_fog;
use crate::turn::nation::{advance_nation, NationTurnState};
use crate::turn::{Suspension, TurnInput};
use crate::world::{Nation, ALL_NATIONS};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnCycle {
    #[default]
    NotStarted,
    Natives,
    Nation {
        nation: Nation,
        state: NationTurnState,
    },
    EndCycle,
    Finished,
}

impl TurnCycle {
    pub const fn name(&self) -> &'static str {
        match self {
            TurnCycle::NotStarted => "not_started",
            TurnCycle::Natives => "natives",
            TurnCycle::Nation { .. } => "nation",
            TurnCycle::EndCycle => "end_cycle",
            TurnCycle::Finished => "finished",
        }
    }
}

/// The first nation after `after` (or the first overall) that takes part
/// in this cycle.
fn next_nation(session: &Session<'_>, after: Option<Nation>) -> Option<Nation> {
    let start = match after {
        Some(n) => ALL_NATIONS.iter().position(|x| *x == n)? + 1,
        None => 0,
    };
    ALL_NATIONS[start..]
        .iter()
        .copied()
        .find(|n| session.world.nations.contains_key(n) && session.world.nation_alive(*n))
}

fn enter_nation_or_end(session: &mut Session<'_>, after: Option<Nation>) {
    session.world.turn.cycle = match next_nation(session, after) {
        Some(nation) => TurnCycle::Nation {
            nation,
            state: NationTurnState::NotStarted,
        },
        None => TurnCycle::EndCycle,
    };
}

/// Once-per-cycle bookkeeping before anyone moves.
fn start_cycle(session: &mut Session<'_>) {
    let changed = session.world.market.evolve();
    if !changed.is_empty() {
        log::debug!("market prices moved for {:?}", changed);
    }
    let allotments: Vec<_> = session
        .world
        .units
        .values()
        .map(|u| (u.id, session.world.movement_allotment(u)))
        .collect();
    for (id, mv) in allotments {
        if let Some(u) = session.world.units.get_mut(&id) {
            u.mv_pts = mv;
            u.evolved = false;
        }
    }
    log::info!("turn {} begins", session.world.turn.time);
}

fn end_cycle(session: &mut Session<'_>) -> Result<(), EngineError> {
    recompute_fog(session.world);
    let turn = &mut session.world.turn;
    turn.time = turn.time.next(session.config.seasonal_start_year);
    turn.turns_played += 1;
    turn.cycle = TurnCycle::Finished;
    let played = turn.turns_played;
    log::info!("cycle {} finished; next turn is {}", played, turn.time);

    if let Some(every) = session.config.autosave_every.filter(|n| *n > 0) {
        if played % every == 0 {
            session.saver.autosave(session.world)?;
            log::info!("autosaved after turn {}", played);
        }
    }
    Ok(())
}

/// Runs the cycle until the engine needs input or the cycle is finished.
///
/// `input` answers the suspension returned by the previous call. Input that
/// does not match the current suspension is logged and dropped. After
/// `CycleFinished`, the next call starts a new cycle.
pub fn advance(session: &mut Session<'_>, input: Option<TurnInput>) -> Result<Suspension, EngineError> {
    let mut input = input;
    loop {
        let cycle = session.world.turn.cycle.clone();
        if !matches!(cycle, TurnCycle::Nation { .. }) {
            if let Some(stray) = input.take() {
                log::warn!("cycle at {}; dropping {:?}", cycle.name(), stray);
            }
        }
        match cycle {
            TurnCycle::NotStarted => {
                start_cycle(session);
                session.world.turn.cycle = TurnCycle::Natives;
            }
            TurnCycle::Natives => {
                session.natives.take_turn(session.world, session.rng)?;
                enter_nation_or_end(session, None);
            }
            TurnCycle::Nation { nation, .. } => {
                if let Some(suspension) = advance_nation(session, nation, &mut input)? {
                    return Ok(suspension);
                }
                enter_nation_or_end(session, Some(nation));
            }
            TurnCycle::EndCycle => {
                end_cycle(session)?;
                return Ok(Suspension::CycleFinished);
            }
            TurnCycle::Finished => session.world.turn.cycle = TurnCycle::NotStarted,
        }
    }
}
