//! One nation's turn.
//!
//! Progression: not started, colonies, units, end of turn, finish,
//! finished. The units state carries the activation queue so it is saved
//! along with everything else.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::session::Session;
use crate::turn::colonies::evolve_colonies;
use crate::turn::queue::ActivationQueue;
use crate::turn::unit_turn::{apply_menu, build_queue, run_units};
use crate::turn::{EndOfTurnInput, Suspension, TurnCycle, TurnInput};
use crate::world::Nation;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NationTurnState {
    #[default]
    NotStarted,
    Colonies,
    Units {
        queue: ActivationQueue,
    },
    EndOfTurn,
    Finish,
    Finished,
}

impl NationTurnState {
    pub const fn name(&self) -> &'static str {
        match self {
            NationTurnState::NotStarted => "not_started",
            NationTurnState::Colonies => "colonies",
            NationTurnState::Units { .. } => "units",
            NationTurnState::EndOfTurn => "end_of_turn",
            NationTurnState::Finish => "finish",
            NationTurnState::Finished => "finished",
        }
    }
}

fn current(session: &Session<'_>, nation: Nation) -> Result<NationTurnState, EngineError> {
    match &session.world.turn.cycle {
        TurnCycle::Nation { nation: n, state } if *n == nation => Ok(state.clone()),
        other => Err(EngineError::Invariant(format!(
            "{} turn advanced while the cycle is at {:?}",
            nation, other
        ))),
    }
}

fn store(session: &mut Session<'_>, nation: Nation, state: NationTurnState) {
    log::trace!("{} -> {}", nation, state.name());
    session.world.turn.cycle = TurnCycle::Nation { nation, state };
}

/// Advances `nation`'s turn until it suspends or finishes. Returns `None`
/// once the nation is finished.
pub fn advance_nation(
    session: &mut Session<'_>,
    nation: Nation,
    input: &mut Option<TurnInput>,
) -> Result<Option<Suspension>, EngineError> {
    loop {
        match current(session, nation)? {
            NationTurnState::NotStarted => {
                log::info!("{} begins its turn ({})", nation, session.world.turn.time);
                store(session, nation, NationTurnState::Colonies);
            }
            NationTurnState::Colonies => {
                evolve_colonies(session, nation)?;
                let queue = build_queue(session.world, nation);
                store(session, nation, NationTurnState::Units { queue });
            }
            NationTurnState::Units { mut queue } => {
                let suspension = run_units(session, nation, &mut queue, input)?;
                match suspension {
                    Some(s) => {
                        store(session, nation, NationTurnState::Units { queue });
                        return Ok(Some(s));
                    }
                    None => store(session, nation, NationTurnState::EndOfTurn),
                }
            }
            NationTurnState::EndOfTurn => match input.take() {
                None => return Ok(Some(Suspension::EndOfTurn { nation })),
                Some(TurnInput::EndOfTurn(EndOfTurnInput::NextTurn)) => {
                    store(session, nation, NationTurnState::Finish);
                }
                Some(TurnInput::EndOfTurn(EndOfTurnInput::ReturnToUnits)) => {
                    let queue = build_queue(session.world, nation);
                    store(session, nation, NationTurnState::Units { queue });
                }
                Some(TurnInput::EndOfTurn(EndOfTurnInput::Menu(action))) => {
                    if let Some(unit) = apply_menu(session, nation, action)? {
                        let mut queue = build_queue(session.world, nation);
                        queue.prioritize(unit);
                        store(session, nation, NationTurnState::Units { queue });
                    }
                }
                Some(other) => {
                    log::warn!("{} is at end of turn; dropping {:?}", nation, other);
                    return Ok(Some(Suspension::EndOfTurn { nation }));
                }
            },
            NationTurnState::Finish => {
                log::info!("{} ends its turn", nation);
                store(session, nation, NationTurnState::Finished);
            }
            NationTurnState::Finished => return Ok(None),
        }
    }
}
