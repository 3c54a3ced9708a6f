//! Console command parser.
//!
//! Turns one line of player input into a structured `Command`, and a
//! command into the `TurnInput` that answers the engine's current
//! suspension.

use std::path::PathBuf;

use crate::turn::{EndOfTurnInput, MenuAction, Suspension, TurnInput, UnitInput};
use crate::world::{Direction, Order, UnitId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("'{command}' expects {expected}")]
    MissingArgument { command: &'static str, expected: &'static str },

    #[error("not a direction: '{0}' (use n, ne, e, se, s, sw, w, nw)")]
    BadDirection(String),

    #[error("not a unit id: '{0}'")]
    BadUnitId(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Order(Order),
    /// Move the unit to the back of the queue.
    Wait,
    /// No more orders for this unit this turn.
    Skip,
    /// Wake these units and move them to the front of the queue.
    Activate(Vec<UnitId>),
    Sail(UnitId),
    /// Return to units still waiting at the end of the turn.
    Units,
    /// End the turn.
    Next,
    Save(PathBuf),
    Map,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  move <dir>        move or attack (n ne e se s sw w nw)
  found             found a colony here
  fortify | sentry  hold position
  plow | road       pioneer work
  disband | dump    disband the unit / throw goods overboard
  wait | skip       later / no more orders this turn
  activate <id>..   wake units and move them first
  sail <id>         send a ship from the harbor
  units | next      back to units / end the turn
  save <path> | map | help | quit";

fn unit_id(token: &str) -> Result<UnitId, ParseError> {
    let digits = token.trim_start_matches(['u', '#']);
    digits
        .parse::<u32>()
        .map(UnitId)
        .map_err(|_| ParseError::BadUnitId(token.to_string()))
}

/// Parses one line. Returns `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "move" | "m" => {
            let dir = args.first().ok_or(ParseError::MissingArgument {
                command: "move",
                expected: "a direction",
            })?;
            let direction = Direction::from_abbr(&dir.to_ascii_lowercase())
                .ok_or_else(|| ParseError::BadDirection(dir.to_string()))?;
            Command::Order(Order::Move { direction })
        }
        "found" | "build" => Command::Order(Order::BuildColony),
        "fortify" => Command::Order(Order::Fortify),
        "sentry" => Command::Order(Order::Sentry),
        "plow" => Command::Order(Order::Plow),
        "road" => Command::Order(Order::BuildRoad),
        "disband" => Command::Order(Order::Disband),
        "dump" => Command::Order(Order::DumpCargo),
        "wait" => Command::Wait,
        "skip" => Command::Skip,
        "activate" => {
            if args.is_empty() {
                return Err(ParseError::MissingArgument {
                    command: "activate",
                    expected: "one or more unit ids",
                });
            }
            Command::Activate(args.iter().map(|t| unit_id(t)).collect::<Result<_, _>>()?)
        }
        "sail" => {
            let id = args.first().ok_or(ParseError::MissingArgument {
                command: "sail",
                expected: "a unit id",
            })?;
            Command::Sail(unit_id(id)?)
        }
        "units" => Command::Units,
        "next" | "end" => Command::Next,
        "save" => {
            let path = args.first().ok_or(ParseError::MissingArgument {
                command: "save",
                expected: "a file path",
            })?;
            Command::Save(PathBuf::from(path))
        }
        "map" => Command::Map,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        // A bare direction is a move.
        other => match Direction::from_abbr(&other.to_ascii_lowercase()) {
            Some(direction) => Command::Order(Order::Move { direction }),
            None => return Err(ParseError::UnknownCommand(head.to_string())),
        },
    };
    Ok(Some(command))
}

impl Command {
    /// The engine input this command gives at `suspension`, or `None` if it
    /// has no meaning there (or is handled by the frontend itself).
    pub fn to_input(&self, suspension: Suspension) -> Option<TurnInput> {
        match suspension {
            Suspension::NeedsOrders { .. } => {
                let input = match self {
                    Command::Order(order) => UnitInput::Order(*order),
                    Command::Wait => UnitInput::Wait,
                    Command::Skip => UnitInput::NoOrders,
                    Command::Activate(ids) => UnitInput::Prioritize(ids.clone()),
                    Command::Sail(id) => UnitInput::Menu(MenuAction::SailFromHarbor(*id)),
                    Command::Next => return Some(TurnInput::EndOfTurn(EndOfTurnInput::NextTurn)),
                    _ => return None,
                };
                Some(TurnInput::Unit(input))
            }
            Suspension::EndOfTurn { .. } => {
                let input = match self {
                    Command::Next => EndOfTurnInput::NextTurn,
                    Command::Units => EndOfTurnInput::ReturnToUnits,
                    Command::Activate(ids) => EndOfTurnInput::Menu(MenuAction::ActivateUnit(*ids.first()?)),
                    Command::Sail(id) => EndOfTurnInput::Menu(MenuAction::SailFromHarbor(*id)),
                    _ => return None,
                };
                Some(TurnInput::EndOfTurn(input))
            }
            Suspension::CycleFinished => None,
        }
    }
}

/// Parses a yes/no answer.
pub fn parse_yes_no(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
