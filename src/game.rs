//! Top-level game driver.
//!
//! Owns the world, the configuration, the random source and the engine's
//! own collaborators, and builds a fresh `Session` for each call into the
//! turn engine. Frontends supply the interaction surface and animator per
//! step; AI nations are answered by an `Agent`.

use std::path::Path;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::ai::Agent;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::resolve::StandardOracle;
use crate::save::{save_world, SaveError};
use crate::session::{Animator, Autosave, Interaction, PendingOrders, Session, Silent};
use crate::turn::{advance, Suspension, TurnInput};
use crate::world::{Nation, WorldState, ALL_NATIONS};

/// Engine steps allowed within one turn cycle before the driver assumes
/// the agents are stuck.
const MAX_STEPS_PER_CYCLE: usize = 200_000;

pub struct Game {
    pub world: WorldState,
    pub config: EngineConfig,
    pub pending: PendingOrders,
    rng: SmallRng,
    oracle: StandardOracle,
    natives: Silent,
    saver: Box<dyn Autosave + Send>,
}

impl Game {
    /// Wraps a world. A `seed` of 0 draws the random source from entropy.
    pub fn new(world: WorldState, config: EngineConfig, seed: u64, saver: Box<dyn Autosave + Send>) -> Self {
        let rng = if seed != 0 {
            SmallRng::seed_from_u64(seed)
        } else {
            SmallRng::from_entropy()
        };
        Game {
            world,
            config,
            pending: PendingOrders::default(),
            rng,
            oracle: StandardOracle,
            natives: Silent,
            saver,
        }
    }

    /// Runs the engine until its next suspension.
    pub fn step(
        &mut self,
        ui: &mut dyn Interaction,
        animator: &mut dyn Animator,
        input: Option<TurnInput>,
    ) -> Result<Suspension, EngineError> {
        let mut session = Session {
            world: &mut self.world,
            config: &self.config,
            rng: &mut self.rng,
            ui,
            animator,
            oracle: &mut self.oracle,
            natives: &mut self.natives,
            saver: self.saver.as_mut(),
            pending: &mut self.pending,
        };
        advance(&mut session, input)
    }

    /// The nation a suspension is waiting on, if any.
    pub fn waiting_on(suspension: Suspension) -> Option<Nation> {
        match suspension {
            Suspension::NeedsOrders { nation, .. } | Suspension::EndOfTurn { nation } => Some(nation),
            Suspension::CycleFinished => None,
        }
    }

    /// Answers a suspension with `agent`. Human nations get `None`, as does
    /// a finished cycle.
    pub fn answer_ai<A: Agent>(&mut self, agent: &mut A, suspension: Suspension) -> Option<TurnInput> {
        let nation = Self::waiting_on(suspension)?;
        if self.world.is_human(nation) {
            return None;
        }
        Some(self.agent_input(agent, suspension))
    }

    fn agent_input<A: Agent>(&mut self, agent: &mut A, suspension: Suspension) -> TurnInput {
        match suspension {
            Suspension::NeedsOrders { unit, .. } => {
                TurnInput::Unit(agent.unit_input(&self.world, unit, &mut self.rng))
            }
            Suspension::EndOfTurn { nation } => TurnInput::EndOfTurn(agent.end_of_turn(&self.world, nation)),
            Suspension::CycleFinished => TurnInput::EndOfTurn(crate::turn::EndOfTurnInput::NextTurn),
        }
    }

    /// Plays `cycles` full turn cycles with `agent` answering for every
    /// nation, human or not.
    pub fn run_headless<A: Agent>(&mut self, agent: &mut A, cycles: u32) -> Result<GameSummary, EngineError> {
        let mut ui = Silent;
        let mut animator = Silent;
        for _ in 0..cycles {
            let mut input = None;
            let mut steps = 0;
            loop {
                let suspension = self.step(&mut ui, &mut animator, input.take())?;
                if suspension == Suspension::CycleFinished {
                    break;
                }
                steps += 1;
                if steps > MAX_STEPS_PER_CYCLE {
                    return Err(EngineError::Invariant(format!(
                        "no progress after {} steps in turn {}",
                        steps, self.world.turn.time
                    )));
                }
                input = Some(self.agent_input(agent, suspension));
            }
            log::debug!("headless cycle done: {}", self.world.turn.time);
        }
        Ok(self.summary())
    }

    pub fn save(&self, path: &Path) -> Result<(), SaveError> {
        save_world(&self.world, path)
    }

    pub fn summary(&self) -> GameSummary {
        let nations = ALL_NATIONS
            .iter()
            .filter_map(|n| self.world.nations.get(n))
            .map(|state| NationSummary {
                nation: state.nation,
                alive: self.world.nation_alive(state.nation),
                units: self.world.unit_ids_of(state.nation).len(),
                colonies: self.world.colony_ids_of(state.nation).len(),
                fathers: state.fathers.len(),
                bells: state.bells,
            })
            .collect();
        GameSummary {
            turns_played: self.world.turn.turns_played,
            time: self.world.turn.time.to_string(),
            nations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NationSummary {
    pub nation: Nation,
    pub alive: bool,
    pub units: usize,
    pub colonies: usize,
    pub fathers: usize,
    pub bells: i32,
}

/// End-of-game snapshot written by the self-play binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub turns_played: u32,
    pub time: String,
    pub nations: Vec<NationSummary>,
}
