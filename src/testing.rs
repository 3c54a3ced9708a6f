//! Scripted collaborators for driving the engine without a frontend.
//!
//! `Harness` owns a world plus scripted stand-ins for every external
//! service, and hands out sessions over them. Unit tests, integration tests
//! and benchmarks all build on it.

use std::collections::VecDeque;

use rand::rngs::mock::StepRng;

use crate::config::EngineConfig;
use crate::resolve::combat::{CombatOracle, Fight, FightResult, NavalFate, Roll};
use crate::session::{AnimationSequence, Animator, Autosave, Interaction, PendingOrders, Session, Silent};
use crate::save::SaveError;
use crate::turn::TurnState;
use crate::world::{
    Colony, ColonyId, Composition, Coord, Nation, Square, Terrain, TerrainMap, UnitId, WorldState,
};

/// Interaction surface answering from queues and recording what it showed.
/// An empty queue answers like a dismissed dialog.
#[derive(Debug, Default)]
pub struct ScriptedUi {
    confirms: VecDeque<bool>,
    choices: VecDeque<usize>,
    strings: VecDeque<String>,
    ints: VecDeque<i32>,
    messages: Vec<String>,
    questions: Vec<String>,
    colonies_shown: Vec<ColonyId>,
}

impl ScriptedUi {
    pub fn answer_confirm(&mut self, answer: bool) {
        self.confirms.push_back(answer);
    }

    pub fn answer_choice(&mut self, index: usize) {
        self.choices.push_back(index);
    }

    pub fn answer_string(&mut self, answer: &str) {
        self.strings.push_back(answer.to_string());
    }

    pub fn answer_int(&mut self, answer: i32) {
        self.ints.push_back(answer);
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn colonies_shown(&self) -> &[ColonyId] {
        &self.colonies_shown
    }

    pub fn clear_log(&mut self) {
        self.messages.clear();
        self.questions.clear();
        self.colonies_shown.clear();
    }
}

impl Interaction for ScriptedUi {
    fn message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn confirm(&mut self, question: &str) -> Option<bool> {
        self.questions.push(question.to_string());
        self.confirms.pop_front()
    }

    fn choose(&mut self, prompt: &str, options: &[String]) -> Option<usize> {
        self.questions.push(prompt.to_string());
        self.choices.pop_front().filter(|i| *i < options.len())
    }

    fn input_string(&mut self, prompt: &str, _default: &str) -> Option<String> {
        self.questions.push(prompt.to_string());
        self.strings.pop_front()
    }

    fn input_int(&mut self, prompt: &str, min: i32, max: i32) -> Option<i32> {
        self.questions.push(prompt.to_string());
        self.ints.pop_front().map(|n| n.clamp(min, max))
    }

    fn show_colony(&mut self, colony: &Colony) {
        self.colonies_shown.push(colony.id);
    }
}

/// Records every sequence it is asked to play.
#[derive(Debug, Default)]
pub struct RecordingAnimator {
    pub played: Vec<AnimationSequence>,
}

impl Animator for RecordingAnimator {
    fn play(&mut self, sequence: &AnimationSequence) {
        self.played.push(sequence.clone());
    }
}

/// Oracle that replays scripted rolls. Without a script the attacker wins,
/// nobody is promoted and losing ships are damaged.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    rolls: VecDeque<Roll>,
    pub fights: Vec<Fight>,
}

impl ScriptedOracle {
    pub fn push(&mut self, attacker_wins: bool, promote: bool, naval: NavalFate) {
        self.rolls.push_back(Roll {
            attacker_wins,
            promote,
            naval,
        });
    }

    pub fn attacker_wins(&mut self) {
        self.push(true, false, NavalFate::Damage);
    }

    pub fn defender_wins(&mut self) {
        self.push(false, false, NavalFate::Damage);
    }
}

impl CombatOracle for ScriptedOracle {
    fn fight(&mut self, fight: &Fight, _rng: &mut dyn rand::RngCore) -> FightResult {
        self.fights.push(*fight);
        let roll = self.rolls.pop_front().unwrap_or(Roll {
            attacker_wins: true,
            promote: false,
            naval: NavalFate::Damage,
        });
        fight.settle(roll)
    }
}

/// Counts autosaves instead of writing files.
#[derive(Debug, Default)]
pub struct CountingSaver {
    pub saves: usize,
}

impl Autosave for CountingSaver {
    fn autosave(&mut self, _world: &WorldState) -> Result<(), SaveError> {
        self.saves += 1;
        Ok(())
    }
}

pub struct Harness {
    pub world: WorldState,
    pub config: EngineConfig,
    pub rng: StepRng,
    pub ui: ScriptedUi,
    pub animator: RecordingAnimator,
    pub oracle: ScriptedOracle,
    pub natives: Silent,
    pub saver: CountingSaver,
    pub pending: PendingOrders,
}

impl Harness {
    /// Wraps a world. The English are human, everyone else is AI. The rng
    /// starts out answering every roll with success.
    pub fn new(world: WorldState) -> Self {
        Harness {
            world,
            config: EngineConfig::default(),
            rng: StepRng::new(0, 0),
            ui: ScriptedUi::default(),
            animator: RecordingAnimator::default(),
            oracle: ScriptedOracle::default(),
            natives: Silent,
            saver: CountingSaver::default(),
            pending: PendingOrders::default(),
        }
    }

    /// An all-plains map with a human English player and an AI French player.
    pub fn plains(width: i32, height: i32) -> Self {
        let map = TerrainMap::filled(width, height, Square::new(Terrain::Plains));
        let mut world = WorldState::new(map, TurnState::default());
        world.add_nation(Nation::English, true);
        world.add_nation(Nation::French, false);
        Harness::new(world)
    }

    /// Turns the given columns into ocean (sea lanes when `lanes` is set).
    pub fn flood_columns(&mut self, columns: std::ops::Range<i32>, lanes: bool) {
        let height = self.world.map.height();
        for x in columns {
            for y in 0..height {
                if let Some(sq) = self.world.map.square_mut(Coord::new(x, y)) {
                    *sq = Square::new(Terrain::Ocean);
                    sq.sea_lane = lanes;
                }
            }
        }
    }

    pub fn set_terrain(&mut self, coord: Coord, terrain: Terrain) {
        if let Some(sq) = self.world.map.square_mut(coord) {
            *sq = Square::new(terrain);
        }
    }

    /// Creates a unit on the map with its full movement allotment.
    pub fn unit(&mut self, nation: Nation, composition: Composition, coord: Coord) -> UnitId {
        match self.world.create_unit_on_map(nation, composition, coord) {
            Ok(id) => id,
            Err(e) => panic!("cannot place unit at {}: {}", coord, e),
        }
    }

    /// Creates a unit aboard `holder`.
    pub fn passenger(&mut self, nation: Nation, composition: Composition, holder: UnitId) -> UnitId {
        let id = self.world.create_unit(nation, composition);
        if let Err(e) = self.world.board(id, holder) {
            panic!("cannot board {}: {}", holder, e);
        }
        id
    }

    pub fn session(&mut self) -> Session<'_> {
        Session {
            world: &mut self.world,
            config: &self.config,
            rng: &mut self.rng,
            ui: &mut self.ui,
            animator: &mut self.animator,
            oracle: &mut self.oracle,
            natives: &mut self.natives,
            saver: &mut self.saver,
            pending: &mut self.pending,
        }
    }
}
