//! The session threaded through every step of turn processing.
//!
//! A `Session` bundles mutable access to the world with the external
//! collaborators the engine calls into: the interaction surface, the
//! animation player, the combat oracle, the natives step and autosaving.
//! The driver builds one for each call into the turn engine; nothing here is
//! process-global.
//!
//! Every collaborator call is synchronous: a call into `Interaction` or
//! `Animator` returns only once the user has answered or the animation has
//! finished. That is the engine's suspension point inside an order. Between
//! orders, the turn engine suspends by returning to the driver instead.

use std::collections::{BTreeMap, VecDeque};

use rand::RngCore;

use crate::config::{EngineConfig, OverdrawPrompt};
use crate::error::EngineError;
use crate::resolve::combat::CombatOracle;
use crate::save::SaveError;
use crate::world::{Colony, ColonyId, Coord, Direction, Nation, Order, UnitId, WorldState};

/// Dialogs shown to the human player.
///
/// Methods returning `Option` return `None` when the player dismisses the
/// dialog, which callers treat as a cancellation.
pub trait Interaction {
    fn message(&mut self, text: &str);
    fn confirm(&mut self, question: &str) -> Option<bool>;
    fn choose(&mut self, prompt: &str, options: &[String]) -> Option<usize>;
    fn input_string(&mut self, prompt: &str, default: &str) -> Option<String>;
    fn input_int(&mut self, prompt: &str, min: i32, max: i32) -> Option<i32>;
    fn show_colony(&mut self, colony: &Colony);
}

/// One step of a visual sequence. Animations never change the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Animation {
    Slide {
        unit: UnitId,
        from: Coord,
        direction: Direction,
    },
    Attack {
        attacker: UnitId,
        defender: UnitId,
        attacker_wins: bool,
    },
    Depixelate {
        unit: UnitId,
    },
    Fortify {
        unit: UnitId,
    },
    ColonyCapture {
        colony: ColonyId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationSequence {
    pub steps: Vec<Animation>,
}

impl AnimationSequence {
    pub fn single(step: Animation) -> Self {
        AnimationSequence { steps: vec![step] }
    }
}

pub trait Animator {
    /// Plays the sequence and returns once playback has completed.
    fn play(&mut self, sequence: &AnimationSequence);
}

/// The opaque natives step of each turn cycle.
pub trait NativesAgent {
    fn take_turn(&mut self, world: &mut WorldState, rng: &mut dyn RngCore) -> Result<(), EngineError>;
}

pub trait Autosave {
    fn autosave(&mut self, world: &WorldState) -> Result<(), SaveError>;
}

/// Interaction surface that shows nothing and declines every prompt.
#[derive(Debug, Default)]
pub struct Silent;

impl Interaction for Silent {
    fn message(&mut self, _text: &str) {}
    fn confirm(&mut self, _question: &str) -> Option<bool> {
        None
    }
    fn choose(&mut self, _prompt: &str, _options: &[String]) -> Option<usize> {
        None
    }
    fn input_string(&mut self, _prompt: &str, _default: &str) -> Option<String> {
        None
    }
    fn input_int(&mut self, _prompt: &str, _min: i32, _max: i32) -> Option<i32> {
        None
    }
    fn show_colony(&mut self, _colony: &Colony) {}
}

impl Animator for Silent {
    fn play(&mut self, _sequence: &AnimationSequence) {}
}

impl NativesAgent for Silent {
    fn take_turn(&mut self, _world: &mut WorldState, _rng: &mut dyn RngCore) -> Result<(), EngineError> {
        log::trace!("natives pass");
        Ok(())
    }
}

impl Autosave for Silent {
    fn autosave(&mut self, _world: &WorldState) -> Result<(), SaveError> {
        Ok(())
    }
}

/// Orders queued for units ahead of time. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct PendingOrders {
    orders: BTreeMap<UnitId, VecDeque<Order>>,
}

impl PendingOrders {
    pub fn push(&mut self, unit: UnitId, orders: impl IntoIterator<Item = Order>) {
        self.orders.entry(unit).or_default().extend(orders);
    }

    pub fn pop(&mut self, unit: UnitId) -> Option<Order> {
        let queue = self.orders.get_mut(&unit)?;
        let order = queue.pop_front();
        if queue.is_empty() {
            self.orders.remove(&unit);
        }
        order
    }

    pub fn clear(&mut self, unit: UnitId) {
        self.orders.remove(&unit);
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

pub struct Session<'a> {
    pub world: &'a mut WorldState,
    pub config: &'a EngineConfig,
    pub rng: &'a mut dyn RngCore,
    pub ui: &'a mut dyn Interaction,
    pub animator: &'a mut dyn Animator,
    pub oracle: &'a mut dyn CombatOracle,
    pub natives: &'a mut dyn NativesAgent,
    pub saver: &'a mut dyn Autosave,
    pub pending: &'a mut PendingOrders,
}

impl Session<'_> {
    pub fn is_human(&self, nation: Nation) -> bool {
        self.world.is_human(nation)
    }

    /// Shows a message if `nation` is played by a human. AI nations never
    /// see messages.
    pub fn message(&mut self, nation: Nation, text: &str) {
        if self.is_human(nation) {
            self.ui.message(text);
        } else {
            log::debug!("[{}] {}", nation, text);
        }
    }

    /// Asks a yes/no question of a human nation. AI nations get
    /// `ai_answer` without a prompt.
    pub fn ask(&mut self, nation: Nation, question: &str, ai_answer: bool) -> bool {
        if self.is_human(nation) {
            self.ui.confirm(question).unwrap_or(false)
        } else {
            ai_answer
        }
    }

    /// Whether a human is asked before an insufficient-points move.
    pub fn prompts_overdraw(&self, nation: Nation) -> bool {
        self.is_human(nation) && self.config.overdraw_prompt == OverdrawPrompt::Always
    }

    pub fn play(&mut self, sequence: AnimationSequence) {
        if !sequence.steps.is_empty() {
            self.animator.play(&sequence);
        }
    }

    pub fn show_colony(&mut self, colony: ColonyId) -> Result<(), EngineError> {
        let colony = self.world.colony(colony)?.clone();
        self.ui.show_colony(&colony);
        Ok(())
    }
}
