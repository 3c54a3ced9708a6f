//! European nations, their per-game state, and founding fathers.

use serde::{Deserialize, Serialize};

/// A European nation. Turns are taken in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Nation {
    English,
    French,
    Spanish,
    Dutch,
}

/// All nations in the fixed order in which they take their turns.
pub const ALL_NATIONS: [Nation; 4] = [
    Nation::English,
    Nation::French,
    Nation::Spanish,
    Nation::Dutch,
];

impl Nation {
    /// Returns the lowercase name used by the console protocol.
    pub const fn name(self) -> &'static str {
        match self {
            Nation::English => "english",
            Nation::French => "french",
            Nation::Spanish => "spanish",
            Nation::Dutch => "dutch",
        }
    }

    /// Returns the name used in messages ("the English").
    pub const fn display_name(self) -> &'static str {
        match self {
            Nation::English => "English",
            Nation::French => "French",
            Nation::Spanish => "Spanish",
            Nation::Dutch => "Dutch",
        }
    }

    /// Single character used when printing the map.
    pub const fn glyph(self) -> char {
        match self {
            Nation::English => 'E',
            Nation::French => 'F',
            Nation::Spanish => 'S',
            Nation::Dutch => 'D',
        }
    }

    /// Parses a nation from its lowercase name.
    pub fn from_name(name: &str) -> Option<Nation> {
        match name {
            "english" => Some(Nation::English),
            "french" => Some(Nation::French),
            "spanish" => Some(Nation::Spanish),
            "dutch" => Some(Nation::Dutch),
            _ => None,
        }
    }

    /// The nation that follows this one in turn order, if any.
    pub fn next(self) -> Option<Nation> {
        let idx = ALL_NATIONS.iter().position(|n| *n == self)?;
        ALL_NATIONS.get(idx + 1).copied()
    }
}

impl std::fmt::Display for Nation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Founding fathers, acquired in this fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FoundingFather {
    /// +50% bell production.
    ThomasJefferson,
    /// +1 movement point for ships.
    FerdinandMagellan,
    /// +1 sight radius for all units.
    HernandoDeSoto,
    /// Free stockade in every colony of three or more colonists.
    LaSalle,
}

pub const FATHER_ORDER: [FoundingFather; 4] = [
    FoundingFather::ThomasJefferson,
    FoundingFather::FerdinandMagellan,
    FoundingFather::HernandoDeSoto,
    FoundingFather::LaSalle,
];

impl FoundingFather {
    pub const fn name(self) -> &'static str {
        match self {
            FoundingFather::ThomasJefferson => "Thomas Jefferson",
            FoundingFather::FerdinandMagellan => "Ferdinand Magellan",
            FoundingFather::HernandoDeSoto => "Hernando de Soto",
            FoundingFather::LaSalle => "La Salle",
        }
    }
}

/// Per-nation state that persists across turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationState {
    pub nation: Nation,
    /// Controlled from the keyboard rather than by an agent.
    pub human: bool,
    pub gold: i32,
    /// Bells accumulated toward the next founding father.
    pub bells: i32,
    pub fathers: Vec<FoundingFather>,
}

impl NationState {
    pub fn new(nation: Nation, human: bool) -> Self {
        NationState {
            nation,
            human,
            gold: 0,
            bells: 0,
            fathers: Vec::new(),
        }
    }

    pub fn has_father(&self, father: FoundingFather) -> bool {
        self.fathers.contains(&father)
    }

    /// The next father in line, or `None` once all have joined.
    pub fn next_father(&self) -> Option<FoundingFather> {
        FATHER_ORDER
            .iter()
            .copied()
            .find(|f| !self.fathers.contains(f))
    }

    /// Bells required for the next father.
    pub fn father_cost(&self) -> i32 {
        40 + 60 * self.fathers.len() as i32
    }
}
