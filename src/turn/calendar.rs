//! Calendar advance.
//!
//! Early in the game one turn is one year. From the seasonal start year on,
//! each year has a spring and an autumn turn.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Autumn,
}

/// The in-game date of the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnTime {
    pub year: i32,
    /// `None` while turns are still whole years.
    pub season: Option<Season>,
}

impl TurnTime {
    pub const fn new(year: i32) -> Self {
        TurnTime { year, season: None }
    }

    /// Computes the date of the following turn.
    ///
    /// Flow:
    /// - year Y (before the seasonal start) -> year Y+1
    /// - year Y+1 reaching the seasonal start -> Spring Y+1
    /// - Spring Y -> Autumn Y
    /// - Autumn Y -> Spring Y+1
    pub fn next(self, seasonal_start_year: i32) -> TurnTime {
        match self.season {
            None => {
                let year = self.year + 1;
                let season = (year >= seasonal_start_year).then_some(Season::Spring);
                TurnTime { year, season }
            }
            Some(Season::Spring) => TurnTime {
                year: self.year,
                season: Some(Season::Autumn),
            },
            Some(Season::Autumn) => TurnTime {
                year: self.year + 1,
                season: Some(Season::Spring),
            },
        }
    }
}

impl std::fmt::Display for TurnTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.season {
            None => write!(f, "{}", self.year),
            Some(Season::Spring) => write!(f, "Spring {}", self.year),
            Some(Season::Autumn) => write!(f, "Autumn {}", self.year),
        }
    }
}
