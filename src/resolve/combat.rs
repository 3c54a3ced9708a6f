//! Combat descriptors, outcomes, and the combat oracle.
//!
//! The attack resolver describes each side of a fight: who fights, at what
//! strength, and what happens to it on a loss or a win. The oracle only
//! picks the winner (and the random side effects: promotion, sinking,
//! evasion) and turns the descriptors into outcomes. Applying an outcome to
//! the world happens in `outcome`.

use rand::{Rng, RngCore};

use crate::world::{ColonyId, Composition, Coord, Nation, UnitId, UnitRole};

/// What happens to a land unit that loses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossRule {
    Destroy,
    DemoteTo(Composition),
    Capture,
    CaptureAndDemote(Composition),
}

impl LossRule {
    /// The loss rule for a defending unit of this composition.
    pub fn for_defender(composition: &Composition) -> LossRule {
        match composition.role() {
            UnitRole::Scout | UnitRole::DamagedArtillery => LossRule::Destroy,
            UnitRole::Pioneer => LossRule::CaptureAndDemote(Composition {
                tools: 0,
                ..*composition
            }),
            UnitRole::Colonist | UnitRole::WagonTrain => LossRule::Capture,
            UnitRole::Soldier | UnitRole::Dragoon | UnitRole::Artillery => composition
                .demoted()
                .map_or(LossRule::Destroy, LossRule::DemoteTo),
            UnitRole::Ship => LossRule::Destroy,
        }
    }

    /// The loss rule for an attacking unit. Attackers are never captured.
    pub fn for_attacker(composition: &Composition) -> LossRule {
        composition
            .demoted()
            .map_or(LossRule::Destroy, LossRule::DemoteTo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandSide {
    pub unit: UnitId,
    pub nation: Nation,
    pub coord: Coord,
    /// Effective strength in hundredths.
    pub strength: u32,
    pub loss: LossRule,
    pub promotion: Option<Composition>,
}

impl LandSide {
    fn on_loss(&self, winner: &LandSide) -> LandOutcome {
        match self.loss {
            LossRule::Destroy => LandOutcome::Destroyed,
            LossRule::DemoteTo(to) => LandOutcome::Demoted { to },
            LossRule::Capture => LandOutcome::Captured {
                by: winner.nation,
                at: winner.coord,
            },
            LossRule::CaptureAndDemote(to) => LandOutcome::CapturedAndDemoted {
                by: winner.nation,
                at: winner.coord,
                to,
            },
        }
    }

    fn on_win(&self, promote: bool) -> LandOutcome {
        match self.promotion {
            Some(to) if promote => LandOutcome::Promoted { to },
            _ => LandOutcome::NoChange,
        }
    }
}

/// Where a damaged ship goes for repairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairPort {
    Colony { colony: ColonyId, coord: Coord },
    Harbor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavalSide {
    pub unit: UnitId,
    pub nation: Nation,
    pub coord: Coord,
    pub strength: u32,
    pub repair: RepairPort,
    /// A free water square the ship could slip away to, if it may evade.
    pub evade_to: Option<Coord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fight {
    Land {
        attacker: LandSide,
        defender: LandSide,
    },
    /// An attack on a colony with no military units left; a worker defends.
    ColonyWorker {
        attacker: LandSide,
        colony: ColonyId,
        worker: UnitId,
        strength: u32,
    },
    Naval {
        attacker: NavalSide,
        defender: NavalSide,
    },
}

impl Fight {
    fn strengths(&self) -> (u32, u32) {
        match self {
            Fight::Land { attacker, defender } => (attacker.strength, defender.strength),
            Fight::ColonyWorker {
                attacker, strength, ..
            } => (attacker.strength, *strength),
            Fight::Naval { attacker, defender } => (attacker.strength, defender.strength),
        }
    }

    /// Probability that the attacker wins.
    pub fn attacker_odds(&self) -> f64 {
        let (a, d) = self.strengths();
        if a + d == 0 {
            return 0.5;
        }
        f64::from(a) / f64::from(a + d)
    }

    /// Turns a decided fight into per-side outcomes.
    pub fn settle(&self, roll: Roll) -> FightResult {
        match self {
            Fight::Land { attacker, defender } => {
                let (att, def) = if roll.attacker_wins {
                    (attacker.on_win(roll.promote), defender.on_loss(attacker))
                } else {
                    (attacker.on_loss(defender), defender.on_win(roll.promote))
                };
                FightResult::Land {
                    attacker_wins: roll.attacker_wins,
                    attacker: att,
                    defender: def,
                }
            }
            Fight::ColonyWorker {
                attacker, colony, ..
            } => {
                if roll.attacker_wins {
                    FightResult::ColonyWorker {
                        attacker_wins: true,
                        attacker: attacker.on_win(roll.promote),
                        worker: WorkerOutcome::Defeated,
                        colony: *colony,
                    }
                } else {
                    let loss = match attacker.loss {
                        LossRule::DemoteTo(to) => LandOutcome::Demoted { to },
                        _ => LandOutcome::Destroyed,
                    };
                    FightResult::ColonyWorker {
                        attacker_wins: false,
                        attacker: loss,
                        worker: WorkerOutcome::NoChange,
                        colony: *colony,
                    }
                }
            }
            Fight::Naval { attacker, defender } => {
                if !roll.attacker_wins {
                    return FightResult::Naval {
                        attacker_wins: false,
                        attacker: naval_loss(attacker, roll.naval),
                        defender: NavalOutcome::NoChange,
                    };
                }
                let defender_outcome = match (roll.naval, defender.evade_to) {
                    (NavalFate::Evade, Some(to)) => NavalOutcome::Moved { to },
                    (fate, _) => naval_loss(defender, fate),
                };
                FightResult::Naval {
                    attacker_wins: !matches!(defender_outcome, NavalOutcome::Moved { .. }),
                    attacker: NavalOutcome::NoChange,
                    defender: defender_outcome,
                }
            }
        }
    }
}

fn naval_loss(side: &NavalSide, fate: NavalFate) -> NavalOutcome {
    match fate {
        NavalFate::Sink => NavalOutcome::Sunk,
        NavalFate::Damage | NavalFate::Evade => NavalOutcome::Damaged { port: side.repair },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavalFate {
    Damage,
    Sink,
    /// The defender slips away instead of taking damage, when it can.
    Evade,
}

/// The random choices that decide a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roll {
    pub attacker_wins: bool,
    pub promote: bool,
    pub naval: NavalFate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandOutcome {
    NoChange,
    Destroyed,
    Captured { by: Nation, at: Coord },
    Demoted { to: Composition },
    Promoted { to: Composition },
    CapturedAndDemoted { by: Nation, at: Coord, to: Composition },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavalOutcome {
    NoChange,
    Damaged { port: RepairPort },
    Sunk,
    Moved { to: Coord },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    NoChange,
    Defeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightResult {
    Land {
        attacker_wins: bool,
        attacker: LandOutcome,
        defender: LandOutcome,
    },
    ColonyWorker {
        attacker_wins: bool,
        attacker: LandOutcome,
        worker: WorkerOutcome,
        colony: ColonyId,
    },
    Naval {
        attacker_wins: bool,
        attacker: NavalOutcome,
        defender: NavalOutcome,
    },
}

impl FightResult {
    pub fn attacker_wins(&self) -> bool {
        match self {
            FightResult::Land { attacker_wins, .. }
            | FightResult::ColonyWorker { attacker_wins, .. }
            | FightResult::Naval { attacker_wins, .. } => *attacker_wins,
        }
    }
}

/// Decides fights. Pure with respect to the world.
pub trait CombatOracle {
    fn fight(&mut self, fight: &Fight, rng: &mut dyn RngCore) -> FightResult;
}

/// Chance that the winner of a land fight is promoted, when eligible.
const PROMOTION_CHANCE: f64 = 0.2;
/// Chance that a losing ship sinks rather than being damaged.
const SINK_CHANCE: f64 = 0.3;
/// Chance that a defending ship able to evade does so.
const EVADE_CHANCE: f64 = 0.5;

/// Strength-weighted oracle: the attacker wins with probability
/// attack / (attack + defense).
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardOracle;

impl CombatOracle for StandardOracle {
    fn fight(&mut self, fight: &Fight, rng: &mut dyn RngCore) -> FightResult {
        let attacker_wins = rng.gen_bool(fight.attacker_odds());
        let promote = rng.gen_bool(PROMOTION_CHANCE);
        let naval = if rng.gen_bool(EVADE_CHANCE) {
            NavalFate::Evade
        } else if rng.gen_bool(SINK_CHANCE) {
            NavalFate::Sink
        } else {
            NavalFate::Damage
        };
        let result = fight.settle(Roll {
            attacker_wins,
            promote,
            naval,
        });
        log::debug!("fight {:?} -> {:?}", fight, result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::BaseType;
    use rand::rngs::mock::StepRng;

    fn side(unit: u32, nation: Nation, composition: Composition, defending: bool) -> LandSide {
        LandSide {
            unit: UnitId(unit),
            nation,
            coord: Coord::new(unit as i32, 0),
            strength: if defending {
                composition.defense()
            } else {
                composition.attack()
            },
            loss: if defending {
                LossRule::for_defender(&composition)
            } else {
                LossRule::for_attacker(&composition)
            },
            promotion: composition.promoted(),
        }
    }

    #[test]
    fn loss_rules_by_role() {
        assert_eq!(LossRule::for_defender(&Composition::scout()), LossRule::Destroy);
        assert_eq!(LossRule::for_defender(&Composition::colonist()), LossRule::Capture);
        assert_eq!(
            LossRule::for_defender(&Composition::of(BaseType::WagonTrain)),
            LossRule::Capture
        );
        assert_eq!(
            LossRule::for_defender(&Composition::pioneer(60)),
            LossRule::CaptureAndDemote(Composition::colonist())
        );
        assert_eq!(
            LossRule::for_defender(&Composition::dragoon()),
            LossRule::DemoteTo(Composition::soldier())
        );
        assert_eq!(
            LossRule::for_defender(&Composition::of(BaseType::DamagedArtillery)),
            LossRule::Destroy
        );
    }

    #[test]
    fn captured_defender_goes_to_attacker_square() {
        let attacker = side(1, Nation::English, Composition::soldier(), false);
        let defender = side(2, Nation::French, Composition::colonist(), true);
        let fight = Fight::Land { attacker, defender };
        let result = fight.settle(Roll {
            attacker_wins: true,
            promote: false,
            naval: NavalFate::Damage,
        });
        assert_eq!(
            result,
            FightResult::Land {
                attacker_wins: true,
                attacker: LandOutcome::NoChange,
                defender: LandOutcome::Captured {
                    by: Nation::English,
                    at: attacker.coord
                },
            }
        );
    }

    #[test]
    fn losing_attacker_is_demoted_and_winner_promoted() {
        let attacker = side(1, Nation::English, Composition::dragoon(), false);
        let defender = side(2, Nation::French, Composition::soldier(), true);
        let result = Fight::Land { attacker, defender }.settle(Roll {
            attacker_wins: false,
            promote: true,
            naval: NavalFate::Damage,
        });
        match result {
            FightResult::Land {
                attacker: LandOutcome::Demoted { to },
                defender: LandOutcome::Promoted { to: promoted },
                ..
            } => {
                assert_eq!(to, Composition::soldier());
                assert_eq!(promoted.base, BaseType::VeteranSoldier);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn evasion_requires_escape_square() {
        let ship = |unit: u32, nation, evade_to| NavalSide {
            unit: UnitId(unit),
            nation,
            coord: Coord::new(0, 0),
            strength: 200,
            repair: RepairPort::Harbor,
            evade_to,
        };
        let roll = Roll {
            attacker_wins: true,
            promote: false,
            naval: NavalFate::Evade,
        };
        let fight = Fight::Naval {
            attacker: ship(1, Nation::English, None),
            defender: ship(2, Nation::Dutch, Some(Coord::new(1, 1))),
        };
        assert!(matches!(
            fight.settle(roll),
            FightResult::Naval {
                attacker_wins: false,
                defender: NavalOutcome::Moved { .. },
                ..
            }
        ));
        let cornered = Fight::Naval {
            attacker: ship(1, Nation::English, None),
            defender: ship(2, Nation::Dutch, None),
        };
        assert!(matches!(
            cornered.settle(roll),
            FightResult::Naval {
                attacker_wins: true,
                defender: NavalOutcome::Damaged { .. },
                ..
            }
        ));
    }

    #[test]
    fn standard_oracle_follows_rng() {
        let attacker = side(1, Nation::English, Composition::soldier(), false);
        let defender = side(2, Nation::French, Composition::soldier(), true);
        let fight = Fight::Land { attacker, defender };
        assert!((fight.attacker_odds() - 0.5).abs() < 1e-9);

        let mut yes = StepRng::new(0, 0);
        assert!(StandardOracle.fight(&fight, &mut yes).attacker_wins());
        let mut no = StepRng::new(u64::MAX, 0);
        assert!(!StandardOracle.fight(&fight, &mut no).attacker_wins());
    }
}
