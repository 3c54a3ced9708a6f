//! Fortify and sentry orders.
//!
//! Neither order moves the unit; both only change its order state so the
//! activation queue stops asking it for orders.

use crate::error::EngineError;
use crate::resolve::handler::OrderHandler;
use crate::session::{Animation, AnimationSequence, Session};
use crate::world::{Ownership, UnitId, UnitOrders};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FortifyVerdict {
    Fortify,
    AlreadyFortified,
    ShipCannotFortify,
    InCargo,
}

impl FortifyVerdict {
    pub const fn name(&self) -> &'static str {
        match self {
            FortifyVerdict::Fortify => "fortify",
            FortifyVerdict::AlreadyFortified => "already_fortified",
            FortifyVerdict::ShipCannotFortify => "ship_cannot_fortify",
            FortifyVerdict::InCargo => "in_cargo",
        }
    }
}

pub fn resolve_fortify(session: &Session<'_>, unit: UnitId) -> Result<FortifyVerdict, EngineError> {
    let u = session.world.unit(unit)?;
    Ok(if u.is_ship() {
        FortifyVerdict::ShipCannotFortify
    } else if matches!(u.ownership, Ownership::Cargo { .. }) {
        FortifyVerdict::InCargo
    } else if matches!(u.orders, UnitOrders::Fortifying | UnitOrders::Fortified) {
        FortifyVerdict::AlreadyFortified
    } else {
        FortifyVerdict::Fortify
    })
}

pub struct FortifyHandler {
    unit: UnitId,
}

impl FortifyHandler {
    pub fn new(unit: UnitId) -> Self {
        FortifyHandler { unit }
    }
}

impl OrderHandler for FortifyHandler {
    fn unit(&self) -> UnitId {
        self.unit
    }

    fn confirm(&mut self, session: &mut Session<'_>) -> Result<bool, EngineError> {
        let verdict = resolve_fortify(session, self.unit)?;
        log::debug!("{} fortify: {}", self.unit, verdict.name());
        let nation = session.world.unit(self.unit)?.nation;
        match verdict {
            FortifyVerdict::Fortify => return Ok(true),
            FortifyVerdict::AlreadyFortified => session.message(nation, "The unit is already fortified."),
            FortifyVerdict::ShipCannotFortify => session.message(nation, "Ships cannot fortify."),
            FortifyVerdict::InCargo => session.message(nation, "Units aboard a ship cannot fortify."),
        }
        Ok(false)
    }

    fn animate(&self, session: &mut Session<'_>) -> Result<(), EngineError> {
        session.play(AnimationSequence::single(Animation::Fortify { unit: self.unit }));
        Ok(())
    }

    fn perform(&mut self, session: &mut Session<'_>) -> Result<(), EngineError> {
        // Takes effect at the unit's next evolution.
        session.world.unit_mut(self.unit)?.orders = UnitOrders::Fortifying;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentryVerdict {
    Sentry,
    AlreadySentried,
}

pub struct SentryHandler {
    unit: UnitId,
}

impl SentryHandler {
    pub fn new(unit: UnitId) -> Self {
        SentryHandler { unit }
    }
}

pub fn resolve_sentry(session: &Session<'_>, unit: UnitId) -> Result<SentryVerdict, EngineError> {
    Ok(match session.world.unit(unit)?.orders {
        UnitOrders::Sentry => SentryVerdict::AlreadySentried,
        _ => SentryVerdict::Sentry,
    })
}

impl OrderHandler for SentryHandler {
    fn unit(&self) -> UnitId {
        self.unit
    }

    fn confirm(&mut self, session: &mut Session<'_>) -> Result<bool, EngineError> {
        match resolve_sentry(session, self.unit)? {
            SentryVerdict::Sentry => Ok(true),
            SentryVerdict::AlreadySentried => {
                let nation = session.world.unit(self.unit)?.nation;
                session.message(nation, "The unit is already on sentry duty.");
                Ok(false)
            }
        }
    }

    fn perform(&mut self, session: &mut Session<'_>) -> Result<(), EngineError> {
        session.world.unit_mut(self.unit)?.orders = UnitOrders::Sentry;
        Ok(())
    }
}
