//! Disbanding units.

use crate::error::EngineError;
use crate::resolve::handler::OrderHandler;
use crate::session::{Animation, AnimationSequence, Session};
use crate::world::{MovementPoints, UnitId, UnitOrders};

pub struct DisbandHandler {
    unit: UnitId,
}

impl DisbandHandler {
    pub fn new(unit: UnitId) -> Self {
        DisbandHandler { unit }
    }
}

impl OrderHandler for DisbandHandler {
    fn unit(&self) -> UnitId {
        self.unit
    }

    fn confirm(&mut self, session: &mut Session<'_>) -> Result<bool, EngineError> {
        let u = session.world.unit(self.unit)?;
        let nation = u.nation;
        let question = format!("Really disband this {}?", u.name());
        Ok(session.ask(nation, &question, true))
    }

    fn animate(&self, session: &mut Session<'_>) -> Result<(), EngineError> {
        session.play(AnimationSequence::single(Animation::Depixelate { unit: self.unit }));
        Ok(())
    }

    /// Passengers of a holder standing on land (a ship in a colony port) go
    /// ashore; at sea they are lost with it.
    fn perform(&mut self, session: &mut Session<'_>) -> Result<(), EngineError> {
        let world = &mut *session.world;
        let u = world.unit(self.unit)?;
        let nation = u.nation;
        let passengers: Vec<UnitId> = u.cargo_units().collect();
        let ashore = world
            .unit_coord(self.unit)
            .filter(|c| world.map.is_land(*c));
        if let Some(coord) = ashore {
            for p in passengers {
                world.relocate(p, coord)?;
                let p = world.unit_mut(p)?;
                p.orders = UnitOrders::None;
                p.mv_pts = MovementPoints::ZERO;
            }
        }
        let destroyed = world.destroy_unit(self.unit)?;
        log::info!("{} disbanded {} ({} units lost)", nation, self.unit, destroyed.len());
        Ok(())
    }
}
