//! Pioneer work: plowing and road building.
//!
//! The order only starts the job. Progress and completion happen when the
//! unit evolves at the start of each later turn.

use crate::error::EngineError;
use crate::resolve::handler::OrderHandler;
use crate::session::Session;
use crate::world::{
    Composition, Coord, MovementPoints, Ownership, Terrain, TerrainMap, UnitId, UnitOrders, UnitRole,
    WorldState, TOOLS_PER_JOB,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Improvement {
    Plow,
    Road,
}

impl Improvement {
    /// Turns of work before the job completes.
    pub const fn turns(self) -> u8 {
        match self {
            Improvement::Plow => 4,
            Improvement::Road => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Improvement::Plow => "plow",
            Improvement::Road => "road",
        }
    }

    /// The order state of a unit that has just started this job.
    pub const fn started(self) -> UnitOrders {
        match self {
            Improvement::Plow => UnitOrders::Plow { turns_worked: 0 },
            Improvement::Road => UnitOrders::Road { turns_worked: 0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImproveVerdict {
    Start { coord: Coord },
    NotPioneer,
    NotOnLand,
    CannotPlow,
    AlreadyPlowed,
    AlreadyHasRoad,
}

impl ImproveVerdict {
    pub const fn name(&self) -> &'static str {
        match self {
            ImproveVerdict::Start { .. } => "start",
            ImproveVerdict::NotPioneer => "not_pioneer",
            ImproveVerdict::NotOnLand => "not_on_land",
            ImproveVerdict::CannotPlow => "cannot_plow",
            ImproveVerdict::AlreadyPlowed => "already_plowed",
            ImproveVerdict::AlreadyHasRoad => "already_has_road",
        }
    }

    fn refusal_text(&self) -> Option<&'static str> {
        match self {
            ImproveVerdict::Start { .. } => None,
            ImproveVerdict::NotPioneer => Some("Only pioneers with tools can do that."),
            ImproveVerdict::NotOnLand => Some("The unit must stand on land."),
            ImproveVerdict::CannotPlow => Some("This terrain cannot be plowed."),
            ImproveVerdict::AlreadyPlowed => Some("This land is already plowed."),
            ImproveVerdict::AlreadyHasRoad => Some("There is already a road here."),
        }
    }
}

pub fn resolve_improve(world: &WorldState, unit: UnitId, improvement: Improvement) -> Result<ImproveVerdict, EngineError> {
    let u = world.unit(unit)?;
    if u.role() != UnitRole::Pioneer || u.composition.tools < TOOLS_PER_JOB {
        return Ok(ImproveVerdict::NotPioneer);
    }
    let Ownership::World { coord } = u.ownership else {
        return Ok(ImproveVerdict::NotOnLand);
    };
    let Some(square) = world.map.square(coord).filter(|s| s.is_land()) else {
        return Ok(ImproveVerdict::NotOnLand);
    };
    Ok(match improvement {
        Improvement::Plow => match square.terrain {
            Terrain::Hills | Terrain::Mountains => ImproveVerdict::CannotPlow,
            Terrain::Forest => ImproveVerdict::Start { coord },
            _ if square.plowed => ImproveVerdict::AlreadyPlowed,
            _ => ImproveVerdict::Start { coord },
        },
        Improvement::Road => {
            if square.road || world.colony_at(coord).is_some() {
                ImproveVerdict::AlreadyHasRoad
            } else {
                ImproveVerdict::Start { coord }
            }
        }
    })
}

/// Applies a finished job to the map.
pub fn complete(map: &mut TerrainMap, coord: Coord, improvement: Improvement) {
    let Some(square) = map.square_mut(coord) else {
        return;
    };
    match improvement {
        Improvement::Plow if square.terrain == Terrain::Forest => square.terrain = Terrain::Plains,
        Improvement::Plow => square.plowed = true,
        Improvement::Road => square.road = true,
    }
}

/// A pioneer's composition after spending one job's worth of tools.
pub fn spend_tools(composition: Composition) -> Composition {
    Composition {
        tools: composition.tools.saturating_sub(TOOLS_PER_JOB),
        ..composition
    }
}

pub struct ImproveHandler {
    unit: UnitId,
    improvement: Improvement,
}

impl ImproveHandler {
    pub fn new(unit: UnitId, improvement: Improvement) -> Self {
        ImproveHandler { unit, improvement }
    }
}

impl OrderHandler for ImproveHandler {
    fn unit(&self) -> UnitId {
        self.unit
    }

    fn confirm(&mut self, session: &mut Session<'_>) -> Result<bool, EngineError> {
        let verdict = resolve_improve(session.world, self.unit, self.improvement)?;
        log::debug!("{} {}: {}", self.unit, self.improvement.name(), verdict.name());
        if let Some(text) = verdict.refusal_text() {
            let nation = session.world.unit(self.unit)?.nation;
            session.message(nation, text);
            return Ok(false);
        }
        Ok(true)
    }

    fn perform(&mut self, session: &mut Session<'_>) -> Result<(), EngineError> {
        let u = session.world.unit_mut(self.unit)?;
        u.orders = self.improvement.started();
        u.mv_pts = MovementPoints::ZERO;
        Ok(())
    }
}
