//! Founding colonies.

use crate::error::EngineError;
use crate::resolve::handler::OrderHandler;
use crate::session::Session;
use crate::turn::fog::reveal_colony;
use crate::world::{
    Building, ColonyId, Coord, Job, MovementPoints, Nation, Ownership, UnitId, UnitRole, WorldState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildColonyVerdict {
    Build { coord: Coord, name: String },
    ShipCannotFound,
    NoLand,
    ColonyTooClose,
    UnitCannotFound,
    InCargo,
    Cancelled,
}

impl BuildColonyVerdict {
    pub const fn name(&self) -> &'static str {
        match self {
            BuildColonyVerdict::Build { .. } => "build",
            BuildColonyVerdict::ShipCannotFound => "ship_cannot_found",
            BuildColonyVerdict::NoLand => "no_land",
            BuildColonyVerdict::ColonyTooClose => "colony_too_close",
            BuildColonyVerdict::UnitCannotFound => "unit_cannot_found",
            BuildColonyVerdict::InCargo => "in_cargo",
            BuildColonyVerdict::Cancelled => "cancelled",
        }
    }

    fn refusal_text(&self) -> Option<&'static str> {
        match self {
            BuildColonyVerdict::ShipCannotFound => Some("Ships cannot found colonies."),
            BuildColonyVerdict::NoLand => Some("Colonies can only be built on land."),
            BuildColonyVerdict::ColonyTooClose => Some("Too close to another colony."),
            BuildColonyVerdict::UnitCannotFound => Some("This unit cannot found a colony."),
            BuildColonyVerdict::InCargo => Some("Units must go ashore before founding a colony."),
            _ => None,
        }
    }
}

const ENGLISH_NAMES: [&str; 6] = ["Jamestown", "Plymouth", "Roanoke", "Boston", "Salem", "Hartford"];
const FRENCH_NAMES: [&str; 6] = ["Quebec", "Montreal", "Trois-Rivieres", "Louisbourg", "Detroit", "Biloxi"];
const SPANISH_NAMES: [&str; 6] = ["Isabella", "Santo Domingo", "San Juan", "Havana", "Veracruz", "St. Augustine"];
const DUTCH_NAMES: [&str; 6] = ["New Amsterdam", "Fort Orange", "Beverwijck", "Wiltwyck", "Pavonia", "Swanendael"];

fn name_list(nation: Nation) -> &'static [&'static str] {
    match nation {
        Nation::English => &ENGLISH_NAMES,
        Nation::French => &FRENCH_NAMES,
        Nation::Spanish => &SPANISH_NAMES,
        Nation::Dutch => &DUTCH_NAMES,
    }
}

/// The first stock name for `nation` not yet in use, falling back to a
/// numbered name once the list runs out.
pub fn suggest_name(world: &WorldState, nation: Nation) -> String {
    if let Some(name) = name_list(nation).iter().find(|n| !world.colony_name_taken(n)) {
        return (*name).to_string();
    }
    (1..)
        .map(|n| format!("{} Colony {}", nation.name(), n))
        .find(|n| !world.colony_name_taken(n))
        .unwrap_or_default()
}

/// Classifies a found-colony order. Asks a human for the colony name.
pub fn resolve_build(session: &mut Session<'_>, unit: UnitId) -> Result<BuildColonyVerdict, EngineError> {
    let u = session.world.unit(unit)?;
    let nation = u.nation;
    if u.is_ship() {
        return Ok(BuildColonyVerdict::ShipCannotFound);
    }
    if matches!(u.role(), UnitRole::WagonTrain | UnitRole::Artillery | UnitRole::DamagedArtillery) {
        return Ok(BuildColonyVerdict::UnitCannotFound);
    }
    let coord = match u.ownership {
        Ownership::World { coord } => coord,
        Ownership::Cargo { .. } => return Ok(BuildColonyVerdict::InCargo),
        _ => return Err(EngineError::Invariant(format!("{} is not on the map", unit))),
    };
    if !session.world.map.is_land(coord) {
        return Ok(BuildColonyVerdict::NoLand);
    }
    if session.world.colonies.values().any(|c| c.coord.distance(coord) <= 1) {
        return Ok(BuildColonyVerdict::ColonyTooClose);
    }

    let suggestion = suggest_name(session.world, nation);
    if !session.is_human(nation) {
        return Ok(BuildColonyVerdict::Build { coord, name: suggestion });
    }
    loop {
        let Some(name) = session.ui.input_string("Name of the new colony?", &suggestion) else {
            return Ok(BuildColonyVerdict::Cancelled);
        };
        let name = name.trim().to_string();
        if name.is_empty() {
            return Ok(BuildColonyVerdict::Cancelled);
        }
        if session.world.colony_name_taken(&name) {
            session.ui.message(&format!("There is already a colony named {}.", name));
            continue;
        }
        return Ok(BuildColonyVerdict::Build { coord, name });
    }
}

/// Handler for `Order::BuildColony`.
pub struct BuildColonyHandler {
    unit: UnitId,
    verdict: Option<BuildColonyVerdict>,
    founded: Option<ColonyId>,
}

impl BuildColonyHandler {
    pub fn new(unit: UnitId) -> Self {
        BuildColonyHandler {
            unit,
            verdict: None,
            founded: None,
        }
    }
}

impl OrderHandler for BuildColonyHandler {
    fn unit(&self) -> UnitId {
        self.unit
    }

    fn confirm(&mut self, session: &mut Session<'_>) -> Result<bool, EngineError> {
        let verdict = resolve_build(session, self.unit)?;
        log::debug!("{} found colony: {}", self.unit, verdict.name());
        if let Some(text) = verdict.refusal_text() {
            let nation = session.world.unit(self.unit)?.nation;
            session.message(nation, text);
        }
        let allowed = matches!(verdict, BuildColonyVerdict::Build { .. });
        self.verdict = Some(verdict);
        Ok(allowed)
    }

    fn perform(&mut self, session: &mut Session<'_>) -> Result<(), EngineError> {
        let Some(BuildColonyVerdict::Build { coord, name }) = self.verdict.take() else {
            return Err(EngineError::Invariant("colony founded without a verdict".into()));
        };
        let world = &mut *session.world;
        let nation = world.unit(self.unit)?.nation;
        let id = world.create_colony(nation, name.clone(), coord)?;

        let (bare, equipment) = world.unit(self.unit)?.composition.stripped();
        let job = bare.base.expertise().unwrap_or(Job::Farmer);
        let first_build = if world.map.is_coastal(coord) {
            Building::Docks
        } else {
            Building::Stockade
        };
        let colony = world.colony_mut(id)?;
        for (commodity, quantity) in equipment {
            colony.add(commodity, quantity);
        }
        colony.construction = Some(first_build);
        world.disown(self.unit)?;
        let u = world.unit_mut(self.unit)?;
        u.composition = bare;
        u.mv_pts = MovementPoints::ZERO;
        world.join_colony(self.unit, id, job)?;
        reveal_colony(world, id)?;
        log::info!("{} founded {} at {}", nation, name, coord);
        self.founded = Some(id);
        Ok(())
    }

    fn post(&mut self, session: &mut Session<'_>) -> Result<(), EngineError> {
        if let Some(id) = self.founded {
            let nation = session.world.colony(id)?.nation;
            if session.is_human(nation) {
                session.show_colony(id)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::handler::{run_order, OrderOutcome};
    use crate::testing::Harness;
    use crate::world::{BaseType, Commodity, Composition, Order, Terrain};

    #[test]
    fn soldier_founds_and_stores_muskets() {
        let mut h = Harness::plains(8, 8);
        let id = h.unit(Nation::English, Composition::soldier(), Coord::new(3, 3));
        h.ui.answer_string("Providence");
        let outcome = run_order(&mut h.session(), id, Order::BuildColony).unwrap();
        assert_eq!(outcome, OrderOutcome::Performed);

        let colony = h.world.colony_at(Coord::new(3, 3)).unwrap().clone();
        assert_eq!(colony.name, "Providence");
        assert_eq!(colony.quantity(Commodity::Muskets), 50);
        assert_eq!(colony.construction, Some(Building::Stockade));
        let u = h.world.unit(id).unwrap();
        assert_eq!(u.composition, Composition::colonist());
        assert_eq!(
            u.ownership,
            Ownership::Colony {
                colony: colony.id,
                job: Job::Farmer
            }
        );
        assert_eq!(h.ui.colonies_shown(), [colony.id]);
        assert!(h.world.map.square(Coord::new(3, 3)).unwrap().road);
    }

    #[test]
    fn duplicate_name_asks_again() {
        let mut h = Harness::plains(8, 8);
        h.world.create_colony(Nation::French, "Quebec".into(), Coord::new(0, 0)).unwrap();
        let id = h.unit(Nation::English, Composition::colonist(), Coord::new(4, 4));
        h.ui.answer_string("quebec");
        h.ui.answer_string("Charlestown");
        run_order(&mut h.session(), id, Order::BuildColony).unwrap();
        assert_eq!(h.world.colony_at(Coord::new(4, 4)).unwrap().name, "Charlestown");
        assert_eq!(h.ui.questions().len(), 2);
    }

    #[test]
    fn dismissing_the_name_cancels() {
        let mut h = Harness::plains(8, 8);
        let id = h.unit(Nation::English, Composition::colonist(), Coord::new(4, 4));
        let outcome = run_order(&mut h.session(), id, Order::BuildColony).unwrap();
        assert_eq!(outcome, OrderOutcome::Cancelled);
        assert!(h.world.colonies.is_empty());
        assert_eq!(h.world.unit(id).unwrap().coord_if_on_map(), Some(Coord::new(4, 4)));
    }

    #[test]
    fn refusals() {
        let mut h = Harness::plains(8, 8);
        h.world.create_colony(Nation::French, "Quebec".into(), Coord::new(2, 2)).unwrap();
        let near = h.unit(Nation::English, Composition::colonist(), Coord::new(3, 3));
        let wagon = h.unit(Nation::English, Composition::of(BaseType::WagonTrain), Coord::new(6, 6));
        h.set_terrain(Coord::new(7, 0), Terrain::Ocean);
        let ship = h.unit(Nation::English, Composition::of(BaseType::Caravel), Coord::new(7, 0));
        let rider = h.passenger(Nation::English, Composition::colonist(), ship);

        let mut s = h.session();
        assert_eq!(resolve_build(&mut s, near).unwrap(), BuildColonyVerdict::ColonyTooClose);
        assert_eq!(resolve_build(&mut s, wagon).unwrap(), BuildColonyVerdict::UnitCannotFound);
        assert_eq!(resolve_build(&mut s, ship).unwrap(), BuildColonyVerdict::ShipCannotFound);
        assert_eq!(resolve_build(&mut s, rider).unwrap(), BuildColonyVerdict::InCargo);
    }

    #[test]
    fn ai_gets_stock_names() {
        let mut h = Harness::plains(10, 10);
        let a = h.unit(Nation::French, Composition::colonist(), Coord::new(1, 1));
        let b = h.unit(Nation::French, Composition::colonist(), Coord::new(6, 6));
        run_order(&mut h.session(), a, Order::BuildColony).unwrap();
        run_order(&mut h.session(), b, Order::BuildColony).unwrap();
        let mut names: Vec<_> = h.world.colonies.values().map(|c| c.name.clone()).collect();
        names.sort();
        assert_eq!(names, ["Montreal", "Quebec"]);
        assert!(h.ui.questions().is_empty());
    }
}
