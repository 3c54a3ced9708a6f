//! Colony evolution and founding-father acquisition.
//!
//! Runs once per nation per turn during the colonies phase. Each colony
//! produces, eats, grows or starves, builds and spoils in that order.

use crate::error::EngineError;
use crate::session::Session;
use crate::world::{
    Building, ColonyId, Commodity, Composition, FoundingFather, Job, Nation, Ownership, UnitId,
    WorldState, ALL_COMMODITIES,
};

/// Food a new colonist costs.
pub const GROWTH_FOOD: i32 = 200;
/// Food each worker eats per turn.
pub const FOOD_PER_WORKER: i32 = 2;
/// Lumber a carpenter turns into hammers per turn.
const CARPENTER_LUMBER: i32 = 3;
/// Workers needed before La Salle grants a stockade.
const LA_SALLE_WORKERS: usize = 3;

const BUILD_ORDER: [Building; 4] = [
    Building::Stockade,
    Building::Docks,
    Building::Warehouse,
    Building::Drydock,
];

/// What happened to a colony during one evolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColonyReport {
    pub food_delta: i32,
    pub born: Option<UnitId>,
    pub starved: Option<UnitId>,
    pub completed: Option<Building>,
    pub spoiled: Vec<(Commodity, i32)>,
    pub bells: i32,
}

fn job_output(job: Job, expert: bool, has_docks: bool) -> Option<(Commodity, i32)> {
    let (commodity, base) = match job {
        Job::Farmer => (Commodity::Food, 3),
        Job::Fisherman if has_docks => (Commodity::Food, 4),
        Job::Fisherman => return None,
        Job::Lumberjack => (Commodity::Lumber, 3),
        Job::FurTrapper => (Commodity::Furs, 2),
        Job::OreMiner => (Commodity::Ore, 2),
        Job::Carpenter | Job::Statesman => return None,
    };
    Some((commodity, if expert { base * 2 } else { base }))
}

/// The next building worth starting, if any is left.
fn next_construction(world: &WorldState, colony: ColonyId) -> Option<Building> {
    let c = world.colonies.get(&colony)?;
    let coastal = world.map.is_coastal(c.coord);
    BUILD_ORDER
        .iter()
        .copied()
        .filter(|b| coastal || !matches!(b, Building::Docks | Building::Drydock))
        .find(|b| !c.has(*b))
}

pub fn evolve_colony(session: &mut Session<'_>, id: ColonyId) -> Result<ColonyReport, EngineError> {
    let mut report = ColonyReport::default();
    let workers = session.world.colony_workers(id);
    let colony = session.world.colony(id)?;
    let nation = colony.nation;
    let coord = colony.coord;
    let name = colony.name.clone();
    let has_docks = colony.has(Building::Docks);
    let plowed = session.world.map.square(coord).is_some_and(|s| s.plowed);

    let mut jobs = Vec::with_capacity(workers.len());
    for w in &workers {
        let u = session.world.unit(*w)?;
        if let Ownership::Colony { job, .. } = u.ownership {
            jobs.push((job, u.composition.base.expertise() == Some(job)));
        }
    }

    // Production.
    let mut food = 3 + i32::from(plowed);
    let mut bells = 0;
    let mut carpenters = 0;
    {
        let colony = session.world.colony_mut(id)?;
        for (job, expert) in &jobs {
            match job {
                Job::Statesman => bells += if *expert { 6 } else { 3 },
                Job::Carpenter => carpenters += 1,
                _ => match job_output(*job, *expert, has_docks) {
                    Some((Commodity::Food, n)) => food += n,
                    Some((commodity, n)) => colony.add(commodity, n),
                    None => {}
                },
            }
        }
        let lumber = (carpenters * CARPENTER_LUMBER).min(colony.quantity(Commodity::Lumber));
        colony.add(Commodity::Lumber, -lumber);
        colony.hammers += lumber;
    }
    if session.world.has_father(nation, FoundingFather::ThomasJefferson) {
        bells = bells * 3 / 2;
    }

    // Consumption, growth and starvation.
    let net = food - FOOD_PER_WORKER * workers.len() as i32;
    report.food_delta = net;
    let stored = session.world.colony(id)?.quantity(Commodity::Food) + net;
    if stored < 0 {
        session.world.colony_mut(id)?.stock.insert(Commodity::Food, 0);
        if workers.len() > 1 {
            if let Some(newest) = workers.iter().copied().max() {
                session.world.destroy_unit(newest)?;
                report.starved = Some(newest);
                log::info!("{}: a colonist starved", name);
                session.message(nation, &format!("A colonist in {} has starved to death.", name));
            }
        }
    } else if stored >= GROWTH_FOOD {
        session.world.colony_mut(id)?.stock.insert(Commodity::Food, stored - GROWTH_FOOD);
        let born = session.world.create_unit_on_map(nation, Composition::colonist(), coord)?;
        report.born = Some(born);
        log::info!("{}: new colonist {}", name, born);
        session.message(nation, &format!("{} has grown! A new colonist has been born.", name));
    } else {
        session.world.colony_mut(id)?.stock.insert(Commodity::Food, stored);
    }

    // La Salle grants a stockade once the colony is big enough.
    let la_salle = session.world.has_father(nation, FoundingFather::LaSalle)
        && session.world.colony_workers(id).len() >= LA_SALLE_WORKERS;
    if la_salle && !session.world.colony(id)?.has(Building::Stockade) {
        session.world.colony_mut(id)?.buildings.insert(Building::Stockade);
        session.message(nation, &format!("La Salle has given {} a stockade.", name));
    }

    // Construction.
    let current = session.world.colony(id)?.construction;
    let current = match current {
        Some(b) if !session.world.colony(id)?.has(b) => Some(b),
        _ => next_construction(session.world, id),
    };
    let next = {
        let colony = session.world.colony_mut(id)?;
        colony.construction = current;
        match current {
            Some(b) if colony.hammers >= b.hammer_cost() => {
                colony.hammers -= b.hammer_cost();
                colony.buildings.insert(b);
                report.completed = Some(b);
                true
            }
            _ => false,
        }
    };
    if next {
        let following = next_construction(session.world, id);
        session.world.colony_mut(id)?.construction = following;
        if let Some(b) = report.completed {
            log::info!("{} completed its {}", name, b.name());
            session.message(nation, &format!("{} has completed its {}.", name, b.name()));
        }
    }

    // Spoilage.
    let colony = session.world.colony_mut(id)?;
    let capacity = colony.warehouse_capacity();
    for commodity in ALL_COMMODITIES.iter().copied().filter(|c| *c != Commodity::Food) {
        let held = colony.quantity(commodity);
        if held > capacity {
            colony.stock.insert(commodity, capacity);
            report.spoiled.push((commodity, held - capacity));
        }
    }
    for (commodity, lost) in report.spoiled.clone() {
        session.message(
            nation,
            &format!("{} {} spoiled in {} for lack of storage.", lost, commodity.name(), name),
        );
    }

    session.world.nation_mut(nation)?.bells += bells;
    report.bells = bells;
    Ok(report)
}

/// Adds founding fathers the nation has collected enough bells for.
pub fn check_fathers(session: &mut Session<'_>, nation: Nation) -> Result<Vec<FoundingFather>, EngineError> {
    let mut joined = Vec::new();
    loop {
        let state = session.world.nation_mut(nation)?;
        let Some(father) = state.next_father() else {
            break;
        };
        let cost = state.father_cost();
        if state.bells < cost {
            break;
        }
        state.bells -= cost;
        state.fathers.push(father);
        joined.push(father);
        log::info!("{} gains {}", nation, father.name());
        session.message(nation, &format!("{} joins the Continental Congress!", father.name()));
    }
    Ok(joined)
}

/// The colonies phase for one nation.
pub fn evolve_colonies(session: &mut Session<'_>, nation: Nation) -> Result<(), EngineError> {
    for id in session.world.colony_ids_of(nation) {
        let report = evolve_colony(session, id)?;
        log::trace!("{} {:?}", id, report);
    }
    check_fathers(session, nation)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use crate::world::{BaseType, Coord};

    fn colony_with(h: &mut Harness, jobs: &[(BaseType, Job)]) -> ColonyId {
        let id = h
            .world
            .create_colony(Nation::English, "Jamestown".into(), Coord::new(2, 2))
            .unwrap();
        for (base, job) in jobs {
            let w = h.world.create_unit(Nation::English, Composition::of(*base));
            h.world.join_colony(w, id, *job).unwrap();
        }
        id
    }

    #[test]
    fn farmers_feed_and_grow() {
        let mut h = Harness::plains(6, 6);
        let id = colony_with(&mut h, &[(BaseType::ExpertFarmer, Job::Farmer)]);
        h.world.colony_mut(id).unwrap().add(Commodity::Food, 195);
        let report = evolve_colony(&mut h.session(), id).unwrap();
        // 3 from the square plus 6 from the expert, minus 2 eaten.
        assert_eq!(report.food_delta, 7);
        assert!(report.born.is_some());
        assert_eq!(h.world.colony(id).unwrap().quantity(Commodity::Food), 2);
    }

    #[test]
    fn starvation_spares_the_last_worker() {
        let mut h = Harness::plains(6, 6);
        let jobs = [(BaseType::FreeColonist, Job::Statesman); 3];
        let id = colony_with(&mut h, &jobs);
        let report = evolve_colony(&mut h.session(), id).unwrap();
        assert_eq!(report.food_delta, -3);
        assert!(report.starved.is_some());
        assert_eq!(h.world.colony_workers(id).len(), 2);
        assert_eq!(h.world.colony(id).unwrap().quantity(Commodity::Food), 0);
    }

    #[test]
    fn carpenters_finish_construction() {
        let mut h = Harness::plains(6, 6);
        let id = colony_with(&mut h, &[(BaseType::FreeColonist, Job::Carpenter)]);
        {
            let c = h.world.colony_mut(id).unwrap();
            c.add(Commodity::Lumber, 10);
            c.hammers = 62;
            c.construction = Some(Building::Stockade);
        }
        let report = evolve_colony(&mut h.session(), id).unwrap();
        assert_eq!(report.completed, Some(Building::Stockade));
        let c = h.world.colony(id).unwrap();
        assert!(c.has(Building::Stockade));
        assert_eq!(c.hammers, 1);
        assert_eq!(c.quantity(Commodity::Lumber), 7);
        // inland: the warehouse is next
        assert_eq!(c.construction, Some(Building::Warehouse));
    }

    #[test]
    fn excess_goods_spoil() {
        let mut h = Harness::plains(6, 6);
        let id = colony_with(&mut h, &[(BaseType::FreeColonist, Job::FurTrapper)]);
        h.world.colony_mut(id).unwrap().add(Commodity::Furs, 99);
        let report = evolve_colony(&mut h.session(), id).unwrap();
        assert_eq!(report.spoiled, vec![(Commodity::Furs, 1)]);
        assert_eq!(h.world.colony(id).unwrap().quantity(Commodity::Furs), 100);
    }

    #[test]
    fn bells_buy_fathers_in_order() {
        let mut h = Harness::plains(6, 6);
        h.world.nation_mut(Nation::English).unwrap().bells = 105;
        let joined = check_fathers(&mut h.session(), Nation::English).unwrap();
        assert_eq!(joined, vec![FoundingFather::ThomasJefferson]);
        assert_eq!(h.world.nation(Nation::English).unwrap().bells, 65);
        let again = check_fathers(&mut h.session(), Nation::English).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn la_salle_grants_stockade() {
        let mut h = Harness::plains(6, 6);
        h.world
            .nation_mut(Nation::English)
            .unwrap()
            .fathers
            .push(FoundingFather::LaSalle);
        let id = colony_with(&mut h, &[(BaseType::ExpertFarmer, Job::Farmer); 3]);
        evolve_colony(&mut h.session(), id).unwrap();
        assert!(h.world.colony(id).unwrap().has(Building::Stockade));
    }
}
