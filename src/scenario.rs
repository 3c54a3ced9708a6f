//! Seeded demo scenarios.
//!
//! Generates a continent between a western ocean strip and an eastern
//! ocean whose outer column is all sea lane, then lands every nation on
//! its own stretch of the east coast: a caravel carrying a soldier and a
//! colonist just offshore, with a scout and a pioneer already ashore.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::EngineConfig;
use crate::turn::fog::recompute_fog;
use crate::turn::TurnState;
use crate::world::{
    BaseType, Composition, Coord, Nation, Square, Terrain, TerrainMap, WorldError, WorldState,
    ALL_NATIONS,
};

/// Ocean columns on the east side; the outermost one is sea lane.
const EAST_OCEAN: i32 = 3;
/// Rows each nation needs for its landing.
const ROWS_PER_NATION: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("a {width}x{height} map is too small; need at least {min_width}x{min_height}")]
    MapTooSmall {
        width: i32,
        height: i32,
        min_width: i32,
        min_height: i32,
    },

    #[error(transparent)]
    World(#[from] WorldError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOptions {
    pub width: i32,
    pub height: i32,
    pub seed: u64,
    /// Nations played by humans; the rest are AI.
    pub humans: Vec<Nation>,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        ScenarioOptions {
            width: 32,
            height: 20,
            seed: 1,
            humans: vec![Nation::English],
        }
    }
}

fn random_land(rng: &mut SmallRng) -> Terrain {
    match rng.gen_range(0..20) {
        0..=5 => Terrain::Plains,
        6..=8 => Terrain::Grassland,
        9..=10 => Terrain::Prairie,
        11 => Terrain::Savannah,
        12..=14 => Terrain::Forest,
        15 => Terrain::Marsh,
        16 => Terrain::Swamp,
        17..=18 => Terrain::Hills,
        _ => Terrain::Mountains,
    }
}

fn generate_map(options: &ScenarioOptions, rng: &mut SmallRng) -> TerrainMap {
    let mut map = TerrainMap::filled(options.width, options.height, Square::new(Terrain::Ocean));
    let coast = options.width - EAST_OCEAN;
    for y in 0..options.height {
        for x in 0..options.width {
            let Some(sq) = map.square_mut(Coord::new(x, y)) else {
                continue;
            };
            if x == options.width - 1 {
                sq.sea_lane = true;
            } else if x > 0 && x < coast {
                *sq = Square::new(random_land(rng));
                sq.river = rng.gen_bool(0.08);
            }
        }
    }
    map
}

/// Builds a fresh game from `options`.
pub fn generate(options: &ScenarioOptions, config: &EngineConfig) -> Result<WorldState, ScenarioError> {
    let min_width = EAST_OCEAN + 4;
    let min_height = ROWS_PER_NATION * ALL_NATIONS.len() as i32;
    if options.width < min_width || options.height < min_height {
        return Err(ScenarioError::MapTooSmall {
            width: options.width,
            height: options.height,
            min_width,
            min_height,
        });
    }

    let mut rng = SmallRng::seed_from_u64(options.seed);
    let map = generate_map(options, &mut rng);
    let mut world = WorldState::new(map, TurnState::starting(config.start_year));

    let band = options.height / ALL_NATIONS.len() as i32;
    let landing_x = options.width - EAST_OCEAN - 1;
    for (i, nation) in ALL_NATIONS.iter().copied().enumerate() {
        world.add_nation(nation, options.humans.contains(&nation));
        let y = band * i as i32 + band / 2;
        let landing = Coord::new(landing_x, y);
        if let Some(sq) = world.map.square_mut(landing) {
            *sq = Square::new(Terrain::Plains);
        }

        let ship = world.create_unit_on_map(nation, Composition::of(BaseType::Caravel), Coord::new(landing_x + 1, y))?;
        for passenger in [Composition::soldier(), Composition::colonist()] {
            let id = world.create_unit(nation, passenger);
            world.board(id, ship)?;
        }
        world.create_unit_on_map(nation, Composition::scout(), landing)?;
        world.create_unit_on_map(nation, Composition::pioneer(100), landing)?;
        log::debug!("{} lands at {}", nation, landing);
    }

    recompute_fog(&mut world);
    log::info!(
        "generated {}x{} scenario with seed {}",
        options.width,
        options.height,
        options.seed
    );
    Ok(world)
}
