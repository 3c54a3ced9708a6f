//! World representation: terrain, units, colonies, nations, and the store
//! that ties them together.

pub mod colony;
pub mod coord;
pub mod fog;
pub mod market;
pub mod nation;
pub mod order;
pub mod state;
pub mod terrain;
pub mod unit;

pub use colony::{Building, Colony, ColonyId, Commodity, Job, ALL_COMMODITIES};
pub use coord::{Coord, Direction, ALL_DIRECTIONS};
pub use fog::{Fog, FogLayer};
pub use market::Market;
pub use nation::{FoundingFather, Nation, NationState, ALL_NATIONS, FATHER_ORDER};
pub use order::Order;
pub use state::{WorldError, WorldState};
pub use terrain::{Square, Surface, Terrain, TerrainMap, LAND_TERRAINS};
pub use unit::{
    BaseType, CargoItem, Composition, MovementPoints, Ownership, PortStatus, Unit, UnitId,
    UnitOrders, UnitRole, EQUIPMENT_QUANTITY, TOOLS_PER_JOB,
};
