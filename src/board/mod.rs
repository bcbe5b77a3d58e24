//! World representation and static map data.
//!
//! Contains the region graph, board coordinates, units, orders, and the
//! world aggregate that owns every board of a multiversal game.

pub mod location;
pub mod map;
pub mod order;
pub mod standard;
pub mod state;
pub mod unit;

pub use location::{BoardKey, Location, Phase, RegionId};
pub use map::{ConnectionType, MapError, Region, RegionMap, RegionType};
pub use order::{Order, OrderKind, OrderStatus, OrderStrength};
pub use standard::{WorldError, WorldFactory};
pub use state::{Board, Centre, World};
pub use unit::{Nation, Unit, UnitId, UnitType, ALL_NATIONS};
