//! Persistence formats.
//!
//! [`json`] describes a whole world as plain records keyed by region codes;
//! [`save`] stores only the order history and rebuilds the world by
//! replaying it through the adjudicator.

pub mod json;
pub mod save;

pub use json::{
    BoardRecord, BoardUnitRecord, CentreRecord, LocationRecord, OrderRecord, OrderType, RecordError, UnitRecord,
    WorldRecord,
};
pub use save::{SaveError, SaveFile};
