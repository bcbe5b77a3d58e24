//! Order resolution.
//!
//! Resolves the touched orders of one adjudication phase by phase: movement
//! through the Kruijswijk guess-and-check resolver, retreats and adjustments
//! by direct rules, then advances the boards.

mod arena;
pub mod build;
pub mod dependency;
pub mod kruijswijk;
pub mod movement;
pub mod order;
pub mod phase;
pub mod retreat;
pub mod strength;
pub mod touched;

pub use arena::{Arena, ArenaOrder, Snapshot};
pub use build::{AdjustmentOutcome, Chooser, FirstChoice};
pub use kruijswijk::{resolve_orders, OrderSetResolver};
pub use movement::MovementOutcome;
pub use phase::{execute, find_winner, ExecutionOutcome};
pub use retreat::RetreatOutcome;
pub use touched::find_touched;
