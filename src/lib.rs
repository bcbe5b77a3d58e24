//! Multiversal Diplomacy adjudicator.
//!
//! Exposes the board representation, order validation, the resolver and
//! phase evaluators, the adjudication entry point, and the JSON and save
//! formats, for use by integration tests and the binary entry point.

pub mod board;
pub mod engine;
pub mod protocol;
pub mod resolve;
pub mod validate;
