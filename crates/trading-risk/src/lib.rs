//! Position routing and exit rules.
//!
//! Decides which path an asset takes each cycle (entry, exit or neither)
//! and whether a held position should be closed.

mod exit;
mod position_gate;

pub use exit::ExitPolicy;
pub use position_gate::{PositionGate, Route};
