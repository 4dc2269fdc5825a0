//! Core traits for the trading loop.

mod gateway;
mod indicator;

pub use gateway::Gateway;
pub use indicator::Indicator;
