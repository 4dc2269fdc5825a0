//! Core types and traits for the trading loop.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries, Timeframe)
//! - Account holdings, order intents and execution records
//! - Entry and exit decision types
//! - Core traits for indicators and the exchange gateway

pub mod types;
pub mod traits;
pub mod error;

pub use error::TradingError;
pub use types::*;
pub use traits::*;
