//! Core data types for the trading loop.

mod holding;
mod ohlcv;
mod order;
mod signal;
mod timeframe;

pub use holding::{held_quantity, Holding};
pub use ohlcv::{Bar, BarSeries};
pub use order::{Execution, OrderIntent, OrderResult, OrderSizing, OrderState, Side};
pub use signal::{EntryDecision, EntrySignal, ExitDecision, ExitReason};
pub use timeframe::Timeframe;
