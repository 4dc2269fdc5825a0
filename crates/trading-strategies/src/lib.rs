//! Entry signal rules.
//!
//! The only entry rule is the Stochastic RSI oversold cross-up:
//! enter when %K crosses above %D while both lines sit below the
//! oversold threshold.

mod stoch_rsi_entry;

pub use stoch_rsi_entry::{
    evaluate_cross_up, is_cross_up, is_oversold, StochRsiEntry, StochRsiEntryConfig,
};
