//! Technical indicators.
//!
//! This crate provides the oscillator the entry rule is built on:
//! - Rolling-window primitives (mean, min, max) over possibly undefined values
//! - RSI with simple-mean smoothing
//! - Stochastic RSI (%K, %D)
//!
//! Every indicator returns a series aligned index-for-index with its input.
//! Undefined positions are `None` rather than NaN, so consumers have to
//! branch on them explicitly.

pub mod momentum;
pub mod rolling;

pub use momentum::{Rsi, StochRsi, StochRsiOutput};
pub use rolling::{rolling_max, rolling_mean, rolling_min};
