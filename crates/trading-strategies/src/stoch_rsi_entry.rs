//! Stochastic RSI oversold cross-up entry rule.
//!
//! Buys when %K crosses above %D while both lines are below the
//! oversold level. The rule is memoryless: every evaluation recomputes
//! the oscillator from the series it is given and looks only at the two
//! most recent points.

use serde::{Deserialize, Serialize};
use trading_core::{
    error::StrategyError,
    traits::Indicator,
    types::{BarSeries, EntryDecision, EntrySignal, Timeframe},
};
use trading_indicators::{StochRsi, StochRsiOutput};

/// Configuration for the Stochastic RSI entry rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochRsiEntryConfig {
    /// RSI lookback period
    pub rsi_period: usize,
    /// %K smoothing window
    pub smooth_k: usize,
    /// %D smoothing window
    pub smooth_d: usize,
    /// Oversold threshold (both lines strictly below this)
    pub oversold: f64,
    /// Candle interval the oscillator is computed on
    pub timeframe: Timeframe,
}

impl Default for StochRsiEntryConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            smooth_k: 3,
            smooth_d: 3,
            oversold: 20.0,
            timeframe: Timeframe::Minute1,
        }
    }
}

impl StochRsiEntryConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.rsi_period < 2 {
            return Err(StrategyError::InvalidConfig(
                "RSI period must be at least 2".into(),
            ));
        }
        if self.smooth_k == 0 || self.smooth_d == 0 {
            return Err(StrategyError::InvalidConfig(
                "Smoothing windows must be at least 1".into(),
            ));
        }
        if !(self.oversold > 0.0 && self.oversold < 100.0) {
            return Err(StrategyError::InvalidConfig(
                "Oversold threshold must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

/// Both lines strictly below `threshold`.
pub fn is_oversold(k: f64, d: f64, threshold: f64) -> bool {
    k < threshold && d < threshold
}

/// %K moved from at-or-below %D to strictly above it.
pub fn is_cross_up(previous: (f64, f64), latest: (f64, f64)) -> bool {
    let (prev_k, prev_d) = previous;
    let (k, d) = latest;
    k > d && prev_k <= prev_d
}

/// Apply the entry rule to the tail of an oscillator series.
///
/// Needs the last two points fully defined; otherwise the result is
/// [`EntrySignal::Undecided`] and no entry is taken.
pub fn evaluate_cross_up(points: &[StochRsiOutput], oversold: f64) -> EntryDecision {
    let latest = points.last().copied().unwrap_or(StochRsiOutput { k: None, d: None });
    let undecided = EntryDecision {
        signal: EntrySignal::Undecided,
        k: latest.k,
        d: latest.d,
    };

    let [previous, current] = match points {
        [.., previous, current] => [*previous, *current],
        _ => return undecided,
    };

    let (Some(previous), Some(current)) = (previous.pair(), current.pair()) else {
        return undecided;
    };

    let oversold = is_oversold(current.0, current.1, oversold);
    let signal = if oversold && is_cross_up(previous, current) {
        EntrySignal::Enter
    } else {
        EntrySignal::NoEntry
    };

    EntryDecision {
        signal,
        k: Some(current.0),
        d: Some(current.1),
    }
}

/// Stochastic RSI entry rule bound to its indicator.
#[derive(Debug, Clone)]
pub struct StochRsiEntry {
    config: StochRsiEntryConfig,
    indicator: StochRsi,
}

impl StochRsiEntry {
    /// Create a new entry rule.
    pub fn new(config: StochRsiEntryConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let indicator = StochRsi::new(config.rsi_period, config.smooth_k, config.smooth_d)
            .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
        Ok(Self { config, indicator })
    }

    /// Get the configuration.
    pub fn config(&self) -> &StochRsiEntryConfig {
        &self.config
    }

    /// Bars needed before two consecutive defined points can exist.
    pub fn warmup_period(&self) -> usize {
        self.indicator.period() + 1
    }

    /// Compute the oscillator over `series` and evaluate the entry rule.
    pub fn evaluate(&self, series: &BarSeries) -> EntryDecision {
        let oscillator = self.indicator.calculate(&series.closes());
        let decision = evaluate_cross_up(&oscillator, self.config.oversold);

        if decision.signal == EntrySignal::Undecided {
            tracing::debug!(
                asset = %series.asset,
                bars = series.len(),
                warmup = self.warmup_period(),
                "Stochastic RSI undefined at the latest bars"
            );
        }

        decision
    }
}
