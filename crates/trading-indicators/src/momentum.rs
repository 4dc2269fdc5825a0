//! Momentum indicators.

use serde::{Deserialize, Serialize};
use trading_core::error::IndicatorError;
use trading_core::traits::Indicator;

use crate::rolling::{rolling_max, rolling_mean, rolling_min};

/// Relative Strength Index (RSI) with simple-mean smoothing.
///
/// Gains and losses are averaged with a plain rolling mean over `period`
/// (not Wilder's smoothing). The first sample has no predecessor and counts
/// as zero movement, so the first value is defined at index `period - 1`.
///
/// RS is undefined whenever the average loss is zero, including a window
/// with no losses at all; such positions are `None`.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "RSI period must be greater than 0".into(),
            ));
        }
        Ok(Self { period })
    }

    fn gains_and_losses(data: &[f64]) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        let mut gains = Vec::with_capacity(data.len());
        let mut losses = Vec::with_capacity(data.len());

        for i in 0..data.len() {
            let change = if i == 0 { 0.0 } else { data[i] - data[i - 1] };
            gains.push(Some(change.max(0.0)));
            losses.push(Some((-change).max(0.0)));
        }

        (gains, losses)
    }
}

impl Indicator for Rsi {
    type Output = Option<f64>;

    fn calculate(&self, data: &[f64]) -> Vec<Option<f64>> {
        let (gains, losses) = Self::gains_and_losses(data);
        let avg_gains = rolling_mean(&gains, self.period);
        let avg_losses = rolling_mean(&losses, self.period);

        avg_gains
            .iter()
            .zip(avg_losses.iter())
            .map(|(gain, loss)| match (gain, loss) {
                (Some(gain), Some(loss)) if *loss != 0.0 => {
                    let rs = gain / loss;
                    Some(100.0 - 100.0 / (1.0 + rs))
                }
                _ => None,
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// One point of the Stochastic RSI oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochRsiOutput {
    /// %K (smoothed stochastic of RSI)
    pub k: Option<f64>,
    /// %D (moving average of %K)
    pub d: Option<f64>,
}

impl StochRsiOutput {
    /// Both lines, if both are defined.
    pub fn pair(&self) -> Option<(f64, f64)> {
        Some((self.k?, self.d?))
    }
}

/// Stochastic RSI oscillator.
///
/// Applies the stochastic formula to RSI instead of price:
/// `(RSI - min(RSI, p)) / (max(RSI, p) - min(RSI, p)) * 100`, then smooths
/// it into %K (mean over `smooth_k`) and %D (mean of %K over `smooth_d`).
/// A flat RSI window (max == min) leaves the point undefined.
#[derive(Debug, Clone)]
pub struct StochRsi {
    rsi: Rsi,
    rsi_period: usize,
    smooth_k: usize,
    smooth_d: usize,
}

impl StochRsi {
    /// Create with custom periods.
    pub fn new(
        rsi_period: usize,
        smooth_k: usize,
        smooth_d: usize,
    ) -> Result<Self, IndicatorError> {
        if smooth_k == 0 || smooth_d == 0 {
            return Err(IndicatorError::InvalidParameter(
                "Smoothing windows must be greater than 0".into(),
            ));
        }
        Ok(Self {
            rsi: Rsi::new(rsi_period)?,
            rsi_period,
            smooth_k,
            smooth_d,
        })
    }

    /// Raw stochastic of the RSI series, before smoothing.
    fn stochastic(&self, rsi: &[Option<f64>]) -> Vec<Option<f64>> {
        let lows = rolling_min(rsi, self.rsi_period);
        let highs = rolling_max(rsi, self.rsi_period);

        rsi.iter()
            .zip(lows.iter().zip(highs.iter()))
            .map(|(value, (low, high))| {
                let (value, low, high) = ((*value)?, (*low)?, (*high)?);
                let range = high - low;
                (range != 0.0).then(|| (value - low) / range * 100.0)
            })
            .collect()
    }
}

impl Default for StochRsi {
    /// The conventional 14/3/3 parameters.
    fn default() -> Self {
        Self {
            rsi: Rsi { period: 14 },
            rsi_period: 14,
            smooth_k: 3,
            smooth_d: 3,
        }
    }
}

impl Indicator for StochRsi {
    type Output = StochRsiOutput;

    fn calculate(&self, data: &[f64]) -> Vec<StochRsiOutput> {
        let rsi = self.rsi.calculate(data);
        let stoch = self.stochastic(&rsi);
        let k = rolling_mean(&stoch, self.smooth_k);
        let d = rolling_mean(&k, self.smooth_d);

        k.into_iter()
            .zip(d)
            .map(|(k, d)| StochRsiOutput { k, d })
            .collect()
    }

    /// RSI needs `p` points, its min/max window `p - 1` more, and each
    /// smoothing window adds `window - 1`.
    fn period(&self) -> usize {
        2 * self.rsi_period + self.smooth_k + self.smooth_d - 3
    }

    fn name(&self) -> &str {
        "StochRSI"
    }
}
