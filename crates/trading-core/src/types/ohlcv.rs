//! OHLCV (Open, High, Low, Close, Volume) data types.

use serde::{Deserialize, Serialize};

use super::Timeframe;

/// Compact OHLCV bar.
/// Uses f64 for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Snapshot of bars for one asset, oldest first.
///
/// A series is fetched fresh every evaluation cycle and never mutated
/// afterwards; indicators borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// Asset identifier (e.g. "BTC")
    pub asset: String,
    /// Timeframe of the bars
    pub timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Create a series from bars in any order; bars are sorted chronologically.
    pub fn new(asset: impl Into<String>, timeframe: Timeframe, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        Self {
            asset: asset.into(),
            timeframe,
            bars,
        }
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get the most recent bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_sorted_on_construction() {
        let series = BarSeries::new(
            "BTC",
            Timeframe::Minute1,
            vec![
                Bar::new(3, 1.0, 1.0, 1.0, 103.0, 1.0),
                Bar::new(1, 1.0, 1.0, 1.0, 101.0, 1.0),
                Bar::new(2, 1.0, 1.0, 1.0, 102.0, 1.0),
            ],
        );

        assert_eq!(series.closes(), vec![101.0, 102.0, 103.0]);
        assert_eq!(series.last().unwrap().timestamp, 3);
    }

    #[test]
    fn test_empty_series() {
        let series = BarSeries::new("ETH", Timeframe::Minute1, Vec::new());
        assert!(series.is_empty());
        assert!(series.last().is_none());
        assert_eq!(series.asset, "ETH");
    }
}
