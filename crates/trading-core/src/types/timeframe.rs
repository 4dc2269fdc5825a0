//! Candle intervals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interval of the candles the oscillator is computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    #[default]
    Minute1,
    #[serde(rename = "3m")]
    Minute3,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "10m")]
    Minute10,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Minute60,
    #[serde(rename = "4h")]
    Minute240,
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "1w")]
    Week,
    #[serde(rename = "1M")]
    Month,
}

impl Timeframe {
    /// Minute unit for intraday candles, `None` for day and longer.
    pub fn minutes(&self) -> Option<u32> {
        match self {
            Timeframe::Minute1 => Some(1),
            Timeframe::Minute3 => Some(3),
            Timeframe::Minute5 => Some(5),
            Timeframe::Minute10 => Some(10),
            Timeframe::Minute15 => Some(15),
            Timeframe::Minute30 => Some(30),
            Timeframe::Minute60 => Some(60),
            Timeframe::Minute240 => Some(240),
            Timeframe::Day | Timeframe::Week | Timeframe::Month => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute3 => "3m",
            Timeframe::Minute5 => "5m",
            Timeframe::Minute10 => "10m",
            Timeframe::Minute15 => "15m",
            Timeframe::Minute30 => "30m",
            Timeframe::Minute60 => "1h",
            Timeframe::Minute240 => "4h",
            Timeframe::Day => "1d",
            Timeframe::Week => "1w",
            Timeframe::Month => "1M",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "1M" is the only case-sensitive spelling
        if s == "1M" {
            return Ok(Timeframe::Month);
        }
        match s.to_lowercase().as_str() {
            "1m" | "minute1" => Ok(Timeframe::Minute1),
            "3m" | "minute3" => Ok(Timeframe::Minute3),
            "5m" | "minute5" => Ok(Timeframe::Minute5),
            "10m" | "minute10" => Ok(Timeframe::Minute10),
            "15m" | "minute15" => Ok(Timeframe::Minute15),
            "30m" | "minute30" => Ok(Timeframe::Minute30),
            "1h" | "60m" | "minute60" => Ok(Timeframe::Minute60),
            "4h" | "240m" | "minute240" => Ok(Timeframe::Minute240),
            "1d" | "day" => Ok(Timeframe::Day),
            "1w" | "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            _ => Err(format!("Invalid timeframe: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_minutes() {
        assert_eq!(Timeframe::Minute1.minutes(), Some(1));
        assert_eq!(Timeframe::Minute240.minutes(), Some(240));
        assert_eq!(Timeframe::Day.minutes(), None);
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!(Timeframe::from_str("1m").unwrap(), Timeframe::Minute1);
        assert_eq!(Timeframe::from_str("minute1").unwrap(), Timeframe::Minute1);
        assert_eq!(Timeframe::from_str("1M").unwrap(), Timeframe::Month);
        assert_eq!(Timeframe::from_str("day").unwrap(), Timeframe::Day);
        assert!(Timeframe::from_str("2m").is_err());
    }

    #[test]
    fn test_timeframe_display_roundtrip() {
        for tf in [Timeframe::Minute5, Timeframe::Minute240, Timeframe::Month] {
            assert_eq!(Timeframe::from_str(&tf.to_string()).unwrap(), tf);
        }
    }
}
