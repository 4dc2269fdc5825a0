//! Entry and exit decisions.

use serde::{Deserialize, Serialize};

/// Discrete entry signal produced from the oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySignal {
    /// Oversold cross-up: open a position
    Enter,
    /// Conditions not met
    NoEntry,
    /// Oscillator values undefined (warm-up or degenerate division)
    Undecided,
}

impl EntrySignal {
    /// Check if this signal opens a position.
    pub fn is_enter(&self) -> bool {
        matches!(self, EntrySignal::Enter)
    }
}

impl std::fmt::Display for EntrySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntrySignal::Enter => write!(f, "ENTER"),
            EntrySignal::NoEntry => write!(f, "NONE"),
            EntrySignal::Undecided => write!(f, "UNDECIDED"),
        }
    }
}

/// Entry signal together with the oscillator values it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryDecision {
    pub signal: EntrySignal,
    /// Latest %K, if defined
    pub k: Option<f64>,
    /// Latest %D, if defined
    pub d: Option<f64>,
}

/// Why a held position should be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    ProfitTarget,
    StopLoss,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::ProfitTarget => write!(f, "profit target"),
            ExitReason::StopLoss => write!(f, "stop loss"),
        }
    }
}

/// Exit evaluation for a held position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitDecision {
    Exit(ExitReason),
    Hold,
}

impl ExitDecision {
    /// Check if the position should be closed.
    pub fn is_exit(&self) -> bool {
        matches!(self, ExitDecision::Exit(_))
    }
}
