//! Exchange gateways.
//!
//! [`UpbitGateway`] talks to the Upbit REST API; [`PaperGateway`] simulates
//! an account in memory, optionally reading live public data through
//! another gateway.

mod paper;
mod upbit;

pub use paper::PaperGateway;
pub use upbit::{UpbitConfig, UpbitGateway, DEFAULT_BASE_URL};
