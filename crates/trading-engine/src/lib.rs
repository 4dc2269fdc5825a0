//! Trading loop: per-cycle orchestration and the scheduler that drives it.

mod orchestrator;
mod report;
mod scheduler;

pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use report::{AssetOutcome, AssetReport, CycleReport};
pub use scheduler::{listen_for_shutdown, shutdown_channel, Scheduler};
