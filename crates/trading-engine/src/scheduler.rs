//! Fixed-interval cycle scheduling with cooperative shutdown.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::orchestrator::Orchestrator;
use crate::report::CycleReport;

/// Create the shutdown channel shared by the scheduler and the signal listener.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Flip `shutdown` on Ctrl-C or SIGTERM.
pub async fn listen_for_shutdown(shutdown: watch::Sender<bool>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl-C"),
                    _ = terminate.recv() => info!("Received SIGTERM"),
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl-C");
    }

    let _ = shutdown.send(true);
}

/// Runs orchestrator cycles back to back, sleeping `interval` in between.
///
/// Cycles never overlap. Shutdown is observed before each cycle, between
/// assets inside a cycle and during the sleep; a gateway call in flight
/// always runs to completion.
pub struct Scheduler {
    orchestrator: Orchestrator,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl Scheduler {
    /// Create a scheduler.
    pub fn new(
        orchestrator: Orchestrator,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            orchestrator: orchestrator.with_shutdown(shutdown.clone()),
            interval,
            shutdown,
        }
    }

    /// Get the orchestrator.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Run a single cycle.
    pub async fn run_once(&mut self) -> CycleReport {
        let report = self.orchestrator.run_cycle().await;
        Self::log_cycle(&report);
        report
    }

    /// Run cycles until shutdown. Returns the number of cycles run.
    pub async fn run_until_shutdown(&mut self) -> u64 {
        info!(interval_secs = self.interval.as_secs(), "Scheduler started");
        let mut cycles = 0;

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let report = self.run_once().await;
            cycles += 1;
            if report.interrupted {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        warn!("Shutdown channel closed");
                        break;
                    }
                }
            }
        }

        info!(cycles, "Scheduler stopped");
        cycles
    }

    fn log_cycle(report: &CycleReport) {
        info!(
            cycle = report.cycle,
            assets = report.assets.len(),
            orders = report.orders_placed(),
            failures = report.failures(),
            "Cycle complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::OrchestratorConfig;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use trading_broker::PaperGateway;

    fn create_scheduler(interval: Duration) -> (watch::Sender<bool>, Scheduler) {
        let paper = Arc::new(PaperGateway::new(dec!(100000)));
        let orchestrator = Orchestrator::new(paper, OrchestratorConfig::default()).unwrap();
        let (tx, rx) = shutdown_channel();
        (tx, Scheduler::new(orchestrator, interval, rx))
    }

    #[tokio::test]
    async fn test_run_once() {
        let (_tx, mut scheduler) = create_scheduler(Duration::from_secs(10));

        let report = scheduler.run_once().await;
        assert_eq!(report.cycle, 1);
        assert_eq!(scheduler.orchestrator().cycles(), 1);
    }

    #[tokio::test]
    async fn test_no_cycle_after_shutdown() {
        let (tx, mut scheduler) = create_scheduler(Duration::from_secs(10));
        tx.send(true).unwrap();

        assert_eq!(scheduler.run_until_shutdown().await, 0);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_sleep() {
        let (tx, mut scheduler) = create_scheduler(Duration::from_secs(3600));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });

        let cycles = tokio::time::timeout(Duration::from_secs(5), scheduler.run_until_shutdown())
            .await
            .expect("scheduler should stop on shutdown");
        assert_eq!(cycles, 1);
    }

    #[tokio::test]
    async fn test_closed_channel_stops_loop() {
        let (tx, mut scheduler) = create_scheduler(Duration::from_secs(3600));
        drop(tx);

        let cycles = tokio::time::timeout(Duration::from_secs(5), scheduler.run_until_shutdown())
            .await
            .expect("scheduler should stop when the channel closes");
        assert_eq!(cycles, 1);
    }
}
