//! Live trading command implementation.

use anyhow::Result;
use std::sync::Arc;
use tracing::warn;
use trading_config::AppConfig;

use super::{apply_loop_args, run_loop, upbit_gateway};
use crate::cli::LoopArgs;

pub async fn run(args: LoopArgs, mut config: AppConfig) -> Result<()> {
    apply_loop_args(&mut config, &args);

    let gateway = upbit_gateway(&config.exchange, true)?;
    warn!(
        environment = %config.app.environment,
        "Live trading: orders are placed with real funds"
    );

    run_loop(Arc::new(gateway), &config, args.once).await
}
