//! Paper trading command implementation.

use anyhow::{bail, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use trading_broker::PaperGateway;
use trading_config::AppConfig;

use super::{apply_loop_args, run_loop, upbit_gateway};
use crate::cli::PaperArgs;

pub async fn run(args: PaperArgs, mut config: AppConfig) -> Result<()> {
    if args.cash <= Decimal::ZERO {
        bail!("starting cash must be positive, got {}", args.cash);
    }
    apply_loop_args(&mut config, &args.run);

    let market_data = Arc::new(upbit_gateway(&config.exchange, false)?);
    let paper = PaperGateway::with_market_data(args.cash, market_data)
        .with_quote_currency(config.exchange.quote_currency.clone());

    info!(cash = %args.cash, "Paper trading on live market data");

    run_loop(Arc::new(paper), &config, args.run.once).await
}
