//! Log pruning command implementation.

use anyhow::{Context, Result};
use std::path::PathBuf;
use trading_config::AppConfig;
use trading_monitor::prune_rotated_logs;

use crate::cli::PruneLogsArgs;

pub async fn run(args: PruneLogsArgs, config: &AppConfig) -> Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => config
            .logging
            .directory
            .as_ref()
            .map(PathBuf::from)
            .context("no --dir given and logging.directory is not set")?,
    };
    let keep = args.keep.unwrap_or(config.logging.max_files);

    let removed = prune_rotated_logs(&dir, &config.logging.file_prefix, keep)
        .with_context(|| format!("pruning logs in {}", dir.display()))?;

    println!("Removed {} rotated log file(s) from {}", removed.len(), dir.display());
    Ok(())
}
