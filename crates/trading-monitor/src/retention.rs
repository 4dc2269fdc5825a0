//! Log retention.
//!
//! The rolling appender names rotated files `{prefix}.{date}`, so sorting
//! by file name is sorting by age.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Rotated log files for `prefix` in `dir`, oldest first.
pub fn rotated_logs(dir: &Path, prefix: &str) -> io::Result<Vec<PathBuf>> {
    let marker = format!("{}.", prefix);
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.len() > marker.len() && name.starts_with(&marker) {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// Delete rotated log files beyond the newest `keep`. Returns the deleted paths.
pub fn prune_rotated_logs(dir: &Path, prefix: &str, keep: usize) -> io::Result<Vec<PathBuf>> {
    let files = rotated_logs(dir, prefix)?;
    let excess = files.len().saturating_sub(keep);

    let mut removed = Vec::with_capacity(excess);
    for path in files.into_iter().take(excess) {
        fs::remove_file(&path)?;
        debug!(path = %path.display(), "Removed rotated log");
        removed.push(path);
    }

    if !removed.is_empty() {
        info!(dir = %dir.display(), removed = removed.len(), kept = keep, "Pruned log files");
    }
    Ok(removed)
}
