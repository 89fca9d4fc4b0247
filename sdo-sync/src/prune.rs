use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use glob::{glob, Pattern};

use crate::config::{Channel, SyncConfig};

/// True once at least `retention` has passed since `modified`.
/// Timestamps in the future are never stale.
pub fn is_stale(modified: SystemTime, now: SystemTime, retention: Duration) -> bool {
    match now.duration_since(modified) {
        Ok(elapsed) => elapsed >= retention,
        Err(_) => false,
    }
}

/// Every `*.<extension>` file in `dir` whose modification time is at least
/// `retention` before `now`. A missing directory yields nothing.
pub fn stale_files(
    dir: &Path,
    extension: &str,
    retention: Duration,
    now: SystemTime,
) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(extension)
    );

    let mut stale = Vec::new();
    for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!("Could not stat {}: {}", path.display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        match metadata.modified() {
            Ok(modified) if is_stale(modified, now, retention) => stale.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("No modification time for {}: {}", path.display(), e),
        }
    }

    Ok(stale)
}

/// Delete the stale files in `dir` and return the ones actually removed.
pub fn prune_channel(
    dir: &Path,
    extension: &str,
    retention: Duration,
    now: SystemTime,
) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for path in stale_files(dir, extension, retention, now)? {
        log::info!("PRUNING: {}", path.display());
        match fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}

/// Prune every configured channel. Each channel gets its own result so one
/// bad directory does not hide the others. In dry-run mode the stale files
/// are reported but left in place.
pub fn prune_all(config: &SyncConfig, now: SystemTime) -> Vec<(Channel, Result<Vec<PathBuf>>)> {
    config
        .channels
        .iter()
        .map(|&channel| {
            let dir = config.channel_dir(channel);
            let result = if config.dry_run {
                stale_files(&dir, &config.extension, config.retention, now)
            } else {
                prune_channel(&dir, &config.extension, config.retention, now)
            };
            (channel, result)
        })
        .collect()
}
