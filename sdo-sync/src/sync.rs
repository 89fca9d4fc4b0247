use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::archive::{channel_url, date_url, list_files, local_filename, ListingSource};
use crate::config::{Channel, SyncConfig};
use crate::io::{ensure_dir, is_cached};
use crate::prune::prune_all;
use crate::transfer::FileTransfer;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ChannelReport {
    pub channel: String,
    pub listing_url: Option<String>,
    /// Matching files on the listing page.
    pub listed: usize,
    /// Listed files that were already cached.
    pub present: usize,
    /// Fetched files, or the ones that would be fetched in a dry run.
    pub downloaded: Vec<String>,
    pub failed: Vec<String>,
    /// Removed files, or the ones that would be removed in a dry run.
    pub pruned: Vec<String>,
    pub errors: Vec<String>,
}

impl ChannelReport {
    fn new(channel: Channel) -> ChannelReport {
        ChannelReport {
            channel: channel.id().to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RunReport {
    pub date: String,
    pub date_url: String,
    pub dry_run: bool,
    pub channels: Vec<ChannelReport>,
}

impl RunReport {
    pub fn downloaded(&self) -> usize {
        self.channels.iter().map(|c| c.downloaded.len()).sum()
    }

    pub fn pruned(&self) -> usize {
        self.channels.iter().map(|c| c.pruned.len()).sum()
    }

    pub fn failed(&self) -> usize {
        self.channels.iter().map(|c| c.failed.len()).sum()
    }

    /// No channel errors and no failed transfers.
    pub fn is_clean(&self) -> bool {
        self.channels
            .iter()
            .all(|c| c.errors.is_empty() && c.failed.is_empty())
    }

    pub fn print_summary(&self) {
        let mode = if self.dry_run { " (dry run)" } else { "" };
        println!("\nSync for {}{}: {}", self.date, mode, self.date_url);
        for channel in &self.channels {
            println!(
                "  {:>4}: {} listed, {} cached, {} downloaded, {} failed, {} pruned",
                channel.channel,
                channel.listed,
                channel.present,
                channel.downloaded.len(),
                channel.failed.len(),
                channel.pruned.len()
            );
            for error in &channel.errors {
                println!("        error: {}", error);
            }
        }
        println!(
            "Total: {} downloaded, {} failed, {} pruned",
            self.downloaded(),
            self.failed(),
            self.pruned()
        );
    }
}

/// Download every listed file for `channel` that isn't cached yet.
/// Failed transfers are recorded and the remaining files are still tried.
pub fn sync_channel<L, T>(
    config: &SyncConfig,
    date_url: &Url,
    channel: Channel,
    listing: &L,
    transfer: &T,
    report: &mut ChannelReport,
) -> Result<()>
where
    L: ListingSource + ?Sized,
    T: FileTransfer + ?Sized,
{
    let url = channel_url(date_url, channel)?;
    report.listing_url = Some(url.to_string());
    log::info!("CHECKING: {}", url);

    let files = list_files(listing, &url, &config.extension)
        .with_context(|| format!("Failed to list channel {}", channel))?;
    report.listed = files.len();

    let dir = config.channel_dir(channel);
    if !config.dry_run {
        ensure_dir(&dir)?;
    }

    let mut seen = HashSet::new();
    for file in &files {
        let name = match local_filename(file) {
            Some(name) => name,
            None => {
                log::warn!("No file name in {}, skipping", file);
                continue;
            }
        };
        if !seen.insert(name.clone()) {
            continue;
        }

        if is_cached(&dir, &name) {
            log::debug!("CACHED: {}", Path::new(channel.id()).join(&name).display());
            report.present += 1;
            continue;
        }

        if config.dry_run {
            log::info!("WOULD DOWNLOAD: {}", file);
            report.downloaded.push(name.clone());
            continue;
        }

        log::info!("DOWNLOADING: {}", file);
        match transfer.fetch(file, &dir) {
            Ok(path) => {
                log::debug!("Saved {}", path.display());
                report.downloaded.push(name.clone());
            }
            Err(e) => {
                log::error!("Transfer failed for {}: {}", file, e);
                report.failed.push(name.clone());
            }
        }
    }

    Ok(())
}

/// One full pass: prune every channel, then sync every channel. A failing
/// channel is recorded on its report and does not stop the others.
///
/// `today` is used unless the config pins a date.
pub fn run<L, T>(
    config: &SyncConfig,
    listing: &L,
    transfer: &T,
    today: NaiveDate,
    now: SystemTime,
) -> Result<RunReport>
where
    L: ListingSource + ?Sized,
    T: FileTransfer + ?Sized,
{
    let date = config.date.unwrap_or(today);
    let date_url = date_url(&config.base_url, date)?;

    let mut reports: Vec<ChannelReport> =
        config.channels.iter().map(|&c| ChannelReport::new(c)).collect();

    for (report, (channel, result)) in reports.iter_mut().zip(prune_all(config, now)) {
        match result {
            Ok(paths) => {
                report.pruned = paths
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|name| name.to_string_lossy().to_string())
                    .collect();
            }
            Err(e) => {
                log::error!("Pruning channel {} failed: {:#}", channel, e);
                report.errors.push(format!("prune: {:#}", e));
            }
        }
    }

    for (report, &channel) in reports.iter_mut().zip(&config.channels) {
        if let Err(e) = sync_channel(config, &date_url, channel, listing, transfer, report) {
            log::error!("Channel {} failed: {:#}", channel, e);
            report.errors.push(format!("sync: {:#}", e));
        }
    }

    Ok(RunReport {
        date: date.format("%Y-%m-%d").to_string(),
        date_url: date_url.to_string(),
        dry_run: config.dry_run,
        channels: reports,
    })
}

pub fn save_report(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write run report to {}", path.display()))
}
