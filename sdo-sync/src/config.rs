use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Url;

/// Root of the public JPEG2000 archive. Dated directories hang off this.
pub const DEFAULT_BASE_URL: &str = "https://helioviewer.org/jp2/AIA/";

/// Only links ending in this suffix are considered frames.
pub const DEFAULT_EXTENSION: &str = "jp2";

/// Cached frames at least this old are pruned.
pub const DEFAULT_RETENTION_HOURS: u64 = 24;

/// Timeout for every HTTP request made during a run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// AIA wavelength channel. The set is closed; each one owns a local
/// directory and a remote path segment of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    A94,
    A171,
    A193,
    A211,
    A304,
    A335,
}

pub const CHANNELS: [Channel; 6] = [
    Channel::A94,
    Channel::A171,
    Channel::A193,
    Channel::A211,
    Channel::A304,
    Channel::A335,
];

impl Channel {
    pub fn id(self) -> &'static str {
        match self {
            Channel::A94 => "94",
            Channel::A171 => "171",
            Channel::A193 => "193",
            Channel::A211 => "211",
            Channel::A304 => "304",
            Channel::A335 => "335",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Channel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        CHANNELS
            .iter()
            .copied()
            .find(|channel| channel.id() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = CHANNELS.iter().map(|c| c.id()).collect();
                anyhow::anyhow!("Unknown channel '{}', expected one of {}", s, known.join(", "))
            })
    }
}

/// Everything a single run needs. Built once and only read afterwards.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Archive root; always ends in `/` so that joins append to the path.
    pub base_url: Url,
    /// Parent of the per-channel directories.
    pub data_dir: PathBuf,
    pub channels: Vec<Channel>,
    pub extension: String,
    pub retention: Duration,
    /// Overrides today's local date when set.
    pub date: Option<NaiveDate>,
    pub dry_run: bool,
    pub timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            data_dir: PathBuf::from("."),
            channels: CHANNELS.to_vec(),
            extension: DEFAULT_EXTENSION.to_string(),
            retention: Duration::from_secs(DEFAULT_RETENTION_HOURS * 60 * 60),
            date: None,
            dry_run: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SyncConfig {
    pub fn channel_dir(&self, channel: Channel) -> PathBuf {
        self.data_dir.join(channel.id())
    }
}

/// Parse a base URL, making sure it is treated as a directory.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("Invalid base URL: {}", raw))?;
    if url.cannot_be_a_base() {
        return Err(anyhow::anyhow!("Base URL cannot have paths joined to it: {}", raw));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Retention threshold from a whole number of hours.
pub fn retention_from_hours(hours: u64) -> Result<Duration> {
    hours
        .checked_mul(60 * 60)
        .map(Duration::from_secs)
        .ok_or_else(|| anyhow::anyhow!("Retention of {} hours is too large", hours))
}

/// Drop repeated channels while keeping the order they were given in.
pub fn dedup_channels(channels: Vec<Channel>) -> Vec<Channel> {
    let mut seen = Vec::with_capacity(channels.len());
    for channel in channels {
        if !seen.contains(&channel) {
            seen.push(channel);
        }
    }
    seen
}
