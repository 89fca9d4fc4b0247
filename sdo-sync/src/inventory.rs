use std::path::Path;

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use serde::{Deserialize, Serialize};

use crate::config::Channel;

/// Observation details encoded in an archive frame name such as
/// `2018_09_24__12_00_05_340__SDO_AIA_AIA_171.jp2`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FrameMeta {
    /// `YYYY/MM/DD`
    pub date: String,
    /// `HH:MM:SS:mmm`
    pub time: String,
    pub hour: String,
    pub wavelength: String,
}

impl FrameMeta {
    pub fn parse(filename: &str) -> Result<FrameMeta> {
        let parts: Vec<&str> = filename.split("__").collect();
        if parts.len() != 3 {
            return Err(anyhow::anyhow!(
                "Expected date__time__instrument in frame name: {}",
                filename
            ));
        }

        let date_fields: Vec<&str> = parts[0].split('_').collect();
        if date_fields.len() != 3 || !all_digits(&date_fields) {
            return Err(anyhow::anyhow!("Bad date in frame name: {}", filename));
        }

        let time_fields: Vec<&str> = parts[1].split('_').collect();
        if time_fields.len() < 3 || !all_digits(&time_fields) {
            return Err(anyhow::anyhow!("Bad time in frame name: {}", filename));
        }

        let instrument = parts[2].split('.').next().unwrap_or("");
        let wavelength = match instrument.split('_').nth(3) {
            Some(w) if !w.is_empty() => w.to_string(),
            _ => {
                return Err(anyhow::anyhow!(
                    "No wavelength in frame name: {}",
                    filename
                ))
            }
        };

        Ok(FrameMeta {
            date: date_fields.join("/"),
            time: time_fields.join(":"),
            hour: time_fields[0].to_string(),
            wavelength,
        })
    }

    /// Fixed-width fields make this sort chronologically.
    fn sort_key(&self) -> (&str, &str) {
        (&self.date, &self.time)
    }
}

fn all_digits(fields: &[&str]) -> bool {
    fields
        .iter()
        .all(|f| !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()))
}

/// What is currently cached for one channel.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChannelInventory {
    pub channel: String,
    pub files: usize,
    pub earliest: Option<FrameMeta>,
    pub latest: Option<FrameMeta>,
    /// Names that don't follow the archive naming scheme.
    pub unrecognized: Vec<String>,
    /// Frames whose name carries a different wavelength than the directory.
    pub misplaced: Vec<String>,
}

pub fn channel_inventory(dir: &Path, channel: Channel, extension: &str) -> Result<ChannelInventory> {
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(extension)
    );

    let mut inventory = ChannelInventory {
        channel: channel.id().to_string(),
        files: 0,
        earliest: None,
        latest: None,
        unrecognized: Vec::new(),
        misplaced: Vec::new(),
    };

    for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
        let path = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if !path.is_file() {
            continue;
        }
        inventory.files += 1;

        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => continue,
        };

        let meta = match FrameMeta::parse(&name) {
            Ok(meta) => meta,
            Err(_) => {
                inventory.unrecognized.push(name);
                continue;
            }
        };

        if meta.wavelength != channel.id() {
            inventory.misplaced.push(name);
        }

        let is_earlier = inventory
            .earliest
            .as_ref()
            .map_or(true, |e| meta.sort_key() < e.sort_key());
        if is_earlier {
            inventory.earliest = Some(meta.clone());
        }

        let is_later = inventory
            .latest
            .as_ref()
            .map_or(true, |l| meta.sort_key() > l.sort_key());
        if is_later {
            inventory.latest = Some(meta);
        }
    }

    Ok(inventory)
}
