use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Result;
use reqwest::Url;

use crate::archive::{local_filename, ListingSource};
use crate::transfer::{FileTransfer, TransferError};

pub mod config_tests;
pub mod fixtures;
pub mod prune_tests;

pub const HOUR: Duration = Duration::from_secs(60 * 60);

/// Serves canned listing pages keyed by URL; anything else is a 404.
#[derive(Default)]
pub struct FakeListing {
    pages: HashMap<String, String>,
    pub requests: RefCell<Vec<Url>>,
}

impl FakeListing {
    pub fn with_page(mut self, url: &str, html: String) -> FakeListing {
        self.pages.insert(url.to_string(), html);
        self
    }
}

impl ListingSource for FakeListing {
    fn fetch_listing(&self, url: &Url) -> Result<String> {
        self.requests.borrow_mut().push(url.clone());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("404 Not Found: {}", url))
    }
}

/// Records every request and drops an empty file in place, like a
/// successful download would.
#[derive(Default)]
pub struct RecordingTransfer {
    pub calls: RefCell<Vec<(Url, PathBuf)>>,
    /// File names that fail instead of being written.
    pub failing: Vec<String>,
}

impl FileTransfer for RecordingTransfer {
    fn fetch(&self, source: &Url, dest_dir: &Path) -> Result<PathBuf, TransferError> {
        self.calls
            .borrow_mut()
            .push((source.clone(), dest_dir.to_path_buf()));

        let name = local_filename(source).ok_or_else(|| TransferError::NoFileName(source.clone()))?;
        if self.failing.iter().any(|f| *f == name) {
            return Err(TransferError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                url: source.clone(),
            });
        }

        let dest = dest_dir.join(&name);
        File::create(&dest).map_err(|e| TransferError::Io {
            path: dest.clone(),
            source: e,
        })?;
        Ok(dest)
    }
}

/// Create `path` with a modification time `age` before `now`.
pub fn touch_with_age(path: &Path, age: Duration, now: SystemTime) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let file = File::create(path).unwrap();
    file.set_modified(now - age).unwrap();
}
