use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path_ref = path.as_ref();
    fs::create_dir_all(path_ref)
        .with_context(|| format!("Failed to create directory: {}", path_ref.display()))
}

/// A frame counts as cached once a regular file with its name exists.
pub fn is_cached<P: AsRef<Path>>(dir: P, filename: &str) -> bool {
    dir.as_ref().join(filename).is_file()
}
