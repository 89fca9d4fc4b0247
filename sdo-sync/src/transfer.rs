use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::archive::local_filename;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status} while fetching {url}")]
    Exit {
        program: String,
        status: ExitStatus,
        url: Url,
    },
    #[error("request for {url} failed: {source}")]
    Http {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("server answered {status} for {url}")]
    Status { status: StatusCode, url: Url },
    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no file name in {0}")]
    NoFileName(Url),
}

/// Moves one remote file into a local directory.
pub trait FileTransfer {
    /// Returns the path the file was written to.
    fn fetch(&self, source: &Url, dest_dir: &Path) -> Result<PathBuf, TransferError>;
}

fn destination(source: &Url, dest_dir: &Path) -> Result<PathBuf, TransferError> {
    local_filename(source)
        .map(|name| dest_dir.join(name))
        .ok_or_else(|| TransferError::NoFileName(source.clone()))
}

#[derive(Debug)]
pub struct Wget {
    cmd: Command,
}

impl Wget {
    pub fn cmd(self) -> Command {
        self.cmd
    }

    pub fn arg<S: AsRef<OsStr>>(&mut self, arg: S) -> &mut Wget {
        self.cmd.arg(arg);
        self
    }

    /// `-P <dir>`: save into this directory under the remote file name.
    pub fn dest_dir(&mut self, dir: &Path) -> &mut Wget {
        self.arg("-P");
        self.arg(dir)
    }

    pub fn url(&mut self, url: &Url) -> &mut Wget {
        self.arg(url.as_str())
    }
}

pub fn create_wget_command(program: &str) -> Wget {
    let mut cmd = Command::new(program);
    cmd.arg("--quiet");
    cmd.stdout(Stdio::null());
    Wget { cmd }
}

/// Hands the download to an external `wget`.
#[derive(Debug, Clone)]
pub struct WgetTransfer {
    program: String,
}

impl WgetTransfer {
    pub fn new(program: impl Into<String>) -> WgetTransfer {
        WgetTransfer {
            program: program.into(),
        }
    }
}

impl Default for WgetTransfer {
    fn default() -> Self {
        WgetTransfer::new("wget")
    }
}

impl FileTransfer for WgetTransfer {
    fn fetch(&self, source: &Url, dest_dir: &Path) -> Result<PathBuf, TransferError> {
        let dest = destination(source, dest_dir)?;

        let mut wget = create_wget_command(&self.program);
        wget.dest_dir(dest_dir).url(source);
        let status = wget
            .cmd()
            .status()
            .map_err(|e| TransferError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if !status.success() {
            return Err(TransferError::Exit {
                program: self.program.clone(),
                status,
                url: source.clone(),
            });
        }

        Ok(dest)
    }
}

/// Downloads in-process. The body goes to a temp file next to the target and
/// only takes the final name once it has been written completely.
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    client: Client,
}

impl HttpTransfer {
    pub fn new(timeout: Duration) -> anyhow::Result<HttpTransfer> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpTransfer::from_client(client))
    }

    pub fn from_client(client: Client) -> HttpTransfer {
        HttpTransfer { client }
    }
}

impl FileTransfer for HttpTransfer {
    fn fetch(&self, source: &Url, dest_dir: &Path) -> Result<PathBuf, TransferError> {
        let dest = destination(source, dest_dir)?;

        let mut response = self
            .client
            .get(source.clone())
            .send()
            .map_err(|e| TransferError::Http {
                url: source.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(TransferError::Status {
                status: response.status(),
                url: source.clone(),
            });
        }

        let mut partial = NamedTempFile::new_in(dest_dir).map_err(|e| TransferError::Io {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;
        response
            .copy_to(partial.as_file_mut())
            .map_err(|e| TransferError::Http {
                url: source.clone(),
                source: e,
            })?;
        partial.persist(&dest).map_err(|e| TransferError::Io {
            path: dest.clone(),
            source: e.error,
        })?;

        Ok(dest)
    }
}
