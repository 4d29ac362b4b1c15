//! Retrieving raw model bytes from the network or disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::LoadError;

/// Source of model bytes
///
/// Implementations must be shareable across loader threads.
pub trait ModelFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError>;
}

/// Where a model URL points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Remote(String),
    Local(PathBuf),
}

impl ModelSource {
    /// Classifies `url`, resolving relative paths against `base_dir`
    pub fn parse(url: &str, base_dir: &Path) -> Self {
        let url = url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            return ModelSource::Remote(url.to_string());
        }

        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() {
            ModelSource::Local(path.to_path_buf())
        } else {
            ModelSource::Local(base_dir.join(path))
        }
    }
}

/// Fetches over HTTP(S) with a blocking client, or from the filesystem
pub struct DefaultFetcher {
    client: reqwest::blocking::Client,
    base_dir: PathBuf,
}

impl DefaultFetcher {
    pub fn new(timeout: Duration, base_dir: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_dir: base_dir.into(),
        })
    }
}

impl ModelFetcher for DefaultFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        match ModelSource::parse(url, &self.base_dir) {
            ModelSource::Remote(url) => {
                log::debug!("GET {}", url);
                let response = self.client.get(&url).send()?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        url,
                        status: status.as_u16(),
                    });
                }
                Ok(response.bytes()?.to_vec())
            }
            ModelSource::Local(path) => {
                log::debug!("Reading {}", path.display());
                fs::read(&path).map_err(|source| LoadError::Io { path, source })
            }
        }
    }
}
