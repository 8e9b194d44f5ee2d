//! Non-blocking asset fetching
//!
//! The render thread never waits on I/O. A fetcher is told to start a fetch
//! and hands back finished fetches when polled; the text system pumps it once
//! per frame.

use std::path::PathBuf;

use super::{AssetError, AssetKind};

/// A finished fetch, successful or not
#[derive(Debug)]
pub struct FetchCompletion {
    /// What was requested
    pub kind: AssetKind,
    /// URL exactly as requested
    pub url: String,
    /// Raw file bytes or the failure
    pub result: Result<Vec<u8>, AssetError>,
}

/// Source of font descriptor and atlas image bytes
pub trait AssetFetcher {
    /// Start fetching `url`. Must not block on I/O completion.
    fn begin_fetch(&mut self, kind: AssetKind, url: &str);

    /// Drain every fetch that finished since the last poll
    fn poll_completed(&mut self) -> Vec<FetchCompletion>;
}

/// Fetcher backed by the local file system
///
/// Reads happen when the fetch is issued, but completions are only handed
/// out on the next [`AssetFetcher::poll_completed`], so callers observe the
/// same deferred completion they would get from a network loader.
pub struct FileFetcher {
    search_paths: Vec<PathBuf>,
    completed: Vec<FetchCompletion>,
}

impl FileFetcher {
    /// Create a fetcher that resolves URLs against `search_paths`
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            completed: Vec::new(),
        }
    }

    /// Resolve a URL to a file path: first search path hit wins, then the raw path
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix("file://").unwrap_or(url);

        self.search_paths
            .iter()
            .map(|base| base.join(relative))
            .find(|candidate| candidate.is_file())
            .or_else(|| {
                let raw = PathBuf::from(relative);
                raw.is_file().then_some(raw)
            })
    }

    fn read(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let path = self
            .resolve(url)
            .ok_or_else(|| AssetError::NotFound(url.to_string()))?;
        log::debug!("Reading {} from {}", url, path.display());
        Ok(std::fs::read(path)?)
    }
}

impl Default for FileFetcher {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl AssetFetcher for FileFetcher {
    fn begin_fetch(&mut self, kind: AssetKind, url: &str) {
        let result = self.read(url);
        self.completed.push(FetchCompletion {
            kind,
            url: url.to_string(),
            result,
        });
    }

    fn poll_completed(&mut self) -> Vec<FetchCompletion> {
        std::mem::take(&mut self.completed)
    }
}
