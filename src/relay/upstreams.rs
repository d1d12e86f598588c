//! Upstream authentication servers.
//!
//! # Responsibilities
//! - Parse the newline-delimited upstream list file
//! - Compose forwarding URLs for a single upstream
//! - Serve the current list according to the configured reload policy
//!
//! # Design Decisions
//! - List order is trial order and is never rearranged
//! - Every entry is validated at load time; a bad entry rejects the whole file
//! - Readers always see a complete list (atomic swap, never partial)

use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::config::schema::ReloadPolicy;

/// Errors produced while loading an upstream list.
#[derive(Debug, Error)]
pub enum UpstreamListError {
    /// The list file could not be read.
    #[error("Failed to read upstream list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line is not an absolute URL with a host.
    #[error("Invalid upstream on line {line}: '{entry}' ({reason})")]
    InvalidEntry {
        line: usize,
        entry: String,
        reason: String,
    },
}

/// One upstream base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamEntry {
    raw: String,
    host: String,
}

impl UpstreamEntry {
    /// Parse a single entry. Returns the parse failure reason on error.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let url = Url::parse(raw).map_err(|e| e.to_string())?;
        let host = url
            .host_str()
            .ok_or_else(|| "URL has no host".to_string())?
            .to_string();
        Ok(Self {
            raw: raw.to_string(),
            host,
        })
    }

    /// Hostname used in logs and metrics.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Build the outbound URL for this upstream.
    ///
    /// The raw entry is used verbatim so that `http://a.example` does not pick up
    /// a trailing slash from URL normalisation.
    pub fn forward_url(&self, subpath: &str, query: Option<&str>) -> String {
        let mut url = if subpath.is_empty() {
            self.raw.clone()
        } else {
            format!("{}{}", self.raw.trim_end_matches('/'), subpath)
        };
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

/// Ordered collection of upstreams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamList {
    entries: Vec<UpstreamEntry>,
}

impl UpstreamList {
    /// Parse list file contents. Blank lines are skipped; `\r\n` endings are accepted.
    pub fn parse(text: &str) -> Result<Self, UpstreamListError> {
        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let entry = UpstreamEntry::parse(line).map_err(|reason| UpstreamListError::InvalidEntry {
                line: idx + 1,
                entry: line.to_string(),
                reason,
            })?;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    /// Read and parse a list file.
    pub fn load(path: &Path) -> Result<Self, UpstreamListError> {
        let text = std::fs::read_to_string(path).map_err(|source| UpstreamListError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Async variant of [`UpstreamList::load`] for use on request paths.
    pub async fn load_async(path: &Path) -> Result<Self, UpstreamListError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| UpstreamListError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&text)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpstreamEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared handle to the current upstream list.
///
/// Cloning is cheap; all clones observe the same list.
#[derive(Debug, Clone)]
pub struct UpstreamSource {
    current: Arc<ArcSwap<UpstreamList>>,
    path: Option<PathBuf>,
    policy: ReloadPolicy,
}

impl UpstreamSource {
    /// A list that never changes and has no backing file.
    pub fn fixed(list: UpstreamList) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(list)),
            path: None,
            policy: ReloadPolicy::Static,
        }
    }

    /// Load the list file once. Fails if the file is missing or invalid,
    /// whatever the reload policy.
    pub fn from_file(path: &Path, policy: ReloadPolicy) -> Result<Self, UpstreamListError> {
        let list = UpstreamList::load(path)?;
        Ok(Self {
            current: Arc::new(ArcSwap::from_pointee(list)),
            path: Some(path.to_path_buf()),
            policy,
        })
    }

    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The list to sweep for one request.
    ///
    /// Under [`ReloadPolicy::PerRequest`] the file is re-read first; a failed
    /// read keeps the last good list.
    pub async fn current(&self) -> Arc<UpstreamList> {
        if self.policy == ReloadPolicy::PerRequest {
            if let Some(path) = &self.path {
                match UpstreamList::load_async(path).await {
                    Ok(list) => self.current.store(Arc::new(list)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Upstream list reload failed, keeping previous list");
                    }
                }
            }
        }
        self.current.load_full()
    }

    /// The list as currently held, without triggering a reload.
    pub fn snapshot(&self) -> Arc<UpstreamList> {
        self.current.load_full()
    }

    /// Swap in a new list.
    pub fn replace(&self, list: UpstreamList) {
        self.current.store(Arc::new(list));
    }
}
