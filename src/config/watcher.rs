//! Upstream list file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself: editors
//! that save by writing a temp file and renaming it would otherwise leave
//! the watch attached to a deleted inode.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use crate::relay::upstreams::UpstreamList;

/// Watches the upstream list file and publishes every valid new version.
pub struct UpstreamListWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<UpstreamList>,
}

impl UpstreamListWatcher {
    /// Returns the watcher and a receiver for list updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<UpstreamList>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (Self {
            path: path.to_path_buf(),
            update_tx,
        }, update_rx)
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let file_name: Option<OsString> = path.file_name().map(|n| n.to_os_string());
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    let touches_list = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if !touches_list || !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    match UpstreamList::load(&path) {
                        Ok(list) => {
                            let _ = tx.send(list);
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload upstream list: {}. Keeping current list.", e);
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Upstream list watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rewrite_publishes_new_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth-server-list");
        std::fs::write(&path, "http://a.example\n").unwrap();

        let (watcher, mut updates) = UpstreamListWatcher::new(&path);
        let _watcher = watcher.run().unwrap();

        std::fs::write(&path, "http://a.example\nhttp://b.example\n").unwrap();

        let list = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                let list = updates.recv().await.expect("watcher closed");
                if list.len() == 2 {
                    return list;
                }
            }
        })
        .await
        .expect("no reload observed");
        assert_eq!(list.iter().nth(1).unwrap().host(), "b.example");
    }
}
