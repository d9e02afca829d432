//! File watcher for watch mode.
//!
//! Watches the input directory for manifest changes (and optionally extra
//! files such as the configuration) so suites are regenerated on save.

use crate::config::CONFIG_FILENAME;
use crate::error::{CliResult, WatchError};
use crate::scanner::ManifestFormat;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

/// Event types for file changes.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// A file was created or modified.
    Modified(PathBuf),
    /// A file was deleted.
    Deleted(PathBuf),
    /// An error occurred.
    Error(String),
}

/// File watcher for monitoring manifests.
pub struct FileWatcher {
    /// Root directory to watch.
    root: PathBuf,
    /// Individual files watched in addition to the root.
    extra: Vec<PathBuf>,
    /// Debounce duration in milliseconds.
    debounce_ms: u64,
}

impl FileWatcher {
    /// Create a new file watcher for the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extra: Vec::new(),
            debounce_ms: 500,
        }
    }

    /// Set the debounce duration in milliseconds.
    pub fn with_debounce(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Also watch a single file outside the root, e.g. an explicit config.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra.push(path.into());
        self
    }

    /// Start watching for file changes.
    ///
    /// Returns the debouncer, which must be kept alive, and a receiver that
    /// yields watch events.
    pub fn watch(&self) -> CliResult<(Debouncer<RecommendedWatcher>, Receiver<WatchEvent>)> {
        let (tx, rx) = channel::<WatchEvent>();
        let extra = self.extra.clone();

        let mut debouncer = new_debouncer(
            Duration::from_millis(self.debounce_ms),
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| match result {
                Ok(events) => {
                    for event in events {
                        let path = event.path;
                        if !is_relevant(&path) && !extra.contains(&path) {
                            continue;
                        }

                        let watch_event = if path.exists() {
                            WatchEvent::Modified(path)
                        } else {
                            WatchEvent::Deleted(path)
                        };

                        if tx.send(watch_event).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            },
        )
        .map_err(|e| WatchError::Init(e.to_string()))?;

        debouncer
            .watcher()
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::Notify(format!("{}: {}", self.root.display(), e)))?;

        for path in &self.extra {
            if path.starts_with(&self.root) {
                continue;
            }
            debouncer
                .watcher()
                .watch(path, RecursiveMode::NonRecursive)
                .map_err(|e| WatchError::Notify(format!("{}: {}", path.display(), e)))?;
        }

        Ok((debouncer, rx))
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Whether a change to `path` can affect generated output.
pub fn is_relevant(path: &Path) -> bool {
    ManifestFormat::detect(path).is_some()
        || path
            .file_name()
            .is_some_and(|name| name == CONFIG_FILENAME)
}

impl WatchEvent {
    /// Get the path associated with this event.
    pub fn path(&self) -> Option<&Path> {
        match self {
            WatchEvent::Modified(p) | WatchEvent::Deleted(p) => Some(p),
            WatchEvent::Error(_) => None,
        }
    }

    /// Check if this is an error event.
    pub fn is_error(&self) -> bool {
        matches!(self, WatchEvent::Error(_))
    }

    /// Get the error message if this is an error event.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            WatchEvent::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevant_paths() {
        assert!(is_relevant(Path::new("model/orders.beancheck.toml")));
        assert!(is_relevant(Path::new("users.beancheck.json")));
        assert!(is_relevant(Path::new("/project/beancheck.toml")));
        assert!(!is_relevant(Path::new("src/test/java/p/ThingStructureTest.java")));
        assert!(!is_relevant(Path::new("notes.toml")));
    }

    #[test]
    fn test_watch_event_accessors() {
        let path = PathBuf::from("/test/a.beancheck.toml");

        let modified = WatchEvent::Modified(path.clone());
        assert_eq!(modified.path(), Some(path.as_path()));
        assert!(!modified.is_error());

        let deleted = WatchEvent::Deleted(path.clone());
        assert_eq!(deleted.path(), Some(path.as_path()));

        let error = WatchEvent::Error("test error".to_string());
        assert_eq!(error.path(), None);
        assert!(error.is_error());
        assert_eq!(error.error_message(), Some("test error"));
    }

    #[test]
    fn test_file_watcher_builder() {
        let watcher = FileWatcher::new("/test/path")
            .with_debounce(1000)
            .with_file("/etc/beancheck.toml");
        assert_eq!(watcher.root(), Path::new("/test/path"));
        assert_eq!(watcher.debounce_ms, 1000);
        assert_eq!(watcher.extra, vec![PathBuf::from("/etc/beancheck.toml")]);
    }
}
