//! Filesystem watch source
//!
//! Thin glue over the `notify` crate: a recursive watcher feeding raw paths
//! into a channel, plus the filters applied before anything reaches the
//! debouncer - source-file extension, modify/create kinds, and a SHA-256
//! content check that drops editor auto-save noise.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use sha2::{Digest, Sha256};

use crate::error::{MoltError, MoltResult};

/// Start a recursive watcher under `root`
///
/// Returns the watcher (keep it alive for the duration of the watch) and the
/// channel of raw event paths. Only modify/create events pass; everything
/// else is watch noise.
pub fn spawn_fs_watcher(root: &Path) -> MoltResult<(RecommendedWatcher, Receiver<PathBuf>)> {
    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        },
        Config::default(),
    )
    .map_err(|e| MoltError::Watch(e.to_string()))?;

    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| MoltError::Watch(e.to_string()))?;

    Ok((watcher, rx))
}

/// Whether a path has one of the watched source extensions
pub fn is_source_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|e| e == ext))
        .unwrap_or(false)
}

/// Compute a content hash for change detection
pub fn compute_content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

/// Tracks file content hashes to filter events that changed nothing
#[derive(Debug, Default)]
pub struct ContentTracker {
    hashes: HashMap<PathBuf, String>,
}

impl ContentTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file's current content without reporting a change
    pub fn prime(&mut self, path: &Path) {
        if let Ok(content) = fs::read_to_string(path) {
            self.hashes
                .insert(path.to_path_buf(), compute_content_hash(&content));
        }
    }

    /// Whether the file's content differs from the last observation
    ///
    /// Updates the tracked hash. An unreadable file (e.g. mid-write or
    /// deleted) is reported as changed so the closure provider sees it.
    pub fn content_changed(&mut self, path: &Path) -> bool {
        let Ok(content) = fs::read_to_string(path) else {
            self.hashes.remove(path);
            return true;
        };
        let new_hash = compute_content_hash(&content);
        let changed = self.hashes.get(path) != Some(&new_hash);
        self.hashes.insert(path.to_path_buf(), new_hash);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn exts() -> Vec<String> {
        vec!["md".to_string()]
    }

    #[test]
    fn test_is_source_file_filters_extensions() {
        assert!(is_source_file(Path::new("a/b/unit.md"), &exts()));
        assert!(!is_source_file(Path::new("a/b/notes.txt"), &exts()));
        assert!(!is_source_file(Path::new("a/b/no_extension"), &exts()));
    }

    #[test]
    fn test_compute_content_hash_is_stable() {
        let h1 = compute_content_hash("hello");
        let h2 = compute_content_hash("hello");
        let h3 = compute_content_hash("other");
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        assert!(h1.starts_with("sha256:"));
    }

    #[test]
    fn test_content_tracker_detects_real_changes_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unit.md");
        fs::write(&path, "one").unwrap();

        let mut tracker = ContentTracker::new();
        // First observation is a change (nothing primed).
        assert!(tracker.content_changed(&path));
        // Touching without editing is filtered.
        assert!(!tracker.content_changed(&path));

        fs::write(&path, "two").unwrap();
        assert!(tracker.content_changed(&path));
    }

    #[test]
    fn test_content_tracker_prime_swallows_first_event() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unit.md");
        fs::write(&path, "one").unwrap();

        let mut tracker = ContentTracker::new();
        tracker.prime(&path);
        assert!(!tracker.content_changed(&path));
    }

    #[test]
    fn test_content_tracker_deleted_file_is_a_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unit.md");
        fs::write(&path, "one").unwrap();

        let mut tracker = ContentTracker::new();
        tracker.prime(&path);
        fs::remove_file(&path).unwrap();
        assert!(tracker.content_changed(&path));
    }

    #[test]
    fn test_spawn_fs_watcher_delivers_modify_events() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unit.md");
        fs::write(&path, "one").unwrap();

        let (_watcher, rx) = spawn_fs_watcher(dir.path()).unwrap();
        // Give the backend a moment to register before mutating.
        std::thread::sleep(std::time::Duration::from_millis(200));
        fs::write(&path, "two").unwrap();

        let mut saw_path = false;
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while std::time::Instant::now() < deadline {
            if let Ok(p) = rx.recv_timeout(std::time::Duration::from_millis(100)) {
                if p.file_name().is_some_and(|n| n == "unit.md") {
                    saw_path = true;
                    break;
                }
            }
        }
        assert!(saw_path, "expected a watch event for unit.md");
    }
}
