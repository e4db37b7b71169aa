//! Durable whole-store snapshots
//!
//! The entire session map is serialized as one JSON document and written
//! atomically (write to a temp file in the target directory, then rename).
//! A crash mid-write never leaves a truncated snapshot behind.

use super::types::Session;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Snapshot file holding the serialized session map
#[derive(Debug)]
pub struct SnapshotFile {
    /// Target file path
    path: PathBuf,
    /// Version of the newest state written so far. Writers holding an
    /// older copy of the state skip their write instead of regressing
    /// the file.
    write_gate: Mutex<u64>,
}

impl SnapshotFile {
    /// Create a snapshot handle for the given file path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_gate: Mutex::new(0),
        }
    }

    /// Load the session map from disk.
    ///
    /// A missing file yields an empty map. Unreadable or corrupt content
    /// also yields an empty map, logged at WARN; startup never fails on a
    /// bad snapshot.
    pub fn load(&self) -> HashMap<String, Session> {
        if !self.path.exists() {
            return HashMap::new();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read snapshot, starting empty"
                );
                return HashMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Corrupt snapshot, starting empty"
                );
                HashMap::new()
            }
        }
    }

    /// Write the session map to disk atomically.
    ///
    /// `version` is the store's mutation counter at the time the state was
    /// copied; a save carrying an older version than one already written
    /// is a no-op.
    pub fn save(&self, version: u64, sessions: &HashMap<String, Session>) -> Result<()> {
        let mut gate = self.write_gate.lock();
        if version <= *gate {
            tracing::debug!(version, written = *gate, "Skipping stale snapshot write");
            return Ok(());
        }

        let content = serde_json::to_string_pretty(sessions)
            .map_err(|e| Error::Persistence(format!("Failed to serialize snapshot: {}", e)))?;

        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::Persistence(format!(
                "Failed to create snapshot directory {}: {}",
                parent.display(),
                e
            ))
        })?;

        let mut temp = NamedTempFile::new_in(parent)
            .map_err(|e| Error::Persistence(format!("Failed to create temp snapshot: {}", e)))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| Error::Persistence(format!("Failed to write snapshot: {}", e)))?;
        temp.flush()
            .map_err(|e| Error::Persistence(format!("Failed to flush snapshot: {}", e)))?;
        temp.persist(&self.path).map_err(|e| {
            Error::Persistence(format!(
                "Failed to replace snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;

        *gate = version;
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::Message;
    use tempfile::TempDir;

    fn snapshot_in(dir: &TempDir) -> SnapshotFile {
        SnapshotFile::new(dir.path().join("sessions.json"))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let snapshot = snapshot_in(&dir);
        assert!(snapshot.load().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let snapshot = snapshot_in(&dir);

        let mut sessions = HashMap::new();
        let mut session = Session::new();
        session.history.push(Message::user("hello"));
        sessions.insert(session.id.clone(), session.clone());

        snapshot.save(1, &sessions).unwrap();
        let loaded = snapshot.load();

        assert_eq!(loaded.len(), 1);
        let back = &loaded[&session.id];
        assert_eq!(back.title, session.title);
        assert_eq!(back.history.len(), 1);
        assert_eq!(back.history[0].text, "hello");
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let snapshot = snapshot_in(&dir);
        std::fs::write(snapshot.path(), "{ not json").unwrap();

        assert!(snapshot.load().is_empty());
    }

    #[test]
    fn test_stale_write_is_skipped() {
        let dir = TempDir::new().unwrap();
        let snapshot = snapshot_in(&dir);

        let mut newer = HashMap::new();
        let session = Session::new();
        newer.insert(session.id.clone(), session);

        snapshot.save(2, &newer).unwrap();
        snapshot.save(1, &HashMap::new()).unwrap();

        // The empty v1 state must not have overwritten the v2 state
        assert_eq!(snapshot.load().len(), 1);
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("nested").join("sessions.json"));
        snapshot.save(1, &HashMap::new()).unwrap();
        assert!(snapshot.path().exists());
    }
}
