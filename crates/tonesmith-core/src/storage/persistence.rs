//! JSON state persistence
//!
//! Handles saving and loading the state document to/from the filesystem.
//! Uses atomic writes (write to temp file, then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/tonesmith/` (configurable via `Config`)
//!
//! Files:
//! - `state.json` - The state document
//! - `.tmpXXXXXX` - Uniquely named transient file, only present while a write is in flight
//! - `state.json.corrupt` - Copy of the last unparseable document (backup policy only)

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::{Config, CorruptPolicy};
use crate::models::State;
use crate::storage::error::{StorageError, StorageResult};

/// Persistence layer for the state document
///
/// Provides atomic file operations for saving/loading state. Does no
/// locking of its own; `Store` serializes access.
#[derive(Debug, Clone)]
pub struct JsonPersistence {
    path: PathBuf,
    on_corrupt: CorruptPolicy,
}

impl JsonPersistence {
    /// Create a persistence handler for a specific file
    pub fn new(path: impl Into<PathBuf>, on_corrupt: CorruptPolicy) -> Self {
        Self {
            path: path.into(),
            on_corrupt,
        }
    }

    /// Create a persistence handler for the configured state file
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.state_path(), config.on_corrupt)
    }

    /// Path of the state document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unparseable document is copied under the backup policy
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    /// Check if the document exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the empty document if none exists yet
    pub fn ensure_initialized(&self) -> StorageResult<()> {
        if self.exists() {
            return Ok(());
        }
        debug!("Creating empty state document at {:?}", self.path);
        self.save(&State::default())
    }

    /// Load the document from disk
    ///
    /// A missing, unreadable, or unparseable file yields the empty state.
    pub fn load(&self) -> State {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return State::default(),
            Err(e) => {
                warn!("State document {:?} unreadable, using empty state: {}", self.path, e);
                return State::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(state) => state,
            Err(e) => {
                self.recover_corrupt(&e);
                State::default()
            }
        }
    }

    /// Save the document to disk using atomic write
    pub fn save(&self, state: &State) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(state)?;
        atomic_write(&self.path, &bytes)
    }

    /// Report what is currently on disk
    pub fn stats(&self) -> StorageStats {
        let document_size = fs::metadata(&self.path).map(|m| m.len()).ok();
        StorageStats {
            document_exists: document_size.is_some(),
            document_size: document_size.unwrap_or(0),
        }
    }

    fn recover_corrupt(&self, error: &serde_json::Error) {
        match self.on_corrupt {
            CorruptPolicy::Reset => {
                warn!("State document {:?} is corrupt, using empty state: {}", self.path, error);
            }
            CorruptPolicy::Backup => {
                let backup = self.backup_path();
                match fs::copy(&self.path, &backup) {
                    Ok(_) => warn!(
                        "State document {:?} is corrupt ({}), copied to {:?}",
                        self.path, error, backup
                    ),
                    Err(e) => warn!(
                        "State document {:?} is corrupt ({}) and backup to {:?} failed: {}",
                        self.path, error, backup, e
                    ),
                }
            }
        }
    }
}

/// Size information about the state document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub document_exists: bool,
    pub document_size: u64,
}

impl StorageStats {
    /// Document size formatted for display
    pub fn document_size_human(&self) -> String {
        format_size(self.document_size)
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Write data to a file atomically
///
/// 1. Write to a uniquely named temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The rename is the commit point: readers see the old file or the new one.
/// Concurrent writers never share a temp file; the last rename wins.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    // Same directory as the target so the rename stays on one filesystem
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|source| StorageError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut temp =
        NamedTempFile::new_in(dir).map_err(|e| StorageError::from_io(e, dir.to_path_buf()))?;
    let temp_path = temp.path().to_path_buf();

    temp.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    temp.as_file()
        .sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    // On failure the temp file is removed when the returned handle drops
    temp.persist(path)
        .map_err(|e| StorageError::AtomicWriteFailed {
            from: temp_path,
            to: path.to_path_buf(),
            source: e.error,
        })?;

    debug!("Committed {} bytes to {:?}", data.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GenerationParams, HistoryItem, Session};
    use tempfile::TempDir;

    fn persistence(temp_dir: &TempDir, policy: CorruptPolicy) -> JsonPersistence {
        JsonPersistence::new(temp_dir.path().join("state.json"), policy)
    }

    fn populated_state() -> State {
        let mut state = State::default();
        state.tone_of_voice = "Warm, direct, no jargon.".to_string();
        let project = state.project_mut_or_default("Acme");
        project.sessions.push(Session::new(
            "s1",
            HistoryItem::new("hi", "", "Hello!", GenerationParams::default()),
        ));
        state.active_project = Some("Acme".to_string());
        state
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir, CorruptPolicy::Reset);

        assert!(!persistence.exists());
        assert_eq!(persistence.load(), State::default());

        let state = populated_state();
        persistence.save(&state).unwrap();
        assert!(persistence.exists());

        assert_eq!(persistence.load(), state);
    }

    #[test]
    fn test_no_temp_file_after_save() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir, CorruptPolicy::Reset);

        persistence.save(&populated_state()).unwrap();
        persistence.save(&State::default()).unwrap();

        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("state.json")]);
    }

    #[test]
    fn test_concurrent_writers_use_separate_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        let payload = vec![b'x'; 64 * 1024];

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let path = path.clone();
                let payload = payload.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        atomic_write(&path, &payload).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(fs::read(&path).unwrap(), payload);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_saved_file_is_pretty_json() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir, CorruptPolicy::Reset);

        persistence.save(&populated_state()).unwrap();

        let content = fs::read_to_string(persistence.path()).unwrap();
        assert!(content.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["active_project"], "Acme");
    }

    #[test]
    fn test_ensure_initialized_creates_empty_document() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b").join("state.json");
        let persistence = JsonPersistence::new(nested, CorruptPolicy::Reset);

        persistence.ensure_initialized().unwrap();

        assert!(persistence.exists());
        let value: serde_json::Value =
            serde_json::from_slice(&fs::read(persistence.path()).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"projects": {}, "active_project": null, "tone_of_voice": ""})
        );
    }

    #[test]
    fn test_ensure_initialized_keeps_existing() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir, CorruptPolicy::Reset);

        let state = populated_state();
        persistence.save(&state).unwrap();
        persistence.ensure_initialized().unwrap();

        assert_eq!(persistence.load(), state);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir, CorruptPolicy::Reset);

        fs::write(persistence.path(), b"{\"projects\": {\"Acme\": ").unwrap();

        assert_eq!(persistence.load(), State::default());
        assert!(!persistence.backup_path().exists());
    }

    #[test]
    fn test_wrong_shape_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir, CorruptPolicy::Reset);

        fs::write(persistence.path(), b"[1, 2, 3]").unwrap();
        assert_eq!(persistence.load(), State::default());

        fs::write(persistence.path(), [0xff, 0xfe, 0x00, 0x13]).unwrap();
        assert_eq!(persistence.load(), State::default());
    }

    #[test]
    fn test_backup_policy_preserves_corrupt_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir, CorruptPolicy::Backup);

        fs::write(persistence.path(), b"not json at all").unwrap();

        assert_eq!(persistence.load(), State::default());
        assert!(persistence.backup_path().ends_with("state.json.corrupt"));
        assert_eq!(
            fs::read(persistence.backup_path()).unwrap(),
            b"not json at all".to_vec()
        );
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("c")
            .join("file.json");

        atomic_write(&nested_path, b"test data").unwrap();

        assert!(nested_path.exists());
        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "test data");
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("file.json");

        atomic_write(&path, b"first version, which is longer").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_write_into_file_as_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"i am a file").unwrap();

        let persistence = JsonPersistence::new(blocker.join("state.json"), CorruptPolicy::Reset);
        let err = persistence.save(&State::default()).unwrap_err();

        assert!(matches!(err, StorageError::CreateDirectory { .. }));
    }

    #[test]
    fn test_stats() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = persistence(&temp_dir, CorruptPolicy::Reset);

        let stats = persistence.stats();
        assert!(!stats.document_exists);
        assert_eq!(stats.document_size, 0);

        persistence.save(&populated_state()).unwrap();
        let stats = persistence.stats();
        assert!(stats.document_exists);
        assert!(stats.document_size > 0);
        assert!(stats.document_size_human().ends_with(" B"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
