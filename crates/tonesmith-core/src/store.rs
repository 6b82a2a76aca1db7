//! Unified storage interface
//!
//! The `Store` is the single point of truth for persisted application state:
//! projects, their sessions and likes, the active project, and the global
//! tone of voice.
//!
//! ## Consistency
//!
//! Every operation re-reads the committed document. Writes are
//! read-modify-write of the whole document followed by an atomic rename.
//! A reentrant lock scoped to the store instance serializes those sequences
//! across threads, and lets `transaction` callers invoke store operations
//! while already holding the lock.
//!
//! Returned values are snapshots. Mutating them has no effect until they
//! are written back with `set_state`.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open_with_config(Config::load()?)?;
//!
//! store.create_project("Acme")?;
//! store.append_history_item("Acme", "s1", item)?;
//!
//! let sessions = store.list_sessions("Acme");
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::ReentrantMutex;
use tracing::debug;

use crate::config::{Config, CorruptPolicy};
use crate::models::{HistoryItem, Session, State};
use crate::storage::{JsonPersistence, StorageResult, StorageStats};

/// Thread-safe handle on the state document
///
/// Share across threads with `Arc<Store>`. Access from multiple processes
/// is not coordinated: the last rename wins.
pub struct Store {
    persistence: JsonPersistence,
    config: Config,
    lock: ReentrantMutex<()>,
}

impl Store {
    /// Open the store with a specific configuration
    ///
    /// Creates an empty document if none exists.
    pub fn open_with_config(config: Config) -> Result<Self> {
        let persistence = JsonPersistence::from_config(&config);

        persistence
            .ensure_initialized()
            .with_context(|| format!("Failed to initialize state at {:?}", persistence.path()))?;

        Ok(Self {
            persistence,
            config,
            lock: ReentrantMutex::new(()),
        })
    }

    /// Open a store backed by an explicit document path
    ///
    /// The configuration is the default one, pointed at the document's
    /// directory.
    pub fn open_at(path: impl Into<PathBuf>, on_corrupt: CorruptPolicy) -> StorageResult<Self> {
        let persistence = JsonPersistence::new(path, on_corrupt);
        persistence.ensure_initialized()?;

        let data_dir = persistence
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let config = Config {
            data_dir,
            on_corrupt,
            ..Config::default()
        };

        Ok(Self {
            persistence,
            config,
            lock: ReentrantMutex::new(()),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the backing state document
    pub fn path(&self) -> &Path {
        self.persistence.path()
    }

    /// Size information about the backing document
    pub fn storage_stats(&self) -> StorageStats {
        let _guard = self.lock.lock();
        self.persistence.stats()
    }

    /// Run a compound sequence of store operations without interleaving
    ///
    /// The lock is held for the whole closure. Store operations called from
    /// inside re-acquire it on the same thread without blocking.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> T) -> T {
        let _guard = self.lock.lock();
        f(self)
    }

    /// Read-modify-write the whole document under the lock
    fn update<T>(&self, mutate: impl FnOnce(&mut State) -> T) -> StorageResult<T> {
        let _guard = self.lock.lock();
        let mut state = self.persistence.load();
        let out = mutate(&mut state);
        self.persistence.save(&state)?;
        Ok(out)
    }

    // ==================== Whole Document ====================

    /// Get a snapshot of the full document
    pub fn get_state(&self) -> State {
        let _guard = self.lock.lock();
        self.persistence.load()
    }

    /// Replace the document wholesale
    pub fn set_state(&self, state: &State) -> StorageResult<()> {
        let _guard = self.lock.lock();
        self.persistence.save(state)?;
        debug!("Replaced state document");
        Ok(())
    }

    // ==================== Project Operations ====================

    /// Project names in lexicographic order
    pub fn list_projects(&self) -> Vec<String> {
        self.get_state().projects.into_keys().collect()
    }

    /// Get count of projects
    pub fn project_count(&self) -> usize {
        self.get_state().projects.len()
    }

    /// Get the active project name
    pub fn get_active_project(&self) -> Option<String> {
        self.get_state().active_project
    }

    /// Set the active project
    ///
    /// The name is stored as given; callers check that it exists.
    pub fn set_active_project(&self, name: Option<&str>) -> StorageResult<()> {
        self.update(|state| state.active_project = name.map(str::to_string))?;
        debug!("Active project set to {:?}", name);
        Ok(())
    }

    /// Create a project and make it active
    ///
    /// An existing project keeps its sessions and likes.
    pub fn create_project(&self, name: &str) -> StorageResult<()> {
        let created = self.update(|state| {
            let created = !state.projects.contains_key(name);
            state.project_mut_or_default(name);
            state.active_project = Some(name.to_string());
            created
        })?;
        debug!("Project {:?} active (created={})", name, created);
        Ok(())
    }

    /// Delete a project
    ///
    /// If it was active, the first remaining project (or none) becomes
    /// active. Deleting an unknown project writes nothing.
    pub fn delete_project(&self, name: &str) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut state = self.persistence.load();

        if state.projects.remove(name).is_none() {
            return Ok(());
        }
        if state.active_project.as_deref() == Some(name) {
            state.active_project = state.projects.keys().next().cloned();
        }

        self.persistence.save(&state)?;
        debug!(
            "Deleted project {:?}, active now {:?}",
            name, state.active_project
        );
        Ok(())
    }

    // ==================== Session Operations ====================

    /// Append a generation to a session
    ///
    /// Creates the project and the session as needed.
    pub fn append_history_item(
        &self,
        project: &str,
        session_id: &str,
        item: HistoryItem,
    ) -> StorageResult<()> {
        let version = self.update(|state| {
            let proj = state.project_mut_or_default(project);
            match proj.sessions.iter_mut().find(|s| s.id == session_id) {
                Some(session) => {
                    session.items.push(item);
                    session.items.len()
                }
                None => {
                    proj.sessions.push(Session::new(session_id, item));
                    1
                }
            }
        })?;
        debug!(
            "Appended v{} to session {:?} in project {:?}",
            version, session_id, project
        );
        Ok(())
    }

    /// Sessions of a project in creation order; empty for unknown projects
    pub fn list_sessions(&self, project: &str) -> Vec<Session> {
        self.get_state()
            .projects
            .remove(project)
            .map(|p| p.sessions)
            .unwrap_or_default()
    }

    /// Get a single session
    pub fn session(&self, project: &str, session_id: &str) -> Option<Session> {
        self.get_state()
            .project(project)
            .and_then(|p| p.session(session_id))
            .cloned()
    }

    // ==================== Like Operations ====================

    /// Append a copy of an item to the project's likes
    ///
    /// Creates the project if absent.
    pub fn like_item(&self, project: &str, item: &HistoryItem) -> StorageResult<()> {
        let count = self.update(|state| {
            let proj = state.project_mut_or_default(project);
            proj.likes.push(item.clone());
            proj.likes.len()
        })?;
        debug!("Project {:?} now has {} like(s)", project, count);
        Ok(())
    }

    /// Liked items in like order; empty for unknown projects
    pub fn list_likes(&self, project: &str) -> Vec<HistoryItem> {
        self.get_state()
            .projects
            .remove(project)
            .map(|p| p.likes)
            .unwrap_or_default()
    }

    // ==================== Tone of Voice ====================

    /// Get the global tone of voice; empty if never set
    pub fn get_tone_of_voice(&self) -> String {
        self.get_state().tone_of_voice
    }

    /// Replace the global tone of voice
    pub fn set_tone_of_voice(&self, text: &str) -> StorageResult<()> {
        self.update(|state| state.tone_of_voice = text.to_string())?;
        debug!("Tone of voice updated ({} chars)", text.chars().count());
        Ok(())
    }
}
