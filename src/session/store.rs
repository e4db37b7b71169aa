//! The session store engine
//!
//! Owns the in-memory session map and enforces the store invariants.
//! Mutations happen under a single store-wide lock; the state is then
//! copied out and written to the snapshot file without holding the lock.
//! Persistence is best-effort: a failed write keeps the in-memory result
//! available and is surfaced through [`SessionStore::last_persistence_error`].

use super::snapshot::SnapshotFile;
use super::types::{derive_title, Feedback, Message, Session, SessionSummary, TableData};
use crate::config::StorageConfig;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;

/// In-memory store of chat sessions with snapshot durability
#[derive(Debug)]
pub struct SessionStore {
    inner: Mutex<StoreInner>,
    snapshot: SnapshotFile,
    /// Most recent snapshot failure, cleared on the next durable write
    last_persist_error: Mutex<Option<String>>,
}

#[derive(Debug, Default)]
struct StoreInner {
    sessions: HashMap<String, Session>,
    /// Session ids in insertion order; tie-break for listings
    order: Vec<String>,
    /// Mutation counter, passed to the snapshot writer as its version gate
    version: u64,
}

impl StoreInner {
    /// Record a mutation and hand back the state copy to persist
    fn bump(&mut self) -> (u64, HashMap<String, Session>) {
        self.version += 1;
        (self.version, self.sessions.clone())
    }
}

impl SessionStore {
    /// Open a store backed by the given snapshot file.
    ///
    /// A missing or corrupt snapshot yields an empty store; startup never
    /// fails on bad persisted state.
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        let snapshot = SnapshotFile::new(snapshot_path);
        let sessions = snapshot.load();

        // Insertion order is not persisted; reconstruct it by creation time
        let mut order: Vec<String> = sessions.keys().cloned().collect();
        order.sort_by(|a, b| sessions[a].created_at.cmp(&sessions[b].created_at));

        tracing::debug!(
            count = sessions.len(),
            path = %snapshot.path().display(),
            "Loaded session snapshot"
        );

        Self {
            inner: Mutex::new(StoreInner {
                sessions,
                order,
                version: 0,
            }),
            snapshot,
            last_persist_error: Mutex::new(None),
        }
    }

    /// Open a store at the location described by the storage config
    pub fn open(config: &StorageConfig) -> Self {
        Self::new(Path::new(&config.dir).join(&config.snapshot_file))
    }

    /// Create and register a new session.
    ///
    /// Never fails: a persistence failure keeps the session in memory and
    /// is reported through the degraded-durability channel.
    pub fn create_session(&self) -> Session {
        let session = Session::new();
        let (version, state) = {
            let mut inner = self.inner.lock();
            inner.sessions.insert(session.id.clone(), session.clone());
            inner.order.push(session.id.clone());
            inner.bump()
        };
        self.persist(version, state);
        session
    }

    /// List all sessions, newest first.
    ///
    /// Equal creation times keep insertion order (stable sort).
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        let inner = self.inner.lock();
        let mut summaries: Vec<SessionSummary> = inner
            .order
            .iter()
            .filter_map(|id| inner.sessions.get(id))
            .map(|s| s.summary())
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    /// Fetch a full session by exact id
    pub fn get_session(&self, id: &str) -> Result<Session> {
        self.inner
            .lock()
            .sessions
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Drop every session and persist the empty state
    pub fn reset_all(&self) {
        let (version, state) = {
            let mut inner = self.inner.lock();
            inner.sessions.clear();
            inner.order.clear();
            inner.bump()
        };
        tracing::info!("Session store reset");
        self.persist(version, state);
    }

    /// Append a user message to a session's history
    pub fn append_user_message(&self, id: &str, text: impl Into<String>) -> Result<Message> {
        self.append(id, Message::user(text))
    }

    /// Append an assistant message, optionally carrying a table payload
    pub fn append_assistant_message(
        &self,
        id: &str,
        text: impl Into<String>,
        table: Option<TableData>,
    ) -> Result<Message> {
        self.append(id, Message::assistant(text, table))
    }

    fn append(&self, id: &str, message: Message) -> Result<Message> {
        let (version, state) = {
            let mut inner = self.inner.lock();
            let session = inner
                .sessions
                .get_mut(id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            session.history.push(message.clone());
            inner.bump()
        };
        self.persist(version, state);
        Ok(message)
    }

    /// Replace the placeholder title with one derived from `candidate`.
    ///
    /// No-op when the session is missing, the title was already renamed,
    /// or nothing usable remains of the candidate after sanitizing. The
    /// title therefore leaves placeholder form at most once.
    pub fn set_title_if_placeholder(&self, id: &str, candidate: &str) {
        let (version, state) = {
            let mut inner = self.inner.lock();
            let Some(session) = inner.sessions.get_mut(id) else {
                return;
            };
            if !session.has_placeholder_title() {
                return;
            }
            let Some(title) = derive_title(candidate) else {
                return;
            };
            tracing::debug!(session = id, %title, "Derived session title");
            session.title = title;
            inner.bump()
        };
        self.persist(version, state);
    }

    /// Overwrite the feedback field of the message at `index`.
    ///
    /// The index is signed so negative values are rejected here rather
    /// than at the transport boundary. Feedback attaches to any role;
    /// there is deliberately no role check.
    pub fn attach_feedback(&self, id: &str, index: i64, feedback: Feedback) -> Result<Message> {
        let (version, state, message) = {
            let mut inner = self.inner.lock();
            let session = inner
                .sessions
                .get_mut(id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            if index < 0 || index as usize >= session.history.len() {
                return Err(Error::IndexOutOfRange(index));
            }
            let slot = &mut session.history[index as usize];
            slot.feedback = Some(feedback);
            let message = slot.clone();
            let (version, state) = inner.bump();
            (version, state, message)
        };
        self.persist(version, state);
        Ok(message)
    }

    /// Most recent snapshot failure, if the last write did not reach disk.
    ///
    /// `None` means the in-memory state is durable.
    pub fn last_persistence_error(&self) -> Option<String> {
        self.last_persist_error.lock().clone()
    }

    fn persist(&self, version: u64, state: HashMap<String, Session>) {
        match self.snapshot.save(version, &state) {
            Ok(()) => {
                self.last_persist_error.lock().take();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot write failed, serving from memory only");
                *self.last_persist_error.lock() = Some(e.to_string());
            }
        }
    }
}
