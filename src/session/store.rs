// src/session/store.rs — Key-value session store
//
// A durable, synchronous, string-keyed store with the whole session list
// serialized under a single key. Read and parse failures are swallowed with
// a warning and never surface to callers; every save rewrites the full
// collection. There is no locking: callers own the read-modify-write cycle,
// and two concurrent writers can clobber each other.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use super::ChatSession;

/// The single key holding the serialized session list.
pub const SESSIONS_KEY: &str = "chat_sessions";

/// String-keyed durable store. Object-safe so the repository can be handed
/// an in-memory fake in tests.
pub trait KvStore: Send + Sync {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// File-backed store: one JSON file per key under the given directory.
/// Writes are atomic (temp file + rename) so a crash mid-save never leaves
/// a half-written session list.
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileKvStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        let dst = self.key_path(key);

        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(value.as_bytes())?;
        f.flush()?;
        f.sync_all()?;
        std::fs::rename(&tmp, &dst)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Session-list view over a [`KvStore`]: load/parse and serialize/save of
/// the whole collection under [`SESSIONS_KEY`].
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// All sessions, or an empty list when the key is absent or the stored
    /// document no longer parses. Parse failure is not an error condition:
    /// a corrupt document degrades to a fresh history.
    pub fn load(&self) -> Vec<ChatSession> {
        let raw = match self.kv.read(SESSIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Error reading chat sessions from store: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!("Stored chat sessions are unparseable, starting empty: {e}");
                Vec::new()
            }
        }
    }

    /// Serialize and overwrite the entire collection. Write failure is
    /// logged, never thrown: losing one save beats crashing the UI.
    pub fn save_all(&self, sessions: &[ChatSession]) {
        let raw = match serde_json::to_string(sessions) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Error serializing chat sessions: {e}");
                return;
            }
        };
        if let Err(e) = self.kv.write(SESSIONS_KEY, &raw) {
            warn!("Error saving chat sessions to store: {e}");
        }
    }

    /// Remove the storage key entirely.
    pub fn clear(&self) {
        if let Err(e) = self.kv.remove(SESSIONS_KEY) {
            warn!("Error clearing chat sessions from store: {e}");
        }
    }

    /// Raw stored document, for tests asserting byte-level no-ops.
    pub fn raw(&self) -> Option<String> {
        self.kv.read(SESSIONS_KEY).ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ChatSession;
    use pretty_assertions::assert_eq;

    fn memory_store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryKvStore::new()))
    }

    #[test]
    fn test_load_empty_store() {
        let store = memory_store();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let store = memory_store();
        let sessions = vec![ChatSession::new("New Chat"), ChatSession::new("Bedroom")];
        store.save_all(&sessions);
        assert_eq!(store.load(), sessions);
    }

    #[test]
    fn test_corrupt_document_degrades_to_empty() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.write(SESSIONS_KEY, "{not json").unwrap();
        let store = SessionStore::new(kv);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_clear_removes_key() {
        let store = memory_store();
        store.save_all(&[ChatSession::new("x")]);
        assert!(store.raw().is_some());
        store.clear();
        assert!(store.raw().is_none());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SessionStore::new(Arc::new(FileKvStore::new(dir.path())));
        let sessions = vec![ChatSession::new("Living Room")];
        store.save_all(&sessions);
        assert_eq!(store.load(), sessions);
    }

    #[test]
    fn test_file_store_missing_key_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let kv = FileKvStore::new(dir.path());
        assert!(kv.read("chat_sessions").unwrap().is_none());
        // remove of an absent key is a no-op, not an error
        kv.remove("chat_sessions").unwrap();
    }
}
