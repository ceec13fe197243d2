// src/session/repository.rs — CRUD over individual chat sessions
//
// Every mutation is read-all -> mutate-in-memory -> write-all against the
// key-value store. "Session not found" is never an error: mutations log a
// warning, leave the collection untouched, and report NotFound so callers
// that care can tell, while nothing forces them to handle it.

use std::sync::Arc;

use tracing::warn;

use super::store::{KvStore, SessionStore};
use super::{ChatContextEntry, ChatSession, Product, SessionStatus};

/// Outcome of a mutation addressed by session id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    NotFound,
}

impl UpdateOutcome {
    pub fn is_applied(self) -> bool {
        self == UpdateOutcome::Applied
    }
}

/// Typed partial update for [`SessionRepository::update_meta`]. Fields left
/// `None` are untouched. A `session_id` in the patch is deliberately
/// ignored: the stored id always wins.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub session_id: Option<String>,
    pub title: Option<String>,
    pub products: Option<Vec<Product>>,
    pub status: Option<SessionStatus>,
}

#[derive(Clone)]
pub struct SessionRepository {
    store: SessionStore,
}

impl SessionRepository {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            store: SessionStore::new(kv),
        }
    }

    /// All sessions, in stored order.
    pub fn all(&self) -> Vec<ChatSession> {
        self.store.load()
    }

    /// A session by id, if present.
    pub fn get(&self, session_id: &str) -> Option<ChatSession> {
        self.all()
            .into_iter()
            .find(|s| s.session_id == session_id)
    }

    /// Insert, or replace in place (preserving position) when a session
    /// with the same id already exists.
    pub fn upsert(&self, session: ChatSession) {
        let mut sessions = self.all();
        match sessions
            .iter()
            .position(|s| s.session_id == session.session_id)
        {
            Some(index) => sessions[index] = session,
            None => sessions.push(session),
        }
        self.store.save_all(&sessions);
    }

    /// Append entries to a session's conversation, preserving order.
    pub fn append(&self, session_id: &str, entries: Vec<ChatContextEntry>) -> UpdateOutcome {
        self.mutate(session_id, "append", |session| {
            session.conversation.extend(entries);
        })
    }

    /// Replace the products wholesale (never merged).
    pub fn update_products(&self, session_id: &str, products: Vec<Product>) -> UpdateOutcome {
        self.mutate(session_id, "update products", |session| {
            session.products = Some(products);
        })
    }

    pub fn update_status(&self, session_id: &str, status: SessionStatus) -> UpdateOutcome {
        self.mutate(session_id, "update status", |session| {
            session.status = status;
        })
    }

    /// Shallow-merge the patch into the session. The stored `session_id`
    /// is re-pinned even if the patch tries to change it.
    pub fn update_meta(&self, session_id: &str, patch: SessionPatch) -> UpdateOutcome {
        if let Some(ref requested) = patch.session_id {
            if requested != session_id {
                warn!(
                    "Ignoring session id change '{session_id}' -> '{requested}' in meta update"
                );
            }
        }
        self.mutate(session_id, "meta update", |session| {
            if let Some(title) = patch.title {
                session.title = title;
            }
            if let Some(products) = patch.products {
                session.products = Some(products);
            }
            if let Some(status) = patch.status {
                session.status = status;
            }
        })
    }

    /// Remove a session. Unknown ids fall through silently: the rewrite of
    /// an unchanged collection is harmless.
    pub fn delete(&self, session_id: &str) {
        let mut sessions = self.all();
        sessions.retain(|s| s.session_id != session_id);
        self.store.save_all(&sessions);
    }

    /// Drop the whole collection (removes the storage key).
    pub fn clear_all(&self) {
        self.store.clear();
    }

    /// Raw serialized collection, for byte-level no-op assertions in tests.
    pub fn raw_document(&self) -> Option<String> {
        self.store.raw()
    }

    fn mutate(
        &self,
        session_id: &str,
        op: &str,
        apply: impl FnOnce(&mut ChatSession),
    ) -> UpdateOutcome {
        let mut sessions = self.all();
        let Some(session) = sessions.iter_mut().find(|s| s.session_id == session_id) else {
            warn!("Session {session_id} not found for {op}.");
            return UpdateOutcome::NotFound;
        };
        apply(session);
        self.store.save_all(&sessions);
        UpdateOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemoryKvStore;
    use crate::session::{MessageContent, MessageRole};
    use pretty_assertions::assert_eq;

    fn repo() -> SessionRepository {
        SessionRepository::new(Arc::new(MemoryKvStore::new()))
    }

    fn entry(role: MessageRole, text: &str) -> ChatContextEntry {
        ChatContextEntry {
            role,
            content: MessageContent::Text(text.into()),
        }
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let repo = repo();
        let first = ChatSession::new("first");
        let second = ChatSession::new("second");
        repo.upsert(first.clone());
        repo.upsert(second.clone());

        let mut renamed = first.clone();
        renamed.title = "renamed".into();
        repo.upsert(renamed);

        let all = repo.all();
        assert_eq!(all.len(), 2);
        // position preserved
        assert_eq!(all[0].session_id, first.session_id);
        assert_eq!(all[0].title, "renamed");
        assert_eq!(all[1].session_id, second.session_id);
    }

    #[test]
    fn test_append_preserves_existing_order() {
        let repo = repo();
        let mut session = ChatSession::new("chat");
        session
            .conversation
            .push(entry(MessageRole::Assistant, "welcome"));
        let id = session.session_id.clone();
        repo.upsert(session);

        let outcome = repo.append(
            &id,
            vec![
                entry(MessageRole::User, "red sofa"),
                entry(MessageRole::Assistant, "how about velvet?"),
            ],
        );
        assert!(outcome.is_applied());

        let stored = repo.get(&id).unwrap();
        assert_eq!(stored.conversation.len(), 3);
        assert_eq!(stored.conversation[0].content.display_text(), "welcome");
        assert_eq!(stored.conversation[1].content.display_text(), "red sofa");
    }

    #[test]
    fn test_update_meta_repins_session_id() {
        let repo = repo();
        let session = ChatSession::new("old title");
        let id = session.session_id.clone();
        repo.upsert(session);

        let outcome = repo.update_meta(
            &id,
            SessionPatch {
                session_id: Some("hacked".into()),
                title: Some("New Title".into()),
                ..Default::default()
            },
        );
        assert!(outcome.is_applied());

        let stored = repo.get(&id).unwrap();
        assert_eq!(stored.session_id, id);
        assert_eq!(stored.title, "New Title");
        assert!(repo.get("hacked").is_none());
    }

    #[test]
    fn test_missing_id_is_a_noop() {
        let repo = repo();
        repo.upsert(ChatSession::new("only"));
        let before = repo.raw_document().unwrap();

        assert_eq!(
            repo.append("ghost", vec![entry(MessageRole::User, "hi")]),
            UpdateOutcome::NotFound
        );
        assert_eq!(
            repo.update_status("ghost", SessionStatus::Completed),
            UpdateOutcome::NotFound
        );
        assert_eq!(
            repo.update_products("ghost", Vec::new()),
            UpdateOutcome::NotFound
        );

        assert_eq!(repo.raw_document().unwrap(), before);
    }

    #[test]
    fn test_delete_and_clear() {
        let repo = repo();
        let a = ChatSession::new("a");
        let b = ChatSession::new("b");
        let a_id = a.session_id.clone();
        repo.upsert(a);
        repo.upsert(b);

        repo.delete(&a_id);
        assert_eq!(repo.all().len(), 1);
        assert!(repo.get(&a_id).is_none());

        repo.clear_all();
        assert!(repo.all().is_empty());
        assert!(repo.raw_document().is_none());
    }
}
