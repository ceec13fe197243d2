// src/core/turn.rs — Chat turn engine
//
// Orchestrates one backend round trip per session with an all-or-nothing
// commit: either the whole turn (user message + assistant reply, products
// if any) lands in the session, or nothing does beyond the Generating
// status set up front. Each turn holds a per-session epoch so a response
// that arrives after the session moved on (new chat, delete, clear) is
// discarded instead of being misapplied.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::warn;

use crate::agent::DesignBackend;
use crate::gallery::GalleryManager;
use crate::infra::errors::DecoraError;
use crate::session::repository::{SessionPatch, SessionRepository};
use crate::session::{
    ChatContextEntry, ContentPart, MessageContent, Product, SessionStatus,
};
use crate::util::title_excerpt;

/// Per-session epoch registry. `begin` stamps a turn; any `invalidate`
/// between begin and commit makes the turn stale.
#[derive(Clone, Default)]
struct TurnEpochs {
    inner: Arc<Mutex<HashMap<String, u64>>>,
}

impl TurnEpochs {
    fn begin(&self, session_id: &str) -> u64 {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let epoch = map.entry(session_id.to_string()).or_insert(0);
        *epoch += 1;
        *epoch
    }

    fn is_current(&self, session_id: &str, epoch: u64) -> bool {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.get(session_id).copied() == Some(epoch)
    }

    fn invalidate(&self, session_id: &str) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(epoch) = map.get_mut(session_id) {
            *epoch += 1;
        }
    }

    fn invalidate_all(&self) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        for epoch in map.values_mut() {
            *epoch += 1;
        }
    }
}

/// Result of a chat turn.
#[derive(Debug)]
pub enum TurnOutcome {
    Replied {
        assistant_text: String,
        products: Vec<Product>,
    },
    /// The response came back for a session that has since moved on;
    /// nothing was committed.
    Discarded,
}

/// A render as seen by the caller. `durable` is false when the gallery
/// save failed and the record exists only in memory with a synthetic id.
#[derive(Debug, Clone)]
pub struct StoredRender {
    pub id: i64,
    pub session_id: String,
    pub base64_image: String,
    pub created_at: String,
    pub durable: bool,
}

/// Result of a render turn.
#[derive(Debug)]
pub enum RenderOutcome {
    Rendered(StoredRender),
    Discarded,
}

pub struct TurnEngine {
    repo: SessionRepository,
    gallery: GalleryManager,
    backend: Arc<dyn DesignBackend>,
    epochs: TurnEpochs,
}

impl TurnEngine {
    pub fn new(
        repo: SessionRepository,
        gallery: GalleryManager,
        backend: Arc<dyn DesignBackend>,
    ) -> Self {
        Self {
            repo,
            gallery,
            backend,
            epochs: TurnEpochs::default(),
        }
    }

    pub fn repo(&self) -> &SessionRepository {
        &self.repo
    }

    pub fn gallery(&self) -> &GalleryManager {
        &self.gallery
    }

    /// Run one chat turn against the backend.
    pub async fn send_prompt(
        &self,
        session_id: &str,
        prompt: &str,
        user_image: Option<String>,
    ) -> Result<TurnOutcome, DecoraError> {
        let Some(session) = self.repo.get(session_id) else {
            return Err(DecoraError::SessionNotFound {
                session_id: session_id.to_string(),
            });
        };

        let epoch = self.epochs.begin(session_id);
        self.repo
            .update_status(session_id, SessionStatus::Generating);

        // Snapshot the context before this turn; the user entry is only
        // appended after a successful reply.
        let context = session.conversation.clone();
        let user_entry = build_user_entry(prompt, user_image.as_deref());

        match self
            .backend
            .design_turn(&context, prompt, user_image.as_deref())
            .await
        {
            Ok(turn) => {
                if !self.epochs.is_current(session_id, epoch)
                    || self.repo.get(session_id).is_none()
                {
                    warn!("Discarding stale design-agent reply for session {session_id}");
                    return Ok(TurnOutcome::Discarded);
                }

                let assistant_entry = ChatContextEntry::assistant(turn.assistant_text.clone());
                self.repo
                    .append(session_id, vec![user_entry, assistant_entry]);

                // First user exchange names the session after the prompt.
                if let Some(updated) = self.repo.get(session_id) {
                    let user_turns = updated
                        .conversation
                        .iter()
                        .filter(|e| e.role == crate::session::MessageRole::User)
                        .count();
                    if user_turns == 1 {
                        self.repo.update_meta(
                            session_id,
                            SessionPatch {
                                title: Some(title_excerpt(prompt)),
                                ..Default::default()
                            },
                        );
                    }
                }

                if !turn.products.is_empty() {
                    self.repo
                        .update_products(session_id, turn.products.clone());
                }
                self.repo
                    .update_status(session_id, SessionStatus::Completed);

                Ok(TurnOutcome::Replied {
                    assistant_text: turn.assistant_text,
                    products: turn.products,
                })
            }
            Err(e) => {
                // No partial commit: the conversation stays as it was.
                if self.epochs.is_current(session_id, epoch) {
                    self.repo.update_status(session_id, SessionStatus::Error);
                }
                Err(e)
            }
        }
    }

    /// Generate a furnished-room render from the session's conversation and
    /// the selected product reference images. Durable storage is
    /// best-effort: a gallery failure degrades to an ephemeral record so
    /// the image still reaches the user.
    pub async fn render(
        &self,
        session_id: &str,
        product_image_urls: &[String],
    ) -> Result<RenderOutcome, DecoraError> {
        let Some(session) = self.repo.get(session_id) else {
            return Err(DecoraError::SessionNotFound {
                session_id: session_id.to_string(),
            });
        };

        let epoch = self.epochs.begin(session_id);

        match self
            .backend
            .render_image(&session.conversation, product_image_urls)
            .await
        {
            Ok(base64_image) => {
                if !self.epochs.is_current(session_id, epoch)
                    || self.repo.get(session_id).is_none()
                {
                    warn!("Discarding stale render for session {session_id}");
                    return Ok(RenderOutcome::Discarded);
                }

                let created_at = Utc::now().to_rfc3339();
                let render = match self.gallery.store.save_image(session_id, &base64_image) {
                    Ok(id) => StoredRender {
                        id,
                        session_id: session_id.to_string(),
                        base64_image,
                        created_at,
                        durable: true,
                    },
                    Err(e) => {
                        warn!("Gallery save failed, keeping render in memory only: {e}");
                        StoredRender {
                            id: Utc::now().timestamp_millis(),
                            session_id: session_id.to_string(),
                            base64_image,
                            created_at,
                            durable: false,
                        }
                    }
                };
                Ok(RenderOutcome::Rendered(render))
            }
            Err(e) => {
                if self.epochs.is_current(session_id, epoch) {
                    self.repo.update_status(session_id, SessionStatus::Error);
                }
                Err(e)
            }
        }
    }

    /// Delete a session together with its renders, invalidating any
    /// in-flight turn for it.
    pub fn delete_session(&self, session_id: &str) {
        self.epochs.invalidate(session_id);
        if let Err(e) = self.gallery.store.delete_images_by_session(session_id) {
            warn!("Error deleting renders for session {session_id}: {e}");
        }
        self.repo.delete(session_id);
    }

    /// Clear every session and every render.
    pub fn clear_all(&self) {
        self.epochs.invalidate_all();
        if let Err(e) = self.gallery.store.clear_all() {
            warn!("Error clearing render gallery: {e}");
        }
        self.repo.clear_all();
    }
}

/// A single text prompt serializes as a bare string; a prompt with an
/// attached image becomes a typed parts array.
fn build_user_entry(prompt: &str, user_image: Option<&str>) -> ChatContextEntry {
    match user_image {
        Some(image_url) => ChatContextEntry::user(MessageContent::Parts(vec![
            ContentPart::InputText {
                text: prompt.to_string(),
            },
            ContentPart::InputImage {
                image_url: image_url.to_string(),
            },
        ])),
        None => ChatContextEntry::user(MessageContent::Text(prompt.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_user_entry_shapes() {
        let plain = build_user_entry("red sofa", None);
        assert_eq!(plain.content, MessageContent::Text("red sofa".into()));

        let with_image = build_user_entry("red sofa", Some("data:image/png;base64,AA"));
        match with_image.content {
            MessageContent::Parts(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(parts[0], ContentPart::InputText { .. }));
                assert!(matches!(parts[1], ContentPart::InputImage { .. }));
            }
            MessageContent::Text(_) => panic!("expected parts"),
        }
    }

    #[test]
    fn test_epochs_stale_after_invalidate() {
        let epochs = TurnEpochs::default();
        let epoch = epochs.begin("s1");
        assert!(epochs.is_current("s1", epoch));

        epochs.invalidate("s1");
        assert!(!epochs.is_current("s1", epoch));

        // a later turn gets a fresh, current epoch
        let next = epochs.begin("s1");
        assert!(epochs.is_current("s1", next));
    }

    #[test]
    fn test_epochs_are_per_session() {
        let epochs = TurnEpochs::default();
        let a = epochs.begin("a");
        let b = epochs.begin("b");
        epochs.invalidate("a");
        assert!(!epochs.is_current("a", a));
        assert!(epochs.is_current("b", b));
    }
}
