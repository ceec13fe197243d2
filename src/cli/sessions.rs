// src/cli/sessions.rs — Session management commands

use std::sync::Arc;

use crate::gallery::GalleryManager;
use crate::infra::paths;
use crate::session::repository::SessionRepository;
use crate::session::store::FileKvStore;
use crate::session::{ChatSession, SessionStatus};

fn open_repo() -> SessionRepository {
    SessionRepository::new(Arc::new(FileKvStore::new(paths::sessions_dir())))
}

pub fn run_list() -> anyhow::Result<()> {
    let repo = open_repo();
    let sessions = repo.all();
    if sessions.is_empty() {
        println!("No sessions yet. Run `decora` to start one.");
        return Ok(());
    }

    println!("{} session(s):", sessions.len());
    for session in &sessions {
        println!(
            "  {}  {}  [{}] {} message(s)\n      id: {}",
            session.created_at.format("%Y-%m-%d %H:%M"),
            session.title,
            status_badge(session.status),
            session.conversation.len(),
            session.session_id,
        );
    }
    Ok(())
}

pub fn run_delete(id: &str) -> anyhow::Result<()> {
    let repo = open_repo();
    if repo.get(id).is_none() {
        println!("No session with id '{id}'.");
        return Ok(());
    }

    // Renders are not reference-counted against sessions; purge explicitly.
    let gallery = GalleryManager::open(&paths::gallery_db_path())?;
    gallery.store.delete_images_by_session(id)?;
    repo.delete(id);

    // The product never shows an empty session list.
    if repo.all().is_empty() {
        repo.upsert(ChatSession::new("New Chat"));
    }

    println!("Deleted session {id}.");
    Ok(())
}

pub fn run_clear() -> anyhow::Result<()> {
    let repo = open_repo();
    let gallery = GalleryManager::open(&paths::gallery_db_path())?;
    gallery.store.clear_all()?;
    repo.clear_all();
    repo.upsert(ChatSession::new("New Chat"));
    println!("Cleared all sessions and renders.");
    Ok(())
}

fn status_badge(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Idle => "idle",
        SessionStatus::Generating => "generating",
        SessionStatus::Completed => "completed",
        SessionStatus::Error => "error",
    }
}
