// src/gallery/mod.rs — Render gallery manager

pub mod schema;
pub mod store;

use rusqlite::Connection;
use std::path::Path;

/// Central gallery manager owning the SQLite connection. Opening is
/// idempotent: the schema is created on first use via migrations.
pub struct GalleryManager {
    pub store: store::ImageStore,
}

impl GalleryManager {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        // WAL keeps reads cheap while a save is in flight
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        schema::run_migrations(&conn)?;

        Ok(Self {
            store: store::ImageStore::new(conn),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::run_migrations(&conn)?;
        Ok(Self {
            store: store::ImageStore::new(conn),
        })
    }
}
