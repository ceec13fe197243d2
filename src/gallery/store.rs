// src/gallery/store.rs — SQLite operations for generated images

use chrono::Utc;
use rusqlite::{params, Connection};

/// A stored render. `id` is assigned by the store and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImageRow {
    pub id: i64,
    pub session_id: String,
    pub base64_image: String,
    pub created_at: String,
}

/// Low-level gallery operations. Images live here, not in the session
/// document: payloads are large and session-scoped, and must not bloat the
/// synchronous session store.
pub struct ImageStore {
    conn: Connection,
}

impl ImageStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Insert a render and return the store-assigned id. This is the only
    /// way a stored image acquires an id.
    pub fn save_image(&self, session_id: &str, base64_image: &str) -> anyhow::Result<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO generated_images (session_id, base64_image, created_at)
             VALUES (?1, ?2, ?3)",
            params![session_id, base64_image, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All renders for a session via the secondary index. The index does
    /// not guarantee insertion order, so rows are sorted by creation time
    /// before return.
    pub fn images_by_session(&self, session_id: &str) -> anyhow::Result<Vec<GeneratedImageRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, base64_image, created_at
             FROM generated_images WHERE session_id = ?1",
        )?;

        let rows = stmt.query_map(params![session_id], |row| {
            Ok(GeneratedImageRow {
                id: row.get(0)?,
                session_id: row.get(1)?,
                base64_image: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    /// A single render by primary key.
    pub fn get_image(&self, id: i64) -> anyhow::Result<Option<GeneratedImageRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, base64_image, created_at
             FROM generated_images WHERE id = ?1",
        )?;

        let mut rows = stmt.query_map(params![id], |row| {
            Ok(GeneratedImageRow {
                id: row.get(0)?,
                session_id: row.get(1)?,
                base64_image: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Delete a single render by primary key.
    pub fn delete_image(&self, id: i64) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM generated_images WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Delete every render belonging to a session: fetch the matching rows,
    /// then delete each individually. Volumes are per-session small.
    pub fn delete_images_by_session(&self, session_id: &str) -> anyhow::Result<()> {
        let images = self.images_by_session(session_id)?;
        for image in images {
            self.delete_image(image.id)?;
        }
        Ok(())
    }

    /// Empty the entire gallery.
    pub fn clear_all(&self) -> anyhow::Result<()> {
        self.conn.execute("DELETE FROM generated_images", [])?;
        Ok(())
    }

    pub fn count(&self) -> anyhow::Result<i64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM generated_images", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
