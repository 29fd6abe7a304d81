//! SQLite storage.
//!
//! Provides persistent storage for:
//! - The live session state between CLI invocations (key-value table)
//! - Named session templates

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::session::SessionState;
use crate::template::SessionTemplate;

const SESSION_KEY: &str = "session_state";

/// Row of the template listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub saved_at: DateTime<Utc>,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/roundchain.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("roundchain.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        // `session watch` and one-shot commands share the file.
        conn.busy_timeout(Duration::from_secs(5))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS templates (
                id       TEXT PRIMARY KEY,
                name     TEXT NOT NULL UNIQUE,
                payload  TEXT NOT NULL,
                saved_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_templates_saved_at ON templates(saved_at);",
        )
    }

    // ── Key-value ────────────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Session state ────────────────────────────────────────────────

    /// Stored session, validated on the way in. `None` when nothing was
    /// saved yet.
    pub fn load_session(&self) -> Result<Option<SessionState>> {
        let Some(json) = self.kv_get(SESSION_KEY)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    pub fn save_session(&self, state: &SessionState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.kv_set(SESSION_KEY, &json)
    }

    pub fn clear_session(&self) -> Result<()> {
        self.kv_delete(SESSION_KEY)
    }

    // ── Templates ────────────────────────────────────────────────────

    /// Insert a template, replacing any existing one with the same name.
    /// The existing id is kept on replace. Returns the stored template.
    pub fn save_template(&self, template: &SessionTemplate) -> Result<SessionTemplate> {
        let mut stored = template.clone();
        let existing_id: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM templates WHERE name = ?1",
                params![template.name],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing_id {
            stored.id = id;
        }

        let payload = serde_json::to_string(&stored)?;
        self.conn.execute(
            "INSERT INTO templates (id, name, payload, saved_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                payload = excluded.payload,
                saved_at = excluded.saved_at",
            params![stored.id, stored.name, payload, stored.saved_at.to_rfc3339()],
        )?;
        debug!(id = %stored.id, name = %stored.name, "template saved");
        Ok(stored)
    }

    /// All templates, newest first.
    pub fn list_templates(&self) -> Result<Vec<TemplateSummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, saved_at FROM templates ORDER BY saved_at DESC, name")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, name, saved_at) = row?;
            let saved_at = DateTime::parse_from_rfc3339(&saved_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_default();
            out.push(TemplateSummary { id, name, saved_at });
        }
        Ok(out)
    }

    /// Look a template up by exact name, then by id.
    pub fn get_template(&self, name_or_id: &str) -> Result<Option<SessionTemplate>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM templates WHERE name = ?1 OR id = ?1
                 ORDER BY (name = ?1) DESC LIMIT 1",
                params![name_or_id],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => Ok(Some(SessionTemplate::from_json(&json)?)),
            None => Ok(None),
        }
    }

    /// Returns whether a template was removed.
    pub fn delete_template(&self, name_or_id: &str) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM templates WHERE name = ?1 OR id = ?1",
            params![name_or_id],
        )?;
        Ok(n > 0)
    }
}
