//! Durable save-slot storage.
//!
//! RULE: Only store.rs talks to the database. Everything above it sees
//! the SaveStore key-value contract and nothing else.

use crate::error::{GameError, GameResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

/// Minimal durable key-value contract the persistence layer requires.
/// Declared as a non-optional constructor parameter everywhere — a host
/// without a store is a construction-time error, not a silent no-op.
pub trait SaveStore: Send {
    fn get(&self, key: &str) -> GameResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> GameResult<()>;
}

/// Production store backed by SQLite.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: a reader (crash-recovery tooling) never blocks the
        // game's writes.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GameResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_save_slot.sql"))?;
        Ok(())
    }
}

impl SaveStore for SqliteStore {
    fn get(&self, key: &str) -> GameResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM save_slot WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> GameResult<()> {
        let updated_at = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT INTO save_slot (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
            params![key, value, updated_at],
        )?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral hosts.
#[derive(Default)]
pub struct MemoryStore {
    map: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> GameResult<Option<String>> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> GameResult<()> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store whose writes always fail. Exercises the failed-save path in
/// tests without touching a database.
pub struct FailingStore;

impl SaveStore for FailingStore {
    fn get(&self, _key: &str) -> GameResult<Option<String>> {
        Err(GameError::Store {
            op: "get",
            reason: "store unavailable".to_string(),
        })
    }

    fn set(&mut self, _key: &str, _value: &str) -> GameResult<()> {
        Err(GameError::Store {
            op: "set",
            reason: "store unavailable".to_string(),
        })
    }
}
