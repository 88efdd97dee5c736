//! Local persistent storage
//!
//! Persistence is modeled as named slots, each holding one serialized
//! value that is always rewritten whole. The SQLite backend keeps slots in
//! a single table; [`MemoryStorage`] keeps them for the current process only.

use crate::error::{EducadorError, Result};
use anyhow::Context;
use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub mod memory;
pub use memory::MemoryStorage;

/// Named-slot storage backend
pub trait SlotStorage: Send + Sync {
    /// Read a slot; `None` if it was never written or was deleted
    ///
    /// # Errors
    ///
    /// Returns `EducadorError::Storage` if the backend cannot be read
    fn read_slot(&self, name: &str) -> Result<Option<String>>;

    /// Replace the full contents of a slot
    ///
    /// # Errors
    ///
    /// Returns `EducadorError::Storage` if the backend cannot be written
    fn write_slot(&self, name: &str, value: &str) -> Result<()>;

    /// Remove a slot; removing a missing slot is not an error
    ///
    /// # Errors
    ///
    /// Returns `EducadorError::Storage` if the backend cannot be written
    fn delete_slot(&self, name: &str) -> Result<()>;
}

/// SQLite storage backend
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a storage instance in the user's data directory
    ///
    /// `EDUCADOR_HISTORY_DB` overrides the location.
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be determined or created,
    /// or the database cannot be initialized
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("EDUCADOR_HISTORY_DB") {
            return Self::new_with_path(override_path);
        }

        Self::new_with_path(Self::default_path()?)
    }

    /// Default database location inside the platform data directory
    ///
    /// # Errors
    ///
    /// Returns error if no home directory can be determined
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("br", "educador-ia", "educador-ia").ok_or_else(|| {
            EducadorError::Storage("Could not determine data directory".into())
        })?;
        Ok(proj_dirs.data_dir().join("history.db"))
    }

    /// Create a storage instance that uses the specified database path
    ///
    /// # Examples
    ///
    /// ```
    /// use educador_ia::storage::{SlotStorage, SqliteStorage};
    ///
    /// let dir = std::env::temp_dir().join("educador-ia-doctest");
    /// let storage = SqliteStorage::new_with_path(dir.join("history.db")).unwrap();
    /// storage.write_slot("demo", "[]").unwrap();
    /// assert_eq!(storage.read_slot("demo").unwrap().as_deref(), Some("[]"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create parent directory for database")
                    .map_err(|e| EducadorError::Storage(e.to_string()))?;
            }
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Path of the backing database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| EducadorError::Storage(e.to_string()).into())
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS slots (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| EducadorError::Storage(e.to_string()))?;

        Ok(())
    }
}

impl SlotStorage for SqliteStorage {
    fn read_slot(&self, name: &str) -> Result<Option<String>> {
        let conn = self.open()?;

        let value = conn
            .query_row(
                "SELECT value FROM slots WHERE name = ?",
                params![name],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query slot")
            .map_err(|e| EducadorError::Storage(e.to_string()))?;

        Ok(value)
    }

    fn write_slot(&self, name: &str, value: &str) -> Result<()> {
        let conn = self.open()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO slots (name, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![name, value, now],
        )
        .context("Failed to write slot")
        .map_err(|e| EducadorError::Storage(e.to_string()))?;

        Ok(())
    }

    fn delete_slot(&self, name: &str) -> Result<()> {
        let conn = self.open()?;

        conn.execute("DELETE FROM slots WHERE name = ?", params![name])
            .context("Failed to delete slot")
            .map_err(|e| EducadorError::Storage(e.to_string()))?;

        Ok(())
    }
}
