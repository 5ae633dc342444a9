//! SQLite-backed key-value store.
//!
//! A single `kv` table holds every record. The file lives at
//! `<data_dir>/tomato.db`.

use rusqlite::{params, Connection};
use std::path::Path;
use std::time::Duration;

use super::{data_dir, KvStore};
use crate::error::{Result, StorageError};

pub const DB_FILE: &str = "tomato.db";

/// How long a connection waits for another process's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite database holding the settings, stats, task and timer records.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database in the default data directory.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join(DB_FILE);
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        tracing::debug!(path = %path.display(), "opened database");
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

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Take the write lock and open a transaction.
    ///
    /// Other processes block (up to the busy timeout) until [`commit`]
    /// so their read-modify-write cycles cannot interleave with this one.
    /// Dropping the database without committing rolls back.
    ///
    /// [`commit`]: Self::commit
    pub fn begin_immediate(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        Ok(())
    }

    pub fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT;")?;
        Ok(())
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn kv_store() {
        let mut db = Database::open_memory().unwrap();
        assert!(db.get("test").unwrap().is_none());
        db.set("test", "hello").unwrap();
        assert_eq!(db.get("test").unwrap().unwrap(), "hello");
        db.set("test", "again").unwrap();
        assert_eq!(db.get("test").unwrap().unwrap(), "again");
        db.remove("test").unwrap();
        assert!(db.get("test").unwrap().is_none());
    }

    #[test]
    fn values_persist_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DB_FILE);
        {
            let mut db = Database::open_at(&path).unwrap();
            db.set("b", "2").unwrap();
            db.set("a", "1").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(db.keys().unwrap(), ["a", "b"]);
    }

    #[test]
    fn transaction_is_visible_only_after_commit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DB_FILE);
        let mut writer = Database::open_at(&path).unwrap();
        let reader = Database::open_at(&path).unwrap();

        writer.begin_immediate().unwrap();
        writer.set("k", "v").unwrap();
        assert!(reader.get("k").unwrap().is_none());
        writer.commit().unwrap();
        assert_eq!(reader.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn dropping_open_transaction_rolls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DB_FILE);
        {
            let mut db = Database::open_at(&path).unwrap();
            db.set("k", "old").unwrap();
            db.begin_immediate().unwrap();
            db.set("k", "new").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.get("k").unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn open_fails_for_directory_path() {
        let temp_dir = TempDir::new().unwrap();
        let result = Database::open_at(temp_dir.path());
        assert!(result.is_err());
    }
}
