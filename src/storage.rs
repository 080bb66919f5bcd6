// Persistence adapters for the task snapshot

use eyre::{Context, Result};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key of the row holding the task snapshot
const SLOT_KEY: &str = "tasks";

/// A single key-value slot holding an opaque snapshot
///
/// `load` returns `None` when nothing has been saved yet.
pub trait Storage {
    fn load(&self) -> Result<Option<Vec<u8>>>;

    fn save(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        (**self).load()
    }

    fn save(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).save(bytes)
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Slot kept in memory, mostly for tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    bytes: Option<Vec<u8>>,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing payload in the slot
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Some(bytes.into()),
            saves: 0,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    /// Number of saves since construction
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.bytes.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> Result<()> {
        self.bytes = Some(bytes.to_vec());
        self.saves += 1;
        Ok(())
    }
}

// ============================================================================
// Single file
// ============================================================================

/// Slot backed by one file on disk
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Storage for FileStorage {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&self.path).context("Failed to open snapshot file")?;
        FileExt::lock_shared(&file).context("Failed to acquire file lock")?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).context("Failed to read snapshot file")?;

        debug!(path = ?self.path, len = bytes.len(), "Loaded snapshot file");
        Ok(Some(bytes))
    }

    fn save(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create snapshot directory")?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.path)
            .context("Failed to open snapshot file for writing")?;

        // Truncate only once the lock is held so readers never see a partial write
        file.lock_exclusive().context("Failed to acquire file lock")?;
        file.set_len(0)?;
        file.write_all(bytes)?;
        file.sync_all()?;

        // Lock is automatically released when file is dropped
        Ok(())
    }
}

// ============================================================================
// SQLite key-value table
// ============================================================================

/// Slot stored as one row of a key-value table, the local-storage analogue
pub struct SqliteStorage {
    db: Connection,
}

impl SqliteStorage {
    /// Open or create the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Connection::open(path.as_ref()).context("Failed to open SQLite database")?;

        debug!("Creating key-value schema");
        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );
            "#,
        )?;

        Ok(Self { db })
    }
}

impl Storage for SqliteStorage {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [SLOT_KEY], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()
            .context("Failed to read snapshot row")?;

        Ok(value)
    }

    fn save(&mut self, bytes: &[u8]) -> Result<()> {
        self.db
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                rusqlite::params![SLOT_KEY, bytes],
            )
            .context("Failed to write snapshot row")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_none());

        storage.save(b"[1]").unwrap();
        storage.save(b"[2]").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some(&b"[2]"[..]));
        assert_eq!(storage.saves(), 2);
    }

    #[test]
    fn test_file_storage_missing_file() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("tasks.json"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_overwrites_slot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("tasks.json");
        let mut storage = FileStorage::new(&path);

        storage.save(b"a much longer first payload").unwrap();
        storage.save(b"short").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"short");
        assert_eq!(storage.load().unwrap().as_deref(), Some(&b"short"[..]));
    }

    #[test]
    fn test_sqlite_storage_roundtrip() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("tasklist.db");

        {
            let mut storage = SqliteStorage::open(&db_path).unwrap();
            assert!(storage.load().unwrap().is_none());
            storage.save(b"first").unwrap();
            storage.save(b"second").unwrap();
        }

        let storage = SqliteStorage::open(&db_path).unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some(&b"second"[..]));
    }

    #[test]
    fn test_boxed_storage_delegates() {
        let temp = TempDir::new().unwrap();
        let mut storage: Box<dyn Storage> = Box::new(SqliteStorage::open(temp.path().join("tasklist.db")).unwrap());
        storage.save(b"boxed").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some(&b"boxed"[..]));
    }
}
