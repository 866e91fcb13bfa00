use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::data::Fingerprint;
use crate::error::CacheError;

/// Persistent cache of converted previews.
///
/// Maps a file's content fingerprint to the preview URL the conversion
/// service returned for it, so re-selecting a file (or re-adding it in a
/// later session) never converts the same bytes twice. Entries never expire.
pub struct ConvertedCache {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl ConvertedCache {
    /// Open the cache in the user's data directory:
    /// - Linux: ~/.local/share/print-desk/preview_cache.db
    /// - macOS: ~/Library/Application Support/print-desk/preview_cache.db
    /// - Windows: %APPDATA%\print-desk\preview_cache.db
    pub fn open_default() -> Result<Self, CacheError> {
        let path = Self::default_path().ok_or(CacheError::NoDataDir)?;
        Self::open(&path)
    }

    /// Open (or create) the cache database at `path`
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        tracing::info!("Preview cache opened at {}", path.display());

        let cache = ConvertedCache {
            conn,
            db_path: Some(path.to_path_buf()),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    /// A cache that lives only as long as this process
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let cache = ConvertedCache {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        cache.init_schema()?;
        Ok(cache)
    }

    fn default_path() -> Option<PathBuf> {
        let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
        path.push("print-desk");
        path.push("preview_cache.db");
        Some(path)
    }

    fn init_schema(&self) -> Result<(), CacheError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS converted_previews (
                fingerprint     TEXT PRIMARY KEY,
                file_name       TEXT NOT NULL,
                url             TEXT NOT NULL,
                cached_at       INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Look up the preview URL for a fingerprint
    pub fn get(&self, fingerprint: &Fingerprint) -> Result<Option<String>, CacheError> {
        let url = self
            .conn
            .query_row(
                "SELECT url FROM converted_previews WHERE fingerprint = ?1",
                params![fingerprint.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(url)
    }

    /// Store (or replace) the preview URL for a fingerprint
    pub fn insert(&self, fingerprint: &Fingerprint, file_name: &str, url: &str) -> Result<(), CacheError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO converted_previews (fingerprint, file_name, url, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![fingerprint.as_str(), file_name, url, Utc::now().timestamp()],
        )?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize, CacheError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM converted_previews", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl std::fmt::Debug for ConvertedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertedCache")
            .field("db_path", &self.db_path)
            .finish()
    }
}
