/// File loader
///
/// Reads dropped or picked files into memory, detects their type and
/// fingerprints their content. Reading happens on tokio's file API and
/// hashing on the blocking pool, so the UI thread never waits on either.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::task;
use walkdir::WalkDir;

use super::mime;
use crate::error::LoadError;
use crate::state::data::{FilePayload, LoadedFile};

/// Result of loading one path
pub type LoadResult = (PathBuf, Result<LoadedFile, LoadError>);

/// Releases finished loads in the order they were started.
///
/// Every drop, pick or folder import is its own background load and they can
/// complete in any order; results are held back until all earlier loads
/// have been released.
#[derive(Debug, Default)]
pub struct LoadQueue {
    next_ticket: u64,
    next_release: u64,
    finished: BTreeMap<u64, Vec<LoadResult>>,
}

impl LoadQueue {
    /// Ticket for a load about to start
    pub fn start(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    /// Record a finished load and return everything now releasable, oldest
    /// load first. Empty while an earlier load is still running.
    pub fn finish(&mut self, ticket: u64, results: Vec<LoadResult>) -> Vec<LoadResult> {
        self.finished.insert(ticket, results);

        let mut released = Vec::new();
        while let Some(results) = self.finished.remove(&self.next_release) {
            released.extend(results);
            self.next_release += 1;
        }
        released
    }

    /// Loads started but not yet released
    pub fn in_flight(&self) -> u64 {
        self.next_ticket - self.next_release
    }
}

/// Load every path, in input order. A failure only affects its own file.
pub async fn load_files(paths: Vec<PathBuf>, max_bytes: u64) -> Vec<LoadResult> {
    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        let result = load_file(&path, max_bytes).await;
        if let Err(e) = &result {
            tracing::warn!("Skipping {}: {}", path.display(), e);
        }
        results.push((path, result));
    }
    results
}

/// Read, type-check and fingerprint a single file
pub async fn load_file(path: &Path, max_bytes: u64) -> Result<LoadedFile, LoadError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let read_error = |e: std::io::Error| LoadError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let size = tokio::fs::metadata(path).await.map_err(read_error)?.len();
    if size > max_bytes {
        return Err(LoadError::TooLarge { name, size, limit: max_bytes });
    }

    let bytes = tokio::fs::read(path).await.map_err(read_error)?;

    let mime = mime::detect(path, &bytes).ok_or_else(|| LoadError::Unsupported { name: name.clone() })?;

    // Hashing large documents is CPU-bound
    let payload = FilePayload::new(name, mime, bytes);
    let loaded = task::spawn_blocking(move || LoadedFile::new(payload))
        .await
        .map_err(|e| LoadError::Join(e.to_string()))?;

    tracing::debug!(
        "Loaded {} ({}, {} bytes)",
        loaded.payload.name,
        loaded.payload.mime,
        loaded.payload.size()
    );
    Ok(loaded)
}

/// All accepted files under `root`, recursively, in sorted path order
pub fn collect_folder(root: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| mime::is_accepted_path(p))
        .collect();
    paths.sort();
    paths
}

/// Walk a folder off the UI thread, then load what it contains
pub async fn load_folder(root: PathBuf, max_bytes: u64) -> Vec<LoadResult> {
    tracing::info!("Scanning folder: {}", root.display());
    let paths = match task::spawn_blocking(move || collect_folder(&root)).await {
        Ok(paths) => paths,
        Err(e) => {
            tracing::error!("Folder scan failed: {}", e);
            return Vec::new();
        }
    };
    load_files(paths, max_bytes).await
}
