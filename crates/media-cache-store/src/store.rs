//! Pull-through cache over a single flat directory

use crate::downloader::Downloader;
use crate::error::{CacheStoreError, Result};
use crate::serializer::{JsonSerializer, MetadataSerializer};
use crate::types::{CacheEntry, CacheStats};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Entries older than this are removed by [`CacheStore::sweep_expired_default`]
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(2 * 24 * 60 * 60);

const PARTIAL_SUFFIX: &str = ".part";

/// Media and metadata files cached side by side in one directory
pub struct CacheStore<S = JsonSerializer> {
    /// Directory holding every cached file
    cache_dir: PathBuf,
    downloader: Arc<dyn Downloader>,
    serializer: S,
    /// Per-name locks held while a file is being populated
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStore<JsonSerializer> {
    /// Create a cache storing metadata as JSON
    pub fn new(cache_dir: PathBuf, downloader: Arc<dyn Downloader>) -> Self {
        Self::with_serializer(cache_dir, downloader, JsonSerializer::new())
    }
}

impl<S: MetadataSerializer> CacheStore<S> {
    pub fn with_serializer(
        cache_dir: PathBuf,
        downloader: Arc<dyn Downloader>,
        serializer: S,
    ) -> Self {
        Self {
            cache_dir,
            downloader,
            serializer,
            in_flight: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Initialize the cache by ensuring the cache directory exists
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir).await?;
        info!(cache_dir = ?self.cache_dir, "Cache initialized");
        Ok(())
    }

    /// Return the cached file, downloading it from `url` on a miss.
    ///
    /// An existing file is returned as is without contacting the downloader.
    /// Any failure yields `None` and leaves nothing behind under `file_name`.
    pub async fn save_file(&self, url: &str, file_name: &str) -> Option<PathBuf> {
        match self.try_save_file(url, file_name).await {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(url, file_name, error = %err, "Failed to cache file");
                None
            }
        }
    }

    /// Like [`save_file`](Self::save_file) but reports why population failed
    pub async fn try_save_file(&self, url: &str, file_name: &str) -> Result<PathBuf> {
        let path = self.entry_path(file_name)?;

        let lock = self.name_lock(file_name).await;
        let result = {
            let _guard = lock.lock().await;
            self.populate(url, file_name, &path).await
        };
        self.release_name_lock(file_name, lock).await;

        result.map(|()| path)
    }

    /// Cache the media at `url`, then store `record` as its metadata.
    ///
    /// Returns `true` only if both files are in place. No metadata is written
    /// when the media step fails, and an existing metadata file is kept.
    pub async fn save_record<T: Serialize>(
        &self,
        record: &T,
        url: &str,
        media_file_name: &str,
        metadata_file_name: &str,
    ) -> bool {
        if media_file_name == metadata_file_name {
            warn!(
                file_name = media_file_name,
                "Media and metadata cannot share a file name"
            );
            return false;
        }

        if self.save_file(url, media_file_name).await.is_none() {
            return false;
        }

        match self.write_record(record, metadata_file_name).await {
            Ok(()) => true,
            Err(err) => {
                warn!(file_name = metadata_file_name, error = %err, "Failed to write metadata");
                false
            }
        }
    }

    /// Path of a cached file, if present
    pub async fn get_file(&self, file_name: &str) -> Option<PathBuf> {
        let path = self.entry_path(file_name).ok()?;
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Some(path),
            _ => None,
        }
    }

    /// Read and decode a metadata file. Unreadable or undecodable files are misses.
    pub async fn get_record<T: DeserializeOwned>(&self, metadata_file_name: &str) -> Option<T> {
        let path = self.get_file(metadata_file_name).await?;

        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(err) => {
                warn!(file_name = metadata_file_name, error = %err, "Failed to read metadata");
                return None;
            }
        };

        match self.serializer.deserialize(&text) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(file_name = metadata_file_name, error = %err, "Failed to decode metadata");
                None
            }
        }
    }

    /// Delete a cached file, returning whether anything was removed
    pub async fn delete_file(&self, file_name: &str) -> bool {
        let Ok(path) = self.entry_path(file_name) else {
            return false;
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(file_name, "Deleted cache entry");
                true
            }
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => {
                warn!(file_name, error = %err, "Failed to delete cache entry");
                false
            }
        }
    }

    /// Remove every file last modified more than `max_age` ago.
    ///
    /// Returns the number of files removed. Stale partial downloads count too.
    pub async fn sweep_expired(&self, max_age: Duration) -> usize {
        let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
            return 0;
        };

        let mut dir = match fs::read_dir(&self.cache_dir).await {
            Ok(dir) => dir,
            Err(err) => {
                warn!(cache_dir = ?self.cache_dir, error = %err, "Failed to list cache directory");
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "Cache directory listing interrupted");
                    break;
                }
            };

            let modified = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata.modified(),
                Ok(_) => continue,
                Err(err) => Err(err),
            };
            let modified = match modified {
                Ok(modified) => modified,
                Err(err) => {
                    warn!(path = ?entry.path(), error = %err, "Failed to stat cache entry");
                    continue;
                }
            };

            if modified >= cutoff {
                continue;
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => {
                    removed += 1;
                    debug!(path = ?entry.path(), "Swept expired cache entry");
                }
                Err(err) => {
                    warn!(path = ?entry.path(), error = %err, "Failed to sweep cache entry")
                }
            }
        }

        info!(removed, max_age_secs = max_age.as_secs(), "Cache sweep finished");
        removed
    }

    /// Sweep with [`DEFAULT_MAX_AGE`]
    pub async fn sweep_expired_default(&self) -> usize {
        self.sweep_expired(DEFAULT_MAX_AGE).await
    }

    /// Whether the cache directory holds at least one file
    pub async fn has_entries(&self) -> bool {
        let Ok(mut dir) = fs::read_dir(&self.cache_dir).await else {
            return false;
        };

        while let Ok(Some(entry)) = dir.next_entry().await {
            if is_partial(&entry.file_name().to_string_lossy()) {
                continue;
            }
            if matches!(entry.file_type().await, Ok(file_type) if file_type.is_file()) {
                return true;
            }
        }
        false
    }

    /// List cached files, ordered by name
    pub async fn entries(&self) -> Result<Vec<CacheEntry>> {
        let mut dir = fs::read_dir(&self.cache_dir).await?;
        let mut entries = Vec::new();

        while let Some(entry) = dir.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if is_partial(&file_name) {
                continue;
            }

            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            entries.push(CacheEntry {
                file_name,
                path: entry.path(),
                size: metadata.len(),
                modified: DateTime::<Utc>::from(metadata.modified()?),
            });
        }

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }

    /// Get current cache statistics
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries().await.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to list cache entries for stats");
            Vec::new()
        });

        CacheStats {
            entries: entries.len(),
            total_size: entries.iter().map(|e| e.size).sum(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Resolve a caller-supplied name to a path directly inside the cache directory.
    /// Names of in-progress downloads are reserved.
    fn entry_path(&self, file_name: &str) -> Result<PathBuf> {
        if file_name.is_empty()
            || file_name == "."
            || file_name == ".."
            || file_name.contains(['/', '\\', '\0'])
            || is_partial(file_name)
        {
            return Err(CacheStoreError::InvalidFileName(file_name.to_string()));
        }
        Ok(self.cache_dir.join(file_name))
    }

    fn partial_path(&self, file_name: &str) -> PathBuf {
        self.cache_dir.join(format!(".{}{}", file_name, PARTIAL_SUFFIX))
    }

    async fn populate(&self, url: &str, file_name: &str, path: &Path) -> Result<()> {
        if fs::try_exists(path).await? {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(file_name, "Cache hit");
            return Ok(());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(file_name, url, "Cache miss, downloading");

        let partial = self.partial_path(file_name);
        let outcome: Result<u64> = async {
            let size = self.download_to(url, &partial).await?;
            fs::rename(&partial, path).await?;
            Ok(size)
        }
        .await;

        match outcome {
            Ok(size) => {
                debug!(file_name, size, "Cached file");
                Ok(())
            }
            Err(err) => {
                discard(&partial).await;
                Err(err)
            }
        }
    }

    async fn download_to(&self, url: &str, path: &Path) -> Result<u64> {
        let mut stream = self.downloader.open_stream(url).await?;
        let mut file = fs::File::create(path).await?;
        let mut size = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(size)
    }

    async fn write_record<T: Serialize>(&self, record: &T, file_name: &str) -> Result<()> {
        let path = self.entry_path(file_name)?;

        let lock = self.name_lock(file_name).await;
        let result = {
            let _guard = lock.lock().await;
            self.write_new(file_name, &path, record).await
        };
        self.release_name_lock(file_name, lock).await;

        result
    }

    async fn write_new<T: Serialize>(
        &self,
        file_name: &str,
        path: &Path,
        record: &T,
    ) -> Result<()> {
        if fs::try_exists(path).await? {
            debug!(file_name, "Metadata already cached");
            return Ok(());
        }

        let text = self.serializer.serialize(record)?;
        let partial = self.partial_path(file_name);
        let outcome: Result<()> = async {
            fs::write(&partial, text.as_bytes()).await?;
            fs::rename(&partial, path).await?;
            Ok(())
        }
        .await;

        if outcome.is_err() {
            discard(&partial).await;
        }
        outcome
    }

    async fn name_lock(&self, file_name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.in_flight.lock().await;
        locks.entry(file_name.to_string()).or_default().clone()
    }

    async fn release_name_lock(&self, file_name: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.in_flight.lock().await;
        // Only the map and this caller still hold it
        if Arc::strong_count(&lock) == 2 {
            locks.remove(file_name);
        }
    }
}

fn is_partial(file_name: &str) -> bool {
    file_name.starts_with('.') && file_name.ends_with(PARTIAL_SUFFIX)
}

async fn discard(path: &Path) {
    if let Err(err) = fs::remove_file(path).await {
        if err.kind() != ErrorKind::NotFound {
            warn!(path = ?path, error = %err, "Failed to remove partial file");
        }
    }
}
