//! Pull-through file cache for remote media and metadata
//!
//! Keeps downloaded media files and their companion metadata records side by
//! side in a single flat directory. Files are fetched on first request, never
//! rewritten once present, and removed by name or by an age-based sweep.

pub mod downloader;
pub mod error;
pub mod serializer;
pub mod store;
pub mod types;

pub use downloader::{ByteStream, Downloader, HttpDownloader};
pub use error::{CacheStoreError, Result};
pub use serializer::{JsonSerializer, MetadataSerializer};
pub use store::{CacheStore, DEFAULT_MAX_AGE};
pub use types::{CacheEntry, CacheStats};
