//! Error types for the media cache service

use std::fmt;

#[derive(Debug)]
pub enum MediaCacheServiceError {
    Cache(media_cache_store::CacheStoreError),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for MediaCacheServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaCacheServiceError::Cache(err) => write!(f, "Cache error: {}", err),
            MediaCacheServiceError::Io(err) => write!(f, "IO error: {}", err),
            MediaCacheServiceError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for MediaCacheServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MediaCacheServiceError::Cache(err) => Some(err),
            MediaCacheServiceError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<media_cache_store::CacheStoreError> for MediaCacheServiceError {
    fn from(err: media_cache_store::CacheStoreError) -> Self {
        MediaCacheServiceError::Cache(err)
    }
}

impl From<std::io::Error> for MediaCacheServiceError {
    fn from(err: std::io::Error) -> Self {
        MediaCacheServiceError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for MediaCacheServiceError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        MediaCacheServiceError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MediaCacheServiceError>;
