//! Error types for the media cache store

use std::fmt;

#[derive(Debug)]
pub enum CacheStoreError {
    Io(Box<std::io::Error>),
    Http(Box<reqwest::Error>),
    Status { url: String, status: u16 },
    Serialization(String),
    InvalidFileName(String),
}

impl fmt::Display for CacheStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStoreError::Io(err) => write!(f, "IO error: {}", err),
            CacheStoreError::Http(err) => write!(f, "HTTP error: {}", err),
            CacheStoreError::Status { url, status } => {
                write!(f, "Download of {} returned status {}", url, status)
            }
            CacheStoreError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            CacheStoreError::InvalidFileName(name) => write!(f, "Invalid file name: {:?}", name),
        }
    }
}

impl std::error::Error for CacheStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheStoreError::Io(err) => Some(err.as_ref()),
            CacheStoreError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CacheStoreError {
    fn from(err: std::io::Error) -> Self {
        CacheStoreError::Io(Box::new(err))
    }
}

impl From<reqwest::Error> for CacheStoreError {
    fn from(err: reqwest::Error) -> Self {
        CacheStoreError::Http(Box::new(err))
    }
}

impl From<serde_json::Error> for CacheStoreError {
    fn from(err: serde_json::Error) -> Self {
        CacheStoreError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CacheStoreError>;
