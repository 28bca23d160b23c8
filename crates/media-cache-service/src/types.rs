//! Request and response bodies for the media cache service

use media_cache_store::CacheStats;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

#[derive(Debug, Deserialize)]
pub struct SaveFileRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedFileResponse {
    pub file_name: String,
    pub size: u64,
}

/// A media download paired with the record describing it
#[derive(Debug, Deserialize)]
pub struct SaveRecordRequest {
    pub record: serde_json::Value,
    pub url: String,
    pub media_file_name: String,
    pub metadata_file_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedRecordResponse {
    pub media_file_name: String,
    pub metadata_file_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SweepResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
