//! Opening remote byte streams for cache population

use crate::error::{CacheStoreError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_USER_AGENT: &str = "media-cache-store/0.1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Chunks of a remote resource, in order
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Source of remote bytes for the cache
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Open a stream over the body found at `url`
    async fn open_stream(&self, url: &str) -> Result<ByteStream>;
}

/// Downloader backed by a reqwest client
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Create a downloader with the default request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a downloader whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn open_stream(&self, url: &str) -> Result<ByteStream> {
        debug!(url, "Opening download stream");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url, "Download rejected");
            return Err(CacheStoreError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(CacheStoreError::from))
            .boxed())
    }
}
