use std::env;
use std::path::PathBuf;
use std::time::Duration;

use media_cache_store::DEFAULT_MAX_AGE;

const DEFAULT_PORT: u16 = 3005;
const DEFAULT_CACHE_DIR: &str = "./cache/media";
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60 * 60;
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Service configuration parsed from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub cache_dir: PathBuf,
    /// Entries last modified longer ago than this are swept
    pub max_age: Duration,
    pub sweep_interval: Duration,
    pub download_timeout: Duration,
    pub json_logs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            max_age: DEFAULT_MAX_AGE,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            json_logs: false,
        }
    }
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse configuration from an arbitrary variable source.
    /// Missing or unparseable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let cache_dir = lookup("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);

        let json_logs = lookup("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);

        Self {
            port,
            cache_dir,
            max_age: secs("CACHE_MAX_AGE_SECS", defaults.max_age),
            sweep_interval: secs("SWEEP_INTERVAL_SECS", defaults.sweep_interval),
            download_timeout: secs("DOWNLOAD_TIMEOUT_SECS", defaults.download_timeout),
            json_logs,
        }
    }
}
