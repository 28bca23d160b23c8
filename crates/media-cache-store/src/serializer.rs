//! Text serialization of metadata records

use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};

/// Converts typed records to and from the text stored in the cache
pub trait MetadataSerializer: Send + Sync {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<String>;

    fn deserialize<T: DeserializeOwned>(&self, text: &str) -> Result<T>;
}

/// JSON metadata via serde_json
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataSerializer for JsonSerializer {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn deserialize<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        Ok(serde_json::from_str(text)?)
    }
}
