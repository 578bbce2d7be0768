//! Bucketed hash map configuration.

use super::buffer::{BufferConfig, DEFAULT_BLOCK_SIZE};
use super::{parse_env_var, Config};
use crate::error::{ContainerError, Result};
use crate::policy::FaultAction;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of buckets
pub const DEFAULT_BUCKET_COUNT: usize = 16;

/// Configuration for a [`BucketedMap`](crate::BucketedMap)
///
/// The bucket count is fixed for the lifetime of a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Number of buckets
    pub bucket_count: usize,
    /// Initial block size of every bucket
    pub bucket_block_size: usize,
    /// Reaction to illegal operations inside buckets
    pub on_illegal: FaultAction,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            bucket_block_size: DEFAULT_BLOCK_SIZE,
            on_illegal: FaultAction::Terminate,
        }
    }
}

impl MapConfig {
    /// Default configuration with the given bucket geometry
    pub fn new(bucket_count: usize, bucket_block_size: usize) -> Self {
        Self {
            bucket_count,
            bucket_block_size,
            ..Self::default()
        }
    }

    /// Replace the fault action
    pub fn on_illegal(mut self, action: FaultAction) -> Self {
        self.on_illegal = action;
        self
    }

    /// Configuration handed to each bucket
    pub fn bucket_config(&self) -> BufferConfig {
        BufferConfig {
            block_size: self.bucket_block_size,
            on_illegal: self.on_illegal,
        }
    }
}

impl Config for MapConfig {
    fn validate(&self) -> Result<()> {
        if self.bucket_count == 0 {
            return Err(ContainerError::configuration(
                "bucket_count must be greater than 0",
            ));
        }
        self.bucket_config().validate()
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.bucket_count = parse_env_var(&format!("{}MAP_BUCKET_COUNT", prefix), config.bucket_count);
        config.bucket_block_size =
            parse_env_var(&format!("{}MAP_BUCKET_BLOCK_SIZE", prefix), config.bucket_block_size);
        config.on_illegal = parse_env_var(&format!("{}MAP_ON_ILLEGAL", prefix), config.on_illegal);
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self { bucket_count: 256, bucket_block_size: 64, on_illegal: FaultAction::Terminate }
    }

    fn memory_preset() -> Self {
        Self { bucket_count: 8, bucket_block_size: 4, on_illegal: FaultAction::Terminate }
    }

    fn realtime_preset() -> Self {
        Self { bucket_count: 16, bucket_block_size: 1024, on_illegal: FaultAction::ReturnDefault }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)
            .map_err(|e| ContainerError::configuration(format!("Failed to serialize map config: {}", e)))?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ContainerError::configuration(format!("Failed to parse map config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
