//! Growable buffer configuration.

use super::{parse_env_var, Config};
use crate::error::{ContainerError, Result};
use crate::policy::FaultAction;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default initial block size, in elements
pub const DEFAULT_BLOCK_SIZE: usize = 32;

/// Configuration for a [`GrowableBuffer`](crate::GrowableBuffer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Capacity allocated by `init`; capacity never shrinks below it
    pub block_size: usize,
    /// Reaction to illegal operations
    pub on_illegal: FaultAction,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            on_illegal: FaultAction::Terminate,
        }
    }
}

impl BufferConfig {
    /// Default configuration with a different block size
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size,
            ..Self::default()
        }
    }

    /// Replace the fault action
    pub fn on_illegal(mut self, action: FaultAction) -> Self {
        self.on_illegal = action;
        self
    }
}

impl Config for BufferConfig {
    fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(ContainerError::configuration(
                "block_size must be greater than 0",
            ));
        }
        if self.block_size.checked_mul(2).is_none() {
            return Err(ContainerError::configuration(format!(
                "block_size {} is too large to grow",
                self.block_size
            )));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.block_size = parse_env_var(&format!("{}BUFFER_BLOCK_SIZE", prefix), config.block_size);
        config.on_illegal = parse_env_var(&format!("{}BUFFER_ON_ILLEGAL", prefix), config.on_illegal);
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self { block_size: 256, on_illegal: FaultAction::Terminate }
    }

    fn memory_preset() -> Self {
        Self { block_size: 4, on_illegal: FaultAction::Terminate }
    }

    fn realtime_preset() -> Self {
        Self { block_size: 1024, on_illegal: FaultAction::ReturnDefault }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)
            .map_err(|e| ContainerError::configuration(format!("Failed to serialize buffer config: {}", e)))?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ContainerError::configuration(format!("Failed to parse buffer config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
