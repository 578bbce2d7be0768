//! Configuration APIs for growmap containers
//!
//! Containers are sized and given their illegal-operation reaction through
//! small serializable configuration types. All of them implement [`Config`],
//! which provides validation, environment initialization, presets and JSON
//! persistence.
//!
//! # Configuration Types
//!
//! - [`BufferConfig`]: initial block size and fault action of a [`GrowableBuffer`](crate::GrowableBuffer)
//! - [`MapConfig`]: bucket count, per-bucket block size and fault action of a [`BucketedMap`](crate::BucketedMap)
//!
//! # Environment Initialization
//!
//! ```rust
//! use growmap::config::{Config, MapConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads GROWMAP_MAP_BUCKET_COUNT, GROWMAP_MAP_BUCKET_BLOCK_SIZE, GROWMAP_MAP_ON_ILLEGAL
//! let config = MapConfig::from_env()?;
//! assert!(config.bucket_count > 0);
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use std::env;
use std::fmt;
use std::path::Path;

pub mod buffer;
pub mod map;


pub use buffer::BufferConfig;
pub use map::MapConfig;

/// Default environment variable prefix
pub const ENV_PREFIX: &str = "GROWMAP_";

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables with the
    /// `GROWMAP_` prefix, falling back to defaults for unset variables.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Initialize configuration from environment variables with a custom prefix.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset favouring fewer reallocations over memory use.
    fn performance_preset() -> Self;

    /// Preset favouring a small footprint.
    fn memory_preset() -> Self;

    /// Preset favouring predictable latency.
    fn realtime_preset() -> Self;

    /// Balanced preset, identical to the default.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or does not parse.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    match env::var(var_name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("ignoring unparsable value '{}' for {}", raw, var_name);
                default
            }
        },
        Err(_) => default,
    }
}
