//! Configuration for rawcoll containers
//!
//! The array and the list have no tunables; their growth and linking policies
//! are fixed. The hash map exposes its initial bucket count, the load factor
//! that triggers a rehash, and the bucket growth multiplier through
//! [`BucketMapConfig`]. The defaults reproduce the documented behaviour
//! (16 buckets, rehash above 0.75, doubling).
//!
//! # Environment Initialization
//!
//! ```rust
//! use rawcoll::config::{BucketMapConfig, Config};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads RAWCOLL_MAP_INITIAL_BUCKETS and friends, defaults otherwise
//! let config = BucketMapConfig::from_env()?;
//! assert!(config.validate().is_ok());
//! # Ok(())
//! # }
//! ```
//!
//! # Serialization
//!
//! ```rust
//! use rawcoll::config::{BucketMapConfig, Config};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let json = BucketMapConfig::performance_preset().to_json()?;
//! let restored = BucketMapConfig::from_json(&json)?;
//! assert_eq!(restored, BucketMapConfig::performance_preset());
//! # Ok(())
//! # }
//! ```

use crate::error::{CollectionError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::env;
use std::fmt;

pub mod bucket_map;

#[cfg(test)]
mod tests;

pub use bucket_map::BucketMapConfig;

/// Default prefix for configuration environment variables
pub const ENV_PREFIX: &str = "RAWCOLL_";

/// Common configuration trait providing validation, environment
/// initialization, presets and JSON round-tripping.
pub trait Config: Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables with the
    /// [`ENV_PREFIX`] prefix.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Initialize configuration from environment variables with a custom prefix.
    ///
    /// Unset or unparsable variables keep their default values; the result
    /// is validated before it is returned.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset favouring lookup speed over memory.
    fn performance_preset() -> Self;

    /// Preset favouring compact memory use over lookup speed.
    fn memory_preset() -> Self;

    /// Balanced preset, identical to the default configuration.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Serialize to pretty-printed JSON.
    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CollectionError::configuration(format!("Failed to serialize config: {}", e)))
    }

    /// Parse and validate a configuration from JSON.
    fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CollectionError::configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or does not parse.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
