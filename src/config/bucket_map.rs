//! Hash map sizing and rehash policy.

use super::{parse_env_var, Config};
use crate::error::{CollectionError, Result};
use serde::{Deserialize, Serialize};

/// Bucket count used when none is given
pub const DEFAULT_BUCKET_COUNT: usize = 16;

/// Load factor above which an insert triggers a rehash
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

/// Bucket count multiplier applied on rehash
pub const DEFAULT_GROWTH_FACTOR: usize = 2;

/// Configuration for [`BucketMap`](crate::BucketMap)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketMapConfig {
    /// Number of buckets allocated at construction
    pub initial_buckets: usize,
    /// An insert rehashes first when `(len + 1) / buckets` would exceed this
    pub max_load_factor: f64,
    /// The bucket count is multiplied by this on every automatic rehash
    pub growth_factor: usize,
}

impl Default for BucketMapConfig {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_BUCKET_COUNT,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            growth_factor: DEFAULT_GROWTH_FACTOR,
        }
    }
}

impl BucketMapConfig {
    /// Default policy with a different initial bucket count
    pub fn with_buckets(initial_buckets: usize) -> Self {
        Self {
            initial_buckets,
            ..Self::default()
        }
    }
}

impl Config for BucketMapConfig {
    fn validate(&self) -> Result<()> {
        if self.initial_buckets == 0 {
            return Err(CollectionError::configuration(
                "initial_buckets must be greater than 0",
            ));
        }
        if !self.max_load_factor.is_finite() || self.max_load_factor <= 0.0 {
            return Err(CollectionError::configuration(format!(
                "max_load_factor must be a positive finite number, got {}",
                self.max_load_factor
            )));
        }
        if self.growth_factor < 2 {
            return Err(CollectionError::configuration(format!(
                "growth_factor must be at least 2, got {}",
                self.growth_factor
            )));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            initial_buckets: parse_env_var(
                &format!("{}MAP_INITIAL_BUCKETS", prefix),
                defaults.initial_buckets,
            ),
            max_load_factor: parse_env_var(
                &format!("{}MAP_MAX_LOAD_FACTOR", prefix),
                defaults.max_load_factor,
            ),
            growth_factor: parse_env_var(
                &format!("{}MAP_GROWTH_FACTOR", prefix),
                defaults.growth_factor,
            ),
        };
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            initial_buckets: 64,
            max_load_factor: 0.5,
            growth_factor: 4,
        }
    }

    fn memory_preset() -> Self {
        Self {
            initial_buckets: 4,
            max_load_factor: 2.0,
            growth_factor: 2,
        }
    }
}
