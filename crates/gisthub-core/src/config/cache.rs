//! In-process cache configuration.

use serde::{Deserialize, Serialize};

/// Cache sizing and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries held in memory.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// TTL applied by `set_default`, in seconds.
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: u64,
    /// How long a rendered preview image stays cached, in seconds.
    #[serde(default = "default_preview_ttl")]
    pub preview_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            default_ttl_seconds: default_ttl(),
            preview_ttl_seconds: default_preview_ttl(),
        }
    }
}

fn default_max_capacity() -> u64 {
    10_000
}

fn default_ttl() -> u64 {
    300
}

fn default_preview_ttl() -> u64 {
    600
}
