//! Limits and paging defaults for gist operations.

use serde::{Deserialize, Serialize};

/// Gist limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistConfig {
    /// Maximum title length in characters.
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,
    /// Maximum body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Page size used when the client does not send one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Upper bound on any requested page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Number of gists returned by the public listing without `take`.
    #[serde(default = "default_public_list")]
    pub public_list_default: u64,
    /// Upper bound on `take` for the public listing.
    #[serde(default = "default_public_list_max")]
    pub public_list_max: u64,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            max_title_length: default_max_title_length(),
            max_body_bytes: default_max_body_bytes(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            public_list_default: default_public_list(),
            public_list_max: default_public_list_max(),
        }
    }
}

fn default_max_title_length() -> usize {
    255
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_page_size() -> u64 {
    20
}

fn default_max_page_size() -> u64 {
    100
}

fn default_public_list() -> u64 {
    50
}

fn default_public_list_max() -> u64 {
    100
}
