//! Cache key builders for all GistHub cache entries.

use uuid::Uuid;

/// Prefix applied to all GistHub cache keys.
const PREFIX: &str = "gisthub";

/// Marker for a revoked token, keyed by its `jti`.
pub fn jwt_blocklist(jti: &str) -> String {
    format!("{PREFIX}:jwt:blocked:{jti}")
}

/// Rendered social preview image of a gist.
pub fn og_image(gist_id: Uuid) -> String {
    format!("{PREFIX}:og:{gist_id}")
}
