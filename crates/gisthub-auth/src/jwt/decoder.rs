//! JWT token validation and revocation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;
use uuid::Uuid;

use gisthub_core::config::AuthConfig;
use gisthub_core::error::AppError;
use gisthub_core::traits::CacheProvider;

use super::claims::{Claims, TokenType};

/// Cache key prefix for revoked token ids.
const BLOCKLIST_PREFIX: &str = "gisthub:jwt:blocked:";

/// Minimum time a revocation marker is kept.
const MIN_BLOCKLIST_TTL: Duration = Duration::from_secs(60);

/// Validates JWT tokens and checks revocation status.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    cache: Arc<dyn CacheProvider>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, cache: Arc<dyn CacheProvider>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            cache,
        }
    }

    /// Decodes an access token, rejecting refresh tokens and revoked ids.
    pub async fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_typed(token, TokenType::Access).await
    }

    /// Decodes a refresh token, rejecting access tokens and revoked ids.
    pub async fn decode_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_typed(token, TokenType::Refresh).await
    }

    async fn decode_typed(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;

        if claims.token_type != expected {
            return Err(AppError::authentication(format!(
                "Invalid token type: expected {expected:?} token"
            )));
        }

        if self.is_revoked(claims.jti).await? {
            return Err(AppError::authentication("Token has been revoked"));
        }

        Ok(claims)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                _ => AppError::authentication("Invalid token"),
            })
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        self.cache.exists(&blocklist_key(jti)).await
    }

    /// Revokes a token until it would have expired anyway.
    pub async fn revoke(&self, claims: &Claims) -> Result<(), AppError> {
        self.revoke_id(claims.jti, claims.expires_at()).await?;
        debug!(jti = %claims.jti, user_id = %claims.sub, "Token revoked");
        Ok(())
    }

    /// Revokes a token id until `expires_at`.
    pub async fn revoke_id(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        self.cache
            .set(&blocklist_key(jti), "revoked", blocklist_ttl(expires_at))
            .await
    }

    /// Revokes a single-use token, failing if it was already revoked.
    ///
    /// Of several concurrent calls for the same token exactly one succeeds.
    pub async fn consume(&self, claims: &Claims) -> Result<(), AppError> {
        let claimed = self
            .cache
            .set_if_absent(
                &blocklist_key(claims.jti),
                "revoked",
                blocklist_ttl(claims.expires_at()),
            )
            .await?;
        if !claimed {
            return Err(AppError::authentication("Token has been revoked"));
        }
        debug!(jti = %claims.jti, user_id = %claims.sub, "Token consumed");
        Ok(())
    }
}

fn blocklist_key(jti: Uuid) -> String {
    format!("{BLOCKLIST_PREFIX}{jti}")
}

fn blocklist_ttl(expires_at: DateTime<Utc>) -> Duration {
    let remaining = (expires_at - Utc::now()).num_seconds().max(0) as u64;
    Duration::from_secs(remaining).max(MIN_BLOCKLIST_TTL)
}
