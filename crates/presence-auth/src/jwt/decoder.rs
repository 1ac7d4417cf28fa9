//! JWT token validation and blocklist checking.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::warn;
use uuid::Uuid;

use presence_cache::CacheManager;
use presence_cache::keys;
use presence_core::config::auth::AuthConfig;
use presence_core::error::AppError;
use presence_core::result::AppResult;
use presence_core::traits::cache::CacheProvider;

use super::claims::{Claims, TokenType};

/// Validates JWT tokens and checks blocklist status.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
    /// Cache manager for blocklist lookups.
    cache: Arc<CacheManager>,
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
    pub fn new(config: &AuthConfig, cache: Arc<CacheManager>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            cache,
        }
    }

    /// Resolve the caller from an `Authorization` header value.
    ///
    /// A missing header, a non-bearer scheme, or any token failure is an
    /// authentication error.
    pub async fn authenticate(&self, authorization: Option<&str>) -> AppResult<Uuid> {
        let header = authorization
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Authorization must be a Bearer token"))?;

        let claims = self.decode_access_token(token).await?;
        Ok(claims.user_id())
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks:
    /// 1. Signature validity
    /// 2. Expiration
    /// 3. Token type is Access
    /// 4. JTI not in blocklist
    pub async fn decode_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.decode_token(token)?;

        if claims.token_type != TokenType::Access {
            return Err(AppError::authentication(
                "Invalid token type: expected access token",
            ));
        }

        self.check_blocklist(claims.jti).await?;

        Ok(claims)
    }

    /// Internal decode without type checking.
    fn decode_token(&self, token: &str) -> AppResult<Claims> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Rejects tokens whose JWT ID has been revoked.
    ///
    /// A blocklist lookup failure does not lock every caller out; it is
    /// logged and the token is accepted on its signature alone.
    async fn check_blocklist(&self, jti: Uuid) -> AppResult<()> {
        match self.cache.exists(&keys::jwt_blocklist(jti)).await {
            Ok(true) => Err(AppError::authentication("Token has been revoked")),
            Ok(false) => Ok(()),
            Err(e) => {
                warn!(%jti, error = %e, "Token blocklist lookup failed");
                Ok(())
            }
        }
    }
}
