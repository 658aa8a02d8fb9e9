//! Session token generation and validation.
//!
//! Session tokens are HS256-signed JWTs containing a [`Claims`] payload and
//! valid for exactly [`TOKEN_VALIDITY_DAYS`] days. They are stateless: nothing
//! is stored server-side, so a token cannot be revoked before it expires.
//! Anyone holding the signing secret can mint tokens for any identity or role.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use villa_core::types::{DbId, Timestamp};

/// Fixed session token lifetime.
pub const TOKEN_VALIDITY_DAYS: i64 = 7;

/// JWT claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject -- the account's internal id, stringified.
    pub sub: String,
    /// The account's role label (e.g. `"admin"`, `"user"`).
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

impl Claims {
    /// The subject parsed back into an account id.
    pub fn user_id(&self) -> Option<DbId> {
        self.sub.parse().ok()
    }
}

/// Signing configuration. The secret is process-wide and read-only.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl JwtConfig {
    /// Build a config from an explicit secret.
    ///
    /// # Panics
    ///
    /// Panics if `secret` is empty.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(!secret.is_empty(), "JWT secret must not be empty");
        Self { secret }
    }

    /// Load the signing secret from `JWT_SECRET`.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty. Without a secret the
    /// service cannot authenticate anyone, so this is fatal at startup.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        Self::new(secret)
    }
}

/// Generate a session token for the given account, issued now.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    generate_access_token_at(user_id, role, config, Utc::now())
}

/// Generate a session token as if issued at `issued_at`.
pub fn generate_access_token_at(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
    issued_at: Timestamp,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = issued_at.timestamp();
    let exp = (issued_at + chrono::Duration::days(TOKEN_VALIDITY_DAYS)).timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp,
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a session token against the current time.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    validate_token_at(token, config, Utc::now())
}

/// Validate the signature and check expiry against `now`, with no leeway.
pub fn validate_token_at(
    token: &str,
    config: &JwtConfig,
    now: Timestamp,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked below against the supplied clock.
    validation.validate_exp = false;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    if token_data.claims.exp <= now.timestamp() {
        return Err(ErrorKind::ExpiredSignature.into());
    }
    Ok(token_data.claims)
}
