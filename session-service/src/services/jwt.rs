use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::services::ServiceError;

/// `iss` claim stamped on and required of every access token.
pub const TOKEN_ISSUER: &str = "chirpy";

/// Claims for access tokens (short-lived)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issuer, always [`TOKEN_ISSUER`]
    pub iss: String,
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Sign an HS256 access token for `user_id` valid for `ttl`.
///
/// A negative `ttl` yields a token that is already expired. A `ttl` that takes
/// the expiry past the representable range is [`ServiceError::ConfigInvalid`].
pub fn issue_access_token(
    user_id: Uuid,
    secret: &str,
    ttl: Duration,
) -> Result<String, ServiceError> {
    if secret.is_empty() {
        return Err(ServiceError::ConfigInvalid(
            "token signing secret cannot be empty".to_string(),
        ));
    }

    let now = Utc::now();
    let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
        ServiceError::ConfigInvalid("access token lifetime is out of range".to_string())
    })?;
    let claims = AccessTokenClaims {
        iss: TOKEN_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ServiceError::SigningFailure(e.to_string()))
}

/// Verify an access token and return the user id it was issued to.
///
/// Checks run in order: structure, signature (constant-time), issuer, expiry
/// (`now >= exp` is expired), then the subject must parse as a user id.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Uuid, ServiceError> {
    let claims = decode_claims(token, secret)?;

    if Utc::now().timestamp() >= claims.exp {
        return Err(ServiceError::TokenExpired);
    }

    Uuid::parse_str(&claims.sub).map_err(|_| ServiceError::TokenInvalidSubject)
}

fn decode_claims(token: &str, secret: &str) -> Result<AccessTokenClaims, ServiceError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is compared explicitly so the boundary is exact and leeway-free.
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.set_issuer(&[TOKEN_ISSUER]);

    decode::<AccessTokenClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => ServiceError::TokenBadSignature,
            ErrorKind::ExpiredSignature => ServiceError::TokenExpired,
            ErrorKind::InvalidSubject => ServiceError::TokenInvalidSubject,
            _ => ServiceError::TokenMalformed,
        })
}

/// Access-token codec bound to the configured secret and lifetime.
#[derive(Clone)]
pub struct JwtService {
    secret: Secret<String>,
    access_token_ttl: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_ttl", &self.access_token_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Fails with [`ServiceError::ConfigInvalid`] when the secret is empty or the
    /// lifetime is outside the accepted bounds.
    pub fn new(config: &TokenConfig) -> Result<Self, ServiceError> {
        Self::from_secret(config.jwt_secret.clone(), config.access_token_ttl()?)
    }

    pub fn from_secret(secret: Secret<String>, access_token_ttl: Duration) -> Result<Self, ServiceError> {
        if secret.expose_secret().is_empty() {
            return Err(ServiceError::ConfigInvalid(
                "token signing secret cannot be empty".to_string(),
            ));
        }

        tracing::info!(
            ttl_seconds = access_token_ttl.num_seconds(),
            "JWT service initialized with HS256 secret"
        );

        Ok(Self {
            secret,
            access_token_ttl,
        })
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String, ServiceError> {
        issue_access_token(user_id, self.secret.expose_secret(), self.access_token_ttl)
    }

    /// Validate an access token and return its subject
    pub fn validate_access_token(&self, token: &str) -> Result<Uuid, ServiceError> {
        verify_access_token(token, self.secret.expose_secret())
    }

    /// Get access token expiry in seconds (for client info)
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_ttl.num_seconds()
    }
}
