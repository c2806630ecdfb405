use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::refresh_token::REFRESH_TOKEN_TTL_DAYS;
use crate::models::RefreshToken;
use crate::services::{RefreshStore, ServiceError};

/// Issues, validates and revokes refresh tokens. All state lives in the store.
///
/// Tokens are not rotated on use: a valid token keeps working until it is revoked
/// or reaches `expires_at`.
#[derive(Clone)]
pub struct RefreshTokenLedger {
    store: Arc<dyn RefreshStore>,
    ttl: Duration,
}

impl RefreshTokenLedger {
    pub fn new(store: Arc<dyn RefreshStore>) -> Self {
        Self::with_ttl(store, Duration::days(REFRESH_TOKEN_TTL_DAYS))
    }

    pub fn with_ttl(store: Arc<dyn RefreshStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Generate and persist a new token for `user_id`.
    pub async fn mint(&self, user_id: Uuid) -> Result<RefreshToken, ServiceError> {
        let token = RefreshToken::new(user_id, self.ttl)?;
        self.store.put(&token).await?;
        tracing::debug!(user_id = %user_id, expires_at = %token.expires_at, "Refresh token minted");
        Ok(token)
    }

    /// Resolve a presented token to its user.
    ///
    /// Revocation is checked before expiry so a revoked token always reports
    /// [`ServiceError::TokenRevoked`], even once it would also have expired.
    pub async fn validate(&self, token: &str) -> Result<Uuid, ServiceError> {
        let record = self
            .store
            .get(token)
            .await?
            .ok_or(ServiceError::TokenNotFound)?;

        if record.is_revoked() {
            return Err(ServiceError::TokenRevoked);
        }

        if record.is_expired_at(Utc::now()) {
            return Err(ServiceError::TokenExpired);
        }

        Ok(record.user_id)
    }

    /// Revoke a token. Revoking twice succeeds; the first timestamp is kept.
    pub async fn revoke(&self, token: &str) -> Result<(), ServiceError> {
        if !self.store.revoke(token, Utc::now()).await? {
            return Err(ServiceError::TokenNotFound);
        }
        Ok(())
    }
}
