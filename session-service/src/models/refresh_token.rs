use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::ServiceError;

/// Number of random bytes behind a refresh token; hex doubles it to 64 characters.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Default lifetime of a refresh token.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// Long-lived opaque session credential, keyed by its own value.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Create a fresh, unrevoked token for `user_id` expiring after `ttl`.
    pub fn new(user_id: Uuid, ttl: Duration) -> Result<Self, ServiceError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            ServiceError::ConfigInvalid("refresh token lifetime is out of range".to_string())
        })?;
        Ok(Self {
            token: generate_token(),
            user_id,
            expires_at,
            revoked_at: None,
            created_at: now,
        })
    }

    /// Expired once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Check if this token is valid (not expired and not revoked)
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }

    /// Stamp the revocation time. A token already revoked keeps its first timestamp.
    pub fn revoke(&mut self, at: DateTime<Utc>) {
        if self.revoked_at.is_none() {
            self.revoked_at = Some(at);
        }
    }
}

/// 32 bytes from the OS RNG, lowercase hex.
pub fn generate_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
