//! User identity as seen by the session layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A user record owned by the user store. Only `id`, `hashed_password` and
/// `privileged` drive authentication decisions.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub privileged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserIdentity {
    /// Create a new, unprivileged user from an already hashed password.
    pub fn new(email: String, hashed_password: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            hashed_password,
            privileged: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Convert to sanitized response (no credential material).
    pub fn sanitized(&self) -> SanitizedUser {
        SanitizedUser::from(self)
    }
}

/// User without the stored credential, safe to hand back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizedUser {
    pub id: Uuid,
    pub email: String,
    #[serde(rename = "is_chirpy_red")]
    pub privileged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserIdentity> for SanitizedUser {
    fn from(user: &UserIdentity) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            privileged: user.privileged,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
