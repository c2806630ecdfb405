//! Persistence collaborators. Implementations must give per-key atomicity; the
//! session layer keeps no cache of its own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{RefreshToken, UserIdentity};
use crate::services::ServiceError;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>, ServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserIdentity>, ServiceError>;

    /// Fails with [`ServiceError::EmailAlreadyRegistered`] if the email is taken.
    async fn insert(&self, user: &UserIdentity) -> Result<(), ServiceError>;

    /// Replace email and stored hash. `None` if the user does not exist.
    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserIdentity>, ServiceError>;

    /// `None` if the user does not exist.
    async fn set_privileged(
        &self,
        id: Uuid,
        privileged: bool,
    ) -> Result<Option<UserIdentity>, ServiceError>;
}

#[async_trait]
pub trait RefreshStore: Send + Sync {
    async fn put(&self, token: &RefreshToken) -> Result<(), ServiceError>;

    async fn get(&self, token: &str) -> Result<Option<RefreshToken>, ServiceError>;

    /// Stamp `revoked_at` unless it is already set. Returns `false` when no such
    /// token exists.
    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<bool, ServiceError>;
}
