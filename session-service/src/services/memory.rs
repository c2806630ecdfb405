use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use crate::models::{RefreshToken, UserIdentity};
use crate::services::{RefreshStore, ServiceError, UserStore};

/// In-process store for tests and database-free embedding. Each record is
/// mutated under its shard lock, which gives the per-key atomicity the ledger
/// relies on.
///
/// `emails` maps lowercased email to owner and plays the role of the unique
/// index: an email is claimed through its entry before the user row changes.
/// Locks are always taken `emails` first, then `users`.
#[derive(Default)]
pub struct InMemoryStore {
    users: DashMap<Uuid, UserIdentity>,
    emails: DashMap<String, Uuid>,
    refresh_tokens: DashMap<String, RefreshToken>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn refresh_token_count(&self) -> usize {
        self.refresh_tokens.len()
    }

    /// Claim `email` for `id`. Succeeds if it is free or already owned by `id`.
    fn claim_email(&self, email: &str, id: Uuid) -> Result<(), ServiceError> {
        match self.emails.entry(email.to_lowercase()) {
            Entry::Occupied(owner) if *owner.get() == id => Ok(()),
            Entry::Occupied(_) => Err(ServiceError::EmailAlreadyRegistered),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }

    fn release_email(&self, email: &str, id: Uuid) {
        self.emails.remove_if(&email.to_lowercase(), |_, owner| *owner == id);
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>, ServiceError> {
        let Some(id) = self.emails.get(&email.to_lowercase()).map(|owner| *owner) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserIdentity>, ServiceError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, user: &UserIdentity) -> Result<(), ServiceError> {
        self.claim_email(&user.email, user.id)?;
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserIdentity>, ServiceError> {
        let Some(previous) = self.users.get(&id).map(|user| user.email.clone()) else {
            return Ok(None);
        };
        let email_changes = !previous.eq_ignore_ascii_case(email);

        if email_changes {
            self.claim_email(email, id)?;
        }

        let updated = self.users.get_mut(&id).map(|mut user| {
            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            user.updated_at = Utc::now();
            user.clone()
        });

        if email_changes {
            match updated {
                Some(_) => self.release_email(&previous, id),
                None => self.release_email(email, id),
            }
        }

        Ok(updated)
    }

    async fn set_privileged(
        &self,
        id: Uuid,
        privileged: bool,
    ) -> Result<Option<UserIdentity>, ServiceError> {
        Ok(self.users.get_mut(&id).map(|mut user| {
            user.privileged = privileged;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[async_trait]
impl RefreshStore for InMemoryStore {
    async fn put(&self, token: &RefreshToken) -> Result<(), ServiceError> {
        self.refresh_tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<RefreshToken>, ServiceError> {
        Ok(self.refresh_tokens.get(token).map(|entry| entry.value().clone()))
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<bool, ServiceError> {
        match self.refresh_tokens.get_mut(token) {
            Some(mut record) => {
                record.revoke(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn user(email: &str) -> UserIdentity {
        UserIdentity::new(email.to_string(), "$argon2id$stub".to_string())
    }

    #[tokio::test]
    async fn users_are_found_by_email_and_id() {
        let store = InMemoryStore::new();
        let saul = user("saul@bettercall.com");
        store.insert(&saul).await.unwrap();

        let by_email = store.find_by_email("Saul@BetterCall.com").await.unwrap();
        assert_eq!(by_email.as_ref().map(|u| u.id), Some(saul.id));
        assert_eq!(store.find_by_id(saul.id).await.unwrap(), Some(saul));
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        store.insert(&user("saul@bettercall.com")).await.unwrap();

        let err = store.insert(&user("saul@bettercall.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmailAlreadyRegistered));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn email_cannot_be_moved_onto_another_account() {
        let store = InMemoryStore::new();
        let saul = user("saul@bettercall.com");
        let kim = user("kim@wexler.com");
        store.insert(&saul).await.unwrap();
        store.insert(&kim).await.unwrap();

        let err = store
            .update_credentials(kim.id, "saul@bettercall.com", "$argon2id$new")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmailAlreadyRegistered));

        let updated = store
            .update_credentials(kim.id, "kim@schweikart.com", "$argon2id$new")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.email, "kim@schweikart.com");
        assert_eq!(updated.hashed_password, "$argon2id$new");
    }

    #[tokio::test]
    async fn old_email_is_released_after_a_change() {
        let store = InMemoryStore::new();
        let kim = user("kim@wexler.com");
        store.insert(&kim).await.unwrap();

        store
            .update_credentials(kim.id, "kim@schweikart.com", "$argon2id$new")
            .await
            .unwrap();

        assert!(store.find_by_email("kim@wexler.com").await.unwrap().is_none());
        store.insert(&user("kim@wexler.com")).await.unwrap();
        assert_eq!(store.user_count(), 2);
    }

    #[tokio::test]
    async fn changing_only_the_case_keeps_the_claim() {
        let store = InMemoryStore::new();
        let kim = user("kim@wexler.com");
        store.insert(&kim).await.unwrap();

        store
            .update_credentials(kim.id, "Kim@Wexler.com", "$argon2id$new")
            .await
            .unwrap();

        let found = store.find_by_email("kim@wexler.com").await.unwrap().unwrap();
        assert_eq!(found.email, "Kim@Wexler.com");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_of_one_email_admit_exactly_one() {
        for _ in 0..50 {
            let store = Arc::new(InMemoryStore::new());
            let attempts: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    tokio::spawn(async move { store.insert(&user("race@example.com")).await })
                })
                .collect();

            let mut admitted = 0;
            for attempt in attempts {
                match attempt.await.unwrap() {
                    Ok(()) => admitted += 1,
                    Err(err) => assert!(matches!(err, ServiceError::EmailAlreadyRegistered)),
                }
            }

            assert_eq!(admitted, 1);
            assert_eq!(store.user_count(), 1);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_moves_onto_one_email_admit_exactly_one() {
        let store = Arc::new(InMemoryStore::new());
        let mut ids = Vec::new();
        for n in 0..8 {
            let u = user(&format!("user{n}@example.com"));
            ids.push(u.id);
            store.insert(&u).await.unwrap();
        }

        let attempts: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .update_credentials(id, "taken@example.com", "$argon2id$new")
                        .await
                })
            })
            .collect();

        let mut admitted = 0;
        for attempt in attempts {
            if attempt.await.unwrap().is_ok() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }

    #[tokio::test]
    async fn revoke_keeps_the_first_timestamp() {
        let store = InMemoryStore::new();
        let token = RefreshToken::new(Uuid::new_v4(), Duration::days(60)).unwrap();
        store.put(&token).await.unwrap();

        let first = Utc::now() - Duration::minutes(1);
        assert!(store.revoke(&token.token, first).await.unwrap());
        assert!(store.revoke(&token.token, Utc::now()).await.unwrap());

        let stored = store.get(&token.token).await.unwrap().unwrap();
        assert_eq!(stored.revoked_at, Some(first));
    }

    #[tokio::test]
    async fn revoking_an_unknown_token_reports_absence() {
        let store = InMemoryStore::new();
        assert!(!store.revoke("deadbeef", Utc::now()).await.unwrap());
    }
}
