//! Login, refresh, revocation and the billing webhook.
//!
//! Session lifecycle: `Anonymous -> Authenticated (login) -> RefreshedAccess
//! (refresh, repeatable) -> Terminated (revoke or refresh-token expiry)`. Once
//! terminated a refresh token never authenticates again.

use http::HeaderMap;
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::config::{SessionConfig, TokenConfig};
use crate::dtos::{
    AccessGrant, BillingEvent, CredentialsRequest, LoginResponse, WebhookOutcome,
};
use crate::models::refresh_token::generate_token;
use crate::models::{SanitizedUser, UserIdentity};
use crate::services::{
    JwtService, RefreshStore, RefreshTokenLedger, ServiceError, SessionMetrics, UserStore,
};
use crate::utils::{
    constant_time_eq, extract_api_key, extract_bearer, hash_password, verify_password, Password,
    PasswordHashString,
};

/// Compare a presented webhook key with the configured one in constant time.
/// Every mismatch, including a length mismatch, is [`ServiceError::Unauthorized`].
pub fn validate_api_key(provided: &str, configured: &str) -> Result<(), ServiceError> {
    if constant_time_eq(provided.as_bytes(), configured.as_bytes()) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserStore>,
    ledger: RefreshTokenLedger,
    jwt: JwtService,
    webhook_key: Secret<String>,
    metrics: Arc<SessionMetrics>,
    /// Hash of a random secret, verified against when the email is unknown.
    decoy_hash: PasswordHashString,
}

impl SessionService {
    /// Fails only if Argon2 cannot hash the decoy secret.
    pub fn new(
        users: Arc<dyn UserStore>,
        ledger: RefreshTokenLedger,
        jwt: JwtService,
        webhook_key: Secret<String>,
        metrics: Arc<SessionMetrics>,
    ) -> Result<Self, ServiceError> {
        let decoy_hash = hash_password(&Password::new(generate_token()))?;

        Ok(Self {
            users,
            ledger,
            jwt,
            webhook_key,
            metrics,
            decoy_hash,
        })
    }

    /// Wire the service from configuration. Fails only on invalid configuration.
    pub fn from_config(
        config: &SessionConfig,
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshStore>,
        metrics: Arc<SessionMetrics>,
    ) -> Result<Self, ServiceError> {
        let tokens: &TokenConfig = &config.tokens;
        let jwt = JwtService::new(tokens)?;
        let ledger = RefreshTokenLedger::with_ttl(refresh_tokens, tokens.refresh_token_ttl()?);

        if config.webhook.polka_key.expose_secret().is_empty() {
            return Err(ServiceError::ConfigInvalid(
                "webhook API key cannot be empty".to_string(),
            ));
        }

        Self::new(
            users,
            ledger,
            jwt,
            config.webhook.polka_key.clone(),
            metrics,
        )
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Create an account. The password is stored only as an Argon2 hash.
    pub async fn register(&self, req: CredentialsRequest) -> Result<SanitizedUser, ServiceError> {
        req.validate()?;

        let password_hash = hash_password(&Password::new(req.password))?;
        let user = UserIdentity::new(req.email, password_hash.into_string());
        self.users.insert(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user.sanitized())
    }

    /// Exchange email and password for an access token and a refresh token.
    ///
    /// The password is checked before any token is minted. An unknown email and
    /// a wrong password stay distinct in the error (and in logs); use
    /// [`ServiceError::client_message`] for what the caller sees.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ServiceError> {
        let result = self.try_login(email, password).await;
        self.metrics.record_login(result.is_ok());
        result
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<LoginResponse, ServiceError> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                // Same Argon2 cost as a wrong password.
                let _ = verify_password(&Password::new(password), &self.decoy_hash);
                tracing::warn!(reason = "unknown_email", "Login rejected");
                return Err(ServiceError::UserNotFound);
            }
        };

        if let Err(e) = verify_password(
            &Password::new(password),
            &PasswordHashString::new(user.hashed_password.clone()),
        ) {
            tracing::warn!(user_id = %user.id, reason = %e, "Login rejected");
            return Err(e);
        }

        let access_token = self.jwt.generate_access_token(user.id)?;
        let refresh_token = self.ledger.mint(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            user: user.sanitized(),
            access_token,
            refresh_token: refresh_token.token,
            expires_in: self.jwt.access_token_expiry_seconds(),
        })
    }

    /// Issue a new access token for a valid refresh token. The refresh token
    /// itself is left unchanged.
    pub async fn refresh_access(&self, refresh_token: &str) -> Result<AccessGrant, ServiceError> {
        let user_id = self.ledger.validate(refresh_token).await.map_err(|e| {
            tracing::warn!(reason = %e, "Refresh rejected");
            e
        })?;

        let access_token = self.jwt.generate_access_token(user_id)?;
        self.metrics.record_refresh();
        tracing::info!(user_id = %user_id, "Access token refreshed");

        Ok(AccessGrant {
            access_token,
            expires_in: self.jwt.access_token_expiry_seconds(),
        })
    }

    /// [`Self::refresh_access`] with the token taken from `Authorization: Bearer`.
    pub async fn refresh_access_from_headers(
        &self,
        headers: &HeaderMap,
    ) -> Result<AccessGrant, ServiceError> {
        let refresh_token = extract_bearer(headers)?;
        self.refresh_access(&refresh_token).await
    }

    /// Permanently revoke a refresh token. Revoking twice is not an error.
    pub async fn revoke_session(&self, refresh_token: &str) -> Result<(), ServiceError> {
        self.ledger.revoke(refresh_token).await?;
        self.metrics.record_revocation();
        tracing::info!("Refresh token revoked");
        Ok(())
    }

    /// [`Self::revoke_session`] with the token taken from `Authorization: Bearer`.
    pub async fn revoke_session_from_headers(&self, headers: &HeaderMap) -> Result<(), ServiceError> {
        let refresh_token = extract_bearer(headers)?;
        self.revoke_session(&refresh_token).await
    }

    /// Resolve the access token in `Authorization: Bearer` to a user id.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Uuid, ServiceError> {
        let token = extract_bearer(headers)?;
        self.jwt.validate_access_token(&token)
    }

    /// Replace the authenticated user's email and password.
    pub async fn update_credentials(
        &self,
        headers: &HeaderMap,
        req: CredentialsRequest,
    ) -> Result<SanitizedUser, ServiceError> {
        let user_id = self.authenticate(headers)?;
        req.validate()?;

        let password_hash = hash_password(&Password::new(req.password))?;
        let user = self
            .users
            .update_credentials(user_id, &req.email, password_hash.as_str())
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        tracing::info!(user_id = %user.id, "User credentials updated");
        Ok(user.sanitized())
    }

    /// Check a webhook key against the configured one.
    pub fn validate_api_key(&self, provided: &str) -> Result<(), ServiceError> {
        validate_api_key(provided, self.webhook_key.expose_secret())
    }

    /// Handle a billing-provider delivery.
    ///
    /// The key is checked before the body is looked at. Only `user.upgraded`
    /// changes state; every other event is acknowledged and ignored.
    pub async fn handle_billing_webhook(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<WebhookOutcome, ServiceError> {
        let provided = extract_api_key(headers)?;
        self.validate_api_key(&provided).map_err(|e| {
            tracing::warn!("Billing webhook rejected: API key mismatch");
            e
        })?;

        let event: BillingEvent = serde_json::from_slice(body)
            .map_err(|e| ServiceError::Validation(format!("Invalid webhook body: {}", e)))?;

        if !event.is_upgrade() {
            tracing::info!(event = %event.event, "Billing webhook ignored");
            return Ok(WebhookOutcome::Ignored);
        }

        let user_id = Uuid::parse_str(&event.data.user_id)
            .map_err(|_| ServiceError::Validation("data.user_id is not a valid id".to_string()))?;

        self.users
            .set_privileged(user_id, true)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        self.metrics.record_upgrade();
        tracing::info!(user_id = %user_id, "User upgraded");
        Ok(WebhookOutcome::Upgraded(user_id))
    }
}
