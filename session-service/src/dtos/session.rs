use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::SanitizedUser;

/// Email/password pair used for registration, login and credential updates.
#[derive(Clone, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl CredentialsRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: SanitizedUser,
    #[serde(rename = "token")]
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// A freshly issued access token.
#[derive(Debug, Clone, Serialize)]
pub struct AccessGrant {
    #[serde(rename = "token")]
    pub access_token: String,
    pub expires_in: i64,
}
