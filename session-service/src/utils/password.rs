use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::services::ServiceError;

/// Inputs longer than this are refused before they reach Argon2.
pub const MAX_PASSWORD_BYTES: usize = 1024;

/// Newtype for password to prevent accidental logging
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Newtype for password hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHashString(String);

impl PasswordHashString {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Hash a password using Argon2
///
/// Uses Argon2id variant with secure default parameters.
/// Salt is automatically generated and included in the hash.
pub fn hash_password(password: &Password) -> Result<PasswordHashString, ServiceError> {
    if password.as_str().len() > MAX_PASSWORD_BYTES {
        return Err(ServiceError::HashFailure(format!(
            "password exceeds {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_str().as_bytes(), &salt)
        .map_err(|e| ServiceError::HashFailure(e.to_string()))?
        .to_string();

    Ok(PasswordHashString::new(password_hash))
}

/// Verify a password against a stored hash.
///
/// The comparison is Argon2's own constant-time check. A mismatch is
/// [`ServiceError::BadPassword`]; an unparseable stored hash is a
/// [`ServiceError::HashFailure`].
pub fn verify_password(
    password: &Password,
    password_hash: &PasswordHashString,
) -> Result<(), ServiceError> {
    let parsed_hash = PasswordHash::new(password_hash.as_str())
        .map_err(|e| ServiceError::HashFailure(format!("invalid password hash format: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_str().as_bytes(), &parsed_hash)
        .map_err(|e| match e {
            argon2::password_hash::Error::Password => ServiceError::BadPassword,
            other => ServiceError::HashFailure(other.to_string()),
        })
}
