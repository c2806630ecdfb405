use service_core::error::AppError;
use thiserror::Error;

/// Typed outcomes of every session operation. Callers translate these into their
/// own transport; nothing in this crate retries on any of them.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Authorization header is missing")]
    CredentialMissing,

    #[error("Authorization header is malformed")]
    CredentialMalformed,

    #[error("Password does not match")]
    BadPassword,

    #[error("User not found")]
    UserNotFound,

    #[error("Token is malformed")]
    TokenMalformed,

    #[error("Token signature is invalid")]
    TokenBadSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token subject is not a user id")]
    TokenInvalidSubject,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Token not found")]
    TokenNotFound,

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Password hashing failed: {0}")]
    HashFailure(String),

    #[error("Token signing failed: {0}")]
    SigningFailure(String),

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// Text safe to show the caller.
    ///
    /// An unknown email and a wrong password read the same so responses cannot be
    /// used to enumerate accounts; `Display` keeps them apart for logs.
    pub fn client_message(&self) -> String {
        match self {
            ServiceError::UserNotFound | ServiceError::BadPassword => {
                "Invalid credentials".to_string()
            }
            ServiceError::TokenMalformed
            | ServiceError::TokenBadSignature
            | ServiceError::TokenInvalidSubject => "Invalid token".to_string(),
            ServiceError::HashFailure(_)
            | ServiceError::SigningFailure(_)
            | ServiceError::ConfigInvalid(_)
            | ServiceError::Database(_)
            | ServiceError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// True for failures caused by the presented credential rather than the service.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ServiceError::CredentialMissing
                | ServiceError::CredentialMalformed
                | ServiceError::BadPassword
                | ServiceError::UserNotFound
                | ServiceError::TokenMalformed
                | ServiceError::TokenBadSignature
                | ServiceError::TokenExpired
                | ServiceError::TokenInvalidSubject
                | ServiceError::TokenRevoked
                | ServiceError::TokenNotFound
                | ServiceError::Unauthorized
        )
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ConfigInvalid(msg) => AppError::ConfigError(anyhow::anyhow!(msg)),
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
            other => AppError::InternalError(anyhow::anyhow!(other.to_string())),
        }
    }
}
