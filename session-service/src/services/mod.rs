//! Services layer for session-service.
//!
//! Token issuance and verification, the refresh-token ledger, persistence
//! backends and the [`SessionService`] that ties them together.

mod database;
pub mod error;
mod jwt;
mod memory;
pub mod metrics;
mod refresh_ledger;
pub mod session;
mod store;

pub use database::Database;
pub use error::ServiceError;
pub use jwt::{
    issue_access_token, verify_access_token, AccessTokenClaims, JwtService, TOKEN_ISSUER,
};
pub use memory::InMemoryStore;
pub use metrics::{render as render_metrics, MetricsSnapshot, SessionMetrics};
pub use refresh_ledger::RefreshTokenLedger;
pub use session::{validate_api_key, SessionService};
pub use store::{RefreshStore, UserStore};
