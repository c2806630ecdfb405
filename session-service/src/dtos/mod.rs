pub mod session;
pub mod webhook;

pub use session::{AccessGrant, CredentialsRequest, LoginResponse};
pub use webhook::{BillingEvent, BillingEventData, WebhookOutcome, USER_UPGRADED_EVENT};
