pub mod credential;
pub mod refresh_token;
pub mod user;

pub use credential::Credential;
pub use refresh_token::RefreshToken;
pub use user::{SanitizedUser, UserIdentity};
