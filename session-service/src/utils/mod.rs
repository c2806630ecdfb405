pub mod credentials;
pub mod password;
pub mod secure_compare;

pub use credentials::{extract_api_key, extract_bearer, extract_credential};
pub use password::{hash_password, verify_password, Password, PasswordHashString};
pub use secure_compare::constant_time_eq;
