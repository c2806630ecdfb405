//! service-core: Shared infrastructure for the chirpy services.
pub mod config;
pub mod error;
pub mod observability;

pub use tracing;
