//! Shared setup for session-service integration tests.
//!
//! Everything runs against [`InMemoryStore`], so no database is required.

#![allow(dead_code)]

use chrono::Duration;
use http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use prometheus::Registry;
use secrecy::Secret;
use session_service::{
    dtos::CredentialsRequest,
    models::SanitizedUser,
    services::{InMemoryStore, JwtService, RefreshTokenLedger, SessionMetrics, SessionService},
};
use std::sync::Arc;

pub const JWT_SECRET: &str = "integration-test-signing-secret";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const PASSWORD: &str = "04234";

pub struct TestContext {
    pub service: SessionService,
    pub store: Arc<InMemoryStore>,
    pub metrics: Arc<SessionMetrics>,
    pub registry: Registry,
}

pub fn init_tracing() {
    let _ = service_core::observability::init_tracing("session-service-test", "debug");
}

pub fn setup() -> TestContext {
    setup_with_access_ttl(Duration::hours(1))
}

pub fn setup_with_access_ttl(access_ttl: Duration) -> TestContext {
    init_tracing();

    let store = Arc::new(InMemoryStore::new());
    let registry = Registry::new();
    let metrics =
        Arc::new(SessionMetrics::new(&registry).expect("Failed to register session metrics"));
    let jwt = JwtService::from_secret(Secret::new(JWT_SECRET.to_string()), access_ttl)
        .expect("Failed to create JWT service");
    let ledger = RefreshTokenLedger::new(store.clone());

    let service = SessionService::new(
        store.clone(),
        ledger,
        jwt,
        Secret::new(POLKA_KEY.to_string()),
        metrics.clone(),
    )
    .expect("Failed to create session service");

    TestContext {
        service,
        store,
        metrics,
        registry,
    }
}

pub async fn register(ctx: &TestContext, email: &str) -> SanitizedUser {
    ctx.service
        .register(CredentialsRequest::new(email, PASSWORD))
        .await
        .expect("Failed to register user")
}

pub fn authorization(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(value).expect("Invalid header value"),
    );
    headers
}

pub fn bearer(token: &str) -> HeaderMap {
    authorization(&format!("Bearer {}", token))
}

pub fn api_key(key: &str) -> HeaderMap {
    authorization(&format!("ApiKey {}", key))
}
