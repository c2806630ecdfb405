use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::services::ServiceError;

const LOGIN_SUCCEEDED: &str = "succeeded";
const LOGIN_FAILED: &str = "failed";

/// Session activity counters.
///
/// Registered on a [`Registry`] owned by the embedder and handed to
/// [`crate::services::SessionService`]; there is no global instance.
#[derive(Clone)]
pub struct SessionMetrics {
    logins: IntCounterVec,
    refreshes: IntCounter,
    revocations: IntCounter,
    upgrades: IntCounter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub logins_succeeded: u64,
    pub logins_failed: u64,
    pub refreshes: u64,
    pub revocations: u64,
    pub upgrades: u64,
}

impl SessionMetrics {
    /// Create the counters and register them on `registry`. Registering twice on
    /// the same registry fails.
    pub fn new(registry: &Registry) -> Result<Self, ServiceError> {
        let logins = IntCounterVec::new(
            Opts::new("session_logins_total", "Login attempts by outcome"),
            &["outcome"],
        )
        .map_err(metrics_error)?;
        let refreshes = IntCounter::new(
            "session_refreshes_total",
            "Access tokens issued from a refresh token",
        )
        .map_err(metrics_error)?;
        let revocations = IntCounter::new("session_revocations_total", "Refresh tokens revoked")
            .map_err(metrics_error)?;
        let upgrades = IntCounter::new(
            "session_upgrades_total",
            "Users upgraded by the billing webhook",
        )
        .map_err(metrics_error)?;

        registry
            .register(Box::new(logins.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(refreshes.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(revocations.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(upgrades.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            logins,
            refreshes,
            revocations,
            upgrades,
        })
    }

    pub fn record_login(&self, succeeded: bool) {
        let outcome = if succeeded { LOGIN_SUCCEEDED } else { LOGIN_FAILED };
        self.logins.with_label_values(&[outcome]).inc();
    }

    pub fn record_refresh(&self) {
        self.refreshes.inc();
    }

    pub fn record_revocation(&self) {
        self.revocations.inc();
    }

    pub fn record_upgrade(&self) {
        self.upgrades.inc();
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            logins_succeeded: self.logins.with_label_values(&[LOGIN_SUCCEEDED]).get(),
            logins_failed: self.logins.with_label_values(&[LOGIN_FAILED]).get(),
            refreshes: self.refreshes.get(),
            revocations: self.revocations.get(),
            upgrades: self.upgrades.get(),
        }
    }

    pub fn reset(&self) {
        self.logins.reset();
        self.refreshes.reset();
        self.revocations.reset();
        self.upgrades.reset();
    }
}

/// Render every metric on `registry` in the Prometheus text format.
pub fn render(registry: &Registry) -> Result<String, ServiceError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .map_err(metrics_error)?;
    String::from_utf8(buffer).map_err(|e| ServiceError::Internal(anyhow::Error::new(e)))
}

fn metrics_error(err: prometheus::Error) -> ServiceError {
    tracing::error!("Failed to initialize metrics: {}", err);
    ServiceError::Internal(anyhow::Error::new(err))
}
