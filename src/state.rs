//! # Application State Management
//!
//! Shared state handed to every HTTP request handler through `web::Data`.
//!
//! ## What is shared:
//! - **Responder**: Read-only. The ledger inside it never changes, so it sits behind a
//!   plain `Arc` with no lock.
//! - **Metrics**: Updated by the metrics middleware on every request, so they sit behind
//!   `Arc<RwLock<_>>` (parking_lot, which does not poison).
//! - **Start time**: Copied once at startup for the uptime figure.

use crate::config::AppConfig;
use crate::ledger::AccountLedger;
use crate::responder::Responder;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct AppState {
    /// Configuration the server started with
    pub config: Arc<AppConfig>,

    /// Query-to-reply mapping over the fixed ledger
    pub responder: Arc<Responder>,

    /// Request counters, written by middleware
    pub metrics: Arc<RwLock<AppMetrics>>,

    pub start_time: Instant,
}

/// Request metrics collected across all HTTP requests.
#[derive(Debug, Default, Clone)]
pub struct AppMetrics {
    /// Total number of HTTP requests processed since server start
    pub request_count: u64,

    /// Total number of 4xx/5xx responses since server start
    pub error_count: u64,

    /// Key: endpoint name (e.g., "POST /api/voice-command")
    pub endpoint_metrics: HashMap<String, EndpointMetric>,
}

/// Detailed metrics for a specific API endpoint.
///
/// ## Derived values:
/// - **Average response time**: total_duration_ms / request_count
/// - **Error rate**: error_count / request_count
#[derive(Debug, Default, Clone)]
pub struct EndpointMetric {
    pub request_count: u64,
    pub total_duration_ms: u64,
    pub error_count: u64,
}

impl AppState {
    /// Build state from a validated configuration.
    ///
    /// The ledger is taken from the configuration once here and frozen inside the responder.
    pub fn new(config: AppConfig) -> Self {
        let ledger = AccountLedger::from(&config.ledger);
        Self {
            config: Arc::new(config),
            responder: Arc::new(Responder::new(ledger)),
            metrics: Arc::new(RwLock::new(AppMetrics::default())),
            start_time: Instant::now(),
        }
    }

    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    /// Increment the total request counter (called by middleware for every request).
    pub fn increment_request_count(&self) {
        self.metrics.write().request_count += 1;
    }

    /// Increment the total error counter (called for every 4xx/5xx response).
    pub fn increment_error_count(&self) {
        self.metrics.write().error_count += 1;
    }

    /// Record detailed metrics for a specific endpoint.
    ///
    /// The first time an endpoint is seen, a zeroed entry is created for it.
    pub fn record_endpoint_request(&self, endpoint: &str, duration_ms: u64, is_error: bool) {
        let mut metrics = self.metrics.write();
        let endpoint_metric = metrics.endpoint_metrics.entry(endpoint.to_string()).or_default();

        endpoint_metric.request_count += 1;
        endpoint_metric.total_duration_ms += duration_ms;

        if is_error {
            endpoint_metric.error_count += 1;
        }
    }

    /// Get a snapshot of current metrics (used for the /api/metrics endpoint).
    ///
    /// Cloning releases the lock before the response is serialized.
    pub fn get_metrics_snapshot(&self) -> AppMetrics {
        self.metrics.read().clone()
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl EndpointMetric {
    pub fn average_duration_ms(&self) -> f64 {
        if self.request_count > 0 {
            self.total_duration_ms as f64 / self.request_count as f64
        } else {
            0.0
        }
    }

    /// Error rate as a fraction (0.0 to 1.0).
    pub fn error_rate(&self) -> f64 {
        if self.request_count > 0 {
            self.error_count as f64 / self.request_count as f64
        } else {
            0.0
        }
    }
}
