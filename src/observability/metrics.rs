//! Counters for catalog traffic and the contribution flow.
//!
//! Recording is always safe: without an installed recorder the `metrics`
//! macros are no-ops. `init` installs a Prometheus exporter on request.

use std::fmt;
use std::net::SocketAddr;
use tracing::{info, warn};

/// All metric names used by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Catalog service requests
    FetchSuccess,
    FetchError,
    FetchSkippedUnauthenticated,

    // View counter
    ViewTriggered,
    ViewTriggerFailed,

    // Contribution flow
    SelectorTransition,
    SelectorStaleResponse,
    SubmissionSuccess,
    SubmissionRejected,
    ValidationRejected,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::FetchSuccess => "exam_catalog_fetch_success_total",
            MetricName::FetchError => "exam_catalog_fetch_error_total",
            MetricName::FetchSkippedUnauthenticated => "exam_catalog_fetch_skipped_unauthenticated_total",
            MetricName::ViewTriggered => "exam_catalog_view_triggered_total",
            MetricName::ViewTriggerFailed => "exam_catalog_view_trigger_failed_total",
            MetricName::SelectorTransition => "exam_catalog_selector_transition_total",
            MetricName::SelectorStaleResponse => "exam_catalog_selector_stale_response_total",
            MetricName::SubmissionSuccess => "exam_catalog_submission_success_total",
            MetricName::SubmissionRejected => "exam_catalog_submission_rejected_total",
            MetricName::ValidationRejected => "exam_catalog_validation_rejected_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            FetchSuccess,
            FetchError,
            FetchSkippedUnauthenticated,
            ViewTriggered,
            ViewTriggerFailed,
            SelectorTransition,
            SelectorStaleResponse,
            SubmissionSuccess,
            SubmissionRejected,
            ValidationRejected,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install a Prometheus exporter listening on `port`.
pub fn init(port: u16) {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => info!("Prometheus exporter listening on http://{}/metrics", addr),
        Err(e) => warn!("Prometheus exporter install failed (possibly already installed): {}", e),
    }
}

// ============================================================================
// Catalog service requests
// ============================================================================

pub mod fetch {
    use super::MetricName;

    pub fn success(operation: &'static str) {
        ::metrics::counter!(MetricName::FetchSuccess.as_str(), "operation" => operation).increment(1);
    }

    pub fn error(operation: &'static str) {
        ::metrics::counter!(MetricName::FetchError.as_str(), "operation" => operation).increment(1);
    }

    pub fn skipped_unauthenticated(operation: &'static str) {
        ::metrics::counter!(MetricName::FetchSkippedUnauthenticated.as_str(), "operation" => operation)
            .increment(1);
    }
}

// ============================================================================
// View counter
// ============================================================================

pub mod views {
    use super::MetricName;

    pub fn triggered() {
        ::metrics::counter!(MetricName::ViewTriggered.as_str()).increment(1);
    }

    pub fn failed() {
        ::metrics::counter!(MetricName::ViewTriggerFailed.as_str()).increment(1);
    }
}

// ============================================================================
// Contribution flow
// ============================================================================

pub mod selector {
    use super::MetricName;

    pub fn transition(state: &'static str) {
        ::metrics::counter!(MetricName::SelectorTransition.as_str(), "state" => state).increment(1);
    }

    pub fn stale_response() {
        ::metrics::counter!(MetricName::SelectorStaleResponse.as_str()).increment(1);
    }

    pub fn submission_success() {
        ::metrics::counter!(MetricName::SubmissionSuccess.as_str()).increment(1);
    }

    pub fn submission_rejected() {
        ::metrics::counter!(MetricName::SubmissionRejected.as_str()).increment(1);
    }

    pub fn validation_rejected() {
        ::metrics::counter!(MetricName::ValidationRejected.as_str()).increment(1);
    }
}
