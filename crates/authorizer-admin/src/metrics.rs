//! GraphQL client metrics
//!
//! Recorded through the `metrics` facade; the host application installs
//! the exporter.
//!
//! - `authorizer_graphql_requests_total` (counter): labels `operation`, `outcome`
//! - `authorizer_graphql_request_duration_seconds` (histogram): label `operation`

pub const REQUESTS_TOTAL: &str = "authorizer_graphql_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "authorizer_graphql_request_duration_seconds";

/// Suggested histogram buckets for `REQUEST_DURATION_SECONDS`, 5ms to 60s.
pub const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

/// How a single round-trip ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    GraphqlError,
    TransportError,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::GraphqlError => "graphql_error",
            Outcome::TransportError => "transport_error",
        }
    }
}

/// Record a completed round-trip. `duration_secs` is `None` where no
/// monotonic clock is available.
pub fn record_request(operation: &str, outcome: Outcome, duration_secs: Option<f64>) {
    metrics::counter!(
        REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    if let Some(secs) = duration_secs {
        metrics::histogram!(REQUEST_DURATION_SECONDS, "operation" => operation.to_string())
            .record(secs);
    }
}
