//! GraphQL result normalizer
//!
//! Wraps one transport round-trip and maps it onto `OperationResult`:
//! - transport failures become a single `transport_error` record
//! - a non-empty `errors` array is the only failure signal, and wins over
//!   any `data` sent alongside it
//! - otherwise `data` is returned as-is
//!
//! No retries, no timeout of its own.

use std::collections::BTreeMap;
use std::sync::Arc;

use authorizer_auth::{TOKEN_PATH, TokenRequest, TokenResponse};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use transport::{Transport, apply_headers};

use crate::config::{ADMIN_SECRET_HEADER, ClientConfig};
use crate::metrics::{self, Outcome};
use crate::result::{ErrorRecord, OperationResult, codes};

pub const GRAPHQL_PATH: &str = "/graphql";

/// Metrics/log label of the token exchange.
const TOKEN_OPERATION: &str = "oauth_token";

/// Per-call header overrides, highest precedence.
pub type HeaderOverrides = BTreeMap<String, String>;

/// Executes documents against `{authorizer_url}/graphql`.
#[derive(Clone)]
pub struct GraphqlExecutor {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl GraphqlExecutor {
    pub fn new(config: Arc<ClientConfig>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Header layers, lowest first: admin secret, instance extras (which
    /// carry the marker headers), per-call overrides.
    pub fn headers(&self, overrides: &HeaderOverrides) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(secret) = &self.config.admin_secret {
            apply_headers(&mut headers, [(ADMIN_SECRET_HEADER, secret.expose().as_str())]);
        }
        apply_headers(
            &mut headers,
            self.config
                .extra_headers
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
        apply_headers(
            &mut headers,
            overrides.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        headers
    }

    /// Send `{query, variables}` and normalize the envelope.
    pub async fn execute(
        &self,
        operation: &str,
        document: &str,
        variables: Value,
        overrides: &HeaderOverrides,
    ) -> OperationResult<Value> {
        let variables = match variables {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let body = serde_json::json!({ "query": document, "variables": variables });
        let url = format!("{}{GRAPHQL_PATH}", self.config.authorizer_url);

        let result = self.round_trip(operation, &url, overrides, body).await;
        let result = result.and_then(|json| self.classify(operation, json));
        if result.is_ok() {
            debug!(operation, "graphql request succeeded");
        }
        result
    }

    /// Exchange an authorization code at `{authorizer_url}/oauth/token`.
    ///
    /// The endpoint reports failures as `{error, error_description}`, which
    /// becomes a single record whose code is the OAuth error.
    pub async fn post_token(&self, request: &TokenRequest) -> OperationResult<TokenResponse> {
        let body = match serde_json::to_value(request) {
            Ok(body) => body,
            Err(e) => return OperationResult::from_error(e, codes::INVALID_INPUT),
        };
        let url = format!("{}{TOKEN_PATH}", self.config.authorizer_url);

        self.round_trip(TOKEN_OPERATION, &url, &HeaderOverrides::new(), body)
            .await
            .and_then(|json| {
                if let Some(record) = oauth_error(&json) {
                    warn!(code = ?record.code(), "token exchange rejected");
                    return OperationResult::err(vec![record]);
                }
                if let Some(errors) = error_array(&json) {
                    return OperationResult::err(errors.iter().map(to_record).collect());
                }
                deserialize(TOKEN_OPERATION, json)
            })
    }

    /// One POST; transport errors already converted, metrics recorded.
    async fn round_trip(
        &self,
        operation: &str,
        url: &str,
        overrides: &HeaderOverrides,
        body: Value,
    ) -> OperationResult<Value> {
        let headers = self.headers(overrides);
        let started = Stopwatch::start();
        match self.transport.post_json(url, headers, body).await {
            Ok(json) => {
                let outcome = if is_error_envelope(&json) {
                    Outcome::GraphqlError
                } else {
                    Outcome::Ok
                };
                metrics::record_request(operation, outcome, started.elapsed_secs());
                OperationResult::ok(json)
            }
            Err(e) => {
                warn!(operation, transport = self.transport.id(), error = %e, "request failed");
                metrics::record_request(operation, Outcome::TransportError, started.elapsed_secs());
                OperationResult::from_error(e, codes::TRANSPORT)
            }
        }
    }

    fn classify(&self, operation: &str, mut json: Value) -> OperationResult<Value> {
        if let Some(errors) = error_array(&json) {
            let records: Vec<ErrorRecord> = errors.iter().map(to_record).collect();
            if self.config.debug {
                warn!(operation, errors = ?records, "graphql errors");
            }
            return OperationResult::err(records);
        }
        if let Some(record) = oauth_error(&json) {
            if self.config.debug {
                warn!(operation, error = ?record, "graphql endpoint rejected request");
            }
            return OperationResult::err(vec![record]);
        }
        match json.get_mut("data").map(Value::take) {
            Some(data) if !data.is_null() => OperationResult::ok(data),
            _ => OperationResult::from_error(
                "response contained neither data nor errors",
                codes::INVALID_RESPONSE,
            ),
        }
    }
}

/// The non-empty `errors` array of a response, if any.
fn error_array(json: &Value) -> Option<&Vec<Value>> {
    json.get("errors")
        .and_then(Value::as_array)
        .filter(|errors| !errors.is_empty())
}

/// `{error, error_description}` as one record coded with `error`.
fn oauth_error(json: &Value) -> Option<ErrorRecord> {
    let error = json.get("error").and_then(Value::as_str)?;
    let message = json
        .get("error_description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .unwrap_or(error);
    Some(ErrorRecord::local(message, error))
}

/// GraphQL `errors` or an OAuth `error` string.
fn is_error_envelope(json: &Value) -> bool {
    error_array(json).is_some() || json.get("error").is_some_and(Value::is_string)
}

/// Server error objects are kept verbatim; anything that is not a GraphQL
/// error object is wrapped as its JSON text.
fn to_record(error: &Value) -> ErrorRecord {
    serde_json::from_value(error.clone())
        .unwrap_or_else(|_| ErrorRecord::local(error.to_string(), codes::INVALID_RESPONSE))
}

/// Unwrap `field` from `data` and deserialize it.
pub fn extract_field<T: DeserializeOwned>(
    result: OperationResult<Value>,
    field: &str,
) -> OperationResult<T> {
    result.and_then(|mut data| match data.get_mut(field).map(Value::take) {
        Some(value) if !value.is_null() => deserialize(field, value),
        _ => OperationResult::from_error(
            format!("response is missing field `{field}`"),
            codes::INVALID_RESPONSE,
        ),
    })
}

fn deserialize<T: DeserializeOwned>(field: &str, value: Value) -> OperationResult<T> {
    match serde_json::from_value(value) {
        Ok(data) => OperationResult::ok(data),
        Err(e) => OperationResult::from_error(
            format!("unexpected shape for `{field}`: {e}"),
            codes::INVALID_RESPONSE,
        ),
    }
}

/// Monotonic timer; browsers have no `Instant`, so wasm32 records no
/// duration.
struct Stopwatch(Option<std::time::Instant>);

impl Stopwatch {
    fn start() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        let started = Some(std::time::Instant::now());
        #[cfg(target_arch = "wasm32")]
        let started = None;
        Self(started)
    }

    fn elapsed_secs(&self) -> Option<f64> {
        self.0.map(|started| started.elapsed().as_secs_f64())
    }
}
