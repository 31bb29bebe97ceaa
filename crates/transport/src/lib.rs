//! HTTP transport abstraction for the Authorizer GraphQL endpoint
//!
//! Defines the `Transport` trait that decouples the result normalizer from
//! the HTTP stack. `ReqwestTransport` is the default implementation and picks
//! the right fetch backend for the compilation target; tests and embedders
//! can supply their own implementation behind `Arc<dyn Transport>`.

pub mod headers;
pub mod reqwest_transport;

pub use headers::apply_headers;
pub use reqwest_transport::ReqwestTransport;

use reqwest::header::HeaderMap;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by transports.
///
/// Browser fetch futures are not `Send`, so the bound is dropped on wasm32.
#[cfg(not(target_arch = "wasm32"))]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
#[cfg(target_arch = "wasm32")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Local or network failure while talking to the server.
///
/// Never leaves the client as an `Err`: the normalizer turns it into a
/// single error record.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("invalid response body (status {status}): {message}")]
    Decode { status: u16, message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Http(err.to_string())
    }
}

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// A single JSON-over-HTTP POST.
///
/// Implementations must always send credentials (cookies) with the request
/// and must not retry: one call is one round-trip.
pub trait Transport: Send + Sync {
    /// Identifier for logging (e.g. "reqwest").
    fn id(&self) -> &str;

    /// POST `body` as JSON to `url` and parse the response body as JSON.
    ///
    /// The response status is not interpreted: GraphQL servers report
    /// failures in the body, which is returned as long as it is valid JSON.
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        headers: HeaderMap,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<serde_json::Value>>;
}
