//! Default transport backed by reqwest.
//!
//! On native targets the client keeps a cookie store so an admin session
//! cookie set by `_admin_login` is sent on later calls. On wasm32 reqwest
//! drives the browser `fetch`, and each request asks for
//! `credentials: include` so the browser's own cookie jar is used.

use reqwest::header::HeaderMap;
use tracing::debug;

use crate::{BoxFuture, Result, Transport, TransportError};

/// reqwest-based `Transport`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client suited to the current execution context.
    pub fn new() -> Result<Self> {
        #[cfg(not(target_arch = "wasm32"))]
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        #[cfg(target_arch = "wasm32")]
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client (custom TLS, proxies, timeouts).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn id(&self) -> &str {
        "reqwest"
    }

    fn post_json<'a>(
        &'a self,
        url: &'a str,
        headers: HeaderMap,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<serde_json::Value>> {
        Box::pin(async move {
            let request = self.client.post(url).headers(headers).json(&body);
            #[cfg(target_arch = "wasm32")]
            let request = request.fetch_credentials_include();

            let response = request.send().await?;
            let status = response.status();
            debug!(url, status = status.as_u16(), "received response");

            let bytes = response.bytes().await?;
            serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode {
                status: status.as_u16(),
                message: e.to_string(),
            })
        })
    }
}
