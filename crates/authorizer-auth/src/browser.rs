//! Browser environment capability
//!
//! The authorization flow never touches ambient browser globals. Everything
//! it needs from the page (context detection, navigation, hidden frames and
//! the cross-context message channel) comes through `BrowserEnvironment`,
//! injected by the host. Outside a browser, `HeadlessEnvironment` reports
//! that no window exists and the flow fails fast.

use std::future::Future;
use std::pin::Pin;

use tracing::warn;

/// Boxed future returned by environments.
#[cfg(not(target_arch = "wasm32"))]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
#[cfg(target_arch = "wasm32")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Handle to a hidden frame created by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Page-level operations the authorization flow depends on.
pub trait BrowserEnvironment: Send + Sync {
    /// Whether a window/document context exists.
    fn has_window(&self) -> bool;

    /// Current page URL, if known.
    fn current_location(&self) -> Option<String>;

    /// Replace the current page with `url` (no history entry).
    fn navigate(&self, url: &str);

    /// Create an invisible frame pointed at `url`.
    fn create_hidden_frame(&self, url: &str) -> FrameId;

    /// Remove a frame created by `create_hidden_frame`.
    fn remove_frame(&self, frame: FrameId);

    /// Resolve with the data of the next message posted from `origin`.
    ///
    /// Messages from any other origin must be ignored. Resolves to `None`
    /// if the channel is torn down before a message arrives.
    fn next_message<'a>(&'a self, origin: &'a str) -> BoxFuture<'a, Option<serde_json::Value>>;
}

/// Environment for non-browser hosts: no window, no navigation.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessEnvironment;

impl BrowserEnvironment for HeadlessEnvironment {
    fn has_window(&self) -> bool {
        false
    }

    fn current_location(&self) -> Option<String> {
        None
    }

    fn navigate(&self, url: &str) {
        warn!(url, "navigation requested without a browser window, ignoring");
    }

    fn create_hidden_frame(&self, _url: &str) -> FrameId {
        FrameId(0)
    }

    fn remove_frame(&self, _frame: FrameId) {}

    fn next_message<'a>(&'a self, _origin: &'a str) -> BoxFuture<'a, Option<serde_json::Value>> {
        Box::pin(async { None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn headless_reports_no_window() {
        let env = HeadlessEnvironment;
        assert!(!env.has_window());
        assert!(env.current_location().is_none());
        assert!(env.next_message("http://localhost:8080").await.is_none());
    }
}
