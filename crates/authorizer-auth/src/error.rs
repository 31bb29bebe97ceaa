//! Error types for the browser authorization flow

use crate::constants::INTERACTIVE_LOGIN_ERRORS;

/// Errors from `authorize()`.
///
/// None of these are raised to the caller: the client reports them inside
/// an operation result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("this feature is only supported in browser")]
    BrowserUnavailable,

    #[error("authorization timed out after {0}s")]
    Timeout(u64),

    #[error("{error}: {description}")]
    Provider { error: String, description: String },

    #[error("malformed authorization message: {0}")]
    MalformedMessage(String),

    #[error("authorization flow stopped unexpectedly: {0}")]
    Interrupted(String),
}

impl Error {
    /// Whether the identity provider asked for an interactive login.
    pub fn requires_interactive_login(&self) -> bool {
        match self {
            Error::Provider { error, .. } => INTERACTIVE_LOGIN_ERRORS.contains(&error.as_str()),
            _ => false,
        }
    }

    /// Stable code for error records.
    pub fn code(&self) -> &'static str {
        match self {
            Error::BrowserUnavailable => "browser_unavailable",
            Error::Timeout(_) => "timeout",
            Error::Provider { .. } => "provider_error",
            Error::MalformedMessage(_) => "malformed_message",
            Error::Interrupted(_) => "interrupted",
        }
    }
}

/// Result alias for auth flow operations.
pub type Result<T> = std::result::Result<T, Error>;
