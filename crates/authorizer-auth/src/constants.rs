//! Authorization flow constants
//!
//! Paths are relative to the configured authorizer URL, which is always
//! stored without a trailing slash.

/// How long a silent (iframe) authorization waits for a message, in seconds.
pub const DEFAULT_AUTHORIZE_TIMEOUT_SECS: u64 = 60;

/// Authorization endpoint path.
pub const AUTHORIZE_PATH: &str = "/authorize";

/// Hosted login app, used as the interactive fallback.
pub const APP_PATH: &str = "/app";

/// Token endpoint path for the authorization-code exchange.
pub const TOKEN_PATH: &str = "/oauth/token";

/// Scopes requested on every authorization.
pub const BASE_SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// Added when the caller wants a refresh token.
pub const OFFLINE_ACCESS_SCOPE: &str = "offline_access";

/// Provider error codes meaning the user must log in interactively.
pub const INTERACTIVE_LOGIN_ERRORS: [&str; 4] = [
    "login_required",
    "interaction_required",
    "consent_required",
    "account_selection_required",
];
