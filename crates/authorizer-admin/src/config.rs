//! Client configuration types and loading
//!
//! A config is built in code with `ClientConfig::new` or read from TOML.
//! The admin secret is never read from the TOML directly: it comes from
//! the `AUTHORIZER_ADMIN_SECRET` env var or `admin_secret_file`, env first.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use authorizer_auth::{DEFAULT_AUTHORIZE_TIMEOUT_SECS, FlowSettings, trim_url};
use common::Secret;
use serde::Deserialize;

/// Header carrying the admin secret.
pub const ADMIN_SECRET_HEADER: &str = "x-authorizer-admin-secret";

/// Marker header carrying the configured server URL.
pub const AUTHORIZER_URL_HEADER: &str = "x-authorizer-url";

/// Env var consulted for the admin secret.
pub const ADMIN_SECRET_ENV: &str = "AUTHORIZER_ADMIN_SECRET";

/// Client configuration.
///
/// After `validate()` both URLs are non-empty without a trailing slash,
/// `client_id` is trimmed and `extra_headers` holds the marker headers.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub authorizer_url: String,
    #[serde(default)]
    pub redirect_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(skip)]
    pub admin_secret: Option<Secret<String>>,
    /// File containing the admin secret (alternative to the env var)
    #[serde(default)]
    pub admin_secret_file: Option<PathBuf>,
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
    /// Log GraphQL error arrays
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_authorize_timeout")]
    pub authorize_timeout_secs: u64,
}

fn default_authorize_timeout() -> u64 {
    DEFAULT_AUTHORIZE_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(authorizer_url: impl Into<String>, redirect_url: impl Into<String>) -> Self {
        Self {
            authorizer_url: authorizer_url.into(),
            redirect_url: redirect_url.into(),
            client_id: String::new(),
            admin_secret: None,
            admin_secret_file: None,
            extra_headers: BTreeMap::new(),
            debug: false,
            authorize_timeout_secs: DEFAULT_AUTHORIZE_TIMEOUT_SECS,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_admin_secret(mut self, secret: impl Into<Secret<String>>) -> Self {
        self.admin_secret = Some(secret.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_authorize_timeout_secs(mut self, secs: u64) -> Self {
        self.authorize_timeout_secs = secs;
        self
    }

    /// Parse a TOML document, resolve the admin secret, then validate.
    pub fn from_toml_str(contents: &str) -> common::Result<Self> {
        let mut config: ClientConfig = toml::from_str(contents)?;
        config.resolve_admin_secret()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Admin secret resolution order:
    /// 1. AUTHORIZER_ADMIN_SECRET env var
    /// 2. admin_secret_file path from config
    fn resolve_admin_secret(&mut self) -> common::Result<()> {
        if let Ok(secret) = std::env::var(ADMIN_SECRET_ENV) {
            self.admin_secret = Some(Secret::new(secret));
        } else if let Some(ref secret_file) = self.admin_secret_file {
            let secret = std::fs::read_to_string(secret_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read admin_secret_file {}: {e}",
                    secret_file.display()
                ))
            })?;
            let secret = secret.trim().to_owned();
            if !secret.is_empty() {
                self.admin_secret = Some(Secret::new(secret));
            }
        }
        Ok(())
    }

    /// Check required fields and normalize. Idempotent.
    pub fn validate(&mut self) -> common::Result<()> {
        let authorizer_url = trim_url(&self.authorizer_url);
        if authorizer_url.is_empty() {
            return Err(common::Error::Config("Invalid authorizerURL".into()));
        }
        let redirect_url = trim_url(&self.redirect_url);
        if redirect_url.is_empty() {
            return Err(common::Error::Config("Invalid redirectURL".into()));
        }
        self.authorizer_url = authorizer_url;
        self.redirect_url = redirect_url;
        self.client_id = self.client_id.trim().to_owned();

        if self.authorize_timeout_secs == 0 {
            return Err(common::Error::Config(
                "authorize_timeout_secs must be greater than 0".into(),
            ));
        }

        // Marker headers replace caller-supplied ones of the same name
        self.extra_headers.retain(|name, _| {
            !name.eq_ignore_ascii_case(AUTHORIZER_URL_HEADER)
                && !name.eq_ignore_ascii_case("content-type")
        });
        self.extra_headers
            .insert(AUTHORIZER_URL_HEADER.into(), self.authorizer_url.clone());
        self.extra_headers
            .insert("Content-Type".into(), "application/json".into());
        Ok(())
    }

    /// Settings for the browser authorization flow.
    pub fn flow_settings(&self) -> FlowSettings {
        FlowSettings::new(&self.authorizer_url, &self.redirect_url, &self.client_id)
            .with_timeout(Duration::from_secs(self.authorize_timeout_secs))
    }
}
