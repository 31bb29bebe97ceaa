//! Common error types

use thiserror::Error;

/// Errors raised while building a client, before any network activity.
///
/// These are the only errors the workspace raises as `Err`; every failure
/// after construction is reported inside an operation result instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;
