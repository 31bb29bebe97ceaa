//! The uniform operation result
//!
//! Every operation after construction resolves to an `OperationResult`.
//! Failures are data: callers branch on `errors.is_empty()`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a GraphQL error in the document (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// One error, either passed through verbatim from the server or made
/// locally (transport failure, auth flow failure, bad response shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<ErrorLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ErrorRecord {
    /// A locally synthesized record carrying `extensions.code`.
    pub fn local(message: impl Into<String>, code: &str) -> Self {
        let mut extensions = serde_json::Map::new();
        extensions.insert("code".into(), serde_json::Value::String(code.into()));
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            extensions: Some(extensions),
        }
    }

    /// `extensions.code`, when present.
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.get("code")?.as_str()
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Error codes used for locally synthesized records.
pub mod codes {
    pub const TRANSPORT: &str = "transport_error";
    pub const INVALID_RESPONSE: &str = "invalid_response";
    pub const INVALID_INPUT: &str = "invalid_input";
}

/// `{data, errors}` with the invariant that non-empty `errors` means
/// `data` is `None`. Void operations succeed with `data: None` and no errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub data: Option<T>,
    pub errors: Vec<ErrorRecord>,
}

impl<T> OperationResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// Success without a payload.
    pub fn empty() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
        }
    }

    /// Failure. An empty `errors` is replaced by a generic record so the
    /// result still reads as failed.
    pub fn err(mut errors: Vec<ErrorRecord>) -> Self {
        if errors.is_empty() {
            errors.push(ErrorRecord::local("unknown error", codes::INVALID_RESPONSE));
        }
        Self { data: None, errors }
    }

    /// Failure from a single local error.
    pub fn from_error(err: impl fmt::Display, code: &str) -> Self {
        Self::err(vec![ErrorRecord::local(err.to_string(), code)])
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationResult<U> {
        OperationResult {
            data: self.data.map(f),
            errors: self.errors,
        }
    }

    /// Chain a fallible step that itself produces a result.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> OperationResult<U>) -> OperationResult<U> {
        if !self.errors.is_empty() {
            return OperationResult::err(self.errors);
        }
        match self.data {
            Some(data) => f(data),
            None => OperationResult::empty(),
        }
    }

    pub fn into_result(self) -> Result<Option<T>, Vec<ErrorRecord>> {
        if self.errors.is_empty() {
            Ok(self.data)
        } else {
            Err(self.errors)
        }
    }
}
