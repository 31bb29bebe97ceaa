//! Authorization responses delivered through the message channel

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Result of an authorization round-trip.
///
/// For the code flow only `code` and `state` are set; the implicit flow
/// carries the tokens directly. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AuthorizeResponse {
    /// Parse message data, accepting `{response: {...}}` or a bare object.
    pub fn from_message(data: serde_json::Value) -> Result<Self> {
        let payload = match data {
            serde_json::Value::Object(mut map) => match map.remove("response") {
                Some(inner @ serde_json::Value::Object(_)) => inner,
                Some(other) => {
                    map.insert("response".into(), other);
                    serde_json::Value::Object(map)
                }
                None => serde_json::Value::Object(map),
            },
            other => {
                return Err(Error::MalformedMessage(format!(
                    "expected an object, got {other}"
                )));
            }
        };
        serde_json::from_value(payload).map_err(|e| Error::MalformedMessage(e.to_string()))
    }

    /// The provider error carried by this response, if any.
    pub fn provider_error(&self) -> Option<Error> {
        self.error.as_ref().map(|error| Error::Provider {
            error: error.clone(),
            description: self.error_description.clone().unwrap_or_default(),
        })
    }
}
