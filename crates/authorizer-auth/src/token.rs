//! Authorization-code token exchange payloads
//!
//! The exchange itself is sent by the admin client so that it shares the
//! header layering and error normalization of every other call.

use serde::{Deserialize, Serialize};

/// Body posted to the token endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest {
    pub code: String,
    pub code_verifier: String,
    pub client_id: String,
    pub grant_type: &'static str,
}

impl TokenRequest {
    pub fn authorization_code(
        code: impl Into<String>,
        code_verifier: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            code_verifier: code_verifier.into(),
            client_id: client_id.into(),
            grant_type: "authorization_code",
        }
    }
}

/// Tokens issued by the token endpoint.
///
/// `expires_in` is a delta in seconds from the response time.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: i64,
}
