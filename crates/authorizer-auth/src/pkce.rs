//! PKCE (Proof Key for Code Exchange) implementation per RFC 7636
//!
//! The verifier lives in a `PkceSession` owned by a single `authorize()`
//! call. It is handed back to the caller together with the authorization
//! response and consumed by the token exchange, so two concurrent
//! authorizations never share a verifier.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use crate::util::create_random_string;

/// Generate a fresh random PKCE code verifier (43 URL-safe characters).
pub fn generate_verifier() -> String {
    create_random_string()
}

/// Compute the S256 code challenge from a verifier.
///
/// `challenge = BASE64URL(SHA256(verifier))`, unpadded.
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Call-scoped PKCE state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceSession {
    verifier: String,
}

impl PkceSession {
    /// Start a session with a freshly generated verifier.
    pub fn generate() -> Self {
        Self {
            verifier: generate_verifier(),
        }
    }

    /// Challenge to send in the authorize URL.
    pub fn challenge(&self) -> String {
        compute_challenge(&self.verifier)
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// Consume the session, yielding the verifier for the token exchange.
    pub fn into_verifier(self) -> String {
        self.verifier
    }
}
