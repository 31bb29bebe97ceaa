//! Primitive helpers: URL trimming, random strings, opaque encoding and
//! query-string serialization.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use rand::RngExt;

/// Trim whitespace and every trailing `/`.
///
/// Idempotent: `trim_url(&trim_url(u)) == trim_url(u)`.
pub fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}

/// 43-character random string over the URL-safe base64 alphabet.
///
/// Built from 32 bytes of OS-seeded randomness, which is also a valid
/// RFC 7636 code verifier length.
pub fn create_random_string() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Opaque encoding used for `state`, `nonce` and the fallback config state.
pub fn encode(value: &str) -> String {
    STANDARD.encode(value.as_bytes())
}

/// Serialize pairs as `k=v&k=v`, percent-encoding keys and values.
///
/// Pairs with a `None` value are left out; order is preserved.
pub fn create_query_params<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    params
        .into_iter()
        .filter_map(|(key, value)| {
            value.map(|v| format!("{}={}", urlencoding::encode(key), urlencoding::encode(v)))
        })
        .collect::<Vec<_>>()
        .join("&")
}
