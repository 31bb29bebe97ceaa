//! Layered header injection
//!
//! Headers are applied in layers, lowest precedence first. A later layer
//! replaces a same-named header from an earlier one. Names compare
//! case-insensitively, as `HeaderMap` does.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::str::FromStr;
use tracing::warn;

/// Apply one layer of headers on top of `headers`.
///
/// Invalid names or values are skipped with a warning; the value itself is
/// never logged since layers may carry credentials.
pub fn apply_headers<'a, I>(headers: &mut HeaderMap, layer: I)
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    for (raw_name, raw_value) in layer {
        let name = match HeaderName::from_str(raw_name) {
            Ok(n) => n,
            Err(e) => {
                warn!(header = %raw_name, error = %e, "skipping invalid header name");
                continue;
            }
        };
        let value = match HeaderValue::from_str(raw_value) {
            Ok(v) => v,
            Err(e) => {
                warn!(header = %raw_name, error = %e, "skipping invalid header value");
                continue;
            }
        };
        headers.insert(name, value);
    }
}
