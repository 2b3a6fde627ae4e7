//! URL and form encoding for outgoing requests.

use urlencoding::encode;

/// `name=value` pairs joined with `&`, both sides percent-encoded.
#[must_use]
pub fn form_urlencoded(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| format!("{}={}", encode(name), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append `query` to `url`, respecting any query string already present.
#[must_use]
pub fn with_query(url: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{}", form_urlencoded(query))
}
