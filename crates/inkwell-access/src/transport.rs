//! Transport seam between the pipeline and the network.
//!
//! # Design
//! - Requests are plain data so tests can record and assert them.
//! - Implementations only move bytes: no credential logic, no status interpretation.
//! - `?Send` futures keep browser transports (whose futures are `!Send`) on the same trait.

use std::fmt::{self, Display, Formatter};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// HTTP methods used by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Request body variants.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// `application/json`
    Json(Value),
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
}

/// A single outgoing call, addressed relative to the configured base path.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the base path, without query string.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Caller supplied headers.
    pub headers: Vec<(String, String)>,
    /// Optional body.
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    /// Start a request with no query, headers or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// `GET` shorthand.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `POST` shorthand.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// `PUT` shorthand.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// `PATCH` shorthand.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    /// `DELETE` shorthand.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Append a query parameter when a value is present.
    #[must_use]
    pub fn query_opt(self, name: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Append a set of query parameters.
    #[must_use]
    pub fn query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach a form-encoded body.
    #[must_use]
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }

    /// Set a header, replacing any existing value with the same (case-insensitive) name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// In-place variant of [`ApiRequest::header`].
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove_header(&name);
        self.headers.push((name, value.into()));
    }

    /// Remove every header matching `name`, ignoring case. Returns whether any was removed.
    pub fn remove_header(&mut self, name: &str) -> bool {
        let before = self.headers.len();
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        before != self.headers.len()
    }

    /// Look up a header value, ignoring case.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Number of headers matching `name`, ignoring case.
    #[must_use]
    pub fn header_count(&self, name: &str) -> usize {
        self.headers
            .iter()
            .filter(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .count()
    }
}

/// Response as seen by the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed body; `Value::Null` for empty bodies, a JSON string for non-JSON text.
    pub body: Value,
}

impl ApiResponse {
    /// Build a response from a status and body.
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Parse raw body bytes the way every transport should.
    #[must_use]
    pub fn body_from_bytes(bytes: &[u8]) -> Value {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Value::Null;
        }
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
    }
}

/// Moves a prepared request over the wire.
#[async_trait(?Send)]
pub trait Transport {
    /// Send `request` to `url` (base path already applied, query not yet encoded).
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response was received.
    async fn send(&self, url: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_helpers_ignore_case() {
        let mut request = ApiRequest::get("/user/userInfo")
            .header("authorization", "Bearer a")
            .header("Authorization", "Bearer b");
        assert_eq!(request.header_count("AUTHORIZATION"), 1);
        assert_eq!(request.header_value("Authorization"), Some("Bearer b"));
        assert!(request.remove_header("Authorization"));
        assert!(!request.remove_header("Authorization"));
        assert!(request.headers.is_empty());
    }

    #[test]
    fn body_from_bytes_handles_empty_json_and_text() {
        assert_eq!(ApiResponse::body_from_bytes(b""), Value::Null);
        assert_eq!(ApiResponse::body_from_bytes(b"  \n"), Value::Null);
        assert_eq!(
            ApiResponse::body_from_bytes(br#"{"code":0}"#),
            json!({"code": 0})
        );
        assert_eq!(
            ApiResponse::body_from_bytes(b"Bad Gateway"),
            Value::String("Bad Gateway".into())
        );
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(ApiResponse::new(204, Value::Null).is_success());
        assert!(!ApiResponse::new(301, Value::Null).is_success());
        assert!(!ApiResponse::new(401, Value::Null).is_success());
    }

    #[test]
    fn method_renders_upper_case() {
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }
}
