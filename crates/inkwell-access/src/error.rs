//! # Design
//!
//! - Provide structured, constant-message errors for the access layer.
//! - Keep request context (method, path, status) in fields so callers can branch on it.
//! - Transport failures (no response) stay distinct from well-formed rejections;
//!   only the latter can ever be interpreted as a session event.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::transport::Method;

/// Result alias for access layer operations.
pub type AccessResult<T> = Result<T, AccessError>;

/// Failures raised before a response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the transport timeout.
    #[error("request timed out")]
    Timeout {
        /// Fully qualified request URL.
        url: String,
    },
    /// The connection could not be established or was dropped.
    #[error("connection failed")]
    Connect {
        /// Fully qualified request URL.
        url: String,
        /// Transport-specific detail.
        detail: String,
    },
    /// The request could not be assembled (invalid URL, header or body).
    #[error("request could not be built")]
    Build {
        /// Request URL as provided.
        url: String,
        /// Transport-specific detail.
        detail: String,
    },
    /// The response arrived but its body could not be read.
    #[error("response body could not be read")]
    Body {
        /// Fully qualified request URL.
        url: String,
        /// Transport-specific detail.
        detail: String,
    },
}

/// Failures raised by persistence backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage io failure")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// File involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Stored document was not valid JSON.
    #[error("storage json failure")]
    Json {
        /// Key or file whose document failed to parse.
        key: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// The storage backend rejected the operation.
    #[error("storage backend unavailable")]
    Unavailable {
        /// Key involved in the operation.
        key: String,
        /// Backend-specific detail.
        detail: String,
    },
}

/// Primary error type for the access layer.
#[derive(Debug, Error)]
pub enum AccessError {
    /// No response was received.
    #[error("request transport failure")]
    Transport {
        /// HTTP method of the failing call.
        method: Method,
        /// Request path (relative to the base path).
        path: String,
        /// Underlying transport error.
        source: TransportError,
    },
    /// The server answered 401.
    #[error("request unauthorized")]
    Unauthorized {
        /// HTTP method of the failing call.
        method: Method,
        /// Request path (relative to the base path).
        path: String,
        /// Whether the pipeline treated the failure as session expiry.
        session_cleared: bool,
    },
    /// The server answered with a non-success status other than 401.
    #[error("request rejected with status {status}")]
    Status {
        /// HTTP method of the failing call.
        method: Method,
        /// Request path (relative to the base path).
        path: String,
        /// HTTP status code.
        status: u16,
        /// Server supplied message when the body carried one.
        message: Option<String>,
    },
    /// The server answered 2xx but refused the operation in its reply envelope.
    #[error("request refused with business code {code}")]
    Rejected {
        /// Logical operation that was refused.
        operation: &'static str,
        /// Business code from the envelope.
        code: i64,
        /// Server supplied message when the envelope carried one.
        message: Option<String>,
    },
    /// A payload could not be decoded into the expected shape.
    #[error("response payload could not be decoded")]
    Decode {
        /// Logical operation that produced the payload.
        operation: &'static str,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// A request body could not be serialized.
    #[error("request payload could not be encoded")]
    Encode {
        /// Logical operation that built the payload.
        operation: &'static str,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// Every candidate of a fallback plan failed.
    #[error("all candidate routes failed")]
    Exhausted {
        /// Logical operation the plan serves.
        operation: &'static str,
        /// Number of candidates attempted.
        attempts: usize,
        /// Error raised by the last candidate.
        #[source]
        last: Box<AccessError>,
    },
    /// Input was rejected before any network call.
    #[error("invalid input")]
    Validation {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason.
        reason: &'static str,
    },
    /// A classification rule failed to compile.
    #[error("invalid classification rule")]
    RuleCompile {
        /// Offending pattern.
        pattern: &'static str,
        /// Underlying regex error.
        source: regex::Error,
    },
    /// A persistence backend failed.
    #[error("session storage failure")]
    Storage {
        /// Storage key involved.
        key: String,
        /// Underlying storage error.
        source: StorageError,
    },
}

impl AccessError {
    /// Convenience constructor for validation failures.
    #[must_use]
    pub const fn validation(field: &'static str, reason: &'static str) -> Self {
        Self::Validation { field, reason }
    }

    /// HTTP status carried by the error, when the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            Self::Exhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Whether the error originated before any response was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Human-readable detail suitable for a screen-level message.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            }
            | Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Exhausted { last, .. } => last.detail(),
            Self::Validation { field, reason } => format!("{field}: {reason}"),
            Self::Transport { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn status_is_reported_through_exhaustion() {
        let err = AccessError::Exhausted {
            operation: "article.detail",
            attempts: 3,
            last: Box::new(AccessError::Status {
                method: Method::Get,
                path: "/article/detail/7".into(),
                status: 404,
                message: None,
            }),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.source().is_some());
        assert!(!err.is_transport());
    }

    #[test]
    fn detail_prefers_server_message() {
        let err = AccessError::Status {
            method: Method::Post,
            path: "/user/login".into(),
            status: 500,
            message: Some("密码错误".into()),
        };
        assert_eq!(err.detail(), "密码错误");
        assert_eq!(err.to_string(), "request rejected with status 500");
    }

    #[test]
    fn validation_detail_names_field() {
        let err = AccessError::validation("keyword", "must not be empty");
        assert_eq!(err.detail(), "keyword: must not be empty");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn transport_errors_are_flagged() {
        let err = AccessError::Transport {
            method: Method::Get,
            path: "/search".into(),
            source: TransportError::Timeout {
                url: "http://localhost/api/search".into(),
            },
        };
        assert!(err.is_transport());
        assert_eq!(err.detail(), "request timed out");
    }
}
