//! Reply envelopes returned by the server.
//!
//! # Design
//! - Core endpoints answer `{code, message, data}` ([`Reply`]). Business failures
//!   arrive as HTTP 200 with `code != 200`; [`Reply::accepted`] turns them into errors.
//! - Verification endpoints answer in several shapes; [`ReplyShape`] tags them and
//!   [`Normalized`] is the one shape callers see.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AccessError, AccessResult};

/// Business code of an accepted core reply.
pub const SUCCESS_CODE: i64 = 200;

const fn success_code() -> i64 {
    SUCCESS_CODE
}

/// Standard server reply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reply<T> {
    /// Business status code (`200` on success, assumed when absent).
    #[serde(default = "success_code")]
    pub code: i64,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Business payload.
    pub data: Option<T>,
}

impl<T: DeserializeOwned> Reply<T> {
    /// Decode a pipeline payload into a typed reply.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Decode`] when the payload does not match.
    pub fn decode(operation: &'static str, payload: Value) -> AccessResult<Self> {
        serde_json::from_value(payload).map_err(|source| AccessError::Decode { operation, source })
    }
}

impl<T> Reply<T> {
    /// Keep the reply when the server accepted the operation.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Rejected`] with the server message when `code` is
    /// not [`SUCCESS_CODE`].
    pub fn accepted(self, operation: &'static str) -> AccessResult<Self> {
        if self.code == SUCCESS_CODE {
            Ok(self)
        } else {
            Err(AccessError::Rejected {
                operation,
                code: self.code,
                message: self.message.filter(|text| !text.trim().is_empty()),
            })
        }
    }

    /// Take the payload, failing when the server sent none.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Validation`] when `data` is absent.
    pub fn into_data(self) -> AccessResult<T> {
        self.data
            .ok_or_else(|| AccessError::validation("data", "missing from reply"))
    }
}

/// Paged listing as returned by list endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Current page number.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size used by the server.
    #[serde(default)]
    pub page_size: Option<u32>,
    /// Total number of rows across all pages.
    #[serde(default)]
    pub total: u64,
    /// Rows of the current page.
    #[serde(default = "Vec::new", alias = "items", alias = "records", alias = "list")]
    pub item: Vec<T>,
}

/// Uniform result for verification flows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Normalized {
    /// Whether the server accepted the operation.
    pub success: bool,
    /// Server message, empty when none was sent.
    pub message: String,
    /// Payload, `Null` when none was sent.
    pub data: Value,
}

/// Reply shapes the verification endpoints are known to produce.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplyShape {
    /// `{success, message | msg, data}`.
    Flagged {
        /// Truthiness of `success`.
        success: bool,
        /// `message`, falling back to `msg`.
        message: String,
        /// `data` field.
        data: Value,
    },
    /// `{code, msg | message, data}`; `code == 0` means success.
    Coded {
        /// Business code.
        code: Option<i64>,
        /// `msg`, falling back to `message`.
        message: String,
        /// `data` field.
        data: Value,
    },
    /// Anything else is treated as a successful bare payload.
    Bare(Value),
}

impl ReplyShape {
    /// Tag a raw payload.
    #[must_use]
    pub fn detect(payload: Value) -> Self {
        let Value::Object(mut map) = payload else {
            return Self::Bare(payload);
        };
        if let Some(flag) = map.remove("success") {
            let message = text_field(&map, &["message", "msg"]);
            return Self::Flagged {
                success: truthy(&flag),
                message,
                data: map.remove("data").unwrap_or(Value::Null),
            };
        }
        if let Some(code) = map.remove("code") {
            let message = text_field(&map, &["msg", "message"]);
            return Self::Coded {
                code: code.as_i64(),
                message,
                data: map.remove("data").unwrap_or(Value::Null),
            };
        }
        Self::Bare(Value::Object(map))
    }

    /// Collapse into the uniform shape.
    #[must_use]
    pub fn normalize(self) -> Normalized {
        match self {
            Self::Flagged {
                success,
                message,
                data,
            } => Normalized {
                success,
                message,
                data,
            },
            Self::Coded {
                code,
                message,
                data,
            } => Normalized {
                success: code == Some(0),
                message,
                data,
            },
            Self::Bare(data) => Normalized {
                success: true,
                message: String::new(),
                data,
            },
        }
    }
}

impl From<Value> for Normalized {
    fn from(payload: Value) -> Self {
        ReplyShape::detect(payload).normalize()
    }
}

fn text_field(map: &serde_json::Map<String, Value>, names: &[&str]) -> String {
    names
        .iter()
        .filter_map(|name| map.get(*name))
        .find_map(|value| match value {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn reply_decodes_paged_listing() -> Result<()> {
        let payload = json!({
            "code": 200,
            "message": "操作成功",
            "data": {"total": 2, "item": [{"id": 1}, {"id": 2}]}
        });
        let reply: Reply<Page<Value>> = Reply::decode("article.home", payload)?;
        assert_eq!(reply.code, 200);
        let page = reply.into_data()?;
        assert_eq!(page.total, 2);
        assert_eq!(page.item.len(), 2);
        Ok(())
    }

    #[test]
    fn reply_without_data_reports_missing_payload() -> Result<()> {
        let reply: Reply<Value> = Reply::decode("user.logout", json!({"code": 200}))?;
        assert!(matches!(
            reply.into_data(),
            Err(AccessError::Validation { field: "data", .. })
        ));
        Ok(())
    }

    #[test]
    fn business_failures_carry_the_server_message() -> Result<()> {
        let payload = json!({"code": 500, "message": "用户名已被占用！", "data": null});
        let reply: Reply<Value> = Reply::decode("user.register", payload)?;
        let err = reply.accepted("user.register").err();
        assert!(matches!(
            err,
            Some(AccessError::Rejected {
                operation: "user.register",
                code: 500,
                ..
            })
        ));
        assert_eq!(err.map(|e| e.detail()).as_deref(), Some("用户名已被占用！"));
        Ok(())
    }

    #[test]
    fn missing_code_counts_as_accepted() -> Result<()> {
        let reply: Reply<Value> = Reply::decode("article.like", json!({"data": true}))?;
        assert_eq!(reply.code, SUCCESS_CODE);
        assert!(reply.accepted("article.like").is_ok());
        Ok(())
    }

    #[test]
    fn decode_failures_name_the_operation() {
        let err = Reply::<Page<Value>>::decode("article.home", json!({"data": 3})).err();
        assert!(matches!(
            err,
            Some(AccessError::Decode {
                operation: "article.home",
                ..
            })
        ));
    }

    #[test]
    fn flagged_shape_prefers_message_then_msg() {
        let normalized = Normalized::from(json!({"success": 1, "msg": "sent"}));
        assert!(normalized.success);
        assert_eq!(normalized.message, "sent");
        assert_eq!(normalized.data, Value::Null);

        let normalized = Normalized::from(json!({"success": false, "message": "bad", "msg": "x"}));
        assert!(!normalized.success);
        assert_eq!(normalized.message, "bad");
    }

    #[test]
    fn coded_shape_treats_zero_as_success() {
        let normalized = Normalized::from(json!({"code": 0, "msg": "ok", "data": {"v": 1}}));
        assert!(normalized.success);
        assert_eq!(normalized.data, json!({"v": 1}));

        let normalized = Normalized::from(json!({"code": 500, "message": "expired"}));
        assert!(!normalized.success);
        assert_eq!(normalized.message, "expired");
    }

    #[test]
    fn bare_payloads_default_to_success() {
        assert_eq!(
            Normalized::from(json!("done")),
            Normalized {
                success: true,
                message: String::new(),
                data: json!("done"),
            }
        );
        let normalized = Normalized::from(json!({"verified": true}));
        assert!(normalized.success);
        assert_eq!(normalized.data, json!({"verified": true}));
    }
}
