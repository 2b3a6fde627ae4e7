//! Session data shared by the stores, pipeline and guard.

use std::fmt::{self, Debug, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::defaults::BEARER_PREFIX;
use crate::error::AccessError;

/// Opaque bearer credential. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Validation`] when the value is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccessError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AccessError::validation("credential", "must not be empty"));
        }
        Ok(Self(raw))
    }

    /// Raw stored value, exactly as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value; a stored value that already carries the
    /// bearer prefix is not wrapped twice.
    #[must_use]
    pub fn bearer_value(&self) -> String {
        if self.0.starts_with(BEARER_PREFIX) {
            self.0.clone()
        } else {
            format!("{BEARER_PREFIX}{}", self.0)
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("Credential(<redacted>)")
    }
}

/// Server-assigned role codes. The integers are a wire contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Article author.
    Author,
    /// Regular reader.
    #[default]
    User,
}

impl Role {
    /// Wire code for the role.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Admin => 0,
            Self::Author => 1,
            Self::User => 2,
        }
    }

    /// Lower-case label used in logs and CLI output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Author => "author",
            Self::User => "user",
        }
    }
}

impl TryFrom<i64> for Role {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Admin),
            1 => Ok(Self::Author),
            2 => Ok(Self::User),
            other => Err(format!("unknown role code {other}")),
        }
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        role.code()
    }
}

/// Cached user record used for role-gated decisions.
///
/// Fields the client does not interpret are kept in `extra` so a persisted
/// profile round-trips verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// User identifier.
    pub id: i64,
    /// Role; the server defaults missing roles to [`Role::User`].
    #[serde(default)]
    pub role: Role,
    /// Login name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_pic: Option<String>,
    /// Remaining server fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Profile with only an id and role, for tests and fixtures.
    #[must_use]
    pub fn new(id: i64, role: Role) -> Self {
        Self {
            id,
            role,
            username: None,
            nickname: None,
            email: None,
            user_pic: None,
            extra: Map::new(),
        }
    }

    /// Name to show for the user.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.nickname
            .as_deref()
            .or(self.username.as_deref())
            .map_or_else(|| format!("user #{}", self.id), str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn credential_rejects_blank_values() {
        assert!(Credential::new("").is_err());
        assert!(Credential::new("   ").is_err());
        assert!(Credential::new("abc").is_ok());
    }

    #[test]
    fn bearer_value_never_double_prefixes() -> Result<()> {
        assert_eq!(Credential::new("abc")?.bearer_value(), "Bearer abc");
        assert_eq!(Credential::new("Bearer abc")?.bearer_value(), "Bearer abc");
        Ok(())
    }

    #[test]
    fn credential_debug_is_redacted() -> Result<()> {
        let rendered = format!("{:?}", Credential::new("secret-token")?);
        assert!(!rendered.contains("secret-token"));
        Ok(())
    }

    #[test]
    fn role_codes_are_fixed() -> Result<()> {
        assert_eq!(Role::Admin.code(), 0);
        assert_eq!(Role::Author.code(), 1);
        assert_eq!(Role::User.code(), 2);
        assert_eq!(serde_json::to_value(Role::Author)?, json!(1));
        assert!(serde_json::from_value::<Role>(json!(7)).is_err());
        Ok(())
    }

    #[test]
    fn profile_keeps_unknown_fields_and_defaults_role() -> Result<()> {
        let raw = json!({
            "id": 9,
            "username": "reader",
            "userPic": "https://cdn.example/p.png",
            "status": 0,
            "createTime": "2024-05-01 10:00:00"
        });
        let profile: Profile = serde_json::from_value(raw.clone())?;
        assert_eq!(profile.role, Role::User);
        assert_eq!(profile.user_pic.as_deref(), Some("https://cdn.example/p.png"));
        assert_eq!(profile.display_name(), "reader");

        let back = serde_json::to_value(&profile)?;
        assert_eq!(back["status"], json!(0));
        assert_eq!(back["createTime"], raw["createTime"]);
        assert_eq!(back["role"], json!(2));
        Ok(())
    }
}
