//! Account, profile and author-application endpoints.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use super::email::require_email;
use super::{Api, json_body};
use crate::envelope::Reply;
use crate::error::{AccessError, AccessResult};
use crate::model::Profile;
use crate::transport::{ApiRequest, Transport};

/// Username and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Plain-text password, sent form-encoded.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    fn validate(&self) -> AccessResult<()> {
        if self.username.trim().is_empty() {
            return Err(AccessError::validation("username", "must not be empty"));
        }
        if self.password.is_empty() {
            return Err(AccessError::validation("password", "must not be empty"));
        }
        Ok(())
    }

    fn form(&self) -> Vec<(String, String)> {
        vec![
            ("username".to_string(), self.username.clone()),
            ("password".to_string(), self.password.clone()),
        ]
    }
}

/// New account details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    /// Login credentials.
    pub credentials: Credentials,
    /// Optional display name.
    pub nickname: Option<String>,
    /// Optional contact email.
    pub email: Option<String>,
}

/// Editable profile fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// User identifier.
    pub id: i64,
    /// Display name.
    pub nickname: String,
    /// Contact email.
    pub email: String,
}

/// Password change request.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct PasswordChange {
    /// Current password.
    pub old_pwd: String,
    /// New password.
    pub new_pwd: String,
    /// New password, repeated.
    pub re_pwd: String,
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("PasswordChange(<redacted>)")
    }
}

/// Application for the author role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorApplication {
    /// Applicant's legal name.
    pub real_name: String,
    /// Identity document number.
    pub id_card: String,
    /// Motivation.
    pub apply_desc: String,
}

impl<T: Transport> Api<T> {
    /// Create an account.
    ///
    /// # Errors
    ///
    /// Validation errors for blank credentials, otherwise any pipeline error.
    pub async fn register(&self, registration: &Registration) -> AccessResult<Reply<Value>> {
        registration.credentials.validate()?;
        let mut form = registration.credentials.form();
        if let Some(nickname) = &registration.nickname {
            form.push(("nickname".to_string(), nickname.clone()));
        }
        if let Some(email) = &registration.email {
            form.push(("email".to_string(), email.clone()));
        }
        self.call("user.register", ApiRequest::post("/user/register").form(form))
            .await
    }

    /// Sign in with a password and start a session with the returned token.
    ///
    /// # Errors
    ///
    /// Validation errors for blank credentials or a reply without a token,
    /// otherwise any pipeline error.
    pub async fn login(&self, credentials: &Credentials) -> AccessResult<()> {
        credentials.validate()?;
        let reply: Reply<String> = self
            .call("user.login", ApiRequest::post("/user/login").form(credentials.form()))
            .await?;
        self.session().establish(reply.into_data()?)?;
        info!(username = %credentials.username, "signed in");
        Ok(())
    }

    /// End the session locally. Safe to call repeatedly.
    pub fn logout(&self) {
        self.session().end();
    }

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Pipeline errors, or [`AccessError::Decode`] for an unreadable profile.
    pub async fn user_info(&self) -> AccessResult<Profile> {
        let reply: Reply<Profile> = self
            .call("user.info", ApiRequest::get("/user/userInfo"))
            .await?;
        reply.into_data()
    }

    /// Update nickname and email, refreshing the cached profile on success.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> AccessResult<Reply<Value>> {
        let body = json_body("user.update", update)?;
        let reply = self
            .call("user.update", ApiRequest::put("/user/update").json(body))
            .await?;
        if let Some(mut profile) = self.session().profile().get() {
            profile.nickname = Some(update.nickname.clone());
            profile.email = Some(update.email.clone());
            self.session().profile().set(profile);
        }
        Ok(reply)
    }

    /// Point the avatar at a new URL.
    ///
    /// # Errors
    ///
    /// Validation error for a blank URL, otherwise any pipeline error.
    pub async fn update_avatar(&self, avatar_url: &str) -> AccessResult<Reply<Value>> {
        if avatar_url.trim().is_empty() {
            return Err(AccessError::validation("avatarUrl", "must not be empty"));
        }
        self.call(
            "user.avatar",
            ApiRequest::patch("/user/updateAvatar").query("avatarUrl", avatar_url),
        )
        .await
    }

    /// Change the password.
    ///
    /// # Errors
    ///
    /// Validation error when the repeated password differs, otherwise any pipeline error.
    pub async fn update_password(&self, change: &PasswordChange) -> AccessResult<Reply<Value>> {
        if change.new_pwd != change.re_pwd {
            return Err(AccessError::validation("re_pwd", "does not match new password"));
        }
        let body = json_body("user.password", change)?;
        self.call("user.password", ApiRequest::patch("/user/updatePwd").json(body))
            .await
    }

    /// Set a new password for the account registered under `email`, after the
    /// address was verified with an email code.
    ///
    /// # Errors
    ///
    /// Validation errors for a malformed email or a blank password, otherwise any
    /// pipeline error.
    pub async fn reset_password(&self, email: &str, new_password: &str) -> AccessResult<Reply<Value>> {
        let email = require_email(email)?;
        if new_password.trim().is_empty() {
            return Err(AccessError::validation("newPassword", "must not be empty"));
        }
        let body = json!({"email": email, "newPassword": new_password});
        self.call("user.reset_password", ApiRequest::post("/user/resetPassword").json(body))
            .await
    }

    /// Apply for the author role.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn submit_author_apply(&self, application: &AuthorApplication) -> AccessResult<Reply<Value>> {
        let body = json_body("user.author_apply", application)?;
        self.call("user.author_apply", ApiRequest::post("/user/author-apply").json(body))
            .await
    }

    /// Status of the current author application.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn author_apply_status(&self) -> AccessResult<Reply<Value>> {
        self.call("user.author_apply_status", ApiRequest::get("/user/author-apply/status"))
            .await
    }

    /// Withdraw the current author application.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn cancel_author_apply(&self) -> AccessResult<Reply<Value>> {
        self.call("user.author_apply_cancel", ApiRequest::delete("/user/author-apply"))
            .await
    }

    /// Articles collected by the current user.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn collections(&self) -> AccessResult<Reply<Value>> {
        self.call("user.collections", ApiRequest::get("/user/collections"))
            .await
    }
}
