//! Phone-number sign-up and sign-in. These endpoints are public.

use serde_json::Value;
use tracing::info;

use super::Api;
use crate::envelope::Reply;
use crate::error::{AccessError, AccessResult};
use crate::transport::{ApiRequest, Transport};

/// What a verification code will be used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodePurpose {
    /// Account registration.
    Register,
    /// Sign-in.
    Login,
    /// Password reset by phone.
    Reset,
    /// Password recovery by email.
    Forgot,
}

impl CodePurpose {
    /// Wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::Reset => "reset",
            Self::Forgot => "forgot",
        }
    }
}

fn require_phone(phone: &str) -> AccessResult<&str> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(AccessError::validation("phone", "must not be empty"));
    }
    Ok(phone)
}

impl<T: Transport> Api<T> {
    /// Send an SMS verification code.
    ///
    /// # Errors
    ///
    /// [`AccessError::Validation`] for a blank number, otherwise any pipeline error.
    pub async fn send_sms_code(&self, phone: &str, purpose: CodePurpose) -> AccessResult<Reply<Value>> {
        let phone = require_phone(phone)?;
        let request = ApiRequest::post("/api/sms/send-code")
            .query("targets", phone)
            .query("type", purpose.as_str());
        self.call("phone.send_code", request).await
    }

    /// Register with a phone number and SMS code.
    ///
    /// # Errors
    ///
    /// [`AccessError::Validation`] for a blank number, otherwise any pipeline error.
    pub async fn register_by_phone(
        &self,
        username: &str,
        password: &str,
        phone: &str,
        code: &str,
    ) -> AccessResult<Reply<Value>> {
        let phone = require_phone(phone)?;
        let request = ApiRequest::post("/user/register-by-phone")
            .query("username", username)
            .query("password", password)
            .query("phone", phone)
            .query("code", code);
        self.call("phone.register", request).await
    }

    /// Sign in with a phone number and SMS code, starting a session with the returned token.
    ///
    /// # Errors
    ///
    /// [`AccessError::Validation`] for a blank number or a reply without a token,
    /// otherwise any pipeline error.
    pub async fn login_by_phone(&self, phone: &str, code: &str) -> AccessResult<()> {
        let phone = require_phone(phone)?;
        let request = ApiRequest::post("/user/login-by-phone")
            .query("phone", phone)
            .query("code", code);
        let reply: Reply<String> = self.call("phone.login", request).await?;
        self.session().establish(reply.into_data()?)?;
        info!("signed in by phone");
        Ok(())
    }

    /// Whether a phone number is already registered.
    ///
    /// # Errors
    ///
    /// [`AccessError::Validation`] for a blank number, otherwise any pipeline error.
    pub async fn check_phone(&self, phone: &str) -> AccessResult<Reply<Value>> {
        let phone = require_phone(phone)?;
        self.call("phone.check", ApiRequest::get("/user/check-phone").query("phone", phone))
            .await
    }
}
