//! Email verification codes. Replies come in several shapes and are normalized.

use super::Api;
use super::phone::CodePurpose;
use crate::envelope::Normalized;
use crate::error::{AccessError, AccessResult};
use crate::transport::{ApiRequest, Transport};

pub(super) fn require_email(email: &str) -> AccessResult<&str> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AccessError::validation("email", "must be an email address"));
    }
    Ok(email)
}

impl<T: Transport> Api<T> {
    /// Send a verification code to `email`.
    ///
    /// # Errors
    ///
    /// [`AccessError::Validation`] for a malformed address, otherwise any pipeline error.
    pub async fn send_email_code(&self, email: &str, purpose: CodePurpose) -> AccessResult<Normalized> {
        let email = require_email(email)?;
        let request = ApiRequest::post("/api/email/send-code").form(vec![
            ("email".to_string(), email.to_string()),
            ("type".to_string(), purpose.as_str().to_string()),
        ]);
        Ok(Normalized::from(self.pipeline().send(request).await?))
    }

    /// Check a verification code.
    ///
    /// # Errors
    ///
    /// [`AccessError::Validation`] for a malformed address or blank code,
    /// otherwise any pipeline error.
    pub async fn verify_email_code(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
    ) -> AccessResult<Normalized> {
        let email = require_email(email)?;
        if code.trim().is_empty() {
            return Err(AccessError::validation("code", "must not be empty"));
        }
        let request = ApiRequest::post("/api/email/verify").form(vec![
            ("email".to_string(), email.to_string()),
            ("code".to_string(), code.trim().to_string()),
            ("type".to_string(), purpose.as_str().to_string()),
        ]);
        Ok(Normalized::from(self.pipeline().send(request).await?))
    }
}
