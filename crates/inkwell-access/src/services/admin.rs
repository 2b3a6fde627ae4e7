//! Administrator endpoints: statistics, user management, author-application review.

use serde_json::{Value, json};

use super::Api;
use crate::envelope::Reply;
use crate::error::AccessResult;
use crate::model::Role;
use crate::transport::{ApiRequest, Transport};

/// Filters for the user list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Rows per page.
    pub page_size: Option<u32>,
    /// Restrict to a role.
    pub role: Option<Role>,
    /// Username substring.
    pub username: Option<String>,
    /// Account status code.
    pub status: Option<i64>,
}

/// Filters for author applications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyFilter {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Rows per page.
    pub page_size: Option<u32>,
    /// Application status (0 pending, 1 approved, 2 rejected).
    pub status: Option<i64>,
}

/// Review outcome for an author application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuditDecision {
    /// Grant the author role.
    Approve,
    /// Refuse with a reason (may be empty).
    Reject {
        /// Reason shown to the applicant.
        reason: String,
    },
}

impl AuditDecision {
    /// Request body for the audit endpoint.
    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            Self::Approve => json!({"status": 1}),
            Self::Reject { reason } => json!({"status": 2, "rejectReason": reason}),
        }
    }
}

impl<T: Transport> Api<T> {
    /// Platform statistics.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn statistics(&self) -> AccessResult<Reply<Value>> {
        self.call("admin.statistics", ApiRequest::get("/admin/statistics"))
            .await
    }

    /// Users matching `filter`.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn users(&self, filter: &UserFilter) -> AccessResult<Reply<Value>> {
        let request = ApiRequest::get("/admin/users")
            .query_opt("page", filter.page)
            .query_opt("pageSize", filter.page_size)
            .query_opt("role", filter.role.map(Role::code))
            .query_opt("username", filter.username.as_deref())
            .query_opt("status", filter.status);
        self.call("admin.users", request).await
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn update_user_role(&self, user_id: i64, role: Role) -> AccessResult<Reply<Value>> {
        let request =
            ApiRequest::put(format!("/admin/users/{user_id}/role")).json(json!({"role": role.code()}));
        self.call("admin.user_role", request).await
    }

    /// Enable or disable a user.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn update_user_status(&self, user_id: i64, status: i64) -> AccessResult<Reply<Value>> {
        let request =
            ApiRequest::put(format!("/admin/users/{user_id}/status")).json(json!({"status": status}));
        self.call("admin.user_status", request).await
    }

    /// Ban a user.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn ban_user(&self, user_id: i64) -> AccessResult<Reply<Value>> {
        self.call("admin.ban", ApiRequest::put(format!("/admin/users/{user_id}/ban")))
            .await
    }

    /// Lift a ban.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn unban_user(&self, user_id: i64) -> AccessResult<Reply<Value>> {
        self.call("admin.unban", ApiRequest::put(format!("/admin/users/{user_id}/unban")))
            .await
    }

    /// Author applications matching `filter`.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn author_applies(&self, filter: ApplyFilter) -> AccessResult<Reply<Value>> {
        let request = ApiRequest::get("/admin/author-applies")
            .query_opt("page", filter.page)
            .query_opt("pageSize", filter.page_size)
            .query_opt("status", filter.status);
        self.call("admin.author_applies", request).await
    }

    /// Record a review decision.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn audit_author_apply(&self, apply_id: i64, decision: &AuditDecision) -> AccessResult<Reply<Value>> {
        let request =
            ApiRequest::put(format!("/admin/author-applies/{apply_id}/audit")).json(decision.body());
        self.call("admin.audit", request).await
    }

    /// Approve an application.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn approve_author_apply(&self, apply_id: i64) -> AccessResult<Reply<Value>> {
        self.audit_author_apply(apply_id, &AuditDecision::Approve)
            .await
    }

    /// Reject an application.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn reject_author_apply(&self, apply_id: i64, reason: Option<&str>) -> AccessResult<Reply<Value>> {
        let decision = AuditDecision::Reject {
            reason: reason.unwrap_or_default().to_string(),
        };
        self.audit_author_apply(apply_id, &decision).await
    }
}
