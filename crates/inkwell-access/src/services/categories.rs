//! Article category endpoints.

use serde::Serialize;
use serde_json::Value;

use super::{Api, json_body};
use crate::envelope::Reply;
use crate::error::{AccessError, AccessResult};
use crate::transport::{ApiRequest, Transport};

/// Category fields an author can set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    /// Present when updating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Display name.
    pub category_name: String,
    /// URL alias.
    pub category_alias: String,
}

impl<T: Transport> Api<T> {
    /// All categories.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn list_categories(&self) -> AccessResult<Reply<Value>> {
        self.call("category.list", ApiRequest::get("/category/list"))
            .await
    }

    /// One category.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn category_detail(&self, id: i64) -> AccessResult<Reply<Value>> {
        self.call("category.detail", ApiRequest::get("/category/detail").query("id", id))
            .await
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// [`AccessError::Validation`] for a blank name, otherwise any pipeline error.
    pub async fn create_category(&self, draft: &CategoryDraft) -> AccessResult<Reply<Value>> {
        if draft.category_name.trim().is_empty() {
            return Err(AccessError::validation("categoryName", "must not be empty"));
        }
        let body = json_body("category.create", draft)?;
        self.call("category.create", ApiRequest::post("/category").json(body))
            .await
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// [`AccessError::Validation`] when the draft has no id, otherwise any pipeline error.
    pub async fn update_category(&self, draft: &CategoryDraft) -> AccessResult<Reply<Value>> {
        if draft.id.is_none() {
            return Err(AccessError::validation("id", "required for update"));
        }
        let body = json_body("category.update", draft)?;
        self.call("category.update", ApiRequest::put("/category").json(body))
            .await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn delete_category(&self, id: i64) -> AccessResult<Reply<Value>> {
        self.call("category.delete", ApiRequest::delete("/category").query("id", id))
            .await
    }
}
