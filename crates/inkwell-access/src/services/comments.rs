//! Comment listing and submission (both with route fallback) and comment likes.

use serde_json::Value;

use super::Api;
use crate::envelope::Reply;
use crate::error::{AccessError, AccessResult};
use crate::resolver::{CommentDraft, CommentQuery, comment_listing_plan, comment_submission_plan};
use crate::transport::{ApiRequest, Transport};

impl<T: Transport> Api<T> {
    /// Comments for an article, resolved across every historical listing route.
    ///
    /// # Errors
    ///
    /// [`AccessError::Exhausted`] when no route serves the listing.
    pub async fn list_comments(&self, article_id: i64, query: CommentQuery) -> AccessResult<Value> {
        let plan = comment_listing_plan(article_id, query, self.pipeline().config());
        self.resolve(&plan).await
    }

    /// Post a comment, trying every historical submission route.
    ///
    /// # Errors
    ///
    /// [`AccessError::Validation`] for blank content, [`AccessError::Exhausted`]
    /// when every route rejects the comment.
    pub async fn submit_comment(&self, draft: &CommentDraft) -> AccessResult<Value> {
        if draft.content.trim().is_empty() {
            return Err(AccessError::validation("content", "must not be empty"));
        }
        let authorization = self.pipeline().authorization_value();
        let plan = comment_submission_plan(draft, authorization.as_deref());
        self.resolve(&plan).await
    }

    /// Like or unlike a comment.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn toggle_comment_like(&self, comment_id: i64) -> AccessResult<Reply<Value>> {
        self.call("comment.like", ApiRequest::post(format!("/comment/{comment_id}/like")))
            .await
    }
}
