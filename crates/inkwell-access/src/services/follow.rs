//! Follow relationships between users.

use serde_json::Value;

use super::Api;
use crate::envelope::Reply;
use crate::error::AccessResult;
use crate::transport::{ApiRequest, Transport};

impl<T: Transport> Api<T> {
    /// Follow or unfollow a user.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn toggle_follow(&self, user_id: i64) -> AccessResult<Reply<Value>> {
        self.call("follow.toggle", ApiRequest::post(format!("/user/{user_id}/follow")))
            .await
    }

    /// Users the current user follows.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn following(&self) -> AccessResult<Reply<Value>> {
        self.call("follow.following", ApiRequest::get("/user/following"))
            .await
    }

    /// Users following the current user.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn followers(&self) -> AccessResult<Reply<Value>> {
        self.call("follow.followers", ApiRequest::get("/user/followers"))
            .await
    }
}
