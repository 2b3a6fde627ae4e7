//! Typed wrappers for the server endpoints used by the client.
//!
//! Every call goes through the shared [`RequestPipeline`]; read paths that moved
//! between server releases go through the fallback resolver instead.

pub mod admin;
pub mod articles;
pub mod categories;
pub mod comments;
pub mod email;
pub mod follow;
pub mod phone;
pub mod users;

use std::rc::Rc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::envelope::Reply;
use crate::error::{AccessError, AccessResult};
use crate::guard::ProfileFetcher;
use crate::model::Profile;
use crate::pipeline::RequestPipeline;
use crate::resolver::{self, CandidatePlan};
use crate::session::Session;
use crate::transport::{ApiRequest, Transport};

pub use admin::{ApplyFilter, AuditDecision, UserFilter};
pub use articles::{ArticleDraft, SearchQuery};
pub use categories::CategoryDraft;
pub use phone::CodePurpose;
pub use users::{AuthorApplication, Credentials, PasswordChange, ProfileUpdate, Registration};

/// Client facade over the pipeline.
pub struct Api<T> {
    pipeline: Rc<RequestPipeline<T>>,
}

impl<T> Clone for Api<T> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Rc::clone(&self.pipeline),
        }
    }
}

impl<T: Transport> Api<T> {
    /// Wrap a pipeline.
    #[must_use]
    pub fn new(pipeline: RequestPipeline<T>) -> Self {
        Self {
            pipeline: Rc::new(pipeline),
        }
    }

    /// Underlying pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &RequestPipeline<T> {
        &self.pipeline
    }

    /// Session shared with the pipeline.
    #[must_use]
    pub fn session(&self) -> &Session {
        self.pipeline.session()
    }

    async fn call<R: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: ApiRequest,
    ) -> AccessResult<Reply<R>> {
        let payload = self.pipeline.send(request).await?;
        Reply::decode(operation, payload)?.accepted(operation)
    }

    async fn resolve(&self, plan: &CandidatePlan) -> AccessResult<Value> {
        resolver::resolve(&self.pipeline, plan).await
    }
}

fn json_body<S: Serialize>(operation: &'static str, value: &S) -> AccessResult<Value> {
    serde_json::to_value(value).map_err(|source| AccessError::Encode { operation, source })
}

#[async_trait(?Send)]
impl<T: Transport> ProfileFetcher for Api<T> {
    async fn fetch_profile(&self) -> AccessResult<Profile> {
        self.user_info().await
    }
}
