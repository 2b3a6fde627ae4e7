//! Article reads (with route fallback), search, and author management.

use serde::Serialize;
use serde_json::Value;

use super::{Api, json_body};
use crate::envelope::Reply;
use crate::error::{AccessError, AccessResult};
use crate::resolver::{ListQuery, anonymous_state, article_detail_plan, home_listing_plan};
use crate::transport::{ApiRequest, Transport};

/// Article fields an author can set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDraft {
    /// Present when updating an existing article.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Cover image URL.
    pub cover_img: String,
    /// State label, e.g. draft or published.
    pub state: String,
    /// Owning category.
    pub category_id: i64,
}

/// Full-text search request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Search keyword; must not be blank.
    pub keyword: String,
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Rows per page.
    pub page_size: Option<u32>,
    /// Restrict to a state label.
    pub state: Option<String>,
}

impl<T: Transport> Api<T> {
    /// Home page listing, resolved across every historical listing route.
    ///
    /// # Errors
    ///
    /// [`AccessError::Exhausted`] when no route serves the listing.
    pub async fn home_articles(&self, query: &ListQuery) -> AccessResult<Value> {
        let plan = home_listing_plan(query, self.pipeline().config(), self.session().is_authenticated());
        self.resolve(&plan).await
    }

    /// Article detail, resolved across every historical detail route.
    ///
    /// # Errors
    ///
    /// [`AccessError::Exhausted`] when no route serves the article.
    pub async fn article_detail(&self, id: i64) -> AccessResult<Value> {
        let plan = article_detail_plan(id, self.pipeline().config(), self.session().is_authenticated());
        self.resolve(&plan).await
    }

    /// Search articles by keyword.
    ///
    /// # Errors
    ///
    /// [`AccessError::Validation`] for a blank keyword (no request is sent),
    /// otherwise any pipeline error.
    pub async fn search_articles(&self, query: &SearchQuery) -> AccessResult<Reply<Value>> {
        let keyword = query.keyword.trim();
        if keyword.is_empty() {
            return Err(AccessError::validation("keyword", "must not be empty"));
        }
        let config = self.pipeline().config();
        let state = anonymous_state(query.state.clone(), config, self.session().is_authenticated());
        let request = ApiRequest::get("/search")
            .query("keyword", keyword)
            .query("page", query.page.unwrap_or(config.default_page))
            .query("pageSize", query.page_size.unwrap_or(config.default_page_size))
            .query_opt("state", state);
        self.call("article.search", request).await
    }

    /// Author's own articles, filtered.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn list_articles(&self, query: &ListQuery) -> AccessResult<Reply<Value>> {
        let config = self.pipeline().config();
        let request = ApiRequest::get("/article")
            .query("pageNum", query.page.unwrap_or(config.default_page))
            .query("pageSize", query.page_size.unwrap_or(config.default_page_size))
            .query_opt("categoryId", query.category_id)
            .query_opt("state", query.state.as_deref());
        self.call("article.list", request).await
    }

    /// Publish or save a new article.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn create_article(&self, draft: &ArticleDraft) -> AccessResult<Reply<Value>> {
        let body = json_body("article.create", draft)?;
        self.call("article.create", ApiRequest::post("/article").json(body))
            .await
    }

    /// Update an existing article.
    ///
    /// # Errors
    ///
    /// [`AccessError::Validation`] when the draft has no id, otherwise any pipeline error.
    pub async fn update_article(&self, draft: &ArticleDraft) -> AccessResult<Reply<Value>> {
        if draft.id.is_none() {
            return Err(AccessError::validation("id", "required for update"));
        }
        let body = json_body("article.update", draft)?;
        self.call("article.update", ApiRequest::put("/article").json(body))
            .await
    }

    /// Delete an article.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn delete_article(&self, id: i64) -> AccessResult<Reply<Value>> {
        self.call("article.delete", ApiRequest::delete("/article").query("id", id))
            .await
    }

    /// Like or unlike an article.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn toggle_article_like(&self, id: i64) -> AccessResult<Reply<Value>> {
        self.call("article.like", ApiRequest::post(format!("/article/like/{id}")))
            .await
    }

    /// Collect or uncollect an article.
    ///
    /// # Errors
    ///
    /// Any pipeline error.
    pub async fn toggle_article_collect(&self, id: i64) -> AccessResult<Reply<Value>> {
        self.call("article.collect", ApiRequest::post(format!("/article/collect/{id}")))
            .await
    }
}
