//! Fallback resolution across historical server routes.
//!
//! # Design
//! - A plan is data: an ordered list of candidates built by a pure function, so the
//!   order can be asserted without a network.
//! - One iteration routine consumes every plan. Attempts are strictly sequential and
//!   stop at the first success; exhaustion surfaces the last candidate's error.
//! - Each attempt goes through the pipeline, so credential rules and session recovery
//!   apply per candidate.

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::config::AccessConfig;
use crate::defaults::AUTHORIZATION_HEADER;
use crate::error::{AccessError, AccessResult};
use crate::pipeline::RequestPipeline;
use crate::transport::{ApiRequest, Method, RequestBody, Transport};

/// Query, headers and body for one candidate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CandidateParams {
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Optional body.
    pub body: Option<RequestBody>,
}

impl CandidateParams {
    /// Parameters carried in the query string.
    #[must_use]
    pub const fn query(query: Vec<(String, String)>) -> Self {
        Self {
            query,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Parameters carried as a JSON body.
    #[must_use]
    pub const fn json(body: Value) -> Self {
        Self {
            query: Vec::new(),
            headers: Vec::new(),
            body: Some(RequestBody::Json(body)),
        }
    }

    #[must_use]
    fn with_header(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.headers.push((name.to_string(), value.to_string()));
        }
        self
    }
}

/// One server route to try.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the base path.
    pub path: String,
    /// Request parameters.
    pub params: CandidateParams,
}

impl Candidate {
    /// Candidate with explicit parameters.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, params: CandidateParams) -> Self {
        Self {
            method,
            path: path.into(),
            params,
        }
    }

    /// Materialize the candidate as a request.
    #[must_use]
    pub fn to_request(&self) -> ApiRequest {
        let mut request = ApiRequest::new(self.method, self.path.clone())
            .query_pairs(self.params.query.clone());
        for (name, value) in &self.params.headers {
            request.set_header(name.clone(), value.clone());
        }
        request.body.clone_from(&self.params.body);
        request
    }
}

/// Ordered candidates for one logical operation.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidatePlan {
    /// Operation name used in logs and errors.
    pub operation: &'static str,
    /// Candidates in priority order.
    pub candidates: Vec<Candidate>,
}

impl CandidatePlan {
    /// Plan over `candidates`.
    #[must_use]
    pub const fn new(operation: &'static str, candidates: Vec<Candidate>) -> Self {
        Self {
            operation,
            candidates,
        }
    }

    /// `METHOD path` for each candidate, in order.
    #[must_use]
    pub fn routes(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(|candidate| format!("{} {}", candidate.method, candidate.path))
            .collect()
    }
}

/// Try each candidate in order and return the first success.
///
/// # Errors
///
/// - [`AccessError::Validation`] for an empty plan.
/// - [`AccessError::Exhausted`] wrapping the last candidate's error when all fail.
pub async fn resolve<T: Transport>(
    pipeline: &RequestPipeline<T>,
    plan: &CandidatePlan,
) -> AccessResult<Value> {
    if plan.candidates.is_empty() {
        return Err(AccessError::validation("plan", "has no candidates"));
    }
    let mut last = None;
    for (index, candidate) in plan.candidates.iter().enumerate() {
        debug!(
            operation = plan.operation,
            attempt = index + 1,
            method = %candidate.method,
            path = %candidate.path,
            "trying candidate route"
        );
        match pipeline.send(candidate.to_request()).await {
            Ok(value) => {
                debug!(operation = plan.operation, path = %candidate.path, "candidate route served request");
                return Ok(value);
            }
            Err(err) => {
                debug!(
                    operation = plan.operation,
                    path = %candidate.path,
                    status = ?err.status(),
                    "candidate route failed"
                );
                last = Some(err);
            }
        }
    }
    let attempts = plan.candidates.len();
    let last = last.unwrap_or_else(|| AccessError::validation("plan", "has no candidates"));
    Err(AccessError::Exhausted {
        operation: plan.operation,
        attempts,
        last: Box::new(last),
    })
}

/// Filters for article listings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Rows per page.
    pub page_size: Option<u32>,
    /// Restrict to a category.
    pub category_id: Option<i64>,
    /// Restrict to a state label.
    pub state: Option<String>,
}

/// Listing parameters after defaults and the anonymous state filter are applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedList {
    /// Page number.
    pub page_num: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Category filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    /// State filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ListQuery {
    /// Apply defaults; anonymous callers without a state are limited to published articles.
    #[must_use]
    pub fn normalize(&self, config: &AccessConfig, authenticated: bool) -> NormalizedList {
        NormalizedList {
            page_num: self.page.unwrap_or(config.default_page),
            page_size: self.page_size.unwrap_or(config.default_page_size),
            category_id: self.category_id,
            state: anonymous_state(self.state.clone(), config, authenticated),
        }
    }
}

impl NormalizedList {
    /// Query string form.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("pageNum".to_string(), self.page_num.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        if let Some(category) = self.category_id {
            pairs.push(("categoryId".to_string(), category.to_string()));
        }
        if let Some(state) = &self.state {
            pairs.push(("state".to_string(), state.clone()));
        }
        pairs
    }

    /// JSON body form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

/// Paging for comment listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommentQuery {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Rows per page.
    pub page_size: Option<u32>,
}

/// A comment about to be posted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentDraft {
    /// Article being commented on.
    pub article_id: i64,
    /// Comment text.
    pub content: String,
    /// Parent comment for replies.
    pub parent_id: Option<i64>,
}

impl CommentDraft {
    /// Payload accepted by every submission route.
    #[must_use]
    pub fn payload(&self) -> Value {
        let parent = self.parent_id.unwrap_or(0);
        json!({
            "articleId": self.article_id,
            "article_id": self.article_id,
            "aid": self.article_id,
            "content": self.content,
            "parentId": parent,
            "parent_id": parent,
        })
    }
}

/// Home page listing.
#[must_use]
pub fn home_listing_plan(query: &ListQuery, config: &AccessConfig, authenticated: bool) -> CandidatePlan {
    let normalized = query.normalize(config, authenticated);
    let by_query = || CandidateParams::query(normalized.to_query());
    CandidatePlan::new(
        "article.home",
        vec![
            Candidate::new(Method::Get, "/article", by_query()),
            Candidate::new(Method::Get, "/article/list", by_query()),
            Candidate::new(Method::Post, "/article/list", CandidateParams::json(normalized.to_json())),
            Candidate::new(Method::Get, "/article/home", by_query()),
            Candidate::new(Method::Get, "/home/article", by_query()),
            Candidate::new(Method::Get, "/article/published", by_query()),
            Candidate::new(Method::Get, "/article/public", by_query()),
        ],
    )
}

/// Article detail. Anonymous callers add the published-state filter where the route accepts it.
#[must_use]
pub fn article_detail_plan(id: i64, config: &AccessConfig, authenticated: bool) -> CandidatePlan {
    let base: Vec<(String, String)> = anonymous_state(None, config, authenticated)
        .map(|state| vec![("state".to_string(), state)])
        .unwrap_or_default();
    let with_id = || {
        let mut pairs = vec![("id".to_string(), id.to_string())];
        pairs.extend(base.iter().cloned());
        CandidateParams::query(pairs)
    };
    let id_only = || CandidateParams::query(vec![("id".to_string(), id.to_string())]);
    let base_only = || CandidateParams::query(base.clone());
    CandidatePlan::new(
        "article.detail",
        vec![
            Candidate::new(Method::Get, "/article/detail", with_id()),
            Candidate::new(Method::Get, "/article", with_id()),
            Candidate::new(Method::Get, format!("/article/{id}"), base_only()),
            Candidate::new(Method::Get, "/article/public/detail", id_only()),
            Candidate::new(Method::Get, "/article/published/detail", id_only()),
            Candidate::new(Method::Get, "/home/article/detail", id_only()),
            Candidate::new(Method::Get, format!("/article/detail/{id}"), base_only()),
        ],
    )
}

/// Comment listing for an article.
#[must_use]
pub fn comment_listing_plan(article_id: i64, query: CommentQuery, config: &AccessConfig) -> CandidatePlan {
    let page = query.page.unwrap_or(config.default_page);
    let page_size = query.page_size.unwrap_or(config.default_page_size);
    let rest = vec![
        ("page".to_string(), page.to_string()),
        ("pageSize".to_string(), page_size.to_string()),
    ];
    let alt = vec![
        ("articleId".to_string(), article_id.to_string()),
        ("pageNum".to_string(), page.to_string()),
        ("pageSize".to_string(), page_size.to_string()),
    ];
    let alt_json = json!({
        "articleId": article_id,
        "pageNum": page,
        "pageSize": page_size,
    });
    CandidatePlan::new(
        "comment.list",
        vec![
            Candidate::new(Method::Get, format!("/article/{article_id}/comments"), CandidateParams::query(rest)),
            Candidate::new(Method::Get, "/article/comment/list", CandidateParams::query(alt.clone())),
            Candidate::new(Method::Post, "/article/comment/list", CandidateParams::json(alt_json.clone())),
            Candidate::new(Method::Get, "/article/comment", CandidateParams::query(alt)),
            Candidate::new(Method::Post, "/article/comment", CandidateParams::json(alt_json)),
        ],
    )
}

/// Comment submission. `authorization` is computed once and attached to every candidate.
#[must_use]
pub fn comment_submission_plan(draft: &CommentDraft, authorization: Option<&str>) -> CandidatePlan {
    let payload = draft.payload();
    let params = || CandidateParams::json(payload.clone()).with_header(AUTHORIZATION_HEADER, authorization);
    let id = draft.article_id;
    CandidatePlan::new(
        "comment.submit",
        vec![
            Candidate::new(Method::Post, format!("/article/{id}/comment"), params()),
            Candidate::new(Method::Post, "/article/comment", params()),
            Candidate::new(Method::Post, "/comment/add", params()),
            Candidate::new(Method::Post, "/comment/create", params()),
            Candidate::new(Method::Post, "/comment", params()),
        ],
    )
}

/// State filter applied to reads: the caller's choice wins, anonymous callers default to published.
#[must_use]
pub fn anonymous_state(requested: Option<String>, config: &AccessConfig, authenticated: bool) -> Option<String> {
    requested.or_else(|| (!authenticated).then(|| config.published_state.clone()))
}
