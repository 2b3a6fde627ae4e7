//! `fetch` transport built on `gloo-net`.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use inkwell_access::{ApiRequest, ApiResponse, Method, RequestBody, Transport, TransportError};

use crate::encode::{form_urlencoded, with_query};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Transport issuing same-origin `fetch` calls; the dev proxy or reverse
/// proxy forwards the base path to the API server.
#[derive(Clone, Debug, Default)]
pub struct FetchTransport {
    origin: String,
}

impl FetchTransport {
    /// Address requests relative to `origin` (empty for same-origin).
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    fn build(&self, url: &str, request: &ApiRequest) -> Result<Request, TransportError> {
        let target = with_query(&format!("{}{url}", self.origin), &request.query);
        let mut builder = match request.method {
            Method::Get => Request::get(&target),
            Method::Post => Request::post(&target),
            Method::Put => Request::put(&target),
            Method::Patch => Request::patch(&target),
            Method::Delete => Request::delete(&target),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        match &request.body {
            Some(RequestBody::Json(body)) => builder.json(body).map_err(|err| TransportError::Build {
                url: target.clone(),
                detail: err.to_string(),
            }),
            Some(RequestBody::Form(fields)) => Ok(builder
                .header("Content-Type", FORM_CONTENT_TYPE)
                .body(form_urlencoded(fields))),
            None => Ok(builder),
        }
    }
}

async fn read_body(url: &str, response: &Response) -> Result<ApiResponse, TransportError> {
    let text = response.text().await.map_err(|err| TransportError::Body {
        url: url.to_string(),
        detail: err.to_string(),
    })?;
    Ok(ApiResponse::new(
        response.status(),
        ApiResponse::body_from_bytes(text.as_bytes()),
    ))
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, url: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let prepared = self.build(url, request)?;
        let response = prepared.send().await.map_err(|err| TransportError::Connect {
            url: url.to_string(),
            detail: err.to_string(),
        })?;
        read_body(url, &response).await
    }
}
