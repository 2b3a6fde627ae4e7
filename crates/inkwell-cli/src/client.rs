//! Reqwest transport, CLI error type, and the context shared by command handlers.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use inkwell_access::{
    AccessConfig, AccessError, Api, ApiRequest, ApiResponse, FileStore, KeyValueStore, Method,
    RequestBody, RequestPipeline, Session, Transport, TransportError,
};
use reqwest::{Client, Url};
use tracing::debug;

use crate::cli::Cli;
use crate::terminal::Terminal;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<AccessError> for CliError {
    fn from(err: AccessError) -> Self {
        debug!(error = ?err, "access layer call failed");
        match err {
            AccessError::Validation { .. } => Self::validation(err.detail()),
            AccessError::Exhausted {
                operation,
                attempts,
                ref last,
            } => Self::failure(anyhow!(
                "{operation}: no route answered after {attempts} attempts (last: {})",
                last.detail()
            )),
            other => Self::failure(anyhow!(other.detail())),
        }
    }
}

/// Transport backed by a shared `reqwest` client.
///
/// URLs handed over by the pipeline already carry the base path; they are
/// appended to the server origin verbatim.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
    origin: Url,
}

impl ReqwestTransport {
    /// Wrap `client`, addressing requests under `origin`.
    #[must_use]
    pub const fn new(client: Client, origin: Url) -> Self {
        Self { client, origin }
    }

    /// Build a client with `timeout` applied to every request.
    ///
    /// # Errors
    ///
    /// Returns an error when the TLS backend cannot be initialised.
    pub fn with_timeout(origin: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| anyhow!("failed to build HTTP client: {err}"))?;
        Ok(Self::new(client, origin))
    }

    fn absolute(&self, url: &str) -> String {
        format!("{}{url}", self.origin.as_str().trim_end_matches('/'))
    }
}

const fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn classify_failure(url: String, err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout { url }
    } else if err.is_builder() {
        TransportError::Build {
            url,
            detail: err.to_string(),
        }
    } else {
        TransportError::Connect {
            url,
            detail: err.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn send(&self, url: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let absolute = self.absolute(url);
        let mut builder = self
            .client
            .request(to_reqwest(request.method), &absolute)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            Some(RequestBody::Json(body)) => builder.json(body),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|err| classify_failure(absolute.clone(), &err))?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|err| TransportError::Body {
            url: absolute.clone(),
            detail: err.to_string(),
        })?;
        debug!(url = %absolute, status, "response received");
        Ok(ApiResponse::new(status, ApiResponse::body_from_bytes(&bytes)))
    }
}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) api: Api<ReqwestTransport>,
    pub(crate) terminal: Rc<Terminal>,
    pub(crate) state_dir: PathBuf,
}

impl AppContext {
    /// Restore the persisted session and wire the pipeline for this invocation.
    pub(crate) fn from_cli(cli: &Cli) -> CliResult<Self> {
        let config = AccessConfig::default().with_base_path(cli.base_path.clone());
        let storage: Rc<dyn KeyValueStore> = Rc::new(FileStore::in_dir(&cli.state_dir));
        let session = Session::restore(storage, &config);
        let transport =
            ReqwestTransport::with_timeout(cli.api_url.clone(), Duration::from_secs(cli.timeout))
                .map_err(CliError::failure)?;
        Self::assemble(transport, session, config, cli.state_dir.clone())
    }

    pub(crate) fn assemble(
        transport: ReqwestTransport,
        session: Session,
        config: AccessConfig,
        state_dir: PathBuf,
    ) -> CliResult<Self> {
        let terminal = Rc::new(Terminal::default());
        let pipeline =
            RequestPipeline::new(transport, session, config, terminal.clone(), terminal.clone())?;
        Ok(Self {
            api: Api::new(pipeline),
            terminal,
            state_dir,
        })
    }

    pub(crate) fn session(&self) -> &Session {
        self.api.session()
    }

    pub(crate) fn config(&self) -> &AccessConfig {
        self.api.pipeline().config()
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}
