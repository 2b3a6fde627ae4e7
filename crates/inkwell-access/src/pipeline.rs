//! Request pipeline: credential attachment on the way out, session recovery on the way back.
//!
//! # Design
//! - Outbound and inbound decisions consult the same [`Classifier`].
//! - Only the stored credential is ever sent; caller supplied `Authorization`
//!   headers are dropped whenever none is attached.
//! - Only a 401 on a protected call, while a credential exists, counts as session expiry.
//!   Public endpoints answering 401 never log the user out.
//! - Recovery order is fixed: clear the credential, clear the profile, navigate, notify.
//!   A concurrent second 401 finds no credential and only propagates.
//! - Transport failures are returned untouched; they never trigger recovery.

use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::classify::{Access, Classifier};
use crate::config::AccessConfig;
use crate::defaults::{AUTH_FAILED_MESSAGE, AUTHORIZATION_HEADER};
use crate::error::{AccessError, AccessResult};
use crate::guard::Notice;
use crate::session::Session;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Where to navigate and how.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationRequest {
    /// Target path.
    pub to: String,
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl NavigationRequest {
    /// Navigation that replaces the current history entry.
    #[must_use]
    pub fn replace(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            replace: true,
        }
    }

    /// Navigation that pushes a new history entry.
    #[must_use]
    pub fn push(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            replace: false,
        }
    }
}

/// Screen navigation capability supplied by the host.
pub trait Navigator {
    /// Move to another screen.
    fn navigate(&self, request: NavigationRequest);
}

/// User-facing notice capability supplied by the host.
pub trait Notifier {
    /// Show a dismissible notice.
    fn notify(&self, notice: Notice);
}

/// Single choke point every API call passes through.
pub struct RequestPipeline<T> {
    transport: T,
    session: Session,
    classifier: Rc<Classifier>,
    config: Rc<AccessConfig>,
    navigator: Rc<dyn Navigator>,
    notifier: Rc<dyn Notifier>,
}

impl<T: Transport> RequestPipeline<T> {
    /// Build a pipeline with the standard classification rules.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::RuleCompile`] if the built-in rules fail to compile.
    pub fn new(
        transport: T,
        session: Session,
        config: AccessConfig,
        navigator: Rc<dyn Navigator>,
        notifier: Rc<dyn Notifier>,
    ) -> AccessResult<Self> {
        Ok(Self::with_classifier(
            transport,
            session,
            Classifier::standard()?,
            config,
            navigator,
            notifier,
        ))
    }

    /// Build a pipeline with a caller supplied classifier.
    #[must_use]
    pub fn with_classifier(
        transport: T,
        session: Session,
        classifier: Classifier,
        config: AccessConfig,
        navigator: Rc<dyn Navigator>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            transport,
            session,
            classifier: Rc::new(classifier),
            config: Rc::new(config),
            navigator,
            notifier,
        }
    }

    /// Session shared with the guard.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Classifier used for both directions.
    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// `Authorization` value for the current credential, computed once by callers
    /// that attach it to a series of requests.
    #[must_use]
    pub fn authorization_value(&self) -> Option<String> {
        self.session.credential().get().map(|c| c.bearer_value())
    }

    /// Apply the outbound credential policy to `request` and return its classification.
    pub fn prepare(&self, request: &mut ApiRequest) -> Access {
        let access = self.classifier.classify(&request.path, request.method);
        match (access, self.session.credential().get()) {
            (Access::Protected, Some(credential)) => {
                request.set_header(AUTHORIZATION_HEADER, credential.bearer_value());
            }
            (Access::Public, _) | (Access::Protected, None) => {
                if request.remove_header(AUTHORIZATION_HEADER) {
                    debug!(path = %request.path, ?access, "stripped caller supplied credential");
                }
            }
        }
        access
    }

    /// Send a request and return the response body on success.
    ///
    /// # Errors
    ///
    /// - [`AccessError::Transport`] when no response arrived.
    /// - [`AccessError::Unauthorized`] on 401, after recovery when it applies.
    /// - [`AccessError::Status`] for every other non-2xx status.
    pub async fn send(&self, mut request: ApiRequest) -> AccessResult<Value> {
        let access = self.prepare(&mut request);
        let url = self.config.url_for(&request.path);
        debug!(
            method = %request.method,
            path = %request.path,
            ?access,
            "dispatching request"
        );

        let response = match self.transport.send(&url, &request).await {
            Ok(response) => response,
            Err(source) => {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    error = %source,
                    "request transport failure"
                );
                return Err(AccessError::Transport {
                    method: request.method,
                    path: request.path,
                    source,
                });
            }
        };

        if response.is_success() {
            return Ok(response.body);
        }
        if response.status == 401 {
            return Err(self.recover(request));
        }
        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            "request rejected"
        );
        Err(AccessError::Status {
            method: request.method,
            path: request.path,
            status: response.status,
            message: server_message(&response),
        })
    }

    fn recover(&self, request: ApiRequest) -> AccessError {
        let access = self.classifier.classify(&request.path, request.method);
        let session_cleared = access == Access::Protected && self.session.is_authenticated();
        if session_cleared {
            warn!(
                method = %request.method,
                path = %request.path,
                "credential rejected; clearing session"
            );
            self.session.end();
            self.navigator
                .navigate(NavigationRequest::replace(self.config.login_route.clone()));
            self.notifier.notify(Notice::error(AUTH_FAILED_MESSAGE));
        } else {
            info!(
                method = %request.method,
                path = %request.path,
                ?access,
                "unauthorized response left session untouched"
            );
        }
        AccessError::Unauthorized {
            method: request.method,
            path: request.path,
            session_cleared,
        }
    }
}

fn server_message(response: &ApiResponse) -> Option<String> {
    match &response.body {
        Value::Object(map) => ["message", "msg", "error"]
            .iter()
            .filter_map(|name| map.get(*name))
            .find_map(|value| value.as_str().filter(|text| !text.is_empty()))
            .map(str::to_string),
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        _ => None,
    }
}
