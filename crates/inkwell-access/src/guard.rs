//! Per-navigation authorization decisions.
//!
//! # Design
//! - Decisions are plain values; the host performs the navigation and shows the notice.
//! - The profile is fetched lazily, at most once while it stays cached.
//! - A failed profile fetch for a signed-in user is treated as an expired session.
//! - The layout for `/admin` screens is derived from the role at decision time.

use std::rc::Rc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::AccessConfig;
use crate::defaults::{PERMISSION_DENIED_MESSAGE, SESSION_EXPIRED_MESSAGE, SIGN_IN_REQUIRED_MESSAGE};
use crate::error::AccessResult;
use crate::model::{Profile, Role};
use crate::routes::{RouteTable, is_under};
use crate::session::Session;

const ADMIN_ROOT: &str = "/admin";

/// Severity of a user-facing notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something the user should notice but can recover from.
    Warning,
    /// An operation failed.
    Error,
}

impl NoticeLevel {
    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Dismissible message shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Warning notice.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// Error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Shell used to render `/admin` screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Author workspace with article management navigation.
    AuthorWorkspace,
    /// Personal center for every other role.
    UserCenter,
}

impl Layout {
    /// Layout for `role`.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Author => Self::AuthorWorkspace,
            Role::Admin | Role::User => Self::UserCenter,
        }
    }
}

/// Outcome of evaluating one navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Proceed to `path` (static redirects already applied).
    Allow {
        /// Final path of the navigation.
        path: String,
        /// Layout to render, for `/admin` screens.
        layout: Option<Layout>,
    },
    /// Navigate elsewhere instead.
    Redirect {
        /// Redirect target.
        to: String,
        /// Replace the current history entry.
        replace: bool,
        /// Notice to show alongside the redirect.
        notice: Option<Notice>,
    },
}

/// Source of the signed-in user's profile.
#[async_trait(?Send)]
pub trait ProfileFetcher {
    /// Fetch the current user's profile from the server.
    ///
    /// # Errors
    ///
    /// Returns any [`crate::AccessError`] raised while fetching or decoding.
    async fn fetch_profile(&self) -> AccessResult<Profile>;
}

/// Evaluates navigations against the session and the route table.
pub struct RouteGuard<F> {
    session: Session,
    fetcher: F,
    routes: RouteTable,
    config: Rc<AccessConfig>,
}

impl<F: ProfileFetcher> RouteGuard<F> {
    /// Guard over the standard route table.
    #[must_use]
    pub fn new(session: Session, fetcher: F, config: AccessConfig) -> Self {
        Self::with_routes(session, fetcher, RouteTable::standard(), config)
    }

    /// Guard over a custom route table.
    #[must_use]
    pub fn with_routes(session: Session, fetcher: F, routes: RouteTable, config: AccessConfig) -> Self {
        Self {
            session,
            fetcher,
            routes,
            config: Rc::new(config),
        }
    }

    /// Route table in use.
    #[must_use]
    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decide what happens when the user navigates to `target`.
    pub async fn evaluate(&self, target: &str) -> GuardDecision {
        let path = self.routes.resolve(target);
        let requires_auth = self.routes.requires_auth(&path);
        let authenticated = self.session.is_authenticated();
        debug!(requested = target, %path, requires_auth, authenticated, "evaluating navigation");

        if requires_auth && !authenticated {
            info!(%path, "protected screen requested without credential");
            return GuardDecision::Redirect {
                to: self.config.login_route.clone(),
                replace: true,
                notice: Some(Notice::error(SIGN_IN_REQUIRED_MESSAGE)),
            };
        }

        if path == self.config.login_route && authenticated {
            return match self.ensure_profile().await {
                Ok(profile) => GuardDecision::Redirect {
                    to: self.landing_for(profile.role).to_string(),
                    replace: false,
                    notice: None,
                },
                Err(decision) => decision,
            };
        }

        if requires_auth {
            let profile = match self.ensure_profile().await {
                Ok(profile) => profile,
                Err(decision) => return decision,
            };
            if !self.routes.permits(&path, profile.role) {
                info!(%path, role = profile.role.label(), "role does not grant access");
                return GuardDecision::Redirect {
                    to: self.config.personal_center.clone(),
                    replace: false,
                    notice: Some(Notice::warning(PERMISSION_DENIED_MESSAGE)),
                };
            }
            let layout = is_under(&path, ADMIN_ROOT).then(|| Layout::for_role(profile.role));
            return GuardDecision::Allow { path, layout };
        }

        GuardDecision::Allow { path, layout: None }
    }

    fn landing_for(&self, role: Role) -> &str {
        match role {
            Role::Author => &self.config.author_landing,
            Role::Admin | Role::User => &self.config.personal_center,
        }
    }

    async fn ensure_profile(&self) -> Result<Profile, GuardDecision> {
        if let Some(profile) = self.session.profile().get() {
            return Ok(profile);
        }
        match self.fetcher.fetch_profile().await {
            Ok(profile) => {
                debug!(user = profile.id, role = profile.role.label(), "profile loaded");
                self.session.profile().set(profile.clone());
                Ok(profile)
            }
            Err(err) => {
                warn!(error = %err, detail = %err.detail(), "profile fetch failed; ending session");
                self.session.end();
                Err(GuardDecision::Redirect {
                    to: self.config.login_route.clone(),
                    replace: true,
                    notice: Some(Notice::warning(SESSION_EXPIRED_MESSAGE)),
                })
            }
        }
    }
}
