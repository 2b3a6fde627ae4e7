//! Host-side effects of a guard decision.

use inkwell_access::{
    GuardDecision, NavigationRequest, Navigator, Notice, Notifier, ProfileFetcher, RouteGuard,
};

/// What the host has to do after a decision: move, show a notice, or both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effects {
    /// Navigation to perform, if the decision redirects.
    pub navigation: Option<NavigationRequest>,
    /// Notice to show, if any.
    pub notice: Option<Notice>,
}

impl Effects {
    /// Effects for `decision` evaluated while the browser shows `current`.
    ///
    /// An allowed navigation whose final path differs from `current` (a
    /// static redirect was followed) replaces the history entry.
    #[must_use]
    pub fn for_decision(decision: GuardDecision, current: &str) -> Self {
        match decision {
            GuardDecision::Allow { path, .. } => Self {
                navigation: (path != strip_query(current)).then(|| NavigationRequest::replace(path)),
                notice: None,
            },
            GuardDecision::Redirect {
                to,
                replace,
                notice,
            } => Self {
                navigation: Some(NavigationRequest { to, replace }),
                notice,
            },
        }
    }
}

/// Evaluate the location `current` with `guard` and carry out the effects.
///
/// Hosts call this for the initial location and again after every location
/// change, so each requested screen passes through the guard.
pub async fn guard_location<F: ProfileFetcher>(
    guard: &RouteGuard<F>,
    current: &str,
    navigator: &dyn Navigator,
    notifier: &dyn Notifier,
) -> Effects {
    let decision = guard.evaluate(current).await;
    let effects = Effects::for_decision(decision, current);
    if let Some(notice) = effects.notice.clone() {
        notifier.notify(notice);
    }
    if let Some(request) = effects.navigation.clone() {
        navigator.navigate(request);
    }
    effects
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}
