//! Host capabilities for a terminal session.
//!
//! There are no screens to move between, so navigation requests are recorded
//! and reported once the command finishes.

use std::cell::RefCell;

use inkwell_access::{NavigationRequest, Navigator, Notice, Notifier};
use tracing::info;

/// Navigator and notifier writing to stderr.
#[derive(Debug, Default)]
pub(crate) struct Terminal {
    navigation: RefCell<Option<NavigationRequest>>,
}

impl Terminal {
    /// Most recent navigation the pipeline asked for, if any.
    pub(crate) fn take_navigation(&self) -> Option<NavigationRequest> {
        self.navigation.borrow_mut().take()
    }
}

impl Navigator for Terminal {
    fn navigate(&self, request: NavigationRequest) {
        info!(to = %request.to, replace = request.replace, "navigation requested");
        self.navigation.borrow_mut().replace(request);
    }
}

impl Notifier for Terminal {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", format_notice(&notice));
    }
}

pub(crate) fn format_notice(notice: &Notice) -> String {
    format!("{}: {}", notice.level.as_str(), notice.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_latest_navigation() {
        let terminal = Terminal::default();
        terminal.navigate(NavigationRequest::push("/"));
        terminal.navigate(NavigationRequest::replace("/login"));
        assert_eq!(
            terminal.take_navigation(),
            Some(NavigationRequest::replace("/login"))
        );
        assert_eq!(terminal.take_navigation(), None);
    }

    #[test]
    fn notices_are_prefixed_with_their_level() {
        assert_eq!(
            format_notice(&Notice::warning("you do not have permission")),
            "warning: you do not have permission"
        );
    }
}
