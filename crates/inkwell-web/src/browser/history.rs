//! History-based navigation and console notices.

use gloo::console;
use gloo::utils::window;
use inkwell_access::{NavigationRequest, Navigator, Notice, NoticeLevel, Notifier};
use wasm_bindgen::JsValue;
use web_sys::Event;

/// Navigator writing to `window.history` and announcing the change with a
/// `popstate` event so routers pick it up.
#[derive(Clone, Copy, Debug, Default)]
pub struct HistoryNavigator;

impl HistoryNavigator {
    /// Path, query and fragment of the current location.
    #[must_use]
    pub fn current_path() -> String {
        let location = window().location();
        let path = location.pathname().unwrap_or_else(|_| "/".to_string());
        let search = location.search().unwrap_or_default();
        let hash = location.hash().unwrap_or_default();
        format!("{path}{search}{hash}")
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, request: NavigationRequest) {
        let history = match window().history() {
            Ok(history) => history,
            Err(err) => {
                console::error!("history unavailable", err);
                return;
            }
        };
        let result = if request.replace {
            history.replace_state_with_url(&JsValue::NULL, "", Some(&request.to))
        } else {
            history.push_state_with_url(&JsValue::NULL, "", Some(&request.to))
        };
        if let Err(err) = result {
            console::error!("navigation failed", request.to.as_str(), err);
            return;
        }
        match Event::new("popstate") {
            Ok(event) => {
                if let Err(err) = window().dispatch_event(&event) {
                    console::warn!("popstate dispatch failed", err);
                }
            }
            Err(err) => console::warn!("popstate event unavailable", err),
        }
    }
}

/// Notifier writing to the browser console at the matching level.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let message = notice.message.as_str();
        match notice.level {
            NoticeLevel::Info => console::info!(message),
            NoticeLevel::Warning => console::warn!(message),
            NoticeLevel::Error => console::error!(message),
        }
    }
}
