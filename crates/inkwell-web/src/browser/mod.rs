//! Browser adapters and the page entrypoint.

mod fetch;
mod history;
mod store;

use std::rc::Rc;

use gloo::console;
use gloo::events::EventListener;
use gloo::utils::window;
use inkwell_access::{AccessConfig, Api, KeyValueStore, RequestPipeline, RouteGuard, Session};
use wasm_bindgen_futures::spawn_local;

pub use fetch::FetchTransport;
pub use history::{ConsoleNotifier, HistoryNavigator};
pub use store::BrowserStore;

use crate::effects;

type BrowserGuard = RouteGuard<Api<FetchTransport>>;

/// Restore the session from `localStorage`, then guard the current location and
/// every later location change (`popstate`), applying whatever the guard decides.
pub fn start() {
    console_error_panic_hook::set_once();

    let config = AccessConfig::default();
    let storage: Rc<dyn KeyValueStore> = Rc::new(BrowserStore);
    let session = Session::restore(storage, &config);
    let navigator = Rc::new(HistoryNavigator);
    let notifier = Rc::new(ConsoleNotifier);
    let pipeline = match RequestPipeline::new(
        FetchTransport::default(),
        session.clone(),
        config.clone(),
        navigator.clone(),
        notifier.clone(),
    ) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            console::error!("access layer unavailable", err.detail());
            return;
        }
    };
    let guard = Rc::new(RouteGuard::new(session, Api::new(pipeline), config));

    let listener_guard = Rc::clone(&guard);
    let listener_navigator = Rc::clone(&navigator);
    let listener_notifier = Rc::clone(&notifier);
    EventListener::new(&window(), "popstate", move |_| {
        spawn_guard(
            Rc::clone(&listener_guard),
            Rc::clone(&listener_navigator),
            Rc::clone(&listener_notifier),
        );
    })
    .forget();

    spawn_guard(guard, navigator, notifier);
}

fn spawn_guard(
    guard: Rc<BrowserGuard>,
    navigator: Rc<HistoryNavigator>,
    notifier: Rc<ConsoleNotifier>,
) {
    spawn_local(async move {
        let current = HistoryNavigator::current_path();
        effects::guard_location(&guard, &current, navigator.as_ref(), notifier.as_ref()).await;
    });
}
