// Navigation core - no Tauri imports allowed.
// The bridge owns the engine handle, translates shell commands into engine
// calls, and folds the engine's lifecycle events into an observable
// NavigationState. The engine is a trait so all of this is unit testable.

use serde::Serialize;
use url::Url;

use crate::modules::address;
use crate::modules::observe::{Observers, SubscriptionId};

/// Terminal failure of a navigation attempt, surfaced as UI state.
/// Never thrown past the bridge boundary.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NavError {
    #[error("invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("navigation failed: {message}")]
    NavigationFailure { code: Option<i64>, message: String },

    #[error("navigation failed before commit: {message}")]
    ProvisionalFailure { code: Option<i64>, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    /// Address currently requested or loaded.
    pub address: String,
    /// True between a start event and the matching terminal event.
    pub is_loading: bool,
    /// Set on failure, cleared by the next start or finish.
    pub last_error: Option<NavError>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

impl NavigationState {
    pub fn new(address: impl Into<String>) -> Self {
        NavigationState {
            address: address.into(),
            is_loading: false,
            last_error: None,
            can_go_back: false,
            can_go_forward: false,
        }
    }
}

/// What the embedded webview must provide. Commands are fire-and-forget;
/// results come back asynchronously as [`EngineEvent`]s. Implemented by
/// `WebviewEngine` in production and by a mock in the tests below.
pub trait Engine {
    fn load(&self, url: &Url);
    fn reload(&self);
    fn go_back(&self);
    fn go_forward(&self);
    fn can_go_back(&self) -> bool;
    fn can_go_forward(&self) -> bool;
}

/// Lifecycle callback from the engine. A start always precedes the
/// matching terminal event; ordering across attempts is otherwise
/// unspecified.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Started,
    Finished,
    Failed { code: Option<i64>, message: String },
    ProvisionalFailed { code: Option<i64>, message: String },
}

pub struct Bridge<E: Engine> {
    engine: E,
    state: NavigationState,
    // Attempt tagging: `attempt` is bumped for every command handed to the
    // engine, `live` records which attempt the last observed start belongs
    // to. Terminal events are dropped once a newer command superseded the
    // attempt they terminate, so a fast reload-then-load cannot have the
    // stale callback overwrite the newer attempt's state.
    attempt: u64,
    live: u64,
    observers: Observers<NavigationState>,
}

impl<E: Engine> Bridge<E> {
    pub fn new(engine: E, start_address: impl Into<String>) -> Self {
        Bridge {
            engine,
            state: NavigationState::new(start_address),
            attempt: 0,
            live: 0,
            observers: Observers::new(),
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn subscribe(&mut self, f: impl Fn(&NavigationState) + Send + 'static) -> SubscriptionId {
        self.observers.subscribe(f)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Validate `input` and hand it to the engine. A malformed address is
    /// rejected locally: `last_error` becomes `InvalidAddress` and the
    /// engine is never invoked. Returns whether a load was issued.
    ///
    /// The loading flag is not touched here; the engine's start event owns
    /// that transition.
    pub fn load(&mut self, input: &str) -> bool {
        match address::parse_address(input) {
            Err(reason) => {
                self.state.last_error = Some(NavError::InvalidAddress { reason });
                self.observers.notify(&self.state);
                false
            }
            Ok(url) => {
                self.state.address = url.to_string();
                self.attempt += 1;
                self.engine.load(&url);
                self.observers.notify(&self.state);
                true
            }
        }
    }

    pub fn reload(&mut self) {
        self.attempt += 1;
        self.engine.reload();
    }

    /// Silent no-op while the engine reports the action unavailable.
    pub fn go_back(&mut self) {
        if !self.state.can_go_back {
            return;
        }
        self.attempt += 1;
        self.engine.go_back();
    }

    /// Silent no-op while the engine reports the action unavailable.
    pub fn go_forward(&mut self) {
        if !self.state.can_go_forward {
            return;
        }
        self.attempt += 1;
        self.engine.go_forward();
    }

    /// Fold an engine lifecycle event into the state. Returns whether the
    /// event was applied; terminal events of superseded attempts are
    /// dropped.
    ///
    /// A start event carries no attempt identity on the real platform, so
    /// it is bound to the newest issued command.
    pub fn handle_event(&mut self, event: EngineEvent) -> bool {
        match event {
            EngineEvent::Started => {
                self.live = self.attempt;
                self.state.is_loading = true;
                self.state.last_error = None;
            }
            EngineEvent::Finished => {
                if self.stale() {
                    return false;
                }
                self.state.is_loading = false;
                self.state.last_error = None;
                self.refresh_from_engine();
            }
            EngineEvent::Failed { code, message } => {
                if self.stale() {
                    return false;
                }
                self.state.is_loading = false;
                self.state.last_error = Some(NavError::NavigationFailure { code, message });
                self.refresh_from_engine();
            }
            EngineEvent::ProvisionalFailed { code, message } => {
                if self.stale() {
                    return false;
                }
                self.state.is_loading = false;
                self.state.last_error = Some(NavError::ProvisionalFailure { code, message });
                self.refresh_from_engine();
            }
        }
        self.observers.notify(&self.state);
        true
    }

    /// Availability can be reported late by the platform's in-page probe;
    /// re-read the engine and publish only when something changed.
    pub fn refresh_availability(&mut self) {
        let back = self.engine.can_go_back();
        let forward = self.engine.can_go_forward();
        if back != self.state.can_go_back || forward != self.state.can_go_forward {
            self.state.can_go_back = back;
            self.state.can_go_forward = forward;
            self.observers.notify(&self.state);
        }
    }

    fn stale(&self) -> bool {
        self.live < self.attempt
    }

    fn refresh_from_engine(&mut self) {
        self.state.can_go_back = self.engine.can_go_back();
        self.state.can_go_forward = self.engine.can_go_forward();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockEngine {
        loads: RefCell<Vec<String>>,
        reloads: Cell<u32>,
        backs: Cell<u32>,
        forwards: Cell<u32>,
        can_back: Cell<bool>,
        can_forward: Cell<bool>,
    }

    impl Engine for MockEngine {
        fn load(&self, url: &Url) {
            self.loads.borrow_mut().push(url.to_string());
        }
        fn reload(&self) {
            self.reloads.set(self.reloads.get() + 1);
        }
        fn go_back(&self) {
            self.backs.set(self.backs.get() + 1);
        }
        fn go_forward(&self) {
            self.forwards.set(self.forwards.get() + 1);
        }
        fn can_go_back(&self) -> bool {
            self.can_back.get()
        }
        fn can_go_forward(&self) -> bool {
            self.can_forward.get()
        }
    }

    fn bridge() -> Bridge<MockEngine> {
        Bridge::new(MockEngine::default(), "http://127.0.0.1/chat/ABC")
    }

    /// Record every published `is_loading` value for sequence assertions.
    fn record_loading(b: &mut Bridge<MockEngine>) -> Arc<Mutex<Vec<bool>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let clone = seen.clone();
        b.subscribe(move |s| clone.lock().unwrap().push(s.is_loading));
        seen
    }

    #[test]
    fn malformed_address_never_reaches_engine() {
        let mut b = bridge();
        let issued = b.load("not a url");

        assert!(!issued);
        assert!(b.engine.loads.borrow().is_empty());
        assert!(!b.state().is_loading);
        assert!(matches!(
            b.state().last_error,
            Some(NavError::InvalidAddress { .. })
        ));
        // The requested address is untouched by a rejected load.
        assert_eq!(b.state().address, "http://127.0.0.1/chat/ABC");
    }

    #[test]
    fn successful_navigation_publishes_loading_sequence() {
        let mut b = bridge();
        let loading = record_loading(&mut b);

        b.engine.can_back.set(true);
        assert!(b.load("http://127.0.0.1/apps"));
        assert!(b.handle_event(EngineEvent::Started));
        assert!(b.handle_event(EngineEvent::Finished));

        assert_eq!(*loading.lock().unwrap(), vec![false, true, false]);
        assert_eq!(b.state().address, "http://127.0.0.1/apps");
        assert_eq!(b.state().last_error, None);
        assert!(b.state().can_go_back);
        assert!(!b.state().can_go_forward);
        assert_eq!(*b.engine.loads.borrow(), ["http://127.0.0.1/apps"]);
    }

    #[test]
    fn failed_navigation_surfaces_error() {
        let mut b = bridge();
        let loading = record_loading(&mut b);

        b.load("http://127.0.0.1:5001/chat");
        b.handle_event(EngineEvent::Started);
        b.handle_event(EngineEvent::Failed {
            code: Some(-1004),
            message: "connection refused".to_string(),
        });

        assert_eq!(*loading.lock().unwrap(), vec![false, true, false]);
        assert_eq!(
            b.state().last_error,
            Some(NavError::NavigationFailure {
                code: Some(-1004),
                message: "connection refused".to_string(),
            })
        );
    }

    #[test]
    fn provisional_failure_handled_like_failure() {
        let mut b = bridge();
        b.load("http://127.0.0.1/chat");
        b.handle_event(EngineEvent::Started);
        b.handle_event(EngineEvent::ProvisionalFailed {
            code: None,
            message: "host unreachable".to_string(),
        });

        assert!(!b.state().is_loading);
        assert!(matches!(
            b.state().last_error,
            Some(NavError::ProvisionalFailure { .. })
        ));
    }

    #[test]
    fn start_clears_previous_failure() {
        let mut b = bridge();
        b.load("http://127.0.0.1/chat");
        b.handle_event(EngineEvent::Started);
        b.handle_event(EngineEvent::Failed {
            code: None,
            message: "boom".to_string(),
        });
        assert!(b.state().last_error.is_some());

        b.load("http://127.0.0.1/apps");
        b.handle_event(EngineEvent::Started);

        assert!(b.state().is_loading);
        assert_eq!(b.state().last_error, None);
    }

    #[test]
    fn back_and_forward_noop_when_unavailable() {
        let mut b = bridge();
        let before = b.state().clone();

        b.go_back();
        b.go_forward();

        assert_eq!(b.engine.backs.get(), 0);
        assert_eq!(b.engine.forwards.get(), 0);
        assert_eq!(*b.state(), before);
    }

    #[test]
    fn back_delegates_when_available() {
        let mut b = bridge();
        b.engine.can_back.set(true);
        b.load("http://127.0.0.1/apps");
        b.handle_event(EngineEvent::Started);
        b.handle_event(EngineEvent::Finished);

        b.go_back();
        assert_eq!(b.engine.backs.get(), 1);
    }

    #[test]
    fn reload_delegates_to_engine() {
        let mut b = bridge();
        b.reload();
        assert_eq!(b.engine.reloads.get(), 1);
    }

    #[test]
    fn stale_terminal_event_is_dropped() {
        let mut b = bridge();
        b.load("http://127.0.0.1/chat");
        b.handle_event(EngineEvent::Started);

        // A second load supersedes the first attempt before it terminates.
        b.load("http://127.0.0.1/apps");

        // The first attempt's failure must not overwrite the newer state.
        let applied = b.handle_event(EngineEvent::Failed {
            code: None,
            message: "stale".to_string(),
        });
        assert!(!applied);
        assert!(b.state().is_loading);
        assert_eq!(b.state().last_error, None);

        // The newer attempt completes normally.
        assert!(b.handle_event(EngineEvent::Started));
        assert!(b.handle_event(EngineEvent::Finished));
        assert!(!b.state().is_loading);
        assert_eq!(b.state().last_error, None);
    }

    #[test]
    fn availability_refresh_publishes_only_changes() {
        let mut b = bridge();
        let notified = Arc::new(Mutex::new(0u32));
        let clone = notified.clone();
        b.subscribe(move |_| *clone.lock().unwrap() += 1);

        b.refresh_availability();
        assert_eq!(*notified.lock().unwrap(), 0);

        b.engine.can_forward.set(true);
        b.refresh_availability();
        assert_eq!(*notified.lock().unwrap(), 1);
        assert!(b.state().can_go_forward);
    }

    #[test]
    fn unsubscribed_observer_stops_receiving() {
        let mut b = bridge();
        let count = Arc::new(Mutex::new(0u32));
        let clone = count.clone();
        let id = b.subscribe(move |_| *clone.lock().unwrap() += 1);

        b.load("http://127.0.0.1/chat");
        assert!(b.unsubscribe(id));
        b.handle_event(EngineEvent::Started);

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn shell_session_against_local_chat_app() {
        // Startup at the chat interface, a typo, then a good navigation.
        let mut b = bridge();
        assert_eq!(b.state().address, "http://127.0.0.1/chat/ABC");

        b.load("not a url");
        assert!(matches!(
            b.state().last_error,
            Some(NavError::InvalidAddress { .. })
        ));
        assert!(!b.state().is_loading);
        assert!(b.engine.loads.borrow().is_empty());

        b.engine.can_back.set(true);
        b.load("http://127.0.0.1/apps");
        b.handle_event(EngineEvent::Started);
        b.handle_event(EngineEvent::Finished);

        assert!(!b.state().is_loading);
        assert_eq!(b.state().last_error, None);
        assert!(b.state().can_go_back);
    }
}
