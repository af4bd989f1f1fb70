// Webview-backed engine.
// Commands are delegated to the content webview through script evaluation
// with fire-and-forget semantics; lifecycle events travel the other way
// through the hooks wired up in main.rs. Availability flags are cached
// here because the platform only reports them asynchronously, via the
// in-page probe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tauri::{AppHandle, Manager};
use url::Url;

use crate::modules::nav::Engine;

/// Label of the child webview hosting web content, as registered in the
/// main window setup.
pub const CONTENT_WEBVIEW: &str = "content";

pub struct WebviewEngine {
    app: AppHandle,
    can_go_back: Arc<AtomicBool>,
    can_go_forward: Arc<AtomicBool>,
}

impl WebviewEngine {
    pub fn new(app: AppHandle) -> Self {
        WebviewEngine {
            app,
            can_go_back: Arc::new(AtomicBool::new(false)),
            can_go_forward: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Called by the glue when the in-page probe reports history state.
    pub fn set_availability(&self, can_go_back: bool, can_go_forward: bool) {
        self.can_go_back.store(can_go_back, Ordering::SeqCst);
        self.can_go_forward.store(can_go_forward, Ordering::SeqCst);
    }

    fn eval(&self, js: &str) {
        if let Some(webview) = self.app.get_webview(CONTENT_WEBVIEW) {
            if let Err(e) = webview.eval(js) {
                eprintln!("[Engine] Failed to run script in content webview: {}", e);
            }
        } else {
            eprintln!("[Engine] Content webview not available");
        }
    }
}

impl Engine for WebviewEngine {
    fn load(&self, url: &Url) {
        self.eval(&format!("window.location.href = '{}'", url));
    }

    fn reload(&self) {
        self.eval("window.location.reload()");
    }

    fn go_back(&self) {
        self.eval("window.history.back()");
    }

    fn go_forward(&self) {
        self.eval("window.history.forward()");
    }

    fn can_go_back(&self) -> bool {
        self.can_go_back.load(Ordering::SeqCst)
    }

    fn can_go_forward(&self) -> bool {
        self.can_go_forward.load(Ordering::SeqCst)
    }
}
