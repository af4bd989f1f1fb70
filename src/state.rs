// Shared state handed to Tauri's managed state.
// The bridge owns the engine handle; everything else is reached through
// the Arc handles so setup closures and commands see the same instances.

use std::sync::{Arc, Mutex, RwLock};

use crate::engine::WebviewEngine;
use crate::modules::bookmarks::BookmarkList;
use crate::modules::nav::Bridge;
use crate::monitor::NetworkMonitor;
use crate::settings::Settings;

pub struct AppState {
    pub bridge: Arc<Mutex<Bridge<WebviewEngine>>>,
    pub bookmarks: Arc<Mutex<BookmarkList>>,
    pub settings: Arc<RwLock<Settings>>,
    pub monitor: Arc<NetworkMonitor>,
}
