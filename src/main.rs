use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tauri::menu::{MenuBuilder, MenuItemBuilder, PredefinedMenuItem, SubmenuBuilder};
use tauri::webview::PageLoadEvent;
use tauri::{
    AppHandle, Emitter, Manager, PhysicalPosition, PhysicalSize, State, WebviewBuilder,
    WebviewUrl, Window,
};
use url::Url;

use chatdock_lib::engine::{WebviewEngine, CONTENT_WEBVIEW};
use chatdock_lib::modules::address;
use chatdock_lib::modules::bookmarks::{BookmarkEntry, BookmarkList};
use chatdock_lib::modules::nav::{Bridge, EngineEvent, NavError, NavigationState};
use chatdock_lib::modules::signal;
use chatdock_lib::monitor::NetworkMonitor;
use chatdock_lib::settings::Settings;
use chatdock_lib::state::AppState;

// Base URL of the shell's own bundled pages inside the content webview.
#[cfg(windows)]
const SHELL_PAGE_BASE: &str = "http://tauri.localhost";
#[cfg(not(windows))]
const SHELL_PAGE_BASE: &str = "tauri://localhost";

/// Shell-internal pages (the bundled error page) must not feed the bridge:
/// they are presentation, not navigation.
fn is_shell_page(url: &Url) -> bool {
    url.scheme() == "tauri" || url.host_str() == Some("tauri.localhost")
}

// Show settings window
fn show_settings_window(app: &AppHandle) {
    if let Some(win) = app.get_window("settings") {
        let _ = win.set_focus();
        return;
    }

    let settings_window = tauri::WebviewWindowBuilder::new(
        app,
        "settings",
        tauri::WebviewUrl::App("settings.html".into()),
    )
    .title("Settings")
    .inner_size(500.0, 600.0)
    .resizable(true)
    .minimizable(false)
    .maximizable(false)
    .center()
    .focused(true)
    .build();

    if let Err(e) = settings_window {
        println!("Failed to create settings window: {:?}", e);
    }
}

/// Replace the content surface with the bundled error page describing the
/// bridge's last error. The page offers the remediation commands.
fn show_error_page(app: &AppHandle, nav: &NavigationState) {
    let Some(error) = &nav.last_error else { return };
    let (code, message) = match error {
        NavError::NavigationFailure { code, message }
        | NavError::ProvisionalFailure { code, message } => (*code, message.clone()),
        NavError::InvalidAddress { reason } => (None, reason.clone()),
    };

    let mut error_url = format!(
        "{}/error.html?msg={}&addr={}",
        SHELL_PAGE_BASE,
        urlencoding::encode(&message),
        urlencoding::encode(&nav.address),
    );
    if let Some(code) = code {
        error_url.push_str(&format!("&code={}", code));
    }

    if let Some(webview) = app.get_webview(CONTENT_WEBVIEW) {
        let _ = webview.eval(&format!("window.location.replace('{}')", error_url));
    }
}

/// Connection sentinel for an issued load. The platform webview reports no
/// load-failure callback, so unreachable targets are detected here and fed
/// back into the bridge as a provisional failure.
///
/// Only connection-level errors count (DNS, refused). HTTP error statuses
/// render in the webview like any page, and a slow server is not a
/// failure: timeouts stay the engine's business.
async fn probe_load(app: AppHandle, address: String) {
    if !address.starts_with("http://") && !address.starts_with("https://") {
        return;
    }

    // Give the engine a beat to issue its own start event first.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
    {
        Ok(client) => client,
        Err(_) => return,
    };

    let Err(e) = client.get(address.as_str()).send().await else {
        return;
    };
    if !e.is_connect() {
        return;
    }
    println!("[Sentinel] {} unreachable: {}", address, e);

    let state = app.state::<AppState>();
    let snapshot = {
        let mut bridge = match state.bridge.lock() {
            Ok(bridge) => bridge,
            Err(_) => return,
        };
        let applied = bridge.handle_event(EngineEvent::ProvisionalFailed {
            code: None,
            message: e.to_string(),
        });
        // A stale probe (the user already navigated elsewhere) is dropped
        // by the bridge; only an applied failure gets the error page.
        applied.then(|| bridge.state().clone())
    };
    if let Some(snapshot) = snapshot {
        show_error_page(&app, &snapshot);
    }
}

/// Run a load through the bridge and, when it was issued, start the
/// connection sentinel for the normalized target.
fn issue_load(app: &AppHandle, state: &AppState, input: &str) -> Result<(), String> {
    let target = {
        let mut bridge = state.bridge.lock().map_err(|e| e.to_string())?;
        bridge.load(input).then(|| bridge.state().address.clone())
    };
    if let Some(target) = target {
        tauri::async_runtime::spawn(probe_load(app.clone(), target));
    }
    Ok(())
}

#[tauri::command]
fn navigate(app: AppHandle, state: State<AppState>, url: String) -> Result<(), String> {
    issue_load(&app, &state, &url)
}

#[tauri::command]
fn reload_page(state: State<AppState>) -> Result<(), String> {
    state.bridge.lock().map_err(|e| e.to_string())?.reload();
    Ok(())
}

#[tauri::command]
fn go_back(state: State<AppState>) -> Result<(), String> {
    state.bridge.lock().map_err(|e| e.to_string())?.go_back();
    Ok(())
}

#[tauri::command]
fn go_forward(state: State<AppState>) -> Result<(), String> {
    state.bridge.lock().map_err(|e| e.to_string())?.go_forward();
    Ok(())
}

#[tauri::command]
fn nav_state(state: State<AppState>) -> Result<NavigationState, String> {
    Ok(state.bridge.lock().map_err(|e| e.to_string())?.state().clone())
}

#[tauri::command]
fn retry_current(app: AppHandle, state: State<AppState>) -> Result<(), String> {
    let address = state
        .bridge
        .lock()
        .map_err(|e| e.to_string())?
        .state()
        .address
        .clone();
    issue_load(&app, &state, &address)
}

#[tauri::command]
fn retry_with_host_alias(app: AppHandle, state: State<AppState>) -> Result<(), String> {
    let next = {
        let bridge = state.bridge.lock().map_err(|e| e.to_string())?;
        address::swap_host_alias(&bridge.state().address)
    };
    issue_load(&app, &state, &next)
}

#[tauri::command]
fn retry_with_alt_port(app: AppHandle, state: State<AppState>) -> Result<(), String> {
    let next = {
        let bridge = state.bridge.lock().map_err(|e| e.to_string())?;
        address::swap_port(&bridge.state().address)
    };
    issue_load(&app, &state, &next)
}

#[tauri::command]
fn list_bookmarks(state: State<AppState>) -> Result<Vec<BookmarkEntry>, String> {
    Ok(state
        .bookmarks
        .lock()
        .map_err(|e| e.to_string())?
        .entries()
        .to_vec())
}

#[tauri::command]
fn add_bookmark(state: State<AppState>, address: String) -> Result<bool, String> {
    Ok(state
        .bookmarks
        .lock()
        .map_err(|e| e.to_string())?
        .add(&address))
}

#[tauri::command]
fn rename_bookmark(state: State<AppState>, index: usize, name: String) -> Result<(), String> {
    state
        .bookmarks
        .lock()
        .map_err(|e| e.to_string())?
        .rename(index, &name);
    Ok(())
}

#[tauri::command]
fn remove_bookmark(state: State<AppState>, index: usize) -> Result<(), String> {
    state
        .bookmarks
        .lock()
        .map_err(|e| e.to_string())?
        .remove(index);
    Ok(())
}

#[tauri::command]
fn get_settings(state: State<AppState>) -> Result<Settings, String> {
    Ok(state.settings.read().map_err(|e| e.to_string())?.clone())
}

#[tauri::command]
fn save_settings(
    app: AppHandle,
    state: State<AppState>,
    settings: Settings,
) -> Result<(), String> {
    settings.save(&app)?;
    *state.settings.write().map_err(|e| e.to_string())? = settings;
    Ok(())
}

#[tauri::command]
fn network_online(state: State<AppState>) -> bool {
    state.monitor.is_online()
}

#[tauri::command]
fn open_settings(app: AppHandle) {
    show_settings_window(&app);
}

fn main() {
    tauri::Builder::default()
        .setup(move |app| {
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }

            let main_window: Window = app.get_window("main").unwrap();
            let handle = app.handle().clone();

            let settings = Settings::load(&handle);

            // --- Bridge, bookmarks, monitor ---
            let mut bridge = Bridge::new(
                WebviewEngine::new(handle.clone()),
                settings.start_url.clone(),
            );
            let emit_handle = handle.clone();
            bridge.subscribe(move |nav| {
                let _ = emit_handle.emit("nav-state", nav.clone());
            });
            let bridge = Arc::new(Mutex::new(bridge));

            let seed = settings
                .quick_links
                .iter()
                .map(|link| BookmarkEntry {
                    name: link.name.clone(),
                    address: link.address.clone(),
                })
                .collect();
            let mut bookmarks = BookmarkList::with_entries(seed);
            let emit_handle = handle.clone();
            bookmarks.subscribe(move |entries| {
                let _ = emit_handle.emit("bookmarks-updated", entries.to_vec());
            });

            let monitor = NetworkMonitor::spawn(
                handle.clone(),
                &settings.start_url,
                Duration::from_secs(settings.probe_interval_secs),
            );

            app.manage(AppState {
                bridge: bridge.clone(),
                bookmarks: Arc::new(Mutex::new(bookmarks)),
                settings: Arc::new(RwLock::new(settings.clone())),
                monitor: Arc::new(monitor),
            });

            // --- Build Native Menu ---
            let shell_menu = SubmenuBuilder::new(app, "Chatdock")
                .item(&PredefinedMenuItem::about(app, Some("About Chatdock"), None)?)
                .separator()
                .item(
                    &MenuItemBuilder::with_id("settings", "Settings")
                        .accelerator("CmdOrCtrl+,")
                        .build(app)?,
                )
                .separator()
                .item(&PredefinedMenuItem::quit(app, Some("Quit Chatdock"))?)
                .build()?;

            let edit_menu = SubmenuBuilder::new(app, "Edit")
                .item(&PredefinedMenuItem::undo(app, Some("Undo"))?)
                .item(&PredefinedMenuItem::redo(app, Some("Redo"))?)
                .separator()
                .item(&PredefinedMenuItem::cut(app, Some("Cut"))?)
                .item(&PredefinedMenuItem::copy(app, Some("Copy"))?)
                .item(&PredefinedMenuItem::paste(app, Some("Paste"))?)
                .item(&PredefinedMenuItem::select_all(app, Some("Select All"))?)
                .build()?;

            let view_menu = SubmenuBuilder::new(app, "View")
                .item(
                    &MenuItemBuilder::with_id("reload", "Reload Page")
                        .accelerator("CmdOrCtrl+R")
                        .build(app)?,
                )
                .build()?;

            let history_menu = SubmenuBuilder::new(app, "History")
                .item(
                    &MenuItemBuilder::with_id("go_back", "Back")
                        .accelerator("CmdOrCtrl+[")
                        .build(app)?,
                )
                .item(
                    &MenuItemBuilder::with_id("go_forward", "Forward")
                        .accelerator("CmdOrCtrl+]")
                        .build(app)?,
                )
                .build()?;

            let menu = MenuBuilder::new(app)
                .items(&[&shell_menu, &edit_menu, &view_menu, &history_menu])
                .build()?;

            app.set_menu(menu)?;

            app.on_menu_event(move |app_handle, event| {
                let id = event.id().0.as_str();
                match id {
                    "settings" => show_settings_window(app_handle),
                    "reload" => {
                        let bridge = app_handle.state::<AppState>().bridge.clone();
                        if let Ok(mut bridge) = bridge.lock() {
                            bridge.reload();
                        };
                    }
                    "go_back" => {
                        let bridge = app_handle.state::<AppState>().bridge.clone();
                        if let Ok(mut bridge) = bridge.lock() {
                            bridge.go_back();
                        };
                    }
                    "go_forward" => {
                        let bridge = app_handle.state::<AppState>().bridge.clone();
                        if let Ok(mut bridge) = bridge.lock() {
                            bridge.go_forward();
                        };
                    }
                    _ => {}
                }
            });

            // --- Setup Content Webview ---
            let toolbar_height_logical: f64 = 48.0;

            let physical_size = main_window.inner_size()?;
            let scale_factor = main_window.scale_factor()?;
            let toolbar_height_physical = (toolbar_height_logical * scale_factor) as u32;

            let content_y = toolbar_height_physical;
            let content_height = physical_size
                .height
                .saturating_sub(toolbar_height_physical)
                .max(100);

            let start_url = address::parse_address(&settings.start_url)
                .unwrap_or_else(|reason| {
                    eprintln!("[Shell] Configured start URL rejected: {}", reason);
                    Url::parse("about:blank").unwrap()
                });

            let bridge_for_nav = bridge.clone();
            let bridge_for_load = bridge.clone();

            let webview_builder = WebviewBuilder::new(
                CONTENT_WEBVIEW,
                WebviewUrl::External(start_url),
            )
            .initialization_script(signal::PROBE_SCRIPT)
            .on_navigation(move |url| {
                // Probe reports arrive as internal-scheme navigations:
                // consume them, never let them hit the network.
                if let Some(report) = signal::parse_availability_signal(url) {
                    if let Ok(mut bridge) = bridge_for_nav.lock() {
                        bridge
                            .engine()
                            .set_availability(report.can_go_back, report.can_go_forward);
                        bridge.refresh_availability();
                    }
                    return false;
                }
                true
            })
            .on_page_load(move |_webview, payload| {
                if is_shell_page(payload.url()) {
                    return;
                }
                let event = match payload.event() {
                    PageLoadEvent::Started => EngineEvent::Started,
                    PageLoadEvent::Finished => EngineEvent::Finished,
                };
                if let Ok(mut bridge) = bridge_for_load.lock() {
                    let _ = bridge.handle_event(event);
                }
            });

            let _content_webview = main_window.add_child(
                webview_builder,
                PhysicalPosition::new(0, content_y as i32),
                PhysicalSize::new(physical_size.width, content_height),
            )?;

            // Handle Window Resizing
            let main_window_clone = main_window.clone();
            main_window.on_window_event(move |event| {
                if let tauri::WindowEvent::Resized(new_physical_size) = event {
                    let scale = main_window_clone.scale_factor().unwrap_or(1.0);
                    let toolbar_physical = (toolbar_height_logical * scale) as u32;
                    let content_h = new_physical_size
                        .height
                        .saturating_sub(toolbar_physical)
                        .max(100);

                    if let Some(wv) = handle.get_webview(CONTENT_WEBVIEW) {
                        let _ = wv.set_bounds(tauri::Rect {
                            position: tauri::Position::Physical(PhysicalPosition::new(
                                0,
                                toolbar_physical as i32,
                            )),
                            size: tauri::Size::Physical(PhysicalSize::new(
                                new_physical_size.width,
                                content_h,
                            )),
                        });
                    }
                }
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            navigate,
            reload_page,
            go_back,
            go_forward,
            nav_state,
            retry_current,
            retry_with_host_alias,
            retry_with_alt_port,
            list_bookmarks,
            add_bookmark,
            rename_bookmark,
            remove_bookmark,
            get_settings,
            save_settings,
            network_online,
            open_settings
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
