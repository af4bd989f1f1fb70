use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tauri::AppHandle;
use tauri::Manager;

/// Seed entry for the in-memory bookmark list. Configuration only: runtime
/// bookmark edits are never written back here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuickLink {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Address the content webview loads at startup.
    pub start_url: String,
    /// Default bookmarks offered on first launch.
    pub quick_links: Vec<QuickLink>,
    /// Cadence of the reachability probe, in seconds.
    pub probe_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_url: "http://127.0.0.1/chat".to_string(),
            quick_links: vec![
                QuickLink {
                    name: "Chat Interface".to_string(),
                    address: "http://127.0.0.1/chat".to_string(),
                },
                QuickLink {
                    name: "Apps Dashboard".to_string(),
                    address: "http://127.0.0.1/apps".to_string(),
                },
            ],
            probe_interval_secs: 15,
        }
    }
}

impl Settings {
    pub fn get_path(app: &AppHandle) -> PathBuf {
        app.path()
            .app_data_dir()
            .expect("failed to get app data dir")
            .join("settings.json")
    }

    pub fn load(app: &AppHandle) -> Self {
        Self::load_from(&Self::get_path(app))
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    eprintln!("[Settings] Failed to parse settings: {}, returning defaults", e);
                    Self::default()
                }),
                Err(e) => {
                    eprintln!("[Settings] Failed to read file: {}, returning defaults", e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    pub fn save(&self, app: &AppHandle) -> Result<(), String> {
        self.save_to(&Self::get_path(app))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        let tmp_path = path.with_extension("tmp");
        let parent = path.parent().ok_or("settings path has no parent")?;

        fs::create_dir_all(parent).map_err(|e| e.to_string())?;

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        // Atomic write strategy: write to tmp, then rename.
        // This ensures we never have a half-written file if the app crashes.
        fs::write(&tmp_path, json).map_err(|e| e.to_string())?;
        fs::rename(tmp_path, path).map_err(|e| e.to_string())?;

        Ok(())
    }
}
