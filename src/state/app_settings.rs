use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_PER_PAGE: usize = 10;

/// Operator preferences, persisted as JSON in the config dir. Missing or
/// malformed files fall back to defaults silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub full_screen: bool,
    #[serde(default = "default_per_page")]
    pub items_per_page: usize,
}

fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            items_per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        let Some(path) = settings_path() else {
            return Self::default();
        };
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        let Some(path) = settings_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(payload) = serde_json::to_string_pretty(self) {
            let _ = std::fs::write(path, payload);
        }
    }
}

fn settings_path() -> Option<PathBuf> {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return Some(PathBuf::from(config_dir).join("estui").join("settings.json"));
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return Some(
            PathBuf::from(home)
                .join(".config")
                .join("estui")
                .join("settings.json"),
        );
    }
    None
}
