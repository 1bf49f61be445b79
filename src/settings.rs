use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::history::DEFAULT_CAPACITY;
use crate::ids::IdStrategy;

pub const START_URL_ENV: &str = "HONEYCOMB_START_URL";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    /// Origin loaded at startup. Without one the bundled graph is shown.
    pub start_url: Option<String>,
    pub file_path: String,
    pub history_capacity: usize,
    pub fetch_timeout_secs: u64,
    pub id_strategy: IdStrategy,
    pub discard_stale_loads: bool,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:6543".to_string(),
            start_url: None,
            file_path: "diagram.json".to_string(),
            history_capacity: DEFAULT_CAPACITY,
            fetch_timeout_secs: 4,
            id_strategy: IdStrategy::Random,
            discard_stale_loads: false,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    /// Start origin, with the environment taking precedence over the file.
    pub fn effective_start_url(&self) -> Option<String> {
        std::env::var(START_URL_ENV)
            .ok()
            .or_else(|| self.start_url.clone())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// `~/.config/honeycomb.toml` when it exists, else `settings.toml` in the
/// working directory if present.
pub fn config_path() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config").join("honeycomb.toml");
        if path.exists() {
            return Some(path);
        }
    }
    let local = PathBuf::from("settings.toml");
    local.exists().then_some(local)
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("toml")
}

/// Reads settings, trying the format the extension suggests first and the
/// other one second. Unreadable or unparsable files yield `None`.
pub fn load_settings(path: &Path) -> Option<Settings> {
    let s = std::fs::read_to_string(path).ok()?;
    if is_toml(path) {
        toml::from_str::<Settings>(&s)
            .ok()
            .or_else(|| serde_json::from_str::<Settings>(&s).ok())
    } else {
        serde_json::from_str::<Settings>(&s)
            .ok()
            .or_else(|| toml::from_str::<Settings>(&s).ok())
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let text = if is_toml(path) {
        toml::to_string_pretty(settings)?
    } else {
        serde_json::to_string_pretty(settings)?
    };
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("honeycomb.toml");
        std::fs::write(
            &path,
            "api_base_url = \"https://hive.example.org\"\nid_strategy = \"timestamped\"\n",
        )
        .unwrap();
        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.api_base_url, "https://hive.example.org");
        assert_eq!(settings.id_strategy, IdStrategy::Timestamped);
        assert_eq!(settings.history_capacity, 5);
        assert!(!settings.discard_stale_loads);
    }

    #[test]
    fn json_content_in_a_toml_file_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, r#"{ "history_capacity": 9 }"#).unwrap();
        assert_eq!(load_settings(&path).unwrap().history_capacity, 9);
    }

    #[test]
    fn save_then_load_round_trips_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            start_url: Some("https://hive.example.org/api/v1/honeycombs/a".into()),
            discard_stale_loads: true,
            ..Settings::default()
        };
        for name in ["s.toml", "s.json"] {
            let path = dir.path().join(name);
            save_settings(&path, &settings).unwrap();
            assert_eq!(load_settings(&path).unwrap(), settings);
        }
    }

    #[test]
    fn garbage_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "history_capacity = [").unwrap();
        assert!(load_settings(&path).is_none());
        assert!(load_settings(&dir.path().join("missing.toml")).is_none());
    }

    #[test]
    fn timeout_is_never_zero() {
        let settings = Settings {
            fetch_timeout_secs: 0,
            ..Settings::default()
        };
        assert_eq!(settings.fetch_timeout(), Duration::from_secs(1));
    }
}
