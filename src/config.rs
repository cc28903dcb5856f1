// src/config.rs
//! Process settings: credential, model id, target output language.
//! Read at session start, written only on explicit save.

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const ENV_SETTINGS_PATH: &str = "RADAR_SETTINGS_PATH";
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
const DEFAULT_SETTINGS_PATH: &str = "config/settings.json";

pub const DEFAULT_MODEL_ID: &str = "gemini-3-flash-preview";
const DEFAULT_LANGUAGE: &str = "zh-CN";

/// Known model ids with display names, for the settings UI.
pub const MODEL_CATALOG: &[(&str, &str)] = &[
    ("gemini-3-flash-preview", "Gemini 3.0 Flash (Fast & Balanced)"),
    ("gemini-3-pro-preview", "Gemini 3.0 Pro (High Intelligence)"),
    ("gemini-2.5-flash-latest", "Gemini 2.5 Flash (Stable)"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Empty means: fall back to the `GEMINI_API_KEY` env var.
    pub api_key: String,
    pub model_id: String,
    /// Target language for enrichment output.
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Settings {
    /// Resolve the settings file path: `$RADAR_SETTINGS_PATH` or the default.
    pub fn path() -> PathBuf {
        env::var(ENV_SETTINGS_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_PATH))
    }

    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Missing or garbled file falls back to defaults; individual missing
    /// fields merge with defaults via `#[serde(default)]`.
    pub fn load_from(path: &Path) -> Self {
        let mut cfg = match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "settings file unreadable, using defaults");
                Settings::default()
            }),
            Err(_) => Settings::default(),
        };
        if cfg.model_id.trim().is_empty() {
            cfg.model_id = DEFAULT_MODEL_ID.to_string();
        }
        if cfg.language.trim().is_empty() {
            cfg.language = DEFAULT_LANGUAGE.to_string();
        }
        cfg
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string());
        fs::write(&tmp, json)?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// User-provided key wins; otherwise the env var. `None` means enrichment
    /// calls cannot be attempted at all.
    pub fn resolved_api_key(&self) -> Option<String> {
        let own = self.api_key.trim();
        if !own.is_empty() {
            return Some(own.to_string());
        }
        env::var(ENV_API_KEY).ok().filter(|k| !k.trim().is_empty())
    }
}
