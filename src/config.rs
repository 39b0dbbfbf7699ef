// ~/vbkontrol/src/config.rs

use serde::{Deserialize, Serialize};
use std::{path::{Path, PathBuf}, time::Duration};
use crate::{info, warn, error};

pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Add-on configuration persisted in config.yaml inside the add-on data folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonConfig {
    /// Write info-level lines to the log.
    #[serde(default)]
    pub debug: bool,

    /// Seconds between full publish cycles of the service (1–3600).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Service loop tick in milliseconds (50–60000).
    #[serde(default = "default_tick")]
    pub tick_ms: u64,

    /// Seconds to wait after a failed loop iteration (never shorter than one tick, at most 3600).
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u64,

    /// Stop the service after this many failed iterations in a row. 0 keeps retrying.
    #[serde(default)]
    pub max_consecutive_errors: u32,

    /// Extensions offered by the video picker.
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
}

fn default_refresh_interval() -> u64 {
    10
}

fn default_tick() -> u64 {
    1000
}

fn default_error_backoff() -> u64 {
    5
}

fn default_video_extensions() -> Vec<String> {
    [".mp4", ".mkv", ".avi", ".mov", ".wmv", ".flv", ".webm", ".m4v"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            debug: false,
            refresh_interval_secs: default_refresh_interval(),
            tick_ms: default_tick(),
            error_backoff_secs: default_error_backoff(),
            max_consecutive_errors: 0,
            video_extensions: default_video_extensions(),
        }
    }
}

impl AddonConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.clamp(1, 3600))
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.clamp(50, 60_000))
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs.min(3600)).max(self.tick())
    }

    /// Extensions normalised to lowercase with a leading dot.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.video_extensions
            .iter()
            .map(|ext| ext.trim().to_lowercase())
            .filter(|ext| !ext.is_empty() && ext != ".")
            .map(|ext| if ext.starts_with('.') { ext } else { format!(".{ext}") })
            .collect()
    }
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

/// Load config.yaml from `data_dir` (or create defaults). Call once at startup.
pub fn load_config(data_dir: &Path) -> AddonConfig {
    let path = config_path(data_dir);

    if path.exists() {
        match std::fs::read_to_string(&path) {
            Ok(text) => match serde_yaml::from_str::<AddonConfig>(&text) {
                Ok(c) => {
                    info!("Loaded add-on config from {}", path.display());
                    c
                }
                Err(e) => {
                    warn!("Failed to parse config.yaml, using defaults: {e}");
                    AddonConfig::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config.yaml, using defaults: {e}");
                AddonConfig::default()
            }
        }
    } else {
        info!("No config.yaml found, creating defaults at {}", path.display());
        let defaults = AddonConfig::default();
        save_config_to_disk(&path, &defaults);
        defaults
    }
}

fn save_config_to_disk(path: &Path, cfg: &AddonConfig) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            error!("Failed to create config directory {}: {e}", parent.display());
            return;
        }
    }
    match serde_yaml::to_string(cfg) {
        Ok(text) => {
            if let Err(e) = std::fs::write(path, text) {
                error!("Failed to write config.yaml: {e}");
            }
        }
        Err(e) => error!("Failed to serialize config: {e}"),
    }
}
