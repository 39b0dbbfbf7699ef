// ~/vbkontrol/src/paths.rs

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};
use crate::{info, warn};

pub const ADDON_ID: &str = "plugin.program.vbkontrol";
pub const VIDEO_FOLDER_NAME: &str = "video_backgrounds";
pub const PROPERTIES_FOLDER_NAME: &str = "vbkontrol_properties";

pub fn user_home_dir() -> Option<PathBuf> {
    match dirs_next::home_dir() {
        Some(home) => Some(home),
        None => {
            warn!("Could not resolve the user's home directory");
            None
        }
    }
}

static HOST_HOME: OnceLock<PathBuf> = OnceLock::new();

/// Root of the media-center profile: `$KODI_HOME`, else `~/.kodi`. Resolved once per process.
pub fn host_home_dir() -> PathBuf {
    HOST_HOME
        .get_or_init(|| resolve_host_home(std::env::var("KODI_HOME").ok()))
        .clone()
}

fn resolve_host_home(kodi_home: Option<String>) -> PathBuf {
    if let Some(home) = kodi_home.filter(|home| !home.trim().is_empty()) {
        return PathBuf::from(home);
    }

    match user_home_dir() {
        Some(home) => home.join(".kodi"),
        None => {
            warn!("Falling back to current directory as host home");
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".kodi")
        }
    }
}

/// `userdata/addon_data/plugin.program.vbkontrol/` under the host home.
pub fn addon_data_dir() -> PathBuf {
    host_home_dir()
        .join("userdata")
        .join("addon_data")
        .join(ADDON_ID)
}

pub fn video_folder(data_dir: &Path) -> PathBuf {
    data_dir.join(VIDEO_FOLDER_NAME)
}

pub fn properties_dir() -> PathBuf {
    host_home_dir().join("temp").join(PROPERTIES_FOLDER_NAME)
}

/// Create `dir` if missing. Returns false (and logs) when it cannot be created.
pub fn ensure_dir(dir: &Path) -> bool {
    if dir.is_dir() {
        return true;
    }
    match std::fs::create_dir_all(dir) {
        Ok(_) => {
            info!("Created folder {}", dir.display());
            true
        }
        Err(e) => {
            warn!("Failed to create folder {}: {e}", dir.display());
            false
        }
    }
}

/// Resolve `special://` virtual paths against `host_home`. Other strings pass through.
pub fn translate_path_in(host_home: &Path, path: &str) -> PathBuf {
    let Some(rest) = path.strip_prefix("special://") else {
        return PathBuf::from(path);
    };

    let (root, tail) = match rest.split_once('/') {
        Some((root, tail)) => (root, tail),
        None => (rest, ""),
    };

    let base = match root {
        "home" => host_home.to_path_buf(),
        "userdata" | "profile" | "masterprofile" => host_home.join("userdata"),
        "temp" => host_home.join("temp"),
        _ => {
            warn!("Unknown special:// root '{}', leaving path untouched", root);
            return PathBuf::from(path);
        }
    };

    tail.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(base, |acc, segment| acc.join(segment))
}

pub fn translate_path(path: &str) -> PathBuf {
    translate_path_in(&host_home_dir(), path)
}

/// Existence check used for stored video references.
pub fn video_exists(path: &str) -> bool {
    !path.is_empty() && translate_path(path).exists()
}
