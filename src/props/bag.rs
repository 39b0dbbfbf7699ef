// ~/vbkontrol/src/props/bag.rs
// Shared key/value property bag read by skins.

use std::{
    collections::{BTreeMap, HashMap},
    io::ErrorKind,
    path::PathBuf,
    sync::RwLock,
};
use sha2::{Digest, Sha256};
use crate::{info, warn};

/// Shared property store. Keys are full keys including the `VBKontrol.` prefix.
/// Every call is independent: last writer wins per key.
pub trait PropertyBag: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn clear(&self, key: &str) -> Result<(), String>;
    fn snapshot(&self) -> BTreeMap<String, String>;
}

/// In-process bag.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Default)]
pub struct MemoryBag {
    props: RwLock<HashMap<String, String>>,
}

#[cfg_attr(not(test), allow(dead_code))]
impl MemoryBag {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PropertyBag for MemoryBag {
    fn get(&self, key: &str) -> Option<String> {
        self.props.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let mut props = self.props.write().map_err(|e| format!("property lock poisoned: {e}"))?;
        props.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), String> {
        let mut props = self.props.write().map_err(|e| format!("property lock poisoned: {e}"))?;
        props.remove(key);
        Ok(())
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        match self.props.read() {
            Ok(props) => props.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Err(_) => BTreeMap::new(),
        }
    }
}

const PROPERTY_EXT: &str = "prop";
/// Long keys live in hashed files that carry their own key on the first line.
const KEYED_EXT: &str = "kprop";
/// Longest encoded key kept verbatim as a file name. Leaves room for the temp suffix under NAME_MAX.
const MAX_PLAIN_NAME: usize = 160;
const HASHED_PREFIX: usize = 64;

/// Window properties shared across processes: one file per key inside `dir`.
/// Writes go through a temp file and a rename so readers never see half a value.
#[derive(Debug, Clone)]
pub struct WindowProperties {
    dir: PathBuf,
}

struct PropertyFile {
    path: PathBuf,
    stem: String,
    /// Encoded key stored ahead of the value, for hashed file names.
    header: Option<String>,
}

impl WindowProperties {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_for(&self, key: &str) -> PropertyFile {
        let encoded = urlencoding::encode(key).into_owned();
        if encoded.len() <= MAX_PLAIN_NAME {
            return PropertyFile {
                path: self.dir.join(format!("{encoded}.{PROPERTY_EXT}")),
                stem: encoded,
                header: None,
            };
        }

        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        // percent-encoded text is ASCII, so any byte offset is a char boundary
        let stem = format!("{}-{}", &encoded[..HASHED_PREFIX], &digest[..32]);
        PropertyFile {
            path: self.dir.join(format!("{stem}.{KEYED_EXT}")),
            stem,
            header: Some(encoded),
        }
    }

    fn ensure_dir(&self) -> Result<(), String> {
        if self.dir.is_dir() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir)
            .map(|_| info!("Created window properties folder {}", self.dir.display()))
            .map_err(|e| format!("cannot create {}: {e}", self.dir.display()))
    }
}

/// Split a hashed property file into its encoded key and value.
fn split_keyed(contents: &str) -> Option<(&str, &str)> {
    contents.split_once('\n')
}

impl PropertyBag for WindowProperties {
    fn get(&self, key: &str) -> Option<String> {
        let file = self.file_for(key);
        let contents = std::fs::read_to_string(&file.path).ok()?;
        match &file.header {
            None => Some(contents),
            Some(header) => match split_keyed(&contents) {
                Some((stored, value)) if stored == header => Some(value.to_string()),
                _ => None,
            },
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.ensure_dir()?;
        let file = self.file_for(key);
        let tmp = self.dir.join(format!(".{}.{}.tmp", file.stem, std::process::id()));
        let contents = match &file.header {
            None => value.to_string(),
            Some(header) => format!("{header}\n{value}"),
        };

        std::fs::write(&tmp, contents).map_err(|e| format!("cannot write property '{key}': {e}"))?;
        if let Err(e) = std::fs::rename(&tmp, &file.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(format!("cannot publish property '{key}': {e}"));
        }
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), String> {
        match std::fs::remove_file(self.file_for(key).path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("cannot clear property '{key}': {e}")),
        }
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Failed to read window properties in {}: {e}", self.dir.display());
                }
                return out;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if ext != Some(PROPERTY_EXT) && ext != Some(KEYED_EXT) {
                continue;
            }
            let Ok(contents) = std::fs::read_to_string(&path) else { continue };

            let (encoded, value) = if ext == Some(KEYED_EXT) {
                let Some((encoded, value)) = split_keyed(&contents) else { continue };
                (encoded.to_string(), value.to_string())
            } else {
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
                (stem.to_string(), contents)
            };
            let Ok(key) = urlencoding::decode(&encoded) else { continue };
            out.insert(key.into_owned(), value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(bag: &dyn PropertyBag) {
        assert_eq!(bag.get("VBKontrol.TV Shows.Video"), None);
        bag.set("VBKontrol.TV Shows.Video", "/media/a.mp4").unwrap();
        bag.set("VBKontrol.Slot3.Video", "/media/a.mp4").unwrap();
        bag.set("VBKontrol.TV Shows.Video", "/media/b.mp4").unwrap();
        assert_eq!(bag.get("VBKontrol.TV Shows.Video").as_deref(), Some("/media/b.mp4"));

        bag.clear("VBKontrol.Slot3.Video").unwrap();
        bag.clear("VBKontrol.Slot3.Video").unwrap();
        assert_eq!(bag.get("VBKontrol.Slot3.Video"), None);

        let snap = bag.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap["VBKontrol.TV Shows.Video"], "/media/b.mp4");
    }

    #[test]
    fn memory_bag_set_get_clear() {
        exercise(&MemoryBag::new());
    }

    #[test]
    fn window_properties_set_get_clear() {
        let dir = TempDir::new().unwrap();
        let bag = WindowProperties::new(dir.path().join("props"));
        exercise(&bag);
    }

    #[test]
    fn window_properties_survive_odd_names() {
        let dir = TempDir::new().unwrap();
        let bag = WindowProperties::new(dir.path());
        let key = "VBKontrol.Kids/Cartoons: 100%.Video";
        bag.set(key, "x").unwrap();
        assert_eq!(bag.get(key).as_deref(), Some("x"));
        assert!(bag.snapshot().contains_key(key));
    }

    #[test]
    fn window_properties_are_visible_to_a_second_handle() {
        let dir = TempDir::new().unwrap();
        let writer = WindowProperties::new(dir.path());
        let reader = WindowProperties::new(dir.path());
        writer.set("VBKontrol.Service.Running", "true").unwrap();
        assert_eq!(reader.get("VBKontrol.Service.Running").as_deref(), Some("true"));
    }

    #[test]
    fn long_multibyte_keys_get_bounded_file_names() {
        let dir = TempDir::new().unwrap();
        let bag = WindowProperties::new(dir.path());
        let name = "番".repeat(30);
        let key = format!("VBKontrol.{name}.Video");
        let sibling = format!("VBKontrol.{name}.VideoExists");

        bag.set(&key, "/media/a.mp4").unwrap();
        bag.set(&sibling, "true").unwrap();
        assert_eq!(bag.get(&key).as_deref(), Some("/media/a.mp4"));
        assert_eq!(bag.get(&sibling).as_deref(), Some("true"));

        let snap = bag.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[&key], "/media/a.mp4");
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            assert!(entry.unwrap().file_name().len() <= 255);
        }

        bag.clear(&key).unwrap();
        assert_eq!(bag.get(&key), None);
        assert_eq!(bag.snapshot().len(), 1);
    }

    #[test]
    fn missing_directory_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let bag = WindowProperties::new(dir.path().join("never-created"));
        assert!(bag.snapshot().is_empty());
        assert_eq!(bag.get("VBKontrol.TotalSlots"), None);
        assert!(bag.clear("VBKontrol.TotalSlots").is_ok());
    }
}
