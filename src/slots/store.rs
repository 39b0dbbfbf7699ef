// ~/vbkontrol/src/slots/store.rs
// Per-slot text files in the add-on data folder. The folder is the only source of truth.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use crate::{
    info, warn, error,
    paths::{ensure_dir, video_exists},
    props::{keys, PropertyBag},
    slots::{default_name, video_filename, SlotRecord, all_slots},
};

#[derive(Debug, Clone, Copy)]
enum SlotFile {
    Name,
    Video,
}

impl SlotFile {
    fn as_str(self) -> &'static str {
        match self {
            SlotFile::Name => "name",
            SlotFile::Video => "video",
        }
    }
}

#[derive(Clone)]
pub struct SlotStore {
    root: PathBuf,
    bag: Arc<dyn PropertyBag>,
}

impl SlotStore {
    pub fn new(root: impl Into<PathBuf>, bag: Arc<dyn PropertyBag>) -> Self {
        Self { root: root.into(), bag }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bag(&self) -> &Arc<dyn PropertyBag> {
        &self.bag
    }

    pub fn ensure_root(&self) -> bool {
        ensure_dir(&self.root)
    }

    fn field_path(&self, slot: u32, field: SlotFile) -> PathBuf {
        self.root.join(format!("slot_{slot}_{}.txt", field.as_str()))
    }

    /// Trimmed, non-empty contents of a slot file. Any read error counts as absent.
    fn read_field(&self, slot: u32, field: SlotFile) -> Option<String> {
        let text = std::fs::read_to_string(self.field_path(slot, field)).ok()?;
        let value = text.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn write_field(&self, slot: u32, field: SlotFile, value: &str) -> Result<(), String> {
        if !self.ensure_root() {
            return Err(format!("data folder {} is not available", self.root.display()));
        }
        let path = self.field_path(slot, field);
        std::fs::write(&path, value).map_err(|e| format!("cannot write {}: {e}", path.display()))
    }

    pub fn get_name(&self, slot: u32) -> String {
        self.read_field(slot, SlotFile::Name)
            .unwrap_or_else(|| default_name(slot))
    }

    /// Stored video path, only while the referenced media file still exists.
    pub fn get_video(&self, slot: u32) -> Option<String> {
        self.read_field(slot, SlotFile::Video)
            .filter(|path| video_exists(path))
    }

    pub fn set_name(&self, slot: u32, name: &str) -> bool {
        match self.write_field(slot, SlotFile::Name, name) {
            Ok(_) => {
                info!("Saved name '{}' for slot {}", name, slot);
                true
            }
            Err(e) => {
                error!("Error saving slot name: {e}");
                false
            }
        }
    }

    /// Persist `path` for `slot` and push it to the slot's two `Video` properties.
    pub fn set_video(&self, slot: u32, path: &str) -> bool {
        let path = path.trim();
        if !video_exists(path) {
            warn!("Refusing to assign missing video '{}' to slot {}", path, slot);
            return false;
        }

        if let Err(e) = self.write_field(slot, SlotFile::Video, path) {
            error!("Error saving slot video: {e}");
            return false;
        }

        let name = self.get_name(slot);
        for key in keys::video_keys(&name, slot) {
            if let Err(e) = self.bag.set(&key, path) {
                error!("Error saving slot video: {e}");
                return false;
            }
        }

        info!("Set video for {}: {}", name, video_filename(path));
        true
    }

    /// Remove the slot's video file and its two `Video` properties.
    /// Returns whether a stored file was actually removed; clearing twice is harmless.
    pub fn clear_video(&self, slot: u32) -> bool {
        let path = self.field_path(slot, SlotFile::Video);
        let removed = match std::fs::remove_file(&path) {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                error!("Error clearing slot video {}: {e}", path.display());
                false
            }
        };

        let name = self.get_name(slot);
        for key in keys::video_keys(&name, slot) {
            if let Err(e) = self.bag.clear(&key) {
                warn!("Failed to clear property {key}: {e}");
            }
        }

        if removed {
            info!("Cleared video for {}", name);
        }
        removed
    }

    pub fn record(&self, slot: u32) -> SlotRecord {
        SlotRecord {
            index: slot,
            name: self.get_name(slot),
            video: self.get_video(slot),
        }
    }

    pub fn records(&self) -> Vec<SlotRecord> {
        all_slots().map(|slot| self.record(slot)).collect()
    }
}
