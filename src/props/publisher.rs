// ~/vbkontrol/src/props/publisher.rs
// Mirrors the slot store into the property bag.

use crate::{
    info, warn,
    paths::video_exists,
    props::{
        keys::{self, PropertyUpdate},
        PropertyBag,
    },
    slots::{all_slots, SlotRecord, SlotStore},
};

pub fn apply(bag: &dyn PropertyBag, updates: &[PropertyUpdate]) -> Result<(), String> {
    for update in updates {
        match update {
            PropertyUpdate::Set(key, value) => bag.set(key, value)?,
            PropertyUpdate::Clear(key) => bag.clear(key)?,
        }
    }
    Ok(())
}

/// Publish one slot under both identities and return what was published.
pub fn publish_slot(store: &SlotStore, slot: u32) -> Result<SlotRecord, String> {
    let record = store.record(slot);
    let exists = record.video.as_deref().map(video_exists).unwrap_or(false);
    apply(store.bag().as_ref(), &keys::slot_updates(&record, exists))?;
    Ok(record)
}

/// One publish cycle: every slot, then the total slot count.
/// A failing slot does not hold back the others; the first error is returned.
pub fn publish_all(store: &SlotStore) -> Result<(), String> {
    let mut first_error = None;
    for slot in all_slots() {
        if let Err(e) = publish_slot(store, slot) {
            warn!("Failed to publish slot {slot}: {e}");
            first_error.get_or_insert(e);
        }
    }
    if let Err(e) = apply(store.bag().as_ref(), &[keys::total_slots_update()]) {
        first_error.get_or_insert(e);
    }
    first_error.map_or(Ok(()), Err)
}

pub fn publish_liveness(bag: &dyn PropertyBag, version: &str) -> Result<(), String> {
    bag.set(&keys::service_running(), "true")?;
    bag.set(&keys::service_version(), version)
}

/// Clear the six media keys of a slot. The name key stays.
pub fn clear_slot_media(bag: &dyn PropertyBag, name: &str, slot: u32) -> Result<(), String> {
    let updates: Vec<PropertyUpdate> = keys::media_keys(name, slot)
        .into_iter()
        .map(PropertyUpdate::Clear)
        .collect();
    apply(bag, &updates)
}

/// Move a renamed slot's name-keyed properties from `old_name` to its current name.
pub fn republish_renamed(store: &SlotStore, slot: u32, old_name: &str) -> Result<SlotRecord, String> {
    let bag = store.bag().as_ref();
    for key in keys::name_keyed(old_name) {
        bag.clear(&key)?;
    }
    let record = publish_slot(store, slot)?;
    info!("Moved properties of slot {} from '{}' to '{}'", slot, old_name, record.name);
    Ok(record)
}

/// Remove everything the service published. Keeps going past individual failures.
pub fn clear_published(store: &SlotStore) -> Result<(), String> {
    let bag = store.bag().as_ref();
    let mut keys_to_clear = vec![keys::service_running(), keys::service_version(), keys::total_slots()];
    for slot in all_slots() {
        let name = store.get_name(slot);
        keys_to_clear.extend(keys::media_keys(&name, slot));
        keys_to_clear.push(keys::slot_name_key(slot));
    }

    let mut first_error = None;
    for key in keys_to_clear {
        if let Err(e) = bag.clear(&key) {
            warn!("Failed to clear property {key}: {e}");
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::{MemoryBag, WindowProperties};
    use crate::slots::SLOT_COUNT;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Rejects every key that mentions one slot name.
    struct PickyBag {
        inner: MemoryBag,
        rejects: &'static str,
    }

    impl PropertyBag for PickyBag {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), String> {
            if key.contains(self.rejects) {
                return Err(format!("rejected {key}"));
            }
            self.inner.set(key, value)
        }
        fn clear(&self, key: &str) -> Result<(), String> {
            if key.contains(self.rejects) {
                return Err(format!("rejected {key}"));
            }
            self.inner.clear(key)
        }
        fn snapshot(&self) -> BTreeMap<String, String> {
            self.inner.snapshot()
        }
    }

    struct Fixture {
        dir: TempDir,
        store: SlotStore,
        bag: Arc<MemoryBag>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let bag = Arc::new(MemoryBag::new());
            let store = SlotStore::new(dir.path().join("addon_data"), bag.clone());
            Self { dir, store, bag }
        }

        fn media(&self, name: &str) -> String {
            let path = self.dir.path().join(name);
            std::fs::write(&path, b"video").unwrap();
            path.to_string_lossy().to_string()
        }
    }

    #[test]
    fn publish_all_is_idempotent() {
        let fx = Fixture::new();
        let video = fx.media("bg.mp4");
        assert!(fx.store.set_video(2, &video));
        assert!(fx.store.set_name(9, "Setup"));

        publish_all(&fx.store).unwrap();
        let first = fx.bag.snapshot();
        publish_all(&fx.store).unwrap();
        assert_eq!(fx.bag.snapshot(), first);

        assert_eq!(first["VBKontrol.TotalSlots"], "20");
        assert_eq!(first["VBKontrol.Slot9.Name"], "Setup");
        assert_eq!(first["VBKontrol.Movies.VideoFilename"], "bg.mp4");
        assert_eq!(first["VBKontrol.Slot2.VideoExists"], "true");
        assert!(!first.contains_key("VBKontrol.Slot1.Video"));
    }

    #[test]
    fn global_video_publishes_every_pair() {
        let fx = Fixture::new();
        let video = fx.media("bg.mp4");
        for slot in all_slots() {
            assert!(fx.store.set_video(slot, &video));
        }
        for slot in all_slots() {
            assert_eq!(fx.store.get_video(slot), Some(video.clone()));
        }

        publish_all(&fx.store).unwrap();
        let snap = fx.bag.snapshot();
        for slot in all_slots() {
            let name = fx.store.get_name(slot);
            for id in [name.clone(), format!("Slot{slot}")] {
                assert_eq!(snap[&format!("VBKontrol.{id}.Video")], video);
                assert_eq!(snap[&format!("VBKontrol.{id}.VideoExists")], "true");
            }
        }
        assert_eq!(snap.len(), SLOT_COUNT as usize * 7 + 1);
    }

    #[test]
    fn unassigned_slots_are_cleared_on_publish() {
        let fx = Fixture::new();
        fx.bag.set("VBKontrol.Home.Video", "/stale.mp4").unwrap();
        fx.bag.set("VBKontrol.Slot1.VideoExists", "true").unwrap();
        publish_all(&fx.store).unwrap();
        assert_eq!(fx.bag.get("VBKontrol.Home.Video"), None);
        assert_eq!(fx.bag.get("VBKontrol.Slot1.VideoExists"), None);
        assert_eq!(fx.bag.get("VBKontrol.Slot1.Name").as_deref(), Some("Home"));
    }

    #[test]
    fn rename_moves_name_keyed_properties() {
        let fx = Fixture::new();
        let video = fx.media("shows.mkv");
        assert!(fx.store.set_video(3, &video));
        publish_all(&fx.store).unwrap();
        assert_eq!(fx.bag.get("VBKontrol.Slot3.Video"), Some(video.clone()));

        assert!(fx.store.set_name(3, "Shows"));
        republish_renamed(&fx.store, 3, "TV Shows").unwrap();

        for key in keys::name_keyed("TV Shows") {
            assert_eq!(fx.bag.get(&key), None, "{key} should be gone");
        }
        assert_eq!(fx.bag.get("VBKontrol.Shows.Video"), Some(video.clone()));
        assert_eq!(fx.bag.get("VBKontrol.Slot3.Video"), Some(video));
        assert_eq!(fx.bag.get("VBKontrol.Slot3.Name").as_deref(), Some("Shows"));
    }

    #[test]
    fn clear_published_removes_everything() {
        let fx = Fixture::new();
        let video = fx.media("bg.mp4");
        assert!(fx.store.set_video(1, &video));
        publish_all(&fx.store).unwrap();
        publish_liveness(fx.bag.as_ref(), "1.0.0").unwrap();
        assert_eq!(fx.bag.get("VBKontrol.Service.Running").as_deref(), Some("true"));

        clear_published(&fx.store).unwrap();
        assert!(fx.bag.snapshot().is_empty());
    }

    #[test]
    fn clear_slot_media_keeps_name() {
        let fx = Fixture::new();
        let video = fx.media("bg.mp4");
        assert!(fx.store.set_video(4, &video));
        publish_all(&fx.store).unwrap();
        clear_slot_media(fx.bag.as_ref(), "Music", 4).unwrap();
        let snap = fx.bag.snapshot();
        assert!(!snap.keys().any(|k| k.starts_with("VBKontrol.Music.")));
        assert!(!snap.contains_key("VBKontrol.Slot4.VideoExists"));
        assert_eq!(snap["VBKontrol.Slot4.Name"], "Music");
    }

    #[test]
    fn failing_slot_does_not_block_the_rest() {
        let dir = TempDir::new().unwrap();
        let bag = Arc::new(PickyBag { inner: MemoryBag::new(), rejects: "Broken" });
        let store = SlotStore::new(dir.path(), bag.clone());
        assert!(store.set_name(3, "Broken"));

        let err = publish_all(&store).unwrap_err();
        assert!(err.contains("Broken"), "{err}");
        assert_eq!(bag.get("VBKontrol.Slot3.Name"), None);
        assert_eq!(bag.get("VBKontrol.Slot4.Name").as_deref(), Some("Music"));
        assert_eq!(bag.get("VBKontrol.Slot20.Name").as_deref(), Some("Custom 3"));
        assert_eq!(bag.get("VBKontrol.TotalSlots").as_deref(), Some("20"));
    }

    #[test]
    fn long_names_publish_through_window_properties() {
        let dir = TempDir::new().unwrap();
        let bag = Arc::new(WindowProperties::new(dir.path().join("props")));
        let store = SlotStore::new(dir.path().join("addon_data"), bag.clone());
        let video = dir.path().join("bg.mp4");
        std::fs::write(&video, b"video").unwrap();
        let video = video.to_string_lossy().to_string();

        let name = "番".repeat(30);
        assert!(store.set_name(3, &name));
        assert!(store.set_video(3, &video));
        publish_all(&store).unwrap();

        assert_eq!(bag.get(&format!("VBKontrol.{name}.Video")), Some(video.clone()));
        assert_eq!(bag.get("VBKontrol.Slot3.Name"), Some(name));
        assert_eq!(bag.get("VBKontrol.Slot20.Name").as_deref(), Some("Custom 3"));
        assert_eq!(bag.get("VBKontrol.TotalSlots").as_deref(), Some("20"));
    }
}
