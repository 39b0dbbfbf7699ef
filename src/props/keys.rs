// ~/vbkontrol/src/props/keys.rs
// Property key layout. Every slot is published twice: under its display name
// and under `Slot{n}`. All key construction goes through here.

use crate::slots::{video_filename, SlotRecord, SLOT_COUNT};

pub const PREFIX: &str = "VBKontrol";

pub fn key(suffix: &str) -> String {
    format!("{PREFIX}.{suffix}")
}

pub fn service_running() -> String {
    key("Service.Running")
}

pub fn service_version() -> String {
    key("Service.Version")
}

pub fn total_slots() -> String {
    key("TotalSlots")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotField {
    Video,
    VideoFilename,
    VideoExists,
    Name,
}

impl SlotField {
    pub const MEDIA: [SlotField; 3] = [SlotField::Video, SlotField::VideoFilename, SlotField::VideoExists];

    fn suffix(self) -> &'static str {
        match self {
            SlotField::Video => "Video",
            SlotField::VideoFilename => "VideoFilename",
            SlotField::VideoExists => "VideoExists",
            SlotField::Name => "Name",
        }
    }
}

/// The two ways a skin can address a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotIdentity<'a> {
    Name(&'a str),
    Index(u32),
}

impl SlotIdentity<'_> {
    pub fn key(&self, field: SlotField) -> String {
        match self {
            SlotIdentity::Name(name) => key(&format!("{name}.{}", field.suffix())),
            SlotIdentity::Index(index) => key(&format!("Slot{index}.{}", field.suffix())),
        }
    }
}

fn identities(name: &str, index: u32) -> [SlotIdentity<'_>; 2] {
    [SlotIdentity::Name(name), SlotIdentity::Index(index)]
}

/// `{name}.Video` and `Slot{n}.Video`.
pub fn video_keys(name: &str, index: u32) -> [String; 2] {
    identities(name, index).map(|id| id.key(SlotField::Video))
}

/// The six media keys of a slot, name-keyed first.
pub fn media_keys(name: &str, index: u32) -> Vec<String> {
    identities(name, index)
        .iter()
        .flat_map(|id| SlotField::MEDIA.iter().map(move |field| id.key(*field)))
        .collect()
}

/// Keys that depend on the slot's display name.
pub fn name_keyed(name: &str) -> Vec<String> {
    let id = SlotIdentity::Name(name);
    SlotField::MEDIA.iter().map(|field| id.key(*field)).collect()
}

pub fn slot_name_key(index: u32) -> String {
    SlotIdentity::Index(index).key(SlotField::Name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyUpdate {
    Set(String, String),
    Clear(String),
}

/// Every property a slot contributes to the bag. `exists` is the publish-time
/// existence check of the video, independent of the store's own gate.
pub fn slot_updates(record: &SlotRecord, exists: bool) -> Vec<PropertyUpdate> {
    let mut updates = Vec::with_capacity(7);

    match &record.video {
        Some(video) => {
            let filename = video_filename(video);
            let exists = if exists { "true" } else { "false" };
            for id in identities(&record.name, record.index) {
                updates.push(PropertyUpdate::Set(id.key(SlotField::Video), video.clone()));
                updates.push(PropertyUpdate::Set(id.key(SlotField::VideoFilename), filename.to_string()));
                updates.push(PropertyUpdate::Set(id.key(SlotField::VideoExists), exists.to_string()));
            }
        }
        None => {
            updates.extend(media_keys(&record.name, record.index).into_iter().map(PropertyUpdate::Clear));
        }
    }

    updates.push(PropertyUpdate::Set(slot_name_key(record.index), record.name.clone()));
    updates
}

pub fn total_slots_update() -> PropertyUpdate {
    PropertyUpdate::Set(total_slots(), SLOT_COUNT.to_string())
}
