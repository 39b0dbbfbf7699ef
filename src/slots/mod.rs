// ~/vbkontrol/src/slots/mod.rs

pub mod store;

pub use store::SlotStore;

pub const SLOT_COUNT: u32 = 20;

/// Built-in slot labels, index 0 is slot 1.
pub const DEFAULT_NAMES: [&str; SLOT_COUNT as usize] = [
    "Home", "Movies", "TV Shows", "Music", "Pictures",
    "Videos", "Favourites", "Add-ons", "Settings", "Weather",
    "Programs", "Games", "System", "Live TV", "Radio",
    "Files", "Playlists", "Custom 1", "Custom 2", "Custom 3",
];

pub fn default_name(slot: u32) -> String {
    match slot.checked_sub(1).and_then(|i| DEFAULT_NAMES.get(i as usize)) {
        Some(name) => name.to_string(),
        None => format!("Slot {slot}"),
    }
}

pub fn is_valid_slot(slot: u32) -> bool {
    (1..=SLOT_COUNT).contains(&slot)
}

pub fn all_slots() -> impl Iterator<Item = u32> {
    1..=SLOT_COUNT
}

/// Effective state of one slot as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRecord {
    pub index: u32,
    pub name: String,
    pub video: Option<String>,
}

/// Base name of a stored video path, accepting either separator.
pub fn video_filename(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path)
}
