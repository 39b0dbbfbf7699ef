// ~/vbkontrol/src/plugin/controller.rs
// Menu-driven slot configuration. One instance per plugin invocation.

use std::path::PathBuf;

use crate::{
    info, warn, error,
    config::AddonConfig,
    paths::{ensure_dir, video_folder},
    plugin::{
        dialog::{Dialog, NotificationKind},
        menu::{root_menu, service_running},
    },
    props::publisher::{clear_slot_media, republish_renamed},
    slots::{all_slots, is_valid_slot, SlotStore, SLOT_COUNT},
};

const HEADING: &str = "VB Kontrol";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotChoice {
    SelectVideo,
    ClearVideo,
    Rename,
}

impl SlotChoice {
    fn label(self) -> &'static str {
        match self {
            SlotChoice::SelectVideo => "Select Video File",
            SlotChoice::ClearVideo => "Clear Video",
            SlotChoice::Rename => "Rename Slot",
        }
    }
}

pub struct VbKontrol<'a> {
    store: SlotStore,
    video_folder: PathBuf,
    extensions: Vec<String>,
    dialog: &'a mut dyn Dialog,
}

impl<'a> VbKontrol<'a> {
    pub fn new(store: SlotStore, config: &AddonConfig, dialog: &'a mut dyn Dialog) -> Self {
        let video_folder = video_folder(store.root());
        ensure_dir(&video_folder);
        Self {
            store,
            video_folder,
            extensions: config.normalized_extensions(),
            dialog,
        }
    }

    fn notify(&mut self, message: &str, kind: NotificationKind) {
        self.dialog.notification(HEADING, message, kind);
    }

    fn browse(&mut self, heading: &str) -> Option<String> {
        self.dialog.browse_video(heading, &self.extensions, &self.video_folder)
    }

    pub fn show_main_menu(&mut self) {
        let records = self.store.records();
        let running = service_running(self.store.bag().as_ref());
        let items = root_menu(&records, running);
        self.dialog.add_directory_items(&items);
    }

    pub fn report_invalid_slot(&mut self, raw: &str) {
        warn!("Rejected slot parameter '{}'", raw);
        self.notify(&format!("Invalid slot: {raw} (expected 1-{SLOT_COUNT})"), NotificationKind::Error);
    }

    pub fn configure_slot(&mut self, slot: u32) {
        if !is_valid_slot(slot) {
            self.report_invalid_slot(&slot.to_string());
            return;
        }

        let name = self.store.get_name(slot);
        let mut choices = vec![SlotChoice::SelectVideo, SlotChoice::Rename];
        if self.store.get_video(slot).is_some() {
            choices.insert(1, SlotChoice::ClearVideo);
        }
        let labels: Vec<String> = choices.iter().map(|c| c.label().to_string()).collect();

        let Some(picked) = self.dialog.select(&format!("Configure: {name}"), &labels) else {
            return;
        };
        match choices.get(picked) {
            Some(SlotChoice::SelectVideo) => {
                self.select_video_for_slot(slot);
            }
            Some(SlotChoice::ClearVideo) => self.clear_slot_video(slot),
            Some(SlotChoice::Rename) => {
                self.rename_slot(slot);
            }
            None => warn!("Ignoring out-of-range menu choice {}", picked),
        }
    }

    /// Returns true when a video was assigned.
    pub fn select_video_for_slot(&mut self, slot: u32) -> bool {
        let name = self.store.get_name(slot);
        let Some(video) = self.browse(&format!("Select video for {name}")) else {
            return false;
        };

        if self.store.set_video(slot, &video) {
            self.notify(&format!("Video set for {name}"), NotificationKind::Info);
            true
        } else {
            self.notify("Error setting video file", NotificationKind::Error);
            false
        }
    }

    pub fn clear_slot_video(&mut self, slot: u32) {
        let name = self.store.get_name(slot);
        self.store.clear_video(slot);
        self.notify(&format!("Video cleared for {name}"), NotificationKind::Info);
    }

    /// Returns true when the slot was renamed.
    pub fn rename_slot(&mut self, slot: u32) -> bool {
        let current = self.store.get_name(slot);
        let Some(new_name) = self
            .dialog
            .input(&format!("Rename slot (currently: {current})"), &current)
        else {
            return false;
        };

        let new_name = new_name.trim();
        if new_name.is_empty() || new_name == current {
            return false;
        }

        if !self.store.set_name(slot, new_name) {
            self.notify("Error renaming slot", NotificationKind::Error);
            return false;
        }

        if let Err(e) = republish_renamed(&self.store, slot, &current) {
            error!("Error moving properties for renamed slot {}: {e}", slot);
        }
        self.notify(&format!("Renamed to: {new_name}"), NotificationKind::Info);
        true
    }

    /// Assign one picked video to every slot. Returns the number of slots updated.
    pub fn set_global_video(&mut self) -> Option<usize> {
        let video = self.browse("Select global video file")?;

        let count = all_slots()
            .filter(|slot| self.store.set_video(*slot, &video))
            .count();
        info!("Global video applied to {} slots", count);

        self.notify(&format!("Global video set for {count} slots"), NotificationKind::Info);
        Some(count)
    }

    /// Clear every slot after confirmation. Returns the number of stored videos removed.
    pub fn clear_all_videos(&mut self) -> Option<usize> {
        if !self.dialog.yes_no(HEADING, "Clear all video backgrounds?") {
            return None;
        }

        let mut count = 0;
        for slot in all_slots() {
            if self.store.clear_video(slot) {
                count += 1;
            }
            let name = self.store.get_name(slot);
            if let Err(e) = clear_slot_media(self.store.bag().as_ref(), &name, slot) {
                warn!("Failed to clear properties for {}: {e}", name);
            }
        }
        info!("Cleared {} video backgrounds", count);

        self.notify(&format!("Cleared {count} video backgrounds"), NotificationKind::Info);
        Some(count)
    }
}
