// ~/vbkontrol/src/plugin/menu.rs

use crate::{
    paths::ADDON_ID,
    plugin::router::Action,
    props::{keys, PropertyBag},
    slots::{video_filename, SlotRecord},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub label: String,
    pub title: Option<String>,
    pub plot: Option<String>,
    /// `None` for non-clickable lines (headers, separators, status).
    pub url: Option<String>,
}

impl ListItem {
    pub fn text(label: impl Into<String>) -> Self {
        Self { label: label.into(), title: None, plot: None, url: None }
    }

    pub fn info(label: impl Into<String>, title: &str, plot: &str) -> Self {
        Self {
            label: label.into(),
            title: Some(title.to_string()),
            plot: Some(plot.to_string()),
            url: None,
        }
    }

    pub fn action(label: impl Into<String>, title: &str, plot: &str, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::info(label, title, plot)
        }
    }
}

pub fn plugin_url(params: &[(&str, &str)]) -> String {
    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    format!("plugin://{ADDON_ID}/?{}", query.join("&"))
}

fn slot_item(record: &SlotRecord) -> ListItem {
    let slot = record.index.to_string();
    let url = plugin_url(&[("action", Action::ConfigureSlot.as_str()), ("slot", &slot)]);

    match &record.video {
        Some(video) => {
            let file = video_filename(video);
            ListItem::action(
                format!("📹 {} → {}", record.name, file),
                &record.name,
                &format!("Current video: {file}\nClick to change or clear"),
                url,
            )
        }
        None => ListItem::action(
            format!("⭕ {}", record.name),
            &record.name,
            "No video selected\nClick to select video file",
            url,
        ),
    }
}

pub fn service_running(bag: &dyn PropertyBag) -> bool {
    bag.get(&keys::service_running()).as_deref() == Some("true")
}

/// Root menu, rendered fresh on every visit.
pub fn root_menu(records: &[SlotRecord], service_running: bool) -> Vec<ListItem> {
    let mut items = Vec::with_capacity(records.len() + 6);

    items.push(ListItem::info(
        "=== VB Kontrol - Universal Video Backgrounds ===",
        "VB Kontrol",
        "Configure video backgrounds for any skin",
    ));
    items.push(ListItem::action(
        "🌍 Global Video Background",
        "Global Video",
        "Set one video for all menus",
        plugin_url(&[("action", Action::GlobalVideo.as_str())]),
    ));
    items.push(ListItem::text(format!(
        "--- Video Background Slots ({} Total) ---",
        records.len()
    )));

    items.extend(records.iter().map(slot_item));

    items.push(ListItem::text("--- Utilities ---"));
    items.push(ListItem::action(
        "🗑️ Clear All Video Backgrounds",
        "Clear All",
        "Remove all video background assignments",
        plugin_url(&[("action", Action::ClearAll.as_str())]),
    ));

    let status = if service_running { "✅ Service Running" } else { "❌ Service Stopped" };
    items.push(ListItem::info(
        format!("ℹ️ {status}"),
        "Service Status",
        &format!("Background service status: {status}"),
    ));

    items
}
