// ~/vbkontrol/src/plugin/router.rs
// Maps the plugin's action parameter onto controller calls.

use std::collections::HashMap;
use clap::ValueEnum;

use crate::{
    info, warn,
    plugin::VbKontrol,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Action {
    #[value(name = "configure_slot")]
    ConfigureSlot,
    #[value(name = "global_video")]
    GlobalVideo,
    #[value(name = "clear_all")]
    ClearAll,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::ConfigureSlot => "configure_slot",
            Action::GlobalVideo => "global_video",
            Action::ClearAll => "clear_all",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "configure_slot" => Some(Action::ConfigureSlot),
            "global_video" => Some(Action::GlobalVideo),
            "clear_all" => Some(Action::ClearAll),
            _ => None,
        }
    }
}

/// Slot argument as received. Parsing failures are kept so the controller can report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotParam {
    Missing,
    Index(u32),
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub action: Option<Action>,
    pub slot: SlotParam,
}

/// Decode a plugin query string (`?action=configure_slot&slot=3`).
/// Pairs without `=` or with an empty value are dropped.
pub fn parse_params(paramstring: &str) -> HashMap<String, String> {
    let query = paramstring.trim().trim_start_matches('?');
    let mut params = HashMap::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let Some((key, value)) = pair.split_once('=') else { continue };
        let (Ok(key), Ok(value)) = (decode_component(key), decode_component(value)) else {
            warn!("Ignoring undecodable parameter '{}'", pair);
            continue;
        };
        if !value.is_empty() {
            params.insert(key, value);
        }
    }
    params
}

fn decode_component(raw: &str) -> Result<String, std::string::FromUtf8Error> {
    urlencoding::decode(&raw.replace('+', " ")).map(|s| s.into_owned())
}

/// Combine the query string with explicit flags. Flags win.
pub fn resolve_route(paramstring: Option<&str>, action: Option<Action>, slot: Option<u32>) -> Route {
    let params = paramstring.map(parse_params).unwrap_or_default();

    let action = action.or_else(|| {
        let raw = params.get("action")?;
        let parsed = Action::from_param(raw);
        if parsed.is_none() {
            warn!("Unknown action '{}', showing main menu", raw);
        }
        parsed
    });

    let slot = match (slot, params.get("slot")) {
        (Some(n), _) => SlotParam::Index(n),
        (None, Some(raw)) => match raw.trim().parse::<u32>() {
            Ok(n) => SlotParam::Index(n),
            Err(_) => SlotParam::Invalid(raw.clone()),
        },
        (None, None) => SlotParam::Missing,
    };

    Route { action, slot }
}

pub fn route(controller: &mut VbKontrol<'_>, route: &Route) {
    info!("Routing action {:?} slot {:?}", route.action, route.slot);

    match route.action {
        Some(Action::ConfigureSlot) => match &route.slot {
            SlotParam::Index(n) => controller.configure_slot(*n),
            SlotParam::Missing => controller.configure_slot(1),
            SlotParam::Invalid(raw) => controller.report_invalid_slot(raw),
        },
        Some(Action::GlobalVideo) => {
            controller.set_global_video();
        }
        Some(Action::ClearAll) => {
            controller.clear_all_videos();
        }
        None => controller.show_main_menu(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_query_strings() {
        let params = parse_params("?action=configure_slot&slot=3");
        assert_eq!(params.get("action").map(String::as_str), Some("configure_slot"));
        assert_eq!(params.get("slot").map(String::as_str), Some("3"));

        let params = parse_params("name=TV+Shows%21&empty=&flag");
        assert_eq!(params.get("name").map(String::as_str), Some("TV Shows!"));
        assert!(!params.contains_key("empty"));
        assert!(!params.contains_key("flag"));

        assert!(parse_params("").is_empty());
    }

    #[test]
    fn route_from_query_string() {
        let route = resolve_route(Some("?action=configure_slot&slot=7"), None, None);
        assert_eq!(route, Route { action: Some(Action::ConfigureSlot), slot: SlotParam::Index(7) });

        let route = resolve_route(Some("action=clear_all"), None, None);
        assert_eq!(route, Route { action: Some(Action::ClearAll), slot: SlotParam::Missing });
    }

    #[test]
    fn flags_override_query_string() {
        let route = resolve_route(Some("action=clear_all&slot=2"), Some(Action::ConfigureSlot), Some(9));
        assert_eq!(route, Route { action: Some(Action::ConfigureSlot), slot: SlotParam::Index(9) });
    }

    #[test]
    fn unknown_action_and_bad_slot() {
        let route = resolve_route(Some("action=dance&slot=two"), None, None);
        assert_eq!(route.action, None);
        assert_eq!(route.slot, SlotParam::Invalid("two".into()));
        assert_eq!(resolve_route(None, None, None).action, None);
    }

    #[test]
    fn action_names_round_trip() {
        for action in [Action::ConfigureSlot, Action::GlobalVideo, Action::ClearAll] {
            assert_eq!(Action::from_param(action.as_str()), Some(action));
            let value = action.to_possible_value().unwrap();
            assert_eq!(value.get_name(), action.as_str());
        }
    }
}
