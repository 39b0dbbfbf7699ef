// ~/vbkontrol/src/cli.rs
// Command line entry: plugin actions, the background service, and a status dump.

use clap::{ArgAction, Parser};
use std::{path::PathBuf, sync::Arc};

use crate::{
    config::{load_config, AddonConfig},
    logging,
    paths::{addon_data_dir, host_home_dir, properties_dir},
    plugin::{router, Action, TerminalDialog, VbKontrol},
    props::{PropertyBag, WindowProperties},
    service::{Monitor, RefreshService, ServiceExit},
    slots::SlotStore,
};
use crate::{info, warn, error};

#[derive(Parser, Debug)]
#[command(author, version, about = "VB Kontrol - video background slots for any skin")]
pub struct Cli {
    /// Run the background property service until interrupted.
    #[arg(long = "service", action = ArgAction::SetTrue, conflicts_with_all = ["status", "action"])]
    pub service: bool,

    /// Print the currently published window properties and exit.
    #[arg(long = "status", action = ArgAction::SetTrue, conflicts_with = "action")]
    pub status: bool,

    /// With --status, print a JSON object instead of key=value lines.
    #[arg(long = "json", action = ArgAction::SetTrue, requires = "status")]
    pub json: bool,

    /// Force info-level logging regardless of config.yaml.
    #[arg(long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,

    /// Add-on data folder holding the slot files and config.yaml.
    #[arg(long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Folder backing the shared window properties.
    #[arg(long = "properties-dir", value_name = "PATH")]
    pub properties_dir: Option<PathBuf>,

    #[arg(long = "action", value_enum)]
    pub action: Option<Action>,

    #[arg(long = "slot", value_name = "N")]
    pub slot: Option<u32>,

    /// Plugin arguments as the host passes them: `<handle> ?action=configure_slot&slot=3 resume:false`.
    /// Only the query string is used.
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}

impl Cli {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(addon_data_dir)
    }

    pub fn properties_dir(&self) -> PathBuf {
        self.properties_dir.clone().unwrap_or_else(properties_dir)
    }

    /// The query string among the positional arguments, if any.
    pub fn params(&self) -> Option<&str> {
        self.args
            .iter()
            .find(|arg| arg.starts_with('?'))
            .or_else(|| self.args.iter().find(|arg| arg.contains('=')))
            .map(String::as_str)
    }

    pub fn log_tag(&self) -> &'static str {
        if self.service { "VBKontrol Service" } else { "VBKontrol" }
    }
}

pub fn parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}

pub fn run_cli(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = cli.data_dir();
    let config: AddonConfig = load_config(&data_dir);
    logging::set_debug(config.debug || cli.debug);
    info!("CLI parsed: {:?}", cli);
    info!("Host home: {}", host_home_dir().display());

    let bag: Arc<dyn PropertyBag> = Arc::new(WindowProperties::new(cli.properties_dir()));
    let store = SlotStore::new(data_dir, bag);

    if cli.status {
        return print_status(store.bag().as_ref(), cli.json);
    }

    if cli.service {
        return run_service(store, &config);
    }

    let route = router::resolve_route(cli.params(), cli.action, cli.slot);
    let mut dialog = TerminalDialog::stdio();
    let mut controller = VbKontrol::new(store, &config, &mut dialog);
    router::route(&mut controller, &route);
    Ok(())
}

fn run_service(store: SlotStore, config: &AddonConfig) -> Result<(), Box<dyn std::error::Error>> {
    let monitor = Monitor::new();
    monitor.bind_to_signals()?;

    let service = RefreshService::new(store, monitor, config);
    match service.start() {
        ServiceExit::Aborted => info!("Service loop ended on abort request"),
        ServiceExit::TooManyErrors => warn!("Service loop ended after repeated errors"),
    }
    Ok(())
}

fn print_status(bag: &dyn PropertyBag, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = bag.snapshot();
    if json {
        let text = serde_json::to_string_pretty(&snapshot).map_err(|e| {
            error!("Failed to serialize property snapshot: {e}");
            e
        })?;
        println!("{text}");
    } else if snapshot.is_empty() {
        println!("No VB Kontrol properties are published (service stopped?)");
    } else {
        for (key, value) in &snapshot {
            println!("{key}={value}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plugin_invocations() {
        let cli = Cli::try_parse_from(["vbkontrol", "?action=configure_slot&slot=3"]).unwrap();
        assert_eq!(cli.params(), Some("?action=configure_slot&slot=3"));
        assert!(!cli.service);

        let cli = Cli::try_parse_from(["vbkontrol", "--action", "global_video"]).unwrap();
        assert_eq!(cli.action, Some(Action::GlobalVideo));

        let cli = Cli::try_parse_from(["vbkontrol", "--action", "configure_slot", "--slot", "4"]).unwrap();
        assert_eq!((cli.action, cli.slot), (Some(Action::ConfigureSlot), Some(4)));
    }

    #[test]
    fn host_style_arguments_are_accepted() {
        let cli = Cli::try_parse_from(["vbkontrol", "1", "?action=clear_all", "resume:false"]).unwrap();
        assert_eq!(cli.params(), Some("?action=clear_all"));

        let cli = Cli::try_parse_from(["vbkontrol", "action=global_video&slot=2"]).unwrap();
        assert_eq!(cli.params(), Some("action=global_video&slot=2"));

        let cli = Cli::try_parse_from(["vbkontrol", "1", "resume:false"]).unwrap();
        assert_eq!(cli.params(), None);
    }

    #[test]
    fn bad_flags_surface_as_errors_not_exits() {
        let err = Cli::try_parse_from(["vbkontrol", "--slot", "abc"]).unwrap_err();
        assert!(err.use_stderr());
        let help = Cli::try_parse_from(["vbkontrol", "--help"]).unwrap_err();
        assert!(!help.use_stderr());
    }

    #[test]
    fn service_and_status_flags() {
        let cli = Cli::try_parse_from(["vbkontrol", "--service", "--data-dir", "/tmp/vb"]).unwrap();
        assert!(cli.service);
        assert_eq!(cli.data_dir(), PathBuf::from("/tmp/vb"));
        assert_eq!(cli.log_tag(), "VBKontrol Service");

        assert!(Cli::try_parse_from(["vbkontrol", "--status", "--json"]).is_ok());
        assert!(Cli::try_parse_from(["vbkontrol", "--json"]).is_err());
        assert!(Cli::try_parse_from(["vbkontrol", "--service", "--action", "clear_all"]).is_err());
        assert!(Cli::try_parse_from(["vbkontrol", "--action", "dance"]).is_err());
    }

    #[test]
    fn status_reads_the_shared_properties() {
        let dir = tempfile::TempDir::new().unwrap();
        let props = dir.path().join("props");
        let bag = WindowProperties::new(&props);
        bag.set("VBKontrol.TotalSlots", "20").unwrap();

        let cli = Cli::try_parse_from([
            "vbkontrol".to_string(),
            "--status".to_string(),
            "--data-dir".to_string(),
            dir.path().join("data").display().to_string(),
            "--properties-dir".to_string(),
            props.display().to_string(),
        ])
        .unwrap();
        assert!(run_cli(&cli).is_ok());
        assert!(dir.path().join("data").join("config.yaml").is_file());
    }
}
