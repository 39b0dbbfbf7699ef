// ~/vbkontrol/src/main.rs

mod logging;
mod cli;
mod config;
mod paths;
mod plugin;
mod props;
mod service;
mod slots;

use std::panic::{self, AssertUnwindSafe};

use crate::{
    cli::{parse, run_cli},
    paths::addon_data_dir,
};

const LOG_FILE_NAME: &str = "vbkontrol.log";

fn main() {
    let cli = match parse() {
        Ok(cli) => cli,
        Err(e) => {
            report_usage(&e);
            return;
        }
    };

    logging::init(cli.debug, &cli.data_dir().join(LOG_FILE_NAME), cli.log_tag());
    panic::set_hook(Box::new(|panic_info| {
        error!("Panic: {}", panic_info);
    }));
    info!("VB Kontrol v{} starting", env!("CARGO_PKG_VERSION"));

    // Failures never reach the host as an exit status; they end up in the log.
    match panic::catch_unwind(AssertUnwindSafe(|| run_cli(&cli))) {
        Ok(Ok(())) => info!("VB Kontrol exited normally"),
        Ok(Err(e)) => error!("Error: {e}"),
        Err(_) => error!("VB Kontrol crashed; see panic above"),
    }

    logging::shutdown();
}

/// Help and version go to stdout. A rejected command line is logged and the process still exits 0.
fn report_usage(e: &clap::Error) {
    let _ = e.print();
    if !e.use_stderr() {
        return;
    }
    logging::init(false, &addon_data_dir().join(LOG_FILE_NAME), "VBKontrol");
    error!("Ignoring invalid command line: {}", e.to_string().trim());
    logging::shutdown();
}
