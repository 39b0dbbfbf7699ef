// ~/vbkontrol/src/service/refresh.rs
// Background service: republishes slot properties on a fixed interval until aborted.

use std::time::{Duration, Instant};
use crate::{
    info, warn, error,
    config::AddonConfig,
    paths::{ensure_dir, video_folder},
    props::publisher::{clear_published, publish_all, publish_liveness},
    service::Monitor,
    slots::SlotStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceExit {
    Aborted,
    TooManyErrors,
}

pub struct RefreshService {
    store: SlotStore,
    monitor: Monitor,
    version: String,
    refresh_interval: Duration,
    tick: Duration,
    error_backoff: Duration,
    max_consecutive_errors: u32,
}

impl RefreshService {
    pub fn new(store: SlotStore, monitor: Monitor, config: &AddonConfig) -> Self {
        Self {
            store,
            monitor,
            version: env!("CARGO_PKG_VERSION").to_string(),
            refresh_interval: config.refresh_interval(),
            tick: config.tick(),
            error_backoff: config.error_backoff(),
            max_consecutive_errors: config.max_consecutive_errors,
        }
    }

    /// One publish cycle plus the liveness properties.
    pub fn refresh(&self) -> Result<(), String> {
        publish_all(&self.store)?;
        publish_liveness(self.store.bag().as_ref(), &self.version)
    }

    /// Republish when the interval has elapsed. `None` means a publish is due now.
    pub fn run_iteration(&self, last_update: &mut Option<Instant>) -> Result<bool, String> {
        let due = last_update.map_or(true, |at| at.elapsed() >= self.refresh_interval);
        if !due {
            return Ok(false);
        }
        self.refresh()?;
        *last_update = Some(Instant::now());
        Ok(true)
    }

    /// Run until the monitor aborts (or errors pile up), then clean up.
    pub fn start(&self) -> ServiceExit {
        info!("VB Kontrol v{} - starting video background service", self.version);
        ensure_dir(&video_folder(self.store.root()));

        let mut last_update = match self.refresh() {
            Ok(_) => Some(Instant::now()),
            Err(e) => {
                error!("Error updating window properties: {e}");
                None
            }
        };
        info!(
            "VB Kontrol service started - refreshing every {}s",
            self.refresh_interval.as_secs()
        );

        let mut failures = 0u32;
        let exit = loop {
            if self.monitor.abort_requested() {
                break ServiceExit::Aborted;
            }

            match self.run_iteration(&mut last_update) {
                Ok(_) => {
                    failures = 0;
                    if self.monitor.wait_for_abort(self.tick) {
                        break ServiceExit::Aborted;
                    }
                }
                Err(e) => {
                    failures += 1;
                    error!("Error in service loop ({} in a row): {e}", failures);
                    if self.max_consecutive_errors > 0 && failures >= self.max_consecutive_errors {
                        error!("Giving up after {} consecutive errors", failures);
                        break ServiceExit::TooManyErrors;
                    }
                    if self.monitor.wait_for_abort(self.error_backoff) {
                        break ServiceExit::Aborted;
                    }
                }
            }
        };

        self.stop();
        exit
    }

    /// Clear every property this service publishes.
    pub fn stop(&self) {
        info!("Stopping VB Kontrol service...");
        if let Err(e) = clear_published(&self.store) {
            warn!("Error during cleanup: {e}");
        }
        info!("VB Kontrol service stopped");
    }
}
