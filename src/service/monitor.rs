// ~/vbkontrol/src/service/monitor.rs
// Abort signal for the refresh loop.

use std::{
    sync::{Arc, Condvar, Mutex},
    thread,
    time::Duration,
};
use crate::{info, error};

#[derive(Clone, Default)]
pub struct Monitor {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_abort(&self) {
        let (lock, cvar) = &*self.inner;
        let mut aborted = lock.lock().unwrap_or_else(|e| e.into_inner());
        *aborted = true;
        cvar.notify_all();
    }

    pub fn abort_requested(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleep up to `timeout`. Returns true as soon as an abort is requested.
    pub fn wait_for_abort(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        match cvar.wait_timeout_while(guard, timeout, |aborted| !*aborted) {
            Ok((aborted, _)) => *aborted,
            Err(poisoned) => *poisoned.into_inner().0,
        }
    }

    /// Request abort on Ctrl-C, and on SIGTERM where available.
    pub fn bind_to_signals(&self) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to build signal runtime: {e}"))?;

        let monitor = self.clone();
        thread::Builder::new()
            .name("vbkontrol-signals".into())
            .spawn(move || {
                runtime.block_on(async {
                    match wait_for_shutdown_signal().await {
                        Ok(signal) => info!("Received {signal}, requesting abort"),
                        Err(e) => {
                            error!("Signal listener failed: {e}");
                            return;
                        }
                    }
                    monitor.request_abort();
                });
            })
            .map(|_| ())
            .map_err(|e| format!("Failed to spawn signal listener: {e}"))
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| "Ctrl-C"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn wait_times_out_without_abort() {
        let monitor = Monitor::new();
        let start = Instant::now();
        assert!(!monitor.wait_for_abort(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert!(!monitor.abort_requested());
    }

    #[test]
    fn abort_wakes_a_waiting_thread() {
        let monitor = Monitor::new();
        let remote = monitor.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.request_abort();
        });

        let start = Instant::now();
        assert!(monitor.wait_for_abort(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(monitor.abort_requested());
        handle.join().unwrap();
    }
}
