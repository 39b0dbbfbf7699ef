// ~/vbkontrol/src/logging.rs

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Sender},
        Mutex, OnceLock,
    },
    thread::{self, JoinHandle},
};

use chrono;

/* =========================
   GLOBAL STATE
   ========================= */

static ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static LOG_TAG: OnceLock<String> = OnceLock::new();
static LOG_TX: Mutex<Option<Sender<String>>> = Mutex::new(None);
static LOG_THREAD: Mutex<Option<JoinHandle<()>>> = Mutex::new(None);

/* =========================
   PUBLIC API
   ========================= */

/// Start the background writer. `tag` is stamped on every line so the
/// plugin and the service can share one log file.
pub fn init(debug: bool, path: &Path, tag: &str) {
    let mut tx_slot = LOG_TX.lock().unwrap_or_else(|e| e.into_inner());
    if tx_slot.is_some() || LOG_PATH.get().is_some() {
        panic!("logging::init() called more than once");
    }

    ENABLED.store(debug, Ordering::Relaxed);
    let _ = LOG_TAG.set(tag.to_string());
    let path = LOG_PATH.get_or_init(|| path.to_path_buf()).clone();

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let (tx, rx) = mpsc::channel::<String>();
    *tx_slot = Some(tx);

    let handle = thread::spawn(move || {
        let mut file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("[{}] failed to open log file {}: {e}", tag_or_default(), path.display());
                return;
            }
        };

        while let Ok(line) = rx.recv() {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    });
    *LOG_THREAD.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
}

#[inline]
pub fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Toggle info-level output after init (config is read after logging starts).
pub fn set_debug(debug: bool) {
    ENABLED.store(debug, Ordering::Relaxed);
}

/// Drain pending lines and stop the writer thread.
pub fn shutdown() {
    let tx = LOG_TX.lock().unwrap_or_else(|e| e.into_inner()).take();
    drop(tx);

    let handle = LOG_THREAD.lock().unwrap_or_else(|e| e.into_inner()).take();
    if let Some(handle) = handle {
        let _ = handle.join();
    }
}

/* =========================
   INTERNAL
   ========================= */

#[inline]
pub fn enqueue(level: &str, msg: String) {
    if let Ok(guard) = LOG_TX.lock() {
        if let Some(tx) = guard.as_ref() {
            let ts = timestamp();
            let _ = tx.send(format!("{ts} [{level}] [{}] {msg}", tag_or_default()));
        }
    }
}

fn tag_or_default() -> &'static str {
    LOG_TAG.get().map(String::as_str).unwrap_or("VBKontrol")
}

fn timestamp() -> String {
    let now = chrono::Local::now();
    now.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/* =========================
   MACROS
   ========================= */

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        if $crate::logging::enabled() {
            $crate::logging::enqueue(
                "INFO",
                format!($($arg)*)
            );
        }
    }};
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        $crate::logging::enqueue(
            "WARN",
            format!($($arg)*)
        );
    }};
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        $crate::logging::enqueue(
            "ERROR",
            format!($($arg)*)
        );
    }};
}
