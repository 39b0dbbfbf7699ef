// ~/vbkontrol/src/service/mod.rs

pub mod monitor;
pub mod refresh;

pub use monitor::Monitor;
pub use refresh::{RefreshService, ServiceExit};
