// ~/vbkontrol/src/plugin/mod.rs

pub mod dialog;
pub mod menu;
pub mod controller;
pub mod router;

pub use controller::VbKontrol;
pub use dialog::TerminalDialog;
pub use router::Action;
