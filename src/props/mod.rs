// ~/vbkontrol/src/props/mod.rs

pub mod bag;
pub mod keys;
pub mod publisher;

pub use bag::{PropertyBag, WindowProperties};
#[cfg(test)]
pub use bag::MemoryBag;
