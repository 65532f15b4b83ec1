//! Project persistence

pub mod project;

pub use project::{ProjectStore, StoredProject};
