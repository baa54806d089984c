//! Repository Implementations
//!
//! Concrete implementations of domain repository ports.

mod config_store;

pub use config_store::{FsConfigStore, STATE_DIR};
