//! Sync Module
//!
//! Moves service sources to the deploy host and rebuilds them there.
//!
//! ## Structure
//!
//! - `options` - `SyncOptions`
//! - `result` - `SyncReport`
//! - `use_case` - `SyncUseCase`
//!
//! ## Usage
//!
//! ```ignore
//! use graft::application::sync::{SyncOptions, SyncUseCase};
//!
//! let use_case = SyncUseCase::new(executor, store, engine, "/opt/graft/projects", true);
//! let report = use_case.execute(&SyncOptions::new("graft-compose.yml").with_service("api"))?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::SyncOptions;
pub use result::SyncReport;
pub use use_case::SyncUseCase;
