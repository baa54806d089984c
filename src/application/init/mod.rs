//! Init Module
//!
//! Registers a project on the deploy host and prepares the local checkout.
//!
//! ## Structure
//!
//! - `options` - `InitOptions`
//! - `reconciler` - remote registry download, conflict check, deferred upload
//! - `boilerplate` - starter manifest and `.gitignore` entries
//! - `use_case` - `InitUseCase`

mod boilerplate;
mod options;
mod reconciler;
mod use_case;

pub use boilerplate::{compose_template, ensure_gitignore, GITIGNORE_ENTRIES};
pub use options::InitOptions;
pub use reconciler::{RegistryError, RegistryReconciler, StagedRegistry};
pub use use_case::{InitReport, InitUseCase};
