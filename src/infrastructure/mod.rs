//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `remote/` - OpenSSH-backed `RemoteExecutor`
//! - `transfer/` - Source tree transfer (rsync mirror, archive fallback)
//! - `repositories/` - Filesystem `ConfigStore`

pub mod remote;
pub mod repositories;
pub mod transfer;

// Re-export for convenience
pub use remote::{SshExecutor, SshTarget};
pub use repositories::FsConfigStore;
pub use transfer::{TransferBackend, TransferEngine, TransferMode};
