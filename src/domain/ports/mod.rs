//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod config_store;
pub mod remote_executor;
pub mod sync_events;

pub use config_store::{ConfigStore, StoreError};
pub use remote_executor::{RemoteError, RemoteExecutor, RemoteResult};
pub use sync_events::{LogEventSink, NoopEventSink, SyncEvent, SyncEventSink, SyncStage};
