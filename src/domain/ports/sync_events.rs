//! Sync Event Port
//!
//! Observable progress for sync operations, so the CLI can report stages and
//! tests can assert on the order they happen in.

use std::fmt;

use crate::domain::value_objects::DeployMode;

/// Orchestrator stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Idle,
    Validating,
    Transferring,
    Rewriting,
    Uploading,
    BuildingAndRestarting,
    Cleanup,
    Done,
    Failed,
}

impl SyncStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncStage::Done | SyncStage::Failed)
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::Idle => "idle",
            SyncStage::Validating => "validating",
            SyncStage::Transferring => "transferring",
            SyncStage::Rewriting => "rewriting",
            SyncStage::Uploading => "uploading",
            SyncStage::BuildingAndRestarting => "building",
            SyncStage::Cleanup => "cleanup",
            SyncStage::Done => "done",
            SyncStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Event emitted during sync operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Entered a new stage
    Stage(SyncStage),

    /// A service's source reached the remote host
    ServiceTransferred { service: String, strategy: String },

    /// A service was left alone because it deploys a prebuilt image
    ServiceSkipped { service: String, mode: DeployMode },

    /// A best-effort step failed and the sync carried on
    Warning { message: String },
}

/// Trait for receiving sync events
pub trait SyncEventSink {
    fn on_event(&self, event: SyncEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl SyncEventSink for NoopEventSink {
    fn on_event(&self, _event: SyncEvent) {}
}

/// Logs every event through `log`
pub struct LogEventSink;

impl SyncEventSink for LogEventSink {
    fn on_event(&self, event: SyncEvent) {
        match event {
            SyncEvent::Stage(stage) => log::info!("sync stage: {}", stage),
            SyncEvent::ServiceTransferred { service, strategy } => {
                log::info!("transferred {} ({})", service, strategy)
            }
            SyncEvent::ServiceSkipped { service, mode } => {
                log::debug!("skipping {} ({})", service, mode)
            }
            SyncEvent::Warning { message } => log::warn!("{}", message),
        }
    }
}
