//! Sync Result

use crate::domain::ports::SyncStage;
use crate::infrastructure::transfer::TransferOutcome;

/// What a successful sync did
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub project: String,
    pub remote_dir: String,
    /// One entry per transferred service, in manifest order
    pub transferred: Vec<TransferOutcome>,
    /// Services left alone because they are localbuild
    pub skipped: Vec<String>,
    /// Best-effort commands that failed
    pub warnings: Vec<String>,
    /// Last stage reached before `Done`
    pub last_stage: SyncStage,
    /// Images were built on the remote host
    pub built: bool,
    /// Containers were brought up with the uploaded manifest
    pub restarted: bool,
}

impl SyncReport {
    pub fn new(project: impl Into<String>, remote_dir: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            remote_dir: remote_dir.into(),
            transferred: Vec::new(),
            skipped: Vec::new(),
            warnings: Vec::new(),
            last_stage: SyncStage::Idle,
            built: false,
            restarted: false,
        }
    }

    /// Whether containers were rebuilt from transferred sources. A
    /// manifest-only restart does not count.
    pub fn rebuilt(&self) -> bool {
        self.built && self.restarted
    }

    pub fn restarted(&self) -> bool {
        self.restarted
    }
}
