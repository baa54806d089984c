//! Transfer engine
//!
//! Moves one service's build context to the remote host: rsync when a
//! binary was found, a tar.gz upload otherwise or when rsync turns out to be
//! missing at spawn time.

mod archive;
mod backend;
mod path_adapter;
mod rsync;

use std::path::PathBuf;

pub use archive::{build_archive, extract_command, PackedArchive};
pub use backend::{RsyncLocator, TransferBackend};
pub use path_adapter::{PathAdapter, StagedKey};
pub use rsync::RsyncTool;

use crate::domain::entities::ServiceTransfer;
use crate::domain::ports::{RemoteError, RemoteExecutor};
use crate::domain::services::shell_quote;
use crate::domain::value_objects::{IgnoreError, IgnorePatterns};
use crate::infrastructure::remote::SshTarget;

/// What the archive path does to an existing service directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Single-service sync: the directory is wiped and recreated
    Replace,
    /// Whole-project sync: existing files are left in place
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStrategy {
    Incremental,
    Archive,
}

impl TransferStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStrategy::Incremental => "rsync",
            TransferStrategy::Archive => "archive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub service: String,
    pub remote_dir: String,
    pub strategy: TransferStrategy,
}

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("transfer tool not available: {program}")]
    ToolUnavailable { program: String },

    #[error("transfer of '{service}' failed: {message}")]
    Failed { service: String, message: String },

    #[error("cannot create remote directory {path}: {source}\n  → Fix: Check that the login user may write under the remote root")]
    RemoteDirectory {
        path: String,
        #[source]
        source: RemoteError,
    },

    #[error("cannot pack '{service}': {message}")]
    Archive { service: String, message: String },

    #[error("archive upload of '{service}' failed: {source}")]
    Remote {
        service: String,
        #[source]
        source: RemoteError,
    },

    #[error(transparent)]
    Ignore(#[from] IgnoreError),

    #[error("cannot stage ssh key for the transfer tool: {message}")]
    KeyStaging { message: String },
}

pub struct TransferEngine {
    backend: TransferBackend,
    target: SshTarget,
    scratch_dir: Option<PathBuf>,
}

impl TransferEngine {
    pub fn new(backend: TransferBackend, target: SshTarget) -> Self {
        Self {
            backend,
            target,
            scratch_dir: None,
        }
    }

    /// Directory for temporary archives instead of the system temp dir.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Forward connection options to the rsync transport. The archive path
    /// goes through the executor and needs none.
    pub fn with_ssh_options(mut self, options: Vec<String>) -> Self {
        self.backend = match self.backend {
            TransferBackend::Incremental(tool) => {
                TransferBackend::Incremental(tool.with_ssh_options(options))
            }
            other => other,
        };
        self
    }

    pub fn backend(&self) -> &TransferBackend {
        &self.backend
    }

    pub fn transfer<E: RemoteExecutor>(
        &self,
        executor: &E,
        transfer: &ServiceTransfer,
        remote_dir: &str,
        mode: TransferMode,
    ) -> Result<TransferOutcome, TransferError> {
        let service_dir = service_dir(remote_dir, transfer);

        executor
            .execute(&format!("mkdir -p {}", shell_quote(&service_dir)))
            .map_err(|source| TransferError::RemoteDirectory {
                path: service_dir.clone(),
                source,
            })?;

        let ignore = IgnorePatterns::load(&transfer.local_context)?;

        let strategy = match &self.backend {
            TransferBackend::Incremental(tool) => match tool.mirror(
                &transfer.service,
                &transfer.local_context,
                &service_dir,
                &self.target,
                &ignore,
            ) {
                Ok(()) => TransferStrategy::Incremental,
                Err(TransferError::ToolUnavailable { program }) => {
                    log::warn!("{} could not be started, falling back to archive upload", program);
                    self.via_archive(executor, transfer, remote_dir, &service_dir, &ignore, mode)?;
                    TransferStrategy::Archive
                }
                Err(e) => return Err(e),
            },
            TransferBackend::Archive => {
                self.via_archive(executor, transfer, remote_dir, &service_dir, &ignore, mode)?;
                TransferStrategy::Archive
            }
        };

        log::info!(
            "{} → {} ({})",
            transfer.local_context.display(),
            service_dir,
            strategy.as_str()
        );

        Ok(TransferOutcome {
            service: transfer.service.clone(),
            remote_dir: service_dir,
            strategy,
        })
    }

    fn via_archive<E: RemoteExecutor>(
        &self,
        executor: &E,
        transfer: &ServiceTransfer,
        remote_dir: &str,
        service_dir: &str,
        ignore: &IgnorePatterns,
        mode: TransferMode,
    ) -> Result<(), TransferError> {
        let packed = build_archive(
            &transfer.service,
            &transfer.local_context,
            ignore,
            self.scratch_dir.as_deref(),
        )?;
        let tarball = format!(
            "{}/{}.tar.gz",
            remote_dir.trim_end_matches('/'),
            transfer.remote_name
        );

        let remote_err = |source: RemoteError| TransferError::Remote {
            service: transfer.service.clone(),
            source,
        };
        executor
            .upload_file(packed.path(), &tarball)
            .map_err(remote_err)?;
        executor
            .execute(&extract_command(mode, service_dir, &tarball))
            .map_err(remote_err)?;
        Ok(())
    }
}

/// `<remote_dir>/<remote_name>`
pub fn service_dir(remote_dir: &str, transfer: &ServiceTransfer) -> String {
    format!("{}/{}", remote_dir.trim_end_matches('/'), transfer.remote_name)
}
