//! RemoteExecutor port - command execution and file copy on the deploy host
//!
//! Every remote side effect of a sync goes through this trait, so the
//! orchestrator and the registry reconciler can be driven by fakes.

use std::path::{Path, PathBuf};

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("cannot connect to {destination}: {message}\n  → Fix: Check the host, port, user and key in .graft/config.toml\n  → Run: ssh -p <port> <user>@<host> true")]
    Connection { destination: String, message: String },

    #[error("remote command failed ({}): {command}", exit_status(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("remote file not found: {path}")]
    NotFound { path: String },

    #[error("file copy failed: {} ↔ {remote}: {message}", .local.display())]
    FileTransfer {
        local: PathBuf,
        remote: String,
        message: String,
    },

    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit {}", code),
        None => "killed by signal".to_string(),
    }
}

/// Runs commands on, and copies files to and from, one remote host.
pub trait RemoteExecutor {
    /// Run a shell command remotely, streaming its output.
    /// A non-zero exit status is an error.
    fn execute(&self, command: &str) -> RemoteResult<()>;

    fn upload_file(&self, local: &Path, remote: &str) -> RemoteResult<()>;

    /// A missing remote file is `RemoteError::NotFound`.
    fn download_file(&self, remote: &str, local: &Path) -> RemoteResult<()>;

    /// `user@host`, for messages
    fn destination(&self) -> String;
}

impl<T: RemoteExecutor + ?Sized> RemoteExecutor for &T {
    fn execute(&self, command: &str) -> RemoteResult<()> {
        (**self).execute(command)
    }

    fn upload_file(&self, local: &Path, remote: &str) -> RemoteResult<()> {
        (**self).upload_file(local, remote)
    }

    fn download_file(&self, remote: &str, local: &Path) -> RemoteResult<()> {
        (**self).download_file(remote, local)
    }

    fn destination(&self) -> String {
        (**self).destination()
    }
}
