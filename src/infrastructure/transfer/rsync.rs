//! Rsync mirror
//!
//! Incremental transfer of one build context: only changed files move and
//! files that vanished locally are deleted remotely.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::domain::services::shell_quote;
use crate::domain::value_objects::IgnorePatterns;
use crate::infrastructure::remote::SshTarget;

use super::{PathAdapter, TransferError};

/// A located rsync binary and the filesystem view it runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsyncTool {
    program: PathBuf,
    adapter: PathAdapter,
    /// Extra `-o` values for the `-e ssh` transport
    ssh_options: Vec<String>,
}

impl RsyncTool {
    pub fn native(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let adapter = PathAdapter::for_native_program(&program);
        Self {
            program,
            adapter,
            ssh_options: Vec::new(),
        }
    }

    /// rsync inside WSL, started as `<launcher> rsync ...`
    pub fn compatibility_layer(launcher: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("rsync"),
            adapter: PathAdapter::wsl(launcher),
            ssh_options: Vec::new(),
        }
    }

    pub fn with_adapter(mut self, adapter: PathAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    /// Pass `-o` values to rsync's ssh, typically the executor's
    /// [`transport_options`](crate::infrastructure::SshExecutor::transport_options).
    ///
    /// A control socket lives in this host's filesystem, so `ControlPath` is
    /// dropped when rsync runs inside a compatibility layer.
    pub fn with_ssh_options(mut self, options: impl IntoIterator<Item = String>) -> Self {
        let layered = matches!(self.adapter, PathAdapter::CompatibilityLayer { .. });
        self.ssh_options = options
            .into_iter()
            .filter(|option| !(layered && option.starts_with("ControlPath=")))
            .collect();
        self
    }

    pub fn ssh_options(&self) -> &[String] {
        &self.ssh_options
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn adapter(&self) -> &PathAdapter {
        &self.adapter
    }

    /// Mirror `local` into `remote_dir` on the target host.
    ///
    /// A program that cannot be spawned is `ToolUnavailable`, so the caller
    /// can fall back to the archive path; every other failure is final.
    pub fn mirror(
        &self,
        service: &str,
        local: &Path,
        remote_dir: &str,
        target: &SshTarget,
        ignore: &IgnorePatterns,
    ) -> Result<(), TransferError> {
        let staged_key = match &target.key_path {
            Some(key) => Some(self.adapter.stage_key(key)?),
            None => None,
        };
        let key = staged_key.as_ref().map(|k| k.path());
        let args = self.build_args(local, remote_dir, target, key, ignore);

        log::debug!("{} {}", self.program.display(), args.join(" "));

        let status = self
            .adapter
            .command(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    TransferError::ToolUnavailable {
                        program: self.program.display().to_string(),
                    }
                } else {
                    TransferError::Failed {
                        service: service.to_string(),
                        message: format!("failed to start rsync: {}", e),
                    }
                }
            })?;

        if !status.success() {
            return Err(TransferError::Failed {
                service: service.to_string(),
                message: format!("rsync exited with {}", status),
            });
        }
        Ok(())
    }

    pub fn build_args(
        &self,
        local: &Path,
        remote_dir: &str,
        target: &SshTarget,
        key: Option<&str>,
        ignore: &IgnorePatterns,
    ) -> Vec<String> {
        let mut ssh = format!(
            "ssh -p {} -o StrictHostKeyChecking=accept-new",
            target.port
        );
        if let Some(key) = key {
            ssh.push_str(" -i ");
            ssh.push_str(&shell_quote(key));
        }
        for option in &self.ssh_options {
            ssh.push_str(" -o ");
            ssh.push_str(&shell_quote(option));
        }

        let mut args = vec![
            "-az".to_string(),
            "--delete".to_string(),
            "-e".to_string(),
            ssh,
        ];
        args.extend(ignore.rsync_args());

        let local = self.adapter.translate(local);
        args.push(format!("{}/", local.trim_end_matches(['/', '\\'])));
        args.push(format!(
            "{}:{}/",
            target.destination(),
            remote_dir.trim_end_matches('/')
        ));
        args
    }
}
