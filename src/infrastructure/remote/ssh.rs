//! OpenSSH-backed RemoteExecutor
//!
//! Shells out to the system `ssh` and `scp`. `connect` starts a control
//! master so every later command and copy reuses one authenticated
//! connection; dropping the executor closes it.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tempfile::TempDir;

use crate::domain::ports::{RemoteError, RemoteExecutor, RemoteResult};
use crate::domain::services::shell_quote;

pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_SSH_USER: &str = "root";

/// Where and as whom to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub key_path: Option<PathBuf>,
}

impl SshTarget {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SSH_PORT,
            user: DEFAULT_SSH_USER.to_string(),
            key_path: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_key_path(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.key_path = Some(key_path.into());
        self
    }

    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

pub struct SshExecutor {
    target: SshTarget,
    ssh_program: PathBuf,
    scp_program: PathBuf,
    /// Holds the control socket; `None` until `connect` succeeds
    control_dir: Option<TempDir>,
}

impl SshExecutor {
    /// Open a control master connection with the system `ssh` and `scp`.
    pub fn connect(target: SshTarget) -> RemoteResult<Self> {
        Self::with_programs(target, "ssh", "scp").open()
    }

    /// Use specific `ssh` / `scp` binaries. Call [`SshExecutor::open`] to
    /// start the control master, or use the executor as is for one-shot
    /// connections per command.
    pub fn with_programs(
        target: SshTarget,
        ssh_program: impl Into<PathBuf>,
        scp_program: impl Into<PathBuf>,
    ) -> Self {
        Self {
            target,
            ssh_program: ssh_program.into(),
            scp_program: scp_program.into(),
            control_dir: None,
        }
    }

    pub fn target(&self) -> &SshTarget {
        &self.target
    }

    pub fn open(mut self) -> RemoteResult<Self> {
        let control_dir = tempfile::Builder::new()
            .prefix("graft-ssh-")
            .tempdir()
            .map_err(|e| RemoteError::Connection {
                destination: self.target.destination(),
                message: format!("cannot create control socket directory: {}", e),
            })?;
        let socket = control_dir.path().join("master.sock");

        let status = Command::new(&self.ssh_program)
            .args(self.connection_args(false))
            .args(["-o", "ControlMaster=yes", "-o", "ControlPersist=yes"])
            .arg("-o")
            .arg(format!("ControlPath={}", socket.display()))
            .args(["-f", "-N"])
            .arg(self.target.destination())
            .stdin(Stdio::null())
            .status()
            .map_err(|source| RemoteError::Io {
                program: self.ssh_program.display().to_string(),
                source,
            })?;

        if !status.success() {
            return Err(RemoteError::Connection {
                destination: self.target.destination(),
                message: format!("ssh exited with {}", status),
            });
        }

        log::debug!("control master up for {}", self.target.destination());
        self.control_dir = Some(control_dir);
        Ok(self)
    }

    /// `-o` values other ssh clients (rsync's `-e ssh`) need to ride on
    /// this connection: batch mode, plus the control socket once open.
    pub fn transport_options(&self) -> Vec<String> {
        let mut options = vec!["BatchMode=yes".to_string()];
        if let Some(socket) = self.control_path() {
            options.push(format!("ControlPath={}", socket.display()));
        }
        options
    }

    fn control_path(&self) -> Option<PathBuf> {
        self.control_dir
            .as_ref()
            .map(|dir| dir.path().join("master.sock"))
    }

    /// Identity, port and host key options shared by ssh and scp
    /// (scp spells the port flag `-P`).
    fn connection_args(&self, for_scp: bool) -> Vec<String> {
        let mut args = vec![
            if for_scp { "-P" } else { "-p" }.to_string(),
            self.target.port.to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
        ];
        if let Some(key) = &self.target.key_path {
            args.push("-i".to_string());
            args.push(key.display().to_string());
        }
        if let Some(socket) = self.control_path() {
            args.push("-o".to_string());
            args.push(format!("ControlPath={}", socket.display()));
        }
        args
    }

    fn ssh_status(&self, command: &str, quiet: bool) -> RemoteResult<ExitStatus> {
        log::debug!("ssh {}: {}", self.target.destination(), command);
        let mut cmd = Command::new(&self.ssh_program);
        cmd.args(self.connection_args(false))
            .arg(self.target.destination())
            .arg(command)
            .stdin(Stdio::null());
        if quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        cmd.status().map_err(|source| RemoteError::Io {
            program: self.ssh_program.display().to_string(),
            source,
        })
    }

    fn scp(&self, from: &str, to: &str, local: &Path, remote: &str) -> RemoteResult<()> {
        let status = Command::new(&self.scp_program)
            .args(self.connection_args(true))
            .arg("-q")
            .arg(from)
            .arg(to)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| RemoteError::Io {
                program: self.scp_program.display().to_string(),
                source,
            })?;
        if !status.success() {
            return Err(RemoteError::FileTransfer {
                local: local.to_path_buf(),
                remote: remote.to_string(),
                message: format!("scp exited with {}", status),
            });
        }
        Ok(())
    }

    fn remote_spec(&self, remote: &str) -> String {
        format!("{}:{}", self.target.destination(), remote)
    }
}

impl RemoteExecutor for SshExecutor {
    fn execute(&self, command: &str) -> RemoteResult<()> {
        let status = self.ssh_status(command, false)?;
        if status.success() {
            Ok(())
        } else {
            Err(RemoteError::CommandFailed {
                command: command.to_string(),
                code: status.code(),
            })
        }
    }

    fn upload_file(&self, local: &Path, remote: &str) -> RemoteResult<()> {
        log::debug!("upload {} → {}", local.display(), remote);
        self.scp(
            &local.display().to_string(),
            &self.remote_spec(remote),
            local,
            remote,
        )
    }

    fn download_file(&self, remote: &str, local: &Path) -> RemoteResult<()> {
        // ssh reserves exit status 255 for its own failures.
        let probe = self.ssh_status(&format!("test -e {}", shell_quote(remote)), true)?;
        match probe.code() {
            Some(0) => {}
            Some(255) | None => {
                return Err(RemoteError::Connection {
                    destination: self.target.destination(),
                    message: format!("probing {} failed", remote),
                })
            }
            Some(_) => {
                return Err(RemoteError::NotFound {
                    path: remote.to_string(),
                })
            }
        }

        log::debug!("download {} → {}", remote, local.display());
        self.scp(
            &self.remote_spec(remote),
            &local.display().to_string(),
            local,
            remote,
        )
    }

    fn destination(&self) -> String {
        self.target.destination()
    }
}

impl Drop for SshExecutor {
    fn drop(&mut self) {
        let Some(socket) = self.control_path() else {
            return;
        };
        let result = Command::new(&self.ssh_program)
            .arg("-o")
            .arg(format!("ControlPath={}", socket.display()))
            .args(["-O", "exit"])
            .arg(self.target.destination())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(e) = result {
            log::warn!("failed to close ssh control master: {}", e);
        }
    }
}
