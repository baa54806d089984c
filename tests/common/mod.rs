//! Common test utilities for graft contract and scenario tests.
//!
//! - `LocalHost`: a `RemoteExecutor` that treats this machine as the deploy
//!   host, running commands through `sh -c` and copying files locally
//! - `write_tree` / `read_tree`: build and compare source trees
//! - `fake_bin`: executable shell scripts standing in for ssh, scp or rsync

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use graft::domain::ports::{RemoteError, RemoteExecutor, RemoteResult};
use walkdir::WalkDir;

/// Runs "remote" commands on the local machine.
///
/// Commands that invoke docker are recorded but not run, so orchestration
/// can be exercised on machines without a docker daemon.
#[derive(Default)]
pub struct LocalHost {
    commands: RefCell<Vec<String>>,
    uploads: RefCell<Vec<String>>,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.borrow().clone()
    }

    pub fn docker_commands(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter(|c| c.contains("docker "))
            .collect()
    }
}

impl RemoteExecutor for LocalHost {
    fn execute(&self, command: &str) -> RemoteResult<()> {
        self.commands.borrow_mut().push(command.to_string());
        if command.contains("docker ") {
            return Ok(());
        }

        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .status()
            .map_err(|source| RemoteError::Io {
                program: "sh".to_string(),
                source,
            })?;
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
        self.uploads.borrow_mut().push(remote.to_string());
        let remote_path = Path::new(remote);
        if let Some(parent) = remote_path.parent() {
            fs::create_dir_all(parent).map_err(|e| transfer_error(local, remote, e))?;
        }
        fs::copy(local, remote_path)
            .map(|_| ())
            .map_err(|e| transfer_error(local, remote, e))
    }

    fn download_file(&self, remote: &str, local: &Path) -> RemoteResult<()> {
        if !Path::new(remote).exists() {
            return Err(RemoteError::NotFound {
                path: remote.to_string(),
            });
        }
        fs::copy(remote, local)
            .map(|_| ())
            .map_err(|e| transfer_error(local, remote, e))
    }

    fn destination(&self) -> String {
        "local".to_string()
    }
}

fn transfer_error(local: &Path, remote: &str, err: std::io::Error) -> RemoteError {
    RemoteError::FileTransfer {
        local: local.to_path_buf(),
        remote: remote.to_string(),
        message: err.to_string(),
    }
}

/// Write `files` (relative path → contents) under `root`.
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

/// Every regular file under `root`, keyed by its relative path.
pub fn read_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let rel = entry.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(entry.path()).unwrap())
        })
        .collect()
}

/// Executable `#!/bin/sh` script at `dir/name`.
#[cfg(unix)]
pub fn fake_bin(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A compose manifest with one serverbuild service per name.
pub fn serverbuild_manifest(project: &str, services: &[&str]) -> String {
    let mut manifest = format!("name: {}\nservices:\n", project);
    for service in services {
        manifest.push_str(&format!(
            "  {service}:\n    build:\n      context: ./{service}\n    labels:\n      - graft.mode=serverbuild\n"
        ));
    }
    manifest
}
