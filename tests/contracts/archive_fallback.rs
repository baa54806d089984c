//! CONTRACT: when rsync cannot be started, the archive path reproduces the
//! source tree byte for byte and leaves no local archive behind.

use std::fs;
use std::path::{Path, PathBuf};

use graft::domain::entities::ServiceTransfer;
use graft::domain::ports::{RemoteError, RemoteExecutor, RemoteResult};
use graft::infrastructure::transfer::{
    RsyncTool, TransferBackend, TransferEngine, TransferError, TransferMode, TransferStrategy,
};
use graft::infrastructure::SshTarget;
use tempfile::tempdir;

use crate::common::*;

fn api_transfer(context: PathBuf) -> ServiceTransfer {
    ServiceTransfer {
        service: "api".to_string(),
        local_context: context,
        remote_name: "api".to_string(),
        dockerfile: "Dockerfile".to_string(),
    }
}

/// A `LocalHost` whose archive upload or extract step fails.
struct BrokenHost {
    inner: LocalHost,
    fail_upload: bool,
    fail_extract: bool,
}

impl BrokenHost {
    fn failing_upload() -> Self {
        Self {
            inner: LocalHost::new(),
            fail_upload: true,
            fail_extract: false,
        }
    }

    fn failing_extract() -> Self {
        Self {
            inner: LocalHost::new(),
            fail_upload: false,
            fail_extract: true,
        }
    }
}

impl RemoteExecutor for BrokenHost {
    fn execute(&self, command: &str) -> RemoteResult<()> {
        if self.fail_extract && command.contains("tar -xzf") {
            return Err(RemoteError::CommandFailed {
                command: command.to_string(),
                code: Some(2),
            });
        }
        self.inner.execute(command)
    }

    fn upload_file(&self, local: &Path, remote: &str) -> RemoteResult<()> {
        if self.fail_upload {
            return Err(RemoteError::FileTransfer {
                local: local.to_path_buf(),
                remote: remote.to_string(),
                message: "connection reset".to_string(),
            });
        }
        self.inner.upload_file(local, remote)
    }

    fn download_file(&self, remote: &str, local: &Path) -> RemoteResult<()> {
        self.inner.download_file(remote, local)
    }

    fn destination(&self) -> String {
        self.inner.destination()
    }
}

fn archive_into(executor: &BrokenHost) -> (TransferError, tempfile::TempDir) {
    let local = tempdir().unwrap();
    let host = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    write_tree(local.path(), &[("Dockerfile", b"FROM scratch\n")]);

    let engine = TransferEngine::new(TransferBackend::Archive, SshTarget::new("localhost"))
        .with_scratch_dir(scratch.path());
    let err = engine
        .transfer(
            executor,
            &api_transfer(local.path().to_path_buf()),
            &host.path().display().to_string(),
            TransferMode::Replace,
        )
        .unwrap_err();
    (err, scratch)
}

#[test]
fn contract_archive_fallback_reproduces_tree() {
    let local = tempdir().unwrap();
    let host = tempdir().unwrap();
    let scratch = tempdir().unwrap();

    let binary: &[u8] = &[0, 159, 146, 150, 255, b'\n', 0];
    write_tree(
        local.path(),
        &[
            ("Dockerfile", b"FROM alpine:3.20\nCOPY . /app\n"),
            ("src/main.py", b"print('hello')\n"),
            ("assets/logo.bin", binary),
        ],
    );

    let backend = TransferBackend::Incremental(RsyncTool::native("/nonexistent/bin/rsync"));
    let engine = TransferEngine::new(backend, SshTarget::new("localhost"))
        .with_scratch_dir(scratch.path());
    let remote_dir = host.path().join("demo").display().to_string();

    let executor = LocalHost::new();
    let outcome = engine
        .transfer(
            &executor,
            &api_transfer(local.path().to_path_buf()),
            &remote_dir,
            TransferMode::Replace,
        )
        .unwrap();

    assert_eq!(outcome.strategy, TransferStrategy::Archive);
    assert_eq!(read_tree(local.path()), read_tree(&host.path().join("demo/api")));

    // The uploaded tarball is removed remotely, the local one on drop
    assert!(!host.path().join("demo/api.tar.gz").exists());
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn contract_archive_respects_exclusions() {
    let local = tempdir().unwrap();
    let host = tempdir().unwrap();

    write_tree(
        local.path(),
        &[
            ("Dockerfile", b"FROM scratch\n"),
            ("node_modules/left-pad/index.js", b"module.exports = 1;\n"),
            ("debug.log", b"noise\n"),
            ("secret.txt", b"do not ship\n"),
            (".gitignore", b"secret.txt\n"),
        ],
    );

    let engine = TransferEngine::new(TransferBackend::Archive, SshTarget::new("localhost"));
    let remote_dir = host.path().display().to_string();

    engine
        .transfer(
            &LocalHost::new(),
            &api_transfer(local.path().to_path_buf()),
            &remote_dir,
            TransferMode::Replace,
        )
        .unwrap();

    let uploaded = read_tree(&host.path().join("api"));
    let names: Vec<String> = uploaded
        .keys()
        .map(|p| p.display().to_string())
        .collect();
    assert!(names.contains(&"Dockerfile".to_string()));
    assert!(!names.iter().any(|n| n.starts_with("node_modules")));
    assert!(!names.contains(&"debug.log".to_string()));
    assert!(!names.contains(&"secret.txt".to_string()));
}

#[test]
fn contract_rsync_is_used_when_it_runs() {
    let local = tempdir().unwrap();
    let bin = tempdir().unwrap();
    let log = bin.path().join("rsync.log");
    write_tree(local.path(), &[("Dockerfile", b"FROM scratch\n")]);

    let rsync = fake_bin(
        bin.path(),
        "rsync",
        &format!("echo \"$@\" >> \"{}\"\nexit 0\n", log.display()),
    );
    let engine = TransferEngine::new(
        TransferBackend::Incremental(RsyncTool::native(rsync)),
        SshTarget::new("example.com").with_port(2222),
    )
    .with_ssh_options(vec![
        "BatchMode=yes".to_string(),
        "ControlPath=/tmp/graft-ssh-contract/master.sock".to_string(),
    ]);

    let executor = LocalHost::new();
    let remote = tempdir().unwrap();
    let outcome = engine
        .transfer(
            &executor,
            &api_transfer(local.path().to_path_buf()),
            &remote.path().display().to_string(),
            TransferMode::Additive,
        )
        .unwrap();

    assert_eq!(outcome.strategy, TransferStrategy::Incremental);
    let logged = fs::read_to_string(&log).unwrap();
    assert!(logged.contains("-az --delete"));
    assert!(logged.contains("ssh -p 2222"));
    assert!(logged.contains(
        "-o BatchMode=yes -o ControlPath=/tmp/graft-ssh-contract/master.sock"
    ));
    assert!(logged.contains(&format!("root@example.com:{}/api/", remote.path().display())));
    assert!(executor.uploads().is_empty());
}

#[test]
fn contract_failing_rsync_does_not_fall_back() {
    let local = tempdir().unwrap();
    let bin = tempdir().unwrap();
    write_tree(local.path(), &[("Dockerfile", b"FROM scratch\n")]);
    let rsync = fake_bin(bin.path(), "rsync", "exit 12\n");

    let engine = TransferEngine::new(
        TransferBackend::Incremental(RsyncTool::native(rsync)),
        SshTarget::new("example.com"),
    );
    let executor = LocalHost::new();
    let remote = tempdir().unwrap();

    let err = engine
        .transfer(
            &executor,
            &api_transfer(local.path().to_path_buf()),
            &remote.path().display().to_string(),
            TransferMode::Replace,
        )
        .unwrap_err();

    assert!(err.to_string().contains("api"));
    assert!(executor.uploads().is_empty());
}

#[test]
fn contract_failed_archive_upload_is_reported_and_cleaned_up() {
    let executor = BrokenHost::failing_upload();

    let (err, scratch) = archive_into(&executor);

    match &err {
        TransferError::Remote { service, source } => {
            assert_eq!(service, "api");
            assert!(matches!(source, RemoteError::FileTransfer { .. }));
        }
        other => panic!("expected a remote transfer error, got {:?}", other),
    }
    assert!(executor
        .inner
        .commands()
        .iter()
        .all(|c| !c.contains("tar -xzf")));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn contract_failed_archive_extract_is_reported_and_cleaned_up() {
    let executor = BrokenHost::failing_extract();

    let (err, scratch) = archive_into(&executor);

    match &err {
        TransferError::Remote { service, source } => {
            assert_eq!(service, "api");
            assert!(matches!(
                source,
                RemoteError::CommandFailed { code: Some(2), .. }
            ));
        }
        other => panic!("expected a remote transfer error, got {:?}", other),
    }
    assert_eq!(executor.inner.uploads().len(), 1);
    assert!(err.to_string().contains("api"));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}
