//! CONTRACT: a project-wide sync never deletes remote files, a
//! single-service sync replaces exactly that service's directory.

use graft::domain::entities::ServiceTransfer;
use graft::infrastructure::{SshTarget, TransferBackend, TransferEngine, TransferMode};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use crate::common::*;

fn push(local: &Path, remote_dir: &Path, mode: TransferMode) {
    let transfer = ServiceTransfer {
        service: "api".to_string(),
        local_context: local.to_path_buf(),
        remote_name: "api".to_string(),
        dockerfile: "Dockerfile".to_string(),
    };
    TransferEngine::new(TransferBackend::Archive, SshTarget::new("localhost"))
        .transfer(
            &LocalHost::new(),
            &transfer,
            &remote_dir.display().to_string(),
            mode,
        )
        .unwrap();
}

fn seed_remote(remote: &Path) {
    write_tree(
        remote,
        &[
            ("api/stale.txt", b"left from an earlier sync\n"),
            ("api/main.txt", b"old\n"),
            ("web/index.html", b"<h1>web</h1>\n"),
        ],
    );
}

#[test]
fn contract_additive_keeps_existing_files() {
    let local = tempdir().unwrap();
    let remote = tempdir().unwrap();
    write_tree(local.path(), &[("Dockerfile", b"FROM scratch\n"), ("main.txt", b"new\n")]);
    seed_remote(remote.path());

    push(local.path(), remote.path(), TransferMode::Additive);

    let api = remote.path().join("api");
    assert_eq!(fs::read(api.join("main.txt")).unwrap(), b"new\n");
    assert!(api.join("Dockerfile").is_file());
    assert!(api.join("stale.txt").is_file());
    assert!(remote.path().join("web/index.html").is_file());
}

#[test]
fn contract_replace_wipes_only_the_service_directory() {
    let local = tempdir().unwrap();
    let remote = tempdir().unwrap();
    write_tree(local.path(), &[("Dockerfile", b"FROM scratch\n"), ("main.txt", b"new\n")]);
    seed_remote(remote.path());

    push(local.path(), remote.path(), TransferMode::Replace);

    assert_eq!(read_tree(local.path()), read_tree(&remote.path().join("api")));
    assert!(!remote.path().join("api/stale.txt").exists());
    assert_eq!(
        fs::read(remote.path().join("web/index.html")).unwrap(),
        b"<h1>web</h1>\n"
    );
}
