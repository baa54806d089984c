//! Syncing one service of an already initialized project.

use graft::domain::entities::ProjectMetadata;
use graft::domain::ports::ConfigStore;
use graft::infrastructure::{FsConfigStore, SshTarget, TransferBackend, TransferEngine};
use graft::SyncOptions;
use graft::SyncUseCase;
use std::fs;
use tempfile::tempdir;

use crate::common::*;

#[test]
fn scenario_single_service_sync_lands_on_host() {
    let work = tempdir().unwrap();
    let project = work.path().join("demo");
    let host_root = work.path().join("host");
    fs::create_dir_all(&host_root).unwrap();

    write_tree(
        &project,
        &[
            ("api/Dockerfile", b"FROM python:3.12\nCOPY . /app\n"),
            ("api/app.py", b"print('api')\n"),
            ("web/Dockerfile", b"FROM nginx\n"),
        ],
    );
    fs::write(
        project.join("graft-compose.yml"),
        serverbuild_manifest("demo", &["api", "web"]),
    )
    .unwrap();

    let store = FsConfigStore::new(&project).with_registry_path(work.path().join("projects.json"));
    let remote_dir = host_root.join("demo").display().to_string();
    store
        .save_metadata(&ProjectMetadata::new("demo", remote_dir.as_str()))
        .unwrap();

    let executor = LocalHost::new();
    let engine = TransferEngine::new(TransferBackend::Archive, SshTarget::new("localhost"));
    let use_case = SyncUseCase::new(
        &executor,
        &store,
        engine,
        host_root.display().to_string(),
        false,
    );

    let report = use_case
        .execute(&SyncOptions::new(project.join("graft-compose.yml")).with_service("api"))
        .unwrap();

    assert_eq!(report.transferred.len(), 1);
    assert!(report.rebuilt());
    assert_eq!(
        read_tree(&project.join("api")),
        read_tree(&host_root.join("demo/api"))
    );
    assert!(!host_root.join("demo/web").exists());

    let manifest = fs::read_to_string(host_root.join("demo/docker-compose.yml")).unwrap();
    assert!(manifest.contains("context: ./api"));

    let docker = executor.docker_commands();
    let stop = docker.iter().position(|c| c.contains("stop api")).unwrap();
    let build = docker
        .iter()
        .position(|c| c.contains("--build api"))
        .unwrap();
    assert!(stop < build);
    assert!(docker.last().unwrap().contains("image prune"));

    let metadata = store.load_metadata().unwrap().unwrap();
    assert!(metadata.last_synced.is_some());
}

#[test]
fn scenario_upload_only_never_touches_docker() {
    let work = tempdir().unwrap();
    let project = work.path().join("demo");
    let host_root = work.path().join("host");
    fs::create_dir_all(&host_root).unwrap();
    write_tree(&project, &[("api/Dockerfile", b"FROM scratch\n")]);
    fs::write(
        project.join("graft-compose.yml"),
        serverbuild_manifest("demo", &["api"]),
    )
    .unwrap();

    let store = FsConfigStore::new(&project).with_registry_path(work.path().join("projects.json"));
    let executor = LocalHost::new();
    let use_case = SyncUseCase::new(
        &executor,
        &store,
        TransferEngine::new(TransferBackend::Archive, SshTarget::new("localhost")),
        host_root.display().to_string(),
        false,
    );

    let report = use_case
        .execute(&SyncOptions::new(project.join("graft-compose.yml")).with_upload_only(true))
        .unwrap();

    assert!(!report.rebuilt());
    assert!(executor.docker_commands().is_empty());
    assert!(host_root.join("demo/api/Dockerfile").is_file());
    assert!(host_root.join("demo/docker-compose.yml").is_file());
}
