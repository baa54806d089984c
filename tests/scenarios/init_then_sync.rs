//! A fresh checkout: init registers it, then a full sync ships both
//! starter services.

use graft::application::RegistryReconciler;
use graft::domain::entities::RemoteRegistry;
use graft::domain::ports::ConfigStore;
use graft::infrastructure::{FsConfigStore, SshTarget, TransferBackend, TransferEngine};
use graft::{InitOptions, InitUseCase, SyncOptions, SyncUseCase};
use std::fs;
use tempfile::tempdir;

use crate::common::*;

#[test]
fn scenario_init_then_project_sync() {
    let work = tempdir().unwrap();
    let project = work.path().join("scenario_shop");
    let host_root = work.path().join("host/projects");
    let registry_path = work.path().join("host/registry.json");
    write_tree(
        &project,
        &[
            ("frontend/Dockerfile", b"FROM node:20\n"),
            ("frontend/index.js", b"console.log('hi')\n"),
            ("backend/Dockerfile", b"FROM python:3.12\n"),
            ("backend/app.py", b"print('ok')\n"),
        ],
    );

    let store = FsConfigStore::new(&project).with_registry_path(work.path().join("projects.json"));
    let executor = LocalHost::new();

    let init = InitUseCase::new(
        &executor,
        &store,
        RegistryReconciler::new(
            registry_path.display().to_string(),
            host_root.display().to_string(),
            false,
        ),
        false,
    );
    let report = init
        .execute(&InitOptions::new(&project).with_domain("shop.test"))
        .unwrap();
    assert_eq!(report.name, "scenario_shop");
    assert!(host_root.join("scenario_shop").is_dir());

    let registry =
        RemoteRegistry::from_json(&fs::read_to_string(&registry_path).unwrap()).unwrap();
    assert_eq!(registry.get("scenario_shop"), Some(report.remote_path.as_str()));

    let sync = SyncUseCase::new(
        &executor,
        &store,
        TransferEngine::new(TransferBackend::Archive, SshTarget::new("localhost")),
        host_root.display().to_string(),
        false,
    );
    let synced = sync
        .execute(&SyncOptions::new(project.join("graft-compose.yml")))
        .unwrap();

    assert_eq!(synced.transferred.len(), 2);
    let remote = host_root.join("scenario_shop");
    assert_eq!(read_tree(&project.join("frontend")), read_tree(&remote.join("frontend")));
    assert_eq!(read_tree(&project.join("backend")), read_tree(&remote.join("backend")));

    let manifest = fs::read_to_string(remote.join("docker-compose.yml")).unwrap();
    assert!(manifest.contains("Host(`shop.test`)"));
    assert!(executor
        .docker_commands()
        .iter()
        .any(|c| c.ends_with("docker compose up -d --build --remove-orphans")));

    assert!(store.load_metadata().unwrap().unwrap().last_synced.is_some());
}
