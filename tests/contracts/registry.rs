//! CONTRACT: the host registry holds at most one entry per project name and
//! is only rewritten after the project directory exists.

use graft::application::{RegistryError, RegistryReconciler};
use graft::domain::entities::RemoteRegistry;
use std::fs;
use tempfile::tempdir;

use crate::common::*;

#[test]
fn contract_registry_round_trips_through_the_host() {
    let host = tempdir().unwrap();
    let registry_path = host.path().join("state/registry.json");
    let reconciler = RegistryReconciler::new(
        registry_path.display().to_string(),
        host.path().join("projects").display().to_string(),
        false,
    );
    let executor = LocalHost::new();

    let staged = reconciler.stage(&executor, "contract_shop", false).unwrap();
    assert!(staged.replaced().is_none());
    staged.commit(&executor).unwrap();

    let registry =
        RemoteRegistry::from_json(&fs::read_to_string(&registry_path).unwrap()).unwrap();
    assert_eq!(
        registry.get("contract_shop"),
        Some(host.path().join("projects/contract_shop").to_str().unwrap())
    );
    let uploads = executor.uploads();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].starts_with("/tmp/graft-registry.contract_shop."));
    assert!(!std::path::Path::new(&uploads[0]).exists());
}

#[test]
fn contract_second_claim_on_a_name_is_rejected() {
    let host = tempdir().unwrap();
    let registry_path = host.path().join("registry.json");
    fs::write(&registry_path, r#"{"contract_blog": "/srv/elsewhere/contract_blog"}"#).unwrap();
    let reconciler = RegistryReconciler::new(
        registry_path.display().to_string(),
        host.path().display().to_string(),
        false,
    );
    let executor = LocalHost::new();

    let err = reconciler
        .stage(&executor, "contract_blog", false)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Conflict { .. }));
    assert!(executor.uploads().is_empty());

    let staged = reconciler.stage(&executor, "contract_blog", true).unwrap();
    assert_eq!(staged.replaced(), Some("/srv/elsewhere/contract_blog"));
    assert_eq!(staged.registry().len(), 1);
}
