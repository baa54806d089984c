//! Init command handler

use std::path::Path;

use anyhow::Result;

use graft::application::{InitOptions, InitUseCase, RegistryReconciler};
use graft::domain::ports::RemoteExecutor;

pub fn cmd_init(
    project_root: &Path,
    name: Option<String>,
    domain: Option<String>,
    force: bool,
) -> Result<()> {
    let config = super::load_config(project_root)?;
    let executor = super::connect(&config)?;

    let reconciler = RegistryReconciler::new(
        config.deploy.registry_path.as_str(),
        config.deploy.remote_root.as_str(),
        config.deploy.use_sudo,
    );
    let use_case = InitUseCase::new(
        &executor,
        super::store(project_root),
        reconciler,
        config.deploy.use_sudo,
    );

    let mut options = InitOptions::new(project_root)
        .with_force(force)
        .with_manifest(config.deploy.manifest.as_str());
    if let Some(name) = name {
        options = options.with_name(name);
    }
    if let Some(domain) = domain {
        options = options.with_domain(domain);
    }

    let report = use_case.execute(&options)?;

    if let Some(previous) = &report.replaced {
        println!("Replaced registry entry (was {})", previous);
    }
    println!(
        "Initialized {} → {}:{}",
        report.name,
        executor.destination(),
        report.remote_path
    );
    if report.manifest_created {
        println!("Wrote {}", report.manifest.display());
    }
    Ok(())
}
