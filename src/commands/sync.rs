//! Sync command handler

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use graft::application::{SyncOptions, SyncUseCase};
use graft::domain::ports::LogEventSink;
use graft::infrastructure::transfer::{TransferBackend, TransferEngine};

use crate::cli::{SyncArgs, SyncCommand};

pub fn cmd_sync(project_root: &Path, args: SyncArgs) -> Result<()> {
    let config = super::load_config(project_root)?;

    let options = match args.command {
        Some(SyncCommand::Compose { upload_only }) => {
            SyncOptions::new(config.manifest_path(project_root))
                .manifest_only()
                .with_upload_only(upload_only)
        }
        None => {
            let options = SyncOptions::new(config.manifest_path(project_root))
                .with_no_cache(args.no_cache)
                .with_upload_only(args.upload_only);
            match args.service {
                Some(service) => options.with_service(service),
                None => options,
            }
        }
    };

    let target = config.ssh_target()?;
    let backend = TransferBackend::detect();
    log::debug!("transfer backend: {}", backend.name());
    let executor = super::connect(&config)?;
    let engine =
        TransferEngine::new(backend, target).with_ssh_options(executor.transport_options());

    let use_case = SyncUseCase::new(
        &executor,
        super::store(project_root),
        engine,
        config.deploy.remote_root.as_str(),
        config.deploy.use_sudo,
    )
    .with_events(Arc::new(LogEventSink));

    let report = use_case.execute(&options)?;

    for outcome in &report.transferred {
        println!(
            "  {} → {} ({})",
            outcome.service,
            outcome.remote_dir,
            outcome.strategy.as_str()
        );
    }
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    if report.rebuilt() {
        println!("Synced {} to {}", report.project, report.remote_dir);
    } else if report.restarted() {
        println!(
            "Uploaded compose file for {} to {} and restarted (no rebuild)",
            report.project, report.remote_dir
        );
    } else {
        println!(
            "Uploaded {} to {} (not restarted)",
            report.project, report.remote_dir
        );
    }
    Ok(())
}
