//! Sync Use Case
//!
//! Orchestrates one sync invocation:
//! 1. Resolve and validate the manifest, then inject secrets
//!    (no remote side effects before this passes)
//! 2. Ensure the remote project directory
//! 3. Transfer the selected serverbuild services
//! 4. Rewrite build contexts
//! 5. Upload the manifest as `docker-compose.yml`
//! 6. Rebuild and restart, unless upload-only
//! 7. Best-effort image prune
//!
//! Failures after validation are not rolled back.

use std::fs;
use std::io::Write;
use std::sync::Arc;

use crate::domain::entities::{ProjectMetadata, SyncPlan, SyncTarget};
use crate::domain::ports::{
    ConfigStore, NoopEventSink, RemoteExecutor, SyncEvent, SyncEventSink, SyncStage,
};
use crate::domain::services::{ComposeCommands, ManifestRewriter, Resolver};
use crate::domain::value_objects::DeployMode;
use crate::error::{GraftError, GraftResult};
use crate::infrastructure::transfer::{TransferEngine, TransferMode};

use super::options::SyncOptions;
use super::result::SyncReport;

/// Sync use case, parameterized by its ports so tests can drive it with fakes
pub struct SyncUseCase<E, S>
where
    E: RemoteExecutor,
    S: ConfigStore,
{
    executor: E,
    store: S,
    engine: TransferEngine,
    remote_root: String,
    use_sudo: bool,
    events: Arc<dyn SyncEventSink>,
}

impl<E, S> SyncUseCase<E, S>
where
    E: RemoteExecutor,
    S: ConfigStore,
{
    pub fn new(
        executor: E,
        store: S,
        engine: TransferEngine,
        remote_root: impl Into<String>,
        use_sudo: bool,
    ) -> Self {
        Self {
            executor,
            store,
            engine,
            remote_root: remote_root.into(),
            use_sudo,
            events: Arc::new(NoopEventSink),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn SyncEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Run the sync. On error the `Failed` stage is reported before returning.
    pub fn execute(&self, options: &SyncOptions) -> GraftResult<SyncReport> {
        self.stage(SyncStage::Idle);
        match self.run(options) {
            Ok(report) => {
                self.stage(SyncStage::Done);
                Ok(report)
            }
            Err(e) => {
                log::error!("sync failed: {}", e);
                self.stage(SyncStage::Failed);
                Err(e)
            }
        }
    }

    fn run(&self, options: &SyncOptions) -> GraftResult<SyncReport> {
        self.stage(SyncStage::Validating);
        let metadata = self.store.load_metadata()?;
        let plan = Resolver::new(self.remote_root.as_str())
            .with_fallback_name(metadata.as_ref().map(|m| m.name.clone()))
            .resolve(&options.manifest_path, &options.target)?;
        let injected = self.inject_secrets(&plan)?;

        let mut report = SyncReport::new(plan.project.name.as_str(), plan.remote_dir.as_str());
        self.report_skipped(&plan, &mut report);

        let commands = ComposeCommands::new(plan.remote_dir.as_str(), self.use_sudo);
        self.executor.execute(&commands.ensure_project_dir())?;

        self.record_metadata(metadata, &plan, false)?;

        report.last_stage = SyncStage::Transferring;
        self.stage(SyncStage::Transferring);
        let mode = match plan.target {
            SyncTarget::Service(_) => TransferMode::Replace,
            _ => TransferMode::Additive,
        };
        for transfer in &plan.transfers {
            let outcome = self
                .engine
                .transfer(&self.executor, transfer, &plan.remote_dir, mode)?;
            self.events.on_event(SyncEvent::ServiceTransferred {
                service: outcome.service.clone(),
                strategy: outcome.strategy.as_str().to_string(),
            });
            report.transferred.push(outcome);
        }

        report.last_stage = SyncStage::Rewriting;
        self.stage(SyncStage::Rewriting);
        let manifest = ManifestRewriter::rewrite(&injected, &plan.rewrites);

        report.last_stage = SyncStage::Uploading;
        self.stage(SyncStage::Uploading);
        self.upload_manifest(&plan, &manifest)?;

        if options.upload_only {
            log::info!(
                "uploaded {} (upload only, nothing restarted)",
                plan.remote_manifest_path()
            );
            self.touch_synced(&plan)?;
            return Ok(report);
        }

        report.last_stage = SyncStage::BuildingAndRestarting;
        self.stage(SyncStage::BuildingAndRestarting);
        match &plan.target {
            SyncTarget::Project => {
                if options.no_cache {
                    self.best_effort(&commands.builder_prune(), &mut report);
                    self.executor.execute(&commands.build_all_no_cache())?;
                } else {
                    self.executor.execute(&commands.up_all())?;
                }
            }
            SyncTarget::Service(service) => {
                self.best_effort(&commands.stop_and_remove(service), &mut report);
                if options.no_cache {
                    self.best_effort(&commands.builder_prune(), &mut report);
                    self.executor
                        .execute(&commands.build_service_no_cache(service))?;
                } else {
                    self.executor.execute(&commands.up_service(service))?;
                }
            }
            SyncTarget::ManifestOnly => {
                self.executor.execute(&commands.up_without_build())?;
            }
        }
        report.built = plan.target != SyncTarget::ManifestOnly;
        report.restarted = true;

        if plan.target != SyncTarget::ManifestOnly {
            report.last_stage = SyncStage::Cleanup;
            self.stage(SyncStage::Cleanup);
            self.best_effort(&commands.image_prune(), &mut report);
        }

        self.touch_synced(&plan)?;
        Ok(report)
    }

    fn stage(&self, stage: SyncStage) {
        self.events.on_event(SyncEvent::Stage(stage));
    }

    fn report_skipped(&self, plan: &SyncPlan, report: &mut SyncReport) {
        let considered = plan
            .project
            .services
            .values()
            .filter(|service| match &plan.target {
                SyncTarget::Project => true,
                SyncTarget::Service(name) => name == &service.name,
                SyncTarget::ManifestOnly => false,
            });

        for service in considered {
            if let Ok(mode @ DeployMode::LocalBuild) = service.mode() {
                self.events.on_event(SyncEvent::ServiceSkipped {
                    service: service.name.clone(),
                    mode,
                });
                report.skipped.push(service.name.clone());
            }
        }
    }

    fn inject_secrets(&self, plan: &SyncPlan) -> GraftResult<String> {
        let text = fs::read_to_string(&plan.manifest_path)?;
        let secrets = self.store.load_secrets()?;
        Ok(secrets.inject(&text)?)
    }

    /// The temp file is removed when it drops, whichever way this returns.
    fn upload_manifest(&self, plan: &SyncPlan, manifest: &str) -> GraftResult<()> {
        let mut temp = tempfile::Builder::new()
            .prefix("graft-compose-")
            .suffix(".yml")
            .tempfile()?;
        temp.write_all(manifest.as_bytes())?;
        temp.flush()?;

        self.executor
            .upload_file(temp.path(), &plan.remote_manifest_path())?;
        Ok(())
    }

    fn best_effort(&self, command: &str, report: &mut SyncReport) {
        if let Err(e) = self.executor.execute(command) {
            let message = e.to_string();
            self.events.on_event(SyncEvent::Warning {
                message: message.clone(),
            });
            report.warnings.push(message);
        }
    }

    fn record_metadata(
        &self,
        existing: Option<ProjectMetadata>,
        plan: &SyncPlan,
        synced: bool,
    ) -> Result<(), GraftError> {
        let mut metadata = match existing {
            Some(mut metadata) if metadata.name == plan.project.name => {
                metadata.remote_path = plan.remote_dir.clone();
                metadata
            }
            _ => ProjectMetadata::new(plan.project.name.as_str(), plan.remote_dir.as_str()),
        };
        if synced {
            metadata.touch_synced();
        }
        self.store.save_metadata(&metadata)?;
        Ok(())
    }

    fn touch_synced(&self, plan: &SyncPlan) -> GraftResult<()> {
        let existing = self.store.load_metadata()?;
        self.record_metadata(existing, plan, true)
    }
}
