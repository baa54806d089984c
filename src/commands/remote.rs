//! Handlers for commands that run in the remote project directory

use std::path::Path;

use anyhow::Result;

use graft::application::RemoteOperations;

pub fn cmd_logs(project_root: &Path, service: &str) -> Result<()> {
    let config = super::load_config(project_root)?;
    let executor = super::connect(&config)?;
    RemoteOperations::new(&executor, super::store(project_root), config.deploy.use_sudo)
        .logs(service)?;
    Ok(())
}

pub fn cmd_compose(project_root: &Path, args: &[String]) -> Result<()> {
    let config = super::load_config(project_root)?;
    let executor = super::connect(&config)?;
    RemoteOperations::new(&executor, super::store(project_root), config.deploy.use_sudo)
        .compose(args)?;
    Ok(())
}

pub fn cmd_host_clean(project_root: &Path) -> Result<()> {
    let config = super::load_config(project_root)?;
    let executor = super::connect(&config)?;
    let warnings =
        RemoteOperations::new(&executor, super::store(project_root), config.deploy.use_sudo)
            .host_clean();

    if warnings.is_empty() {
        println!("Host cleaned");
    } else {
        println!("Host cleaned with {} warning(s)", warnings.len());
        for warning in warnings {
            eprintln!("warning: {}", warning);
        }
    }
    Ok(())
}
