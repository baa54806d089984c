//! Projects command handler
//!
//! Lists projects recorded in the local registry (`~/.graft/projects.json`).

use std::path::Path;

use anyhow::Result;

use graft::application::list_projects;

pub fn cmd_projects() -> Result<()> {
    let store = super::store(Path::new("."));
    let projects = list_projects(&store)?;

    if projects.is_empty() {
        println!("No projects in {}", store.registry_path().display());
        return Ok(());
    }

    let width = projects.iter().map(|p| p.name.len()).max().unwrap_or(0);
    for project in &projects {
        let marker = if project.present { "" } else { "  (missing)" };
        println!(
            "{:width$}  {}{}",
            project.name,
            project.path.display(),
            marker,
            width = width
        );
    }
    Ok(())
}
