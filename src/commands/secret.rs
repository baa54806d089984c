//! Secret command handler

use std::path::Path;

use anyhow::Result;

use graft::application::set_secret;

pub fn cmd_secret_set(project_root: &Path, key: &str, value: &str) -> Result<()> {
    let store = super::store(project_root);
    set_secret(&store, key, value)?;
    println!("Stored {} in {}", key, store.secrets_path().display());
    Ok(())
}
