//! Transfer backend detection
//!
//! Resolved once per invocation: an rsync binary when one can be found,
//! otherwise the archive path.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::RsyncTool;

/// Install locations probed after `PATH`
const KNOWN_LOCATIONS: &[&str] = &[
    "/usr/bin/rsync",
    "/usr/local/bin/rsync",
    "/opt/homebrew/bin/rsync",
    r"C:\cygwin64\bin\rsync.exe",
    r"C:\cygwin\bin\rsync.exe",
    r"C:\msys64\usr\bin\rsync.exe",
    r"C:\Program Files\Git\usr\bin\rsync.exe",
    r"C:\ProgramData\chocolatey\bin\rsync.exe",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferBackend {
    /// rsync mirror, falling back to the archive if it vanishes at spawn time
    Incremental(RsyncTool),
    /// tar.gz upload and remote extract
    Archive,
}

impl TransferBackend {
    pub fn detect() -> Self {
        RsyncLocator::from_env().detect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransferBackend::Incremental(_) => "rsync",
            TransferBackend::Archive => "archive",
        }
    }
}

/// Where to look for rsync
#[derive(Debug, Clone)]
pub struct RsyncLocator {
    path_var: Option<OsString>,
    candidates: Vec<PathBuf>,
    compat_launcher: Option<PathBuf>,
}

impl RsyncLocator {
    pub fn from_env() -> Self {
        let mut candidates: Vec<PathBuf> = KNOWN_LOCATIONS.iter().map(PathBuf::from).collect();
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join("scoop").join("shims").join("rsync.exe"));
        }
        Self {
            path_var: std::env::var_os("PATH"),
            candidates,
            compat_launcher: cfg!(windows).then(|| PathBuf::from("wsl")),
        }
    }

    pub fn new(path_var: Option<OsString>, candidates: Vec<PathBuf>) -> Self {
        Self {
            path_var,
            candidates,
            compat_launcher: None,
        }
    }

    pub fn with_compat_launcher(mut self, launcher: impl Into<PathBuf>) -> Self {
        self.compat_launcher = Some(launcher.into());
        self
    }

    pub fn detect(&self) -> TransferBackend {
        match self.locate() {
            Some(tool) => {
                log::debug!("using rsync at {}", tool.program().display());
                TransferBackend::Incremental(tool)
            }
            None => {
                log::info!("rsync not found, source trees will be uploaded as archives");
                TransferBackend::Archive
            }
        }
    }

    pub fn locate(&self) -> Option<RsyncTool> {
        self.on_path()
            .or_else(|| self.candidates.iter().find(|c| c.is_file()).cloned())
            .map(RsyncTool::native)
            .or_else(|| self.in_compat_layer())
    }

    fn on_path(&self) -> Option<PathBuf> {
        let path_var = self.path_var.as_ref()?;
        std::env::split_paths(path_var).find_map(|dir| {
            ["rsync", "rsync.exe"]
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.is_file())
        })
    }

    fn in_compat_layer(&self) -> Option<RsyncTool> {
        let launcher = self.compat_launcher.as_ref()?;
        let available = Command::new(launcher)
            .args(["rsync", "--version"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        available.then(|| RsyncTool::compatibility_layer(launcher.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_rsync_on_path() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("rsync"), "").unwrap();

        let locator = RsyncLocator::new(Some(dir.path().as_os_str().to_owned()), Vec::new());
        let tool = locator.locate().unwrap();
        assert_eq!(tool.program(), dir.path().join("rsync"));
    }

    #[test]
    fn falls_back_to_known_location() {
        let dir = tempdir().unwrap();
        let installed = dir.path().join("opt/rsync");
        fs::create_dir_all(installed.parent().unwrap()).unwrap();
        fs::write(&installed, "").unwrap();

        let locator = RsyncLocator::new(None, vec![dir.path().join("missing"), installed.clone()]);
        assert_eq!(
            locator.detect(),
            TransferBackend::Incremental(RsyncTool::native(installed))
        );
    }

    #[test]
    fn nothing_found_means_archive() {
        let dir = tempdir().unwrap();
        let locator = RsyncLocator::new(Some(dir.path().as_os_str().to_owned()), Vec::new());
        assert_eq!(locator.detect(), TransferBackend::Archive);
        assert_eq!(locator.detect().name(), "archive");
    }

    #[cfg(unix)]
    #[test]
    fn compat_layer_is_probed_last() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let launcher = dir.path().join("wsl");
        fs::write(&launcher, "#!/bin/sh\n[ \"$1\" = rsync ] && exit 0\nexit 1\n").unwrap();
        fs::set_permissions(&launcher, fs::Permissions::from_mode(0o755)).unwrap();

        let locator = RsyncLocator::new(None, Vec::new()).with_compat_launcher(&launcher);
        assert_eq!(
            locator.detect(),
            TransferBackend::Incremental(RsyncTool::compatibility_layer(launcher))
        );
    }

    #[test]
    fn missing_launcher_is_not_an_error() {
        let locator = RsyncLocator::new(None, Vec::new())
            .with_compat_launcher("/nonexistent/graft-test/wsl");
        assert_eq!(locator.detect(), TransferBackend::Archive);
    }
}
