//! Path translation for the rsync tool's view of the filesystem
//!
//! A Windows rsync is a Cygwin or MSYS build, or runs inside WSL; each sees
//! `C:\work\demo` under a different Unix path. On Unix hosts every path
//! passes through unchanged.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::domain::services::shell_quote;

use super::TransferError;

const CYGWIN_DRIVE_ROOT: &str = "/cygdrive";
const WSL_DRIVE_ROOT: &str = "/mnt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathAdapter {
    /// The tool runs directly on the host. `drive_root` is `/cygdrive` for
    /// Cygwin builds and empty for MSYS2 / Git for Windows (`/c/...`).
    Native { drive_root: String },
    /// The tool runs inside WSL, started through `launcher`
    CompatibilityLayer { launcher: PathBuf },
}

impl Default for PathAdapter {
    fn default() -> Self {
        PathAdapter::Native {
            drive_root: CYGWIN_DRIVE_ROOT.to_string(),
        }
    }
}

impl PathAdapter {
    pub fn cygwin() -> Self {
        Self::default()
    }

    pub fn msys() -> Self {
        PathAdapter::Native {
            drive_root: String::new(),
        }
    }

    pub fn wsl(launcher: impl Into<PathBuf>) -> Self {
        PathAdapter::CompatibilityLayer {
            launcher: launcher.into(),
        }
    }

    /// Pick the native flavour from where the binary is installed.
    pub fn for_native_program(program: &Path) -> Self {
        let lowered = program.to_string_lossy().to_ascii_lowercase();
        if lowered.contains("msys") || lowered.contains("\\git\\") || lowered.contains("/git/") {
            Self::msys()
        } else {
            Self::cygwin()
        }
    }

    fn drive_root(&self) -> &str {
        match self {
            PathAdapter::Native { drive_root } => drive_root,
            PathAdapter::CompatibilityLayer { .. } => WSL_DRIVE_ROOT,
        }
    }

    /// `C:\work\demo` → `/cygdrive/c/work/demo`, `/c/work/demo` or
    /// `/mnt/c/work/demo`. Anything without a drive letter is returned as is.
    pub fn translate(&self, path: &Path) -> String {
        let raw = path.to_string_lossy();
        match split_drive(&raw) {
            Some((drive, rest)) => {
                let rest = rest.replace('\\', "/");
                let rest = rest.trim_start_matches('/');
                let mut out = format!("{}/{}", self.drive_root(), drive.to_ascii_lowercase());
                if !rest.is_empty() {
                    out.push('/');
                    out.push_str(rest);
                }
                out
            }
            None => raw.into_owned(),
        }
    }

    /// Command that runs `program` in the tool's environment.
    pub fn command(&self, program: &Path) -> Command {
        match self {
            PathAdapter::Native { .. } => Command::new(program),
            PathAdapter::CompatibilityLayer { launcher } => {
                let mut cmd = Command::new(launcher);
                cmd.arg(program);
                cmd
            }
        }
    }

    /// Make the SSH key readable by the tool.
    ///
    /// Under WSL the key is copied to `/tmp/graft-key-<pid>` with mode 600,
    /// since OpenSSH rejects keys on the Windows mount as too permissive. The
    /// copy is removed when the returned guard drops.
    pub fn stage_key(&self, key: &Path) -> Result<StagedKey, TransferError> {
        match self {
            PathAdapter::Native { .. } => Ok(StagedKey {
                path: self.translate(key),
                cleanup: None,
            }),
            PathAdapter::CompatibilityLayer { launcher } => {
                let staged = format!("/tmp/graft-key-{}", std::process::id());
                let script = format!(
                    "cp {src} {dst} && chmod 600 {dst}",
                    src = shell_quote(&self.translate(key)),
                    dst = shell_quote(&staged)
                );
                let status = Command::new(launcher)
                    .args(["sh", "-c", &script])
                    .stdin(Stdio::null())
                    .status()
                    .map_err(|e| TransferError::KeyStaging {
                        message: e.to_string(),
                    })?;
                if !status.success() {
                    return Err(TransferError::KeyStaging {
                        message: format!("copying key into WSL exited with {}", status),
                    });
                }
                log::debug!("staged ssh key at {}", staged);
                Ok(StagedKey {
                    path: staged.clone(),
                    cleanup: Some((launcher.clone(), staged)),
                })
            }
        }
    }
}

/// Key path as the tool sees it; removes a staged copy on drop.
#[derive(Debug)]
pub struct StagedKey {
    path: String,
    cleanup: Option<(PathBuf, String)>,
}

impl StagedKey {
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Drop for StagedKey {
    fn drop(&mut self) {
        if let Some((launcher, staged)) = self.cleanup.take() {
            let result = Command::new(&launcher)
                .args(["rm", "-f", &staged])
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            if let Err(e) = result {
                log::warn!("failed to remove staged key {}: {}", staged, e);
            }
        }
    }
}

fn split_drive(raw: &str) -> Option<(char, &str)> {
    let mut chars = raw.chars();
    let drive = chars.next()?;
    if !drive.is_ascii_alphabetic() || chars.next()? != ':' {
        return None;
    }
    let rest = &raw[2..];
    if rest.is_empty() || rest.starts_with('\\') || rest.starts_with('/') {
        Some((drive, rest))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cygwin_translation() {
        let adapter = PathAdapter::cygwin();
        assert_eq!(
            adapter.translate(Path::new(r"C:\work\demo\api")),
            "/cygdrive/c/work/demo/api"
        );
    }

    #[test]
    fn msys_translation() {
        assert_eq!(
            PathAdapter::msys().translate(Path::new(r"D:\src")),
            "/d/src"
        );
    }

    #[test]
    fn wsl_translation() {
        let adapter = PathAdapter::wsl("wsl");
        assert_eq!(
            adapter.translate(Path::new(r"C:\Users\me\.ssh\id_ed25519")),
            "/mnt/c/Users/me/.ssh/id_ed25519"
        );
        assert_eq!(adapter.translate(Path::new("E:/")), "/mnt/e");
    }

    #[test]
    fn unix_paths_are_unchanged() {
        let adapter = PathAdapter::wsl("wsl");
        assert_eq!(adapter.translate(Path::new("/home/me/demo")), "/home/me/demo");
        assert_eq!(
            PathAdapter::cygwin().translate(Path::new("relative/dir")),
            "relative/dir"
        );
    }

    #[test]
    fn drive_relative_paths_are_not_translated() {
        assert_eq!(PathAdapter::cygwin().translate(Path::new("C:foo")), "C:foo");
    }

    #[test]
    fn native_flavour_from_install_location() {
        assert_eq!(
            PathAdapter::for_native_program(Path::new(r"C:\msys64\usr\bin\rsync.exe")),
            PathAdapter::msys()
        );
        assert_eq!(
            PathAdapter::for_native_program(Path::new(r"C:\cygwin64\bin\rsync.exe")),
            PathAdapter::cygwin()
        );
    }

    #[test]
    fn native_key_is_not_copied() {
        let staged = PathAdapter::cygwin()
            .stage_key(Path::new("/home/me/.ssh/id"))
            .unwrap();
        assert_eq!(staged.path(), "/home/me/.ssh/id");
    }

    #[cfg(unix)]
    #[test]
    fn compatibility_layer_stages_and_removes_key() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let log = temp.path().join("launcher.log");
        let launcher = temp.path().join("wsl");
        fs::write(
            &launcher,
            format!("#!/bin/sh\necho \"$@\" >> \"{}\"\n", log.display()),
        )
        .unwrap();
        fs::set_permissions(&launcher, fs::Permissions::from_mode(0o755)).unwrap();

        let adapter = PathAdapter::wsl(&launcher);
        let staged = adapter.stage_key(Path::new(r"C:\keys\id")).unwrap();
        let expected = format!("/tmp/graft-key-{}", std::process::id());
        assert_eq!(staged.path(), expected);
        drop(staged);

        let calls = fs::read_to_string(&log).unwrap();
        let lines: Vec<&str> = calls.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("cp /mnt/c/keys/id"));
        assert!(lines[0].contains("chmod 600"));
        assert_eq!(lines[1], format!("rm -f {}", expected));
    }
}
