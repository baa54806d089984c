//! Archive fallback
//!
//! Packs a build context into a gzip'd tarball, honouring the same exclusion
//! set as the rsync path, and builds the remote extract command.

use std::fs::File;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::domain::services::shell_quote;
use crate::domain::value_objects::IgnorePatterns;

use super::{TransferError, TransferMode};

/// A packed context; the file is deleted when this drops.
#[derive(Debug)]
pub struct PackedArchive {
    pub file: NamedTempFile,
    pub entries: usize,
}

impl PackedArchive {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Pack `root` into a temp file under `scratch_dir` (the system temp dir
/// when `None`). Entries are stored relative to `root`, in sorted order.
pub fn build_archive(
    service: &str,
    root: &Path,
    ignore: &IgnorePatterns,
    scratch_dir: Option<&Path>,
) -> Result<PackedArchive, TransferError> {
    let archive_err = |message: String| TransferError::Archive {
        service: service.to_string(),
        message,
    };

    let file = match scratch_dir {
        Some(dir) => tempfile::Builder::new()
            .prefix("graft-")
            .suffix(".tar.gz")
            .tempfile_in(dir),
        None => tempfile::Builder::new()
            .prefix("graft-")
            .suffix(".tar.gz")
            .tempfile(),
    }
    .map_err(|e| archive_err(format!("cannot create temp archive: {}", e)))?;

    let handle = file
        .reopen()
        .map_err(|e| archive_err(format!("cannot open temp archive: {}", e)))?;
    let encoder = GzEncoder::new(handle, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    let mut entries = 0;
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| match entry.path().strip_prefix(root) {
            Ok(rel) => !ignore.is_excluded(rel, entry.file_type().is_dir()),
            Err(_) => false,
        });

    for entry in walker {
        let entry = entry.map_err(|e| archive_err(e.to_string()))?;
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| archive_err(e.to_string()))?;

        if entry.file_type().is_dir() {
            builder
                .append_dir(rel, entry.path())
                .map_err(|e| archive_err(format!("{}: {}", rel.display(), e)))?;
        } else {
            builder
                .append_path_with_name(entry.path(), rel)
                .map_err(|e| archive_err(format!("{}: {}", rel.display(), e)))?;
        }
        entries += 1;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| archive_err(format!("cannot finish tar stream: {}", e)))?;
    let handle: File = encoder
        .finish()
        .map_err(|e| archive_err(format!("cannot finish gzip stream: {}", e)))?;
    handle
        .sync_all()
        .map_err(|e| archive_err(format!("cannot flush archive: {}", e)))?;

    log::debug!("packed {} entries from {}", entries, root.display());
    Ok(PackedArchive { file, entries })
}

/// Shell command that unpacks `tarball` into `service_dir` and removes it.
///
/// `Replace` wipes the directory first so files deleted locally disappear;
/// `Additive` only creates what is missing.
pub fn extract_command(mode: TransferMode, service_dir: &str, tarball: &str) -> String {
    let dir = shell_quote(service_dir);
    let tarball = shell_quote(tarball);
    let unpack = format!(
        "mkdir -p {dir} && tar -xzf {tarball} -C {dir} && rm -f {tarball}",
        dir = dir,
        tarball = tarball
    );
    match mode {
        TransferMode::Replace => format!("rm -rf {} && {}", dir, unpack),
        TransferMode::Additive => unpack,
    }
}
