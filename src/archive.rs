//! Packaging of artifacts into a single downloadable archive.
//!
//! The archive is a gzip-compressed tar file. Entries are written in the order
//! given, one per artifact, each named exactly as the artifact's filename.
//! Headers carry fixed metadata (mode `0644`, mtime 0, no owner) so the same
//! artifacts always produce the same bytes.
//!
//! Duplicate filenames are written as separate entries; most extractors keep
//! the last one.

use crate::types::OutputArtifact;
use flate2::{Compression, write::GzEncoder};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default file name of the packaged archive.
pub const ARCHIVE_NAME: &str = "resized-images.tar.gz";

#[derive(Error, Debug)]
pub enum PackagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot archive {name:?}: {source}")]
    Entry {
        name: String,
        source: std::io::Error,
    },
}

/// Package artifacts into an in-memory `.tar.gz`.
///
/// An empty slice produces a valid, empty archive.
pub fn package(artifacts: &[OutputArtifact]) -> Result<Vec<u8>, PackagingError> {
    package_iter(artifacts.iter())
}

/// Same as [`package`], for borrowed artifacts.
pub fn package_iter<'a>(
    artifacts: impl IntoIterator<Item = &'a OutputArtifact>,
) -> Result<Vec<u8>, PackagingError> {
    let mut tar = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    for artifact in artifacts {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(artifact.bytes.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        tar.append_data(&mut header, &artifact.filename, artifact.bytes.as_slice())
            .map_err(|source| PackagingError::Entry {
                name: artifact.filename.clone(),
                source,
            })?;
    }

    let bytes = tar.into_inner()?.finish()?;
    tracing::debug!(bytes = bytes.len(), "archive packaged");
    Ok(bytes)
}

/// Write an archive to disk.
///
/// If `dest` is an existing directory the archive is written inside it as
/// [`ARCHIVE_NAME`]; otherwise `dest` is the archive path itself. Missing
/// parent directories are created. Returns the path written.
pub fn write_archive<'a>(
    artifacts: impl IntoIterator<Item = &'a OutputArtifact>,
    dest: &Path,
) -> Result<PathBuf, PackagingError> {
    let path = if dest.is_dir() {
        dest.join(ARCHIVE_NAME)
    } else {
        dest.to_path_buf()
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let bytes = package_iter(artifacts)?;
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), "archive written");
    Ok(path)
}
