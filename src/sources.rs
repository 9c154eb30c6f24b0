//! Input collection.
//!
//! Turns command-line paths into an ordered list of [`SourceImage`]s:
//!
//! - A **file** is taken as given, whatever its extension. If it is not an
//!   image the pipeline reports it as a per-file failure.
//! - A **directory** contributes every non-hidden file with a supported image
//!   extension (case-insensitive), sorted by name. Subdirectories are only
//!   walked with `recursive = true`; their files are named by their path
//!   relative to the directory given.
//!
//! Inputs keep the order they were given in. The batch size is checked
//! against `max_files` before anything is read into memory.

use crate::config::SourcesConfig;
use crate::imaging::supported_input_extensions;
use crate::types::SourceImage;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
    #[error("Too many files: {count} selected, at most {max} allowed")]
    TooManyFiles { count: usize, max: usize },
}

/// A file selected for processing, before its bytes are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    /// Name used for the artifact, e.g. `IMG_0001.PNG` or `2024/a.jpg`.
    pub name: String,
}

/// Resolve inputs to the ordered list of files that would be processed.
pub fn list_sources(
    inputs: &[PathBuf],
    limits: &SourcesConfig,
) -> Result<Vec<SourceEntry>, SourceError> {
    let mut entries = Vec::new();

    for input in inputs {
        if input.is_dir() {
            entries.extend(walk_directory(input, limits.recursive)?);
        } else if input.is_file() {
            entries.push(SourceEntry {
                path: input.clone(),
                name: file_name(input),
            });
        } else {
            return Err(SourceError::NotFound(input.clone()));
        }
    }

    if entries.len() > limits.max_files {
        return Err(SourceError::TooManyFiles {
            count: entries.len(),
            max: limits.max_files,
        });
    }

    tracing::debug!(count = entries.len(), "sources listed");
    Ok(entries)
}

/// Resolve inputs and read every selected file into memory.
///
/// No inputs (or only empty directories) is an empty batch, not an error.
pub fn collect_sources(
    inputs: &[PathBuf],
    limits: &SourcesConfig,
) -> Result<Vec<SourceImage>, SourceError> {
    list_sources(inputs, limits)?
        .into_iter()
        .map(|entry| {
            let mut source = SourceImage::from_path(&entry.path)?;
            source.name = entry.name;
            Ok(source)
        })
        .collect()
}

fn walk_directory(dir: &Path, recursive: bool) -> Result<Vec<SourceEntry>, SourceError> {
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        let name = entry
            .path()
            .strip_prefix(dir)
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_else(|_| file_name(entry.path()));
        entries.push(SourceEntry {
            path: entry.into_path(),
            name,
        });
    }
    Ok(entries)
}

fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    supported_input_extensions().contains(&ext.as_str())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
