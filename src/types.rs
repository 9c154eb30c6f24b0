//! Shared types passed between the sources, pipeline and archive stages.

use serde::Serialize;
use std::path::Path;

/// Raw bytes of one input image plus the name it was supplied under.
///
/// Read-only through the pipeline; dropped once its artifact (or failure)
/// has been recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// File name including extension, e.g. `IMG_0001.PNG`.
    pub name: String,
    pub content: Vec<u8>,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Read a file into memory, naming it after the path's final component.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(Self { name, content })
    }

    pub fn byte_size(&self) -> usize {
        self.content.len()
    }
}

/// One encoded output image, ready to be archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

/// Summary of one artifact for the JSON batch report (no pixel data).
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub index: usize,
    pub source: String,
    pub filename: String,
    pub mime_type: &'static str,
    pub original: crate::imaging::Dimensions,
    pub geometry: crate::imaging::TargetGeometry,
    pub bytes: usize,
}
