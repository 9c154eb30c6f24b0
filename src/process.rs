//! Batch transform pipeline.
//!
//! Takes the collected [`SourceImage`]s and the run's [`TransformConfig`] and
//! produces one [`OutputArtifact`] per successfully transformed image.
//!
//! ## Ordering
//!
//! Artifacts come out in input order regardless of how many workers ran.
//! Parallel runs use an indexed rayon iterator, whose `collect` keeps
//! positions stable.
//!
//! ## Failures
//!
//! A source that cannot be decoded or encoded is handled per
//! [`ErrorPolicy`]:
//!
//! - **Skip**: the failure is recorded in [`BatchOutcome::failures`] and the
//!   rest of the batch continues.
//! - **Abort**: the batch stops and [`ProcessError::Aborted`] names the first
//!   failing source in input order. Nothing is returned for packaging.
//!
//! ## Progress
//!
//! When a sender is supplied, one [`ProcessEvent`] is emitted per source as
//! soon as it finishes. In parallel runs events arrive in completion order;
//! each carries the input index.

use crate::config::ErrorPolicy;
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, RustBackend, TargetGeometry, TransformConfig,
    TransformedImage, get_dimensions, plan_render, transform_image,
};
use crate::naming::output_filename;
use crate::types::{ArtifactSummary, OutputArtifact, SourceImage};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Batch aborted at #{index} ({name}): {source}")]
    Aborted {
        index: usize,
        name: String,
        source: BackendError,
    },
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// How a batch is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub on_error: ErrorPolicy,
    /// Worker count; 1 runs on the calling thread.
    pub threads: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::Skip,
            threads: 1,
        }
    }
}

/// Progress event emitted once per source image.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    ImageProcessed {
        /// 0-based position in the input.
        index: usize,
        name: String,
        original: Dimensions,
        canvas: Dimensions,
        filename: String,
        bytes: usize,
    },
    ImageFailed {
        index: usize,
        name: String,
        error: String,
    },
}

/// A source that was left out of the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub index: usize,
    pub name: String,
    pub error: String,
}

/// One successfully transformed source.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub index: usize,
    pub source: String,
    pub result: TransformedImage,
}

/// Result of a completed batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Successes, in input order.
    pub images: Vec<ProcessedImage>,
    /// Skipped sources, in input order.
    pub failures: Vec<FileFailure>,
}

impl BatchOutcome {
    pub fn artifacts(&self) -> Vec<&OutputArtifact> {
        self.images.iter().map(|img| &img.result.artifact).collect()
    }

    pub fn into_artifacts(self) -> Vec<OutputArtifact> {
        self.images
            .into_iter()
            .map(|img| img.result.artifact)
            .collect()
    }

    /// Per-artifact report rows, without pixel data.
    pub fn summaries(&self) -> Vec<ArtifactSummary> {
        self.images
            .iter()
            .map(|img| ArtifactSummary {
                index: img.index,
                source: img.source.clone(),
                filename: img.result.artifact.filename.clone(),
                mime_type: img.result.artifact.mime_type,
                original: img.original(),
                geometry: img.result.geometry,
                bytes: img.result.artifact.bytes.len(),
            })
            .collect()
    }

    pub fn total_bytes(&self) -> usize {
        self.images
            .iter()
            .map(|img| img.result.artifact.bytes.len())
            .sum()
    }
}

impl ProcessedImage {
    pub fn original(&self) -> Dimensions {
        self.result.original
    }
}

/// Transform a batch with the production backend.
pub fn process(
    sources: &[SourceImage],
    config: &TransformConfig,
    options: &BatchOptions,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<BatchOutcome, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(&backend, sources, config, options, progress)
}

/// Transform a batch using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    sources: &[SourceImage],
    config: &TransformConfig,
    options: &BatchOptions,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<BatchOutcome, ProcessError> {
    tracing::info!(
        images = sources.len(),
        threads = options.threads,
        policy = ?options.on_error,
        "processing batch"
    );

    let results = if options.threads > 1 && sources.len() > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()?;
        pool.install(|| {
            sources
                .par_iter()
                .enumerate()
                .map(|(index, source)| run_one(backend, index, source, config, progress.as_ref()))
                .collect::<Vec<_>>()
        })
    } else {
        let mut results = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            let result = run_one(backend, index, source, config, progress.as_ref());
            let failed = result.is_err();
            results.push(result);
            if failed && options.on_error == ErrorPolicy::Abort {
                break;
            }
        }
        results
    };

    collect_outcome(sources, results, options.on_error)
}

fn run_one(
    backend: &impl ImageBackend,
    index: usize,
    source: &SourceImage,
    config: &TransformConfig,
    progress: Option<&Sender<ProcessEvent>>,
) -> Result<TransformedImage, BackendError> {
    let result = transform_image(backend, source, config);

    let event = match &result {
        Ok(image) => ProcessEvent::ImageProcessed {
            index,
            name: source.name.clone(),
            original: image.original,
            canvas: image.geometry.canvas(),
            filename: image.artifact.filename.clone(),
            bytes: image.artifact.bytes.len(),
        },
        Err(e) => {
            tracing::warn!(source = %source.name, error = %e, "image failed");
            ProcessEvent::ImageFailed {
                index,
                name: source.name.clone(),
                error: e.to_string(),
            }
        }
    };
    if let Some(tx) = progress {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(event);
    }

    result
}

fn collect_outcome(
    sources: &[SourceImage],
    results: Vec<Result<TransformedImage, BackendError>>,
    policy: ErrorPolicy,
) -> Result<BatchOutcome, ProcessError> {
    let mut outcome = BatchOutcome::default();

    for (index, result) in results.into_iter().enumerate() {
        let name = sources[index].name.clone();
        match result {
            Ok(image) => outcome.images.push(ProcessedImage {
                index,
                source: name,
                result: image,
            }),
            Err(source) if policy == ErrorPolicy::Abort => {
                return Err(ProcessError::Aborted {
                    index,
                    name,
                    source,
                });
            }
            Err(e) => outcome.failures.push(FileFailure {
                index,
                name,
                error: e.to_string(),
            }),
        }
    }

    tracing::info!(
        artifacts = outcome.images.len(),
        failures = outcome.failures.len(),
        "batch complete"
    );
    Ok(outcome)
}

/// Dry-run result for one source: what would be produced, read from the
/// image header only.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanEntry {
    Ready {
        index: usize,
        name: String,
        filename: String,
        original: Dimensions,
        geometry: TargetGeometry,
    },
    Unreadable {
        index: usize,
        name: String,
        error: String,
    },
}

/// Plan a batch with the production backend.
pub fn plan(sources: &[SourceImage], config: &TransformConfig) -> Vec<PlanEntry> {
    plan_with_backend(&RustBackend::new(), sources, config)
}

/// Resolve every source's geometry without decoding pixels or encoding.
pub fn plan_with_backend(
    backend: &impl ImageBackend,
    sources: &[SourceImage],
    config: &TransformConfig,
) -> Vec<PlanEntry> {
    sources
        .iter()
        .enumerate()
        .map(|(index, source)| match get_dimensions(backend, source) {
            Ok(original) => PlanEntry::Ready {
                index,
                name: source.name.clone(),
                filename: output_filename(&source.name, config.format),
                original,
                geometry: plan_render(original, config).geometry,
            },
            Err(e) => PlanEntry::Unreadable {
                index,
                name: source.name.clone(),
                error: e.to_string(),
            },
        })
        .collect()
}
