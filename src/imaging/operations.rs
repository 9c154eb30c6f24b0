//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::resolve_geometry;
use super::params::{Background, OutputFormat, Quality, RenderParams, ResizeMode, TargetGeometry};
use crate::naming::output_filename;
use crate::types::{OutputArtifact, SourceImage};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, source: &SourceImage) -> Result<Dimensions> {
    backend.identify(&source.content)
}

/// Everything needed to transform one image, independent of the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformConfig {
    pub mode: ResizeMode,
    pub background: Background,
    pub format: OutputFormat,
    pub quality: Quality,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            mode: ResizeMode::Percentage {
                percent: Some(100.0),
            },
            background: Background::WHITE,
            format: OutputFormat::Jpeg,
            quality: Quality::default(),
        }
    }
}

/// Plan a render without executing it.
///
/// Useful for dry runs and for testing parameter generation.
pub fn plan_render(original: Dimensions, config: &TransformConfig) -> RenderParams {
    RenderParams {
        geometry: resolve_geometry(original, &config.mode),
        background: config.background,
        format: config.format,
        quality: config.quality,
    }
}

/// A transformed image together with what was done to it.
#[derive(Debug, Clone)]
pub struct TransformedImage {
    pub artifact: OutputArtifact,
    pub original: Dimensions,
    pub geometry: TargetGeometry,
}

/// Decode, resize, composite and encode one source image.
///
/// The decoded bitmap lives only for the duration of this call.
pub fn transform_image<B: ImageBackend>(
    backend: &B,
    source: &SourceImage,
    config: &TransformConfig,
) -> Result<TransformedImage> {
    let bitmap = backend.decode(&source.content)?;
    let original = backend.dimensions(&bitmap);
    let params = plan_render(original, config);

    tracing::debug!(
        source = %source.name,
        source_bytes = source.byte_size(),
        %original,
        canvas = %params.geometry.canvas(),
        drawn = %params.geometry.drawn(),
        quality = ?config.format.is_lossy().then_some(config.quality.value()),
        "resolved geometry"
    );

    let bytes = backend.render(&bitmap, &params)?;
    drop(bitmap);

    Ok(TransformedImage {
        artifact: OutputArtifact {
            filename: output_filename(&source.name, config.format),
            bytes,
            mime_type: config.format.mime_type(),
        },
        original,
        geometry: params.geometry,
    })
}
