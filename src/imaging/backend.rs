//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: identify, decode, and render (draw + encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust, built on the
//! `image` crate. Tests use a recording mock so pipeline logic can be checked
//! without real codecs.

use super::params::RenderParams;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Pixel size of an image or canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// A decoded bitmap is owned by the caller and dropped when the caller is done
/// with it, so at most one decoded image per worker is alive at a time.
pub trait ImageBackend: Sync {
    /// Decoded, addressable image.
    type Bitmap;

    /// Read image dimensions from the header without decoding pixels.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode source bytes into a bitmap.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Bitmap, BackendError>;

    /// Natural dimensions of a decoded bitmap.
    fn dimensions(&self, bitmap: &Self::Bitmap) -> Dimensions;

    /// Fill a fresh canvas, draw the bitmap per the geometry, and encode it.
    fn render(
        &self,
        bitmap: &Self::Bitmap,
        params: &RenderParams,
    ) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{Background, OutputFormat, Quality, TargetGeometry};
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    ///
    /// "Images" are the UTF-8 text `"<width>x<height>"`; anything else fails to
    /// decode. Rendering returns the canvas size as text, or fails for any
    /// format listed in `failing_formats`.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub failing_formats: Vec<OutputFormat>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(Dimensions),
        Decode(Dimensions),
        Render {
            source: Dimensions,
            geometry: TargetGeometry,
            background: [u8; 4],
            format: OutputFormat,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(format: OutputFormat) -> Self {
            Self {
                failing_formats: vec![format],
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    /// Bytes the mock decodes as an image of the given size.
    pub fn mock_image(width: u32, height: u32) -> Vec<u8> {
        format!("{width}x{height}").into_bytes()
    }

    fn parse_mock(bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| BackendError::Decode("not a mock image".to_string()))?;
        let (w, h) = text
            .split_once('x')
            .ok_or_else(|| BackendError::Decode(format!("not a mock image: {text:?}")))?;
        match (w.parse(), h.parse()) {
            (Ok(width), Ok(height)) => Ok(Dimensions { width, height }),
            _ => Err(BackendError::Decode(format!("not a mock image: {text:?}"))),
        }
    }

    impl ImageBackend for MockBackend {
        type Bitmap = Dimensions;

        fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
            let dims = parse_mock(bytes)?;
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(dims));
            Ok(dims)
        }

        fn decode(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
            let dims = parse_mock(bytes)?;
            self.operations.lock().unwrap().push(RecordedOp::Decode(dims));
            Ok(dims)
        }

        fn dimensions(&self, bitmap: &Dimensions) -> Dimensions {
            *bitmap
        }

        fn render(
            &self,
            bitmap: &Dimensions,
            params: &RenderParams,
        ) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Render {
                source: *bitmap,
                geometry: params.geometry,
                background: params.background.0,
                format: params.format,
                quality: params.quality.value(),
            });
            if self.failing_formats.contains(&params.format) {
                return Err(BackendError::Encode(format!(
                    "mock cannot encode {}",
                    params.format
                )));
            }
            Ok(params.geometry.canvas().to_string().into_bytes())
        }
    }

    #[test]
    fn mock_decodes_dimension_text() {
        let backend = MockBackend::new();
        let dims = backend.decode(&mock_image(800, 600)).unwrap();
        assert_eq!(
            dims,
            Dimensions {
                width: 800,
                height: 600
            }
        );

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Decode(d) if d.width == 800));
    }

    #[test]
    fn mock_rejects_other_bytes() {
        let backend = MockBackend::new();
        let result = backend.decode(b"\x89PNG garbage");
        assert!(matches!(result, Err(BackendError::Decode(_))));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn mock_records_render() {
        let backend = MockBackend::new();
        let bitmap = backend.decode(&mock_image(800, 600)).unwrap();

        let out = backend
            .render(
                &bitmap,
                &RenderParams {
                    geometry: TargetGeometry::simple(400, 300),
                    background: Background::WHITE,
                    format: OutputFormat::Png,
                    quality: Quality::new(90),
                },
            )
            .unwrap();
        assert_eq!(out, b"400x300");

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            &ops[1],
            RecordedOp::Render {
                format: OutputFormat::Png,
                quality: 90,
                ..
            }
        ));
    }

    #[test]
    fn mock_fails_configured_format() {
        let backend = MockBackend::failing_on(OutputFormat::Webp);
        let bitmap = backend.decode(&mock_image(10, 10)).unwrap();
        let result = backend.render(
            &bitmap,
            &RenderParams {
                geometry: TargetGeometry::simple(10, 10),
                background: Background::WHITE,
                format: OutputFormat::Webp,
                quality: Quality::default(),
            },
        );
        assert!(matches!(result, Err(BackendError::Encode(_))));
    }

    #[test]
    fn dimensions_display() {
        let d = Dimensions {
            width: 1920,
            height: 1080,
        };
        assert_eq!(d.to_string(), "1920x1080");
    }
}
