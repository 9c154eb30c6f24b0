//! Image processing backend built on the `image` crate, with `webp` for
//! lossy WebP output.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageDecoder::dimensions` + EXIF orientation (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image` crate, then `apply_orientation` |
//! | Background fill | `image::RgbaImage::from_pixel` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Composite | `image::imageops::overlay` (alpha blended over the fill) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality honored) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (lossless) |
//! | Encode → WebP | `webp::Encoder` (lossy, quality honored) |
//!
//! Canvases larger than [`MAX_CANVAS_BYTES`] are refused before allocation,
//! so an oversized target fails that one image instead of the process.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{OutputFormat, Quality, RenderParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{
    DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageFormat, ImageReader, Rgba,
};
use std::io::Cursor;
use std::sync::LazyLock;

/// Largest RGBA canvas the backend will allocate, matching the decoder's
/// default `max_alloc` limit.
pub const MAX_CANVAS_BYTES: u64 = 512 * 1024 * 1024;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| BackendError::Decode(format!("Failed to sniff format: {e}")))
}

/// Whether an EXIF orientation swaps width and height (EXIF values 5-8).
fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

/// Refuse geometry whose RGBA surface would exceed [`MAX_CANVAS_BYTES`].
fn check_canvas_budget(dims: Dimensions) -> Result<(), BackendError> {
    let bytes = u64::from(dims.width) * u64::from(dims.height) * 4;
    if bytes > MAX_CANVAS_BYTES {
        return Err(BackendError::Encode(format!(
            "canvas {dims} needs {bytes} bytes, limit is {MAX_CANVAS_BYTES}"
        )));
    }
    Ok(())
}

/// Encode a finished canvas in the requested format.
fn encode(
    canvas: DynamicImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, BackendError> {
    let (width, height) = (canvas.width(), canvas.height());
    let mut out = Vec::new();

    let result = match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel; the canvas was already filled, so the
            // color channels carry the composited result.
            let rgb = canvas.into_rgb8();
            JpegEncoder::new_with_quality(&mut out, quality.value() as u8).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        OutputFormat::Png => {
            let rgba = canvas.into_rgba8();
            PngEncoder::new(&mut out).write_image(
                rgba.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )
        }
        OutputFormat::Webp => {
            let rgba = canvas.into_rgba8();
            let memory = webp::Encoder::from_rgba(rgba.as_raw(), width, height)
                .encode_simple(false, quality.value() as f32)
                .map_err(|e| BackendError::Encode(format!("webp encode failed: {e:?}")))?;
            return Ok(memory.to_vec());
        }
    };

    result.map_err(|e| BackendError::Encode(format!("{format} encode failed: {e}")))?;
    Ok(out)
}

impl ImageBackend for RustBackend {
    type Bitmap = DynamicImage;

    /// Displayed size: stored size with axes swapped for rotated EXIF
    /// orientations.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let mut decoder = reader(bytes)?
            .into_decoder()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {e}")))?;
        let (width, height) = decoder.dimensions();
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        Ok(if swaps_axes(orientation) {
            Dimensions {
                width: height,
                height: width,
            }
        } else {
            Dimensions { width, height }
        })
    }

    /// Decode and rotate/flip upright per the EXIF orientation.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        let mut decoder = reader(bytes)?
            .into_decoder()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut image =
            DynamicImage::from_decoder(decoder).map_err(|e| BackendError::Decode(e.to_string()))?;
        image.apply_orientation(orientation);
        Ok(image)
    }

    fn dimensions(&self, bitmap: &DynamicImage) -> Dimensions {
        Dimensions {
            width: bitmap.width(),
            height: bitmap.height(),
        }
    }

    fn render(
        &self,
        bitmap: &DynamicImage,
        params: &RenderParams,
    ) -> Result<Vec<u8>, BackendError> {
        let canvas_dims = params.geometry.canvas();
        let drawn = params.geometry.drawn();
        let (x, y) = params.geometry.offset();
        check_canvas_budget(canvas_dims)?;
        check_canvas_budget(drawn)?;

        let mut canvas = image::RgbaImage::from_pixel(
            canvas_dims.width,
            canvas_dims.height,
            Rgba(params.background.0),
        );

        let scaled = if self.dimensions(bitmap) == drawn {
            bitmap.to_rgba8()
        } else {
            bitmap
                .resize_exact(drawn.width, drawn.height, FilterType::Lanczos3)
                .into_rgba8()
        };
        image::imageops::overlay(&mut canvas, &scaled, i64::from(x), i64::from(y));

        encode(DynamicImage::ImageRgba8(canvas), params.format, params.quality)
    }
}
