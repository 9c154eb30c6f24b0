//! Pure calculation functions for output geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! [`resolve_geometry`] is the single entry point: it maps the natural size of
//! a source image and the active [`ResizeMode`] to the canvas the pipeline
//! allocates and the rectangle the source is drawn into.

use super::backend::Dimensions;
use super::params::{ResizeMode, TargetGeometry};

/// Fixed scale used by the target-file-size mode.
///
/// There is no search against the encoded byte size; every image is simply
/// scaled to 80% on both axes.
pub const FILE_SIZE_SCALE: f64 = 0.8;

/// Round a pixel length to the nearest integer, half away from zero.
///
/// Never returns 0: a dependent side that collapses (e.g. a 1x4000 strip
/// scaled to width 1) still gets one pixel so a surface can be allocated.
fn round_px(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Scale both sides by the same factor.
fn scale_by(original: Dimensions, scale: f64) -> Dimensions {
    Dimensions {
        width: round_px(original.width as f64 * scale),
        height: round_px(original.height as f64 * scale),
    }
}

/// Treat zero as "not given", the same way an empty input field would be.
fn given(value: Option<u32>) -> Option<u32> {
    value.filter(|&v| v > 0)
}

/// Resolve the target geometry for one image.
///
/// Infallible: every mode has a defined fallback, and missing parameters
/// resolve to the original dimensions.
///
/// # Examples
/// ```
/// # use bulk_resize::imaging::{Dimensions, ResizeMode, TargetGeometry, resolve_geometry};
/// let original = Dimensions { width: 800, height: 600 };
/// let geometry = resolve_geometry(original, &ResizeMode::Percentage { percent: Some(50.0) });
/// assert_eq!(geometry, TargetGeometry::simple(400, 300));
/// ```
pub fn resolve_geometry(original: Dimensions, mode: &ResizeMode) -> TargetGeometry {
    match *mode {
        ResizeMode::Percentage { percent } => {
            let percent = percent.filter(|p| p.is_finite() && *p > 0.0).unwrap_or(100.0);
            scale_by(original, percent / 100.0).into()
        }
        ResizeMode::TargetFileSize { .. } => scale_by(original, FILE_SIZE_SCALE).into(),
        ResizeMode::ExactDimensions { width, height, pad } => {
            exact_geometry(original, given(width), given(height), pad)
        }
        ResizeMode::FixedWidth { width } => match given(width) {
            Some(width) => {
                let ratio = original.height as f64 / original.width as f64;
                TargetGeometry::simple(width, round_px(width as f64 * ratio))
            }
            None => original.into(),
        },
        ResizeMode::FixedHeight { height } => match given(height) {
            Some(height) => {
                let ratio = original.width as f64 / original.height as f64;
                TargetGeometry::simple(round_px(height as f64 * ratio), height)
            }
            None => original.into(),
        },
        ResizeMode::LongestSide { max } => match given(max) {
            Some(max) => longest_side_dimensions(original, max).into(),
            None => original.into(),
        },
    }
}

/// Exact target box, either stretched or letterboxed.
fn exact_geometry(
    original: Dimensions,
    width: Option<u32>,
    height: Option<u32>,
    pad: bool,
) -> TargetGeometry {
    if width.is_none() && height.is_none() {
        return original.into();
    }

    let canvas = Dimensions {
        width: width.unwrap_or(original.width),
        height: height.unwrap_or(original.height),
    };

    if !pad {
        return canvas.into();
    }

    let (drawn, offset) = calculate_letterbox(original, canvas);
    TargetGeometry::Padded {
        canvas,
        drawn,
        offset,
    }
}

/// Calculate the uniform-scale placement of `source` inside `canvas`.
///
/// Returns the drawn size and the `(x, y)` offset that centers it. The scale
/// is `min(canvas_w / source_w, canvas_h / source_h)`, so one side matches the
/// canvas exactly and the other leaves an even border.
///
/// # Returns
/// * `(drawn, (offset_x, offset_y))`
pub fn calculate_letterbox(source: Dimensions, canvas: Dimensions) -> (Dimensions, (u32, u32)) {
    let scale_x = canvas.width as f64 / source.width as f64;
    let scale_y = canvas.height as f64 / source.height as f64;
    let scale = scale_x.min(scale_y);

    // The winning axis must land exactly on the canvas edge; rounding the
    // product can otherwise overshoot by one pixel.
    let drawn = Dimensions {
        width: round_px(source.width as f64 * scale).min(canvas.width),
        height: round_px(source.height as f64 * scale).min(canvas.height),
    };

    let offset_x = ((canvas.width - drawn.width) as f64 / 2.0).round() as u32;
    let offset_y = ((canvas.height - drawn.height) as f64 / 2.0).round() as u32;

    (drawn, (offset_x, offset_y))
}

/// Scale so the longer side of `original` becomes `max`.
///
/// A square source takes the height branch, which yields `max x max` either
/// way.
fn longest_side_dimensions(original: Dimensions, max: u32) -> Dimensions {
    if original.width > original.height {
        let ratio = original.height as f64 / original.width as f64;
        Dimensions {
            width: max,
            height: round_px(max as f64 * ratio),
        }
    } else {
        let ratio = original.width as f64 / original.height as f64;
        Dimensions {
            width: round_px(max as f64 * ratio),
            height: max,
        }
    }
}
