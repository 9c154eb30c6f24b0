//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what each output looks like) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing operation logic.
//!
//! ## Types
//!
//! - [`ResizeMode`]: The six resize strategies, each carrying only its own parameters.
//! - [`TargetGeometry`]: Canvas size plus where the source lands on it.
//! - [`Quality`]: Lossy encoding quality (1–100, default 75). Clamped on construction.
//! - [`OutputFormat`]: JPEG, PNG or WebP, with MIME type and file extension.
//! - [`Background`]: RGBA fill color parsed from a hex string.
//! - [`RenderParams`]: Everything one render needs: geometry, fill, format, quality.

use super::backend::Dimensions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How to size each output image.
///
/// Parameters are optional: a mode whose parameters are missing resolves to
/// the original dimensions rather than failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeMode {
    /// Scale both sides by `percent / 100`.
    Percentage { percent: Option<f64> },
    /// Approximate a byte budget with a fixed 80% scale. The budget itself is
    /// carried for reporting only.
    TargetFileSize { max_kilobytes: Option<u32> },
    /// Force an exact box, stretching (`pad = false`) or letterboxing
    /// (`pad = true`). A missing side defaults to the original one.
    ExactDimensions {
        width: Option<u32>,
        height: Option<u32>,
        pad: bool,
    },
    /// Set the width, derive the height from the aspect ratio.
    FixedWidth { width: Option<u32> },
    /// Set the height, derive the width from the aspect ratio.
    FixedHeight { height: Option<u32> },
    /// Scale so the longer side equals `max`.
    LongestSide { max: Option<u32> },
}

/// Where and how large the source is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TargetGeometry {
    /// Source stretched over the whole canvas.
    Simple { canvas: Dimensions },
    /// Source drawn at `offset` with size `drawn`; the rest of the canvas
    /// keeps the background fill.
    Padded {
        canvas: Dimensions,
        drawn: Dimensions,
        offset: (u32, u32),
    },
}

impl TargetGeometry {
    pub fn simple(width: u32, height: u32) -> Self {
        Self::Simple {
            canvas: Dimensions { width, height },
        }
    }

    /// Size of the surface to allocate.
    pub fn canvas(&self) -> Dimensions {
        match *self {
            Self::Simple { canvas } | Self::Padded { canvas, .. } => canvas,
        }
    }

    /// Size the source is scaled to.
    pub fn drawn(&self) -> Dimensions {
        match *self {
            Self::Simple { canvas } => canvas,
            Self::Padded { drawn, .. } => drawn,
        }
    }

    /// Top-left corner of the drawn source on the canvas.
    pub fn offset(&self) -> (u32, u32) {
        match *self {
            Self::Simple { .. } => (0, 0),
            Self::Padded { offset, .. } => offset,
        }
    }
}

impl From<Dimensions> for TargetGeometry {
    fn from(canvas: Dimensions) -> Self {
        Self::Simple { canvas }
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    /// Extension appended to output filenames (the format name itself).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Whether the encoder honors [`Quality`].
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg | Self::Webp)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    /// Accepts the format names case-insensitively, plus `jpg`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            _ => Err(format!("unsupported output format: {s:?} (expected jpeg, png or webp)")),
        }
    }
}

/// Canvas fill color as straight RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub [u8; 4]);

impl Background {
    pub const WHITE: Self = Self([255, 255, 255, 255]);

    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn parse(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if !digits.is_ascii() {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok();
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

        let rgba = match digits.len() {
            3 | 4 => {
                let mut out = [255u8; 4];
                for (i, slot) in out.iter_mut().take(digits.len()).enumerate() {
                    *slot = nibble(i)? * 17;
                }
                out
            }
            6 | 8 => {
                let mut out = [255u8; 4];
                for (i, slot) in out.iter_mut().take(digits.len() / 2).enumerate() {
                    *slot = byte(i * 2)?;
                }
                out
            }
            _ => return None,
        };
        Some(Self(rgba))
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Background {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid hex color: {s:?}"))
    }
}

/// Parameters for rendering one decoded image onto a fresh canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub geometry: TargetGeometry,
    pub background: Background,
    pub format: OutputFormat,
    pub quality: Quality,
}
