//! Image processing: geometry resolution plus a pure-Rust pixel backend.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | header dimensions, EXIF-rotated |
//! | **Geometry** | [`resolve_geometry`] (pure math, no pixels) |
//! | **Render** | fill + Lanczos3 resize + `overlay` |
//! | **Encode** | JPEG and WebP (quality), PNG (lossless) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{FILE_SIZE_SCALE, calculate_letterbox, resolve_geometry};
pub use operations::{
    TransformConfig, TransformedImage, get_dimensions, plan_render, transform_image,
};
pub use params::{Background, OutputFormat, Quality, RenderParams, ResizeMode, TargetGeometry};
pub use rust_backend::{RustBackend, supported_input_extensions};
