//! # Bulk Resize
//!
//! Resize a batch of images with one set of settings and package the results
//! into a single `.tar.gz` archive.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Collect   paths    →  Vec<SourceImage>     (files + directory walk, batch limit)
//! 2. Process   sources  →  BatchOutcome         (geometry → fill → draw → encode)
//! 3. Package   outcome  →  resized-images.tar.gz
//! ```
//!
//! Geometry is resolved before any pixels are touched, by a pure function of
//! the source size and the active [`ResizeMode`](imaging::ResizeMode). The
//! pixel work sits behind the [`ImageBackend`](imaging::ImageBackend) trait so
//! the whole pipeline can be tested against a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sources`] | Stage 1: resolves files and directories, enforces `max_files`, reads bytes |
//! | [`process`] | Stage 2: runs every source through the transform, sequentially or on a rayon pool |
//! | [`archive`] | Stage 3: writes artifacts into a deterministic gzip'd tar |
//! | [`imaging`] | Geometry resolution, render parameters, and the `image`-crate backend |
//! | [`config`] | `bulk-resize.toml` loading, validation, merging, and mode switching |
//! | [`naming`] | Output filename derivation (`IMG_1.PNG` → `IMG_1.jpeg`) |
//! | [`types`] | Shared types passed between stages (`SourceImage`, `OutputArtifact`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Modes Never Fail
//!
//! A mode whose parameters are missing or zero resolves to the original size.
//! Only decoding and encoding can fail, and those failures are per file: the
//! batch either skips the file or aborts, per `processing.on_error`.
//!
//! ## One Decoded Image Per Worker
//!
//! Sources are held as encoded bytes. Each worker decodes one image, renders
//! it, and drops the bitmap before taking the next, so peak memory is bounded
//! by the worker count rather than the batch size.
//!
//! ## Input Order Is Output Order
//!
//! Archive entries follow input order no matter how many workers ran. Names
//! are not deduplicated.

pub mod archive;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod sources;
pub mod types;
