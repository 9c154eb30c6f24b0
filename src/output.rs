//! CLI output formatting.
//!
//! # Entity Display Contract
//!
//! Every source image follows the same two-level pattern in all commands:
//!
//! 1. **Header line**: 1-based positional index, source name, and what it
//!    becomes (`→ filename`) or `FAILED`.
//! 2. **Context lines**: indented geometry, size, or the error.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! 001 dawn.png → dawn.jpeg
//!     4032x3024 → 1008x756 (182.4 KB)
//! 002 notes.png FAILED
//!     Decode failed: ...
//!
//! Resized 1 of 2 images (1 failed), 182.4 KB total
//! Archive: out/resized-images.tar.gz
//! ```
//!
//! ## Plan
//!
//! ```text
//! 001 dawn.png → dawn.jpeg
//!     4032x3024 → 300x300, drawn 300x225 at (0, 38)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::imaging::{Dimensions, TargetGeometry};
use crate::process::{BatchOutcome, PlanEntry, ProcessEvent};
use std::path::Path;
use std::thread::JoinHandle;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 0-based input position as a 3-digit zero-padded 1-based index.
fn format_index(index: usize) -> String {
    format!("{:0>3}", index + 1)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Header line for one source.
///
/// ```text
/// 001 dawn.png → dawn.jpeg
/// 002 notes.png FAILED
/// ```
fn source_line(index: usize, name: &str, filename: Option<&str>) -> String {
    match filename {
        Some(f) => format!("{} {} \u{2192} {}", format_index(index), name, f),
        None => format!("{} {} FAILED", format_index(index), name),
    }
}

/// Human-readable byte count: bytes below 1 KB, otherwise KB or MB with one
/// decimal.
pub fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

fn geometry_detail(original: Dimensions, geometry: &TargetGeometry) -> String {
    match geometry {
        TargetGeometry::Simple { canvas } => format!("{} \u{2192} {}", original, canvas),
        TargetGeometry::Padded {
            canvas,
            drawn,
            offset,
        } => format!(
            "{} \u{2192} {}, drawn {} at ({}, {})",
            original, canvas, drawn, offset.0, offset.1
        ),
    }
}

// ============================================================================
// Resize
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::ImageProcessed {
            index,
            name,
            original,
            canvas,
            filename,
            bytes,
        } => vec![
            source_line(*index, name, Some(filename)),
            format!(
                "{}{} \u{2192} {} ({})",
                indent(1),
                original,
                canvas,
                format_bytes(*bytes)
            ),
        ],
        ProcessEvent::ImageFailed { index, name, error } => vec![
            source_line(*index, name, None),
            format!("{}{}", indent(1), error),
        ],
    }
}

/// Format the end-of-run summary.
pub fn format_summary(outcome: &BatchOutcome, archive: Option<&Path>) -> Vec<String> {
    let succeeded = outcome.images.len();
    let total = succeeded + outcome.failures.len();

    let mut headline = format!("Resized {} of {} images", succeeded, total);
    if !outcome.failures.is_empty() {
        headline.push_str(&format!(" ({} failed)", outcome.failures.len()));
    }
    headline.push_str(&format!(", {} total", format_bytes(outcome.total_bytes())));

    let mut lines = vec![String::new(), headline];
    for failure in &outcome.failures {
        lines.push(format!(
            "{}{} {}: {}",
            indent(1),
            format_index(failure.index),
            failure.name,
            failure.error
        ));
    }
    if let Some(path) = archive {
        lines.push(format!("Archive: {}", path.display()));
    }
    lines
}

/// Print the end-of-run summary to stdout.
pub fn print_summary(outcome: &BatchOutcome, archive: Option<&Path>) {
    for line in format_summary(outcome, archive) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Format a dry-run plan, one entity per source.
pub fn format_plan(entries: &[PlanEntry]) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in entries {
        match entry {
            PlanEntry::Ready {
                index,
                name,
                filename,
                original,
                geometry,
            } => {
                lines.push(source_line(*index, name, Some(filename)));
                lines.push(format!(
                    "{}{}",
                    indent(1),
                    geometry_detail(*original, geometry)
                ));
            }
            PlanEntry::Unreadable { index, name, error } => {
                lines.push(source_line(*index, name, None));
                lines.push(format!("{}{}", indent(1), error));
            }
        }
    }
    if entries.is_empty() {
        lines.push("No images selected".to_string());
    }
    lines
}

/// Print a dry-run plan to stdout.
pub fn print_plan(entries: &[PlanEntry]) {
    for line in format_plan(entries) {
        println!("{}", line);
    }
}

/// Wait for the progress printer. A panicked printer only loses progress
/// lines, so it is logged rather than failing the batch.
pub fn join_printer<T>(handle: JoinHandle<T>) -> Option<T> {
    match handle.join() {
        Ok(value) => Some(value),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::warn!(%reason, "progress printer panicked");
            None
        }
    }
}
