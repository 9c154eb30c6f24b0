//! Output filename derivation.
//!
//! Every artifact is named after its source: the last extension is stripped
//! and the output format's extension is appended.
//!
//! - `IMG_0001.PNG` → `IMG_0001.jpeg`
//! - `archive.tar.gz` → `archive.tar.webp` (only the last extension goes)
//! - `README` → `README.png` (nothing to strip)
//! - `photos/2024/a.jpg` → `photos/2024/a.png` (dots in directories are never
//!   mistaken for an extension)

use crate::imaging::OutputFormat;

/// Strip the final `.ext` from a name.
///
/// Only a dot followed by at least one character that is neither `.` nor `/`
/// up to the end of the string counts as an extension, so `"a."`, `"a.."` and
/// `"dir.d/file"` are returned unchanged.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) => {
            let ext = &name[dot + 1..];
            if ext.is_empty() || ext.contains('/') {
                name
            } else {
                &name[..dot]
            }
        }
        None => name,
    }
}

/// Derive the artifact filename for `source_name` encoded as `format`.
pub fn output_filename(source_name: &str, format: OutputFormat) -> String {
    format!("{}.{}", strip_extension(source_name), format.extension())
}
