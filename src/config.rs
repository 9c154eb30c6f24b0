//! Resize configuration module.
//!
//! Handles loading, validating, and layering `bulk-resize.toml`. Stock
//! defaults are overridden by an optional config file, which in turn is
//! overridden by command-line flags.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! mode = "percentage"          # percentage | file_size | dimensions | width | height | longest_side
//! percentage = 100             # percentage mode: 1-100
//! # max_file_size_kb = 500     # file_size mode (informational; scale is fixed at 80%)
//! # target_width = 1200        # dimensions / width modes
//! # target_height = 800        # dimensions / height modes
//! # max_longest_side = 2048    # longest_side mode
//! use_padding = false          # dimensions mode: letterbox instead of stretching
//! background_color = "#ffffff" # canvas fill, always applied
//! output_format = "jpeg"       # jpeg | png | webp
//! output_quality = 75          # 1-100
//!
//! [processing]
//! # max_processes = 4          # parallel workers (omit for sequential)
//! on_error = "skip"            # skip | abort
//!
//! [sources]
//! max_files = 500
//! recursive = false
//! ```
//!
//! ## Mode Parameters Never Fail
//!
//! Parameters of the active mode are not validated: a missing, zero or
//! unrecognized value resolves to the original image size. Only the output
//! settings (quality, background color) and the batch limits are checked.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Background, OutputFormat, Quality, ResizeMode, TransformConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILENAME: &str = "bulk-resize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// The six recognized mode names, as written in config files and on the
/// command line.
pub const MODE_NAMES: &[&str] = &[
    "percentage",
    "file_size",
    "dimensions",
    "width",
    "height",
    "longest_side",
];

/// Resize configuration loaded from `bulk-resize.toml`.
///
/// This is the flat, settings-panel view of a run: every mode's parameter
/// lives side by side and only the active mode's fields are read. Use
/// [`ResizeConfig::resize_mode`] to get the tagged form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Active mode name (see [`MODE_NAMES`]).
    pub mode: String,
    /// Scale in percent for the `percentage` mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    /// Byte budget in KB for the `file_size` mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size_kb: Option<u32>,
    /// Width for the `dimensions` and `width` modes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_width: Option<u32>,
    /// Height for the `dimensions` and `height` modes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_height: Option<u32>,
    /// Longer-side length for the `longest_side` mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_longest_side: Option<u32>,
    /// Letterbox into the exact box instead of stretching (`dimensions` only).
    pub use_padding: bool,
    /// Canvas fill color, applied before every draw.
    pub background_color: String,
    pub output_format: OutputFormat,
    /// Encoder quality, 1-100.
    pub output_quality: u32,
    pub processing: ProcessingConfig,
    pub sources: SourcesConfig,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            mode: "percentage".to_string(),
            percentage: Some(100.0),
            max_file_size_kb: None,
            target_width: None,
            target_height: None,
            max_longest_side: None,
            use_padding: false,
            background_color: "#ffffff".to_string(),
            output_format: OutputFormat::Jpeg,
            output_quality: Quality::default().value(),
            processing: ProcessingConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

impl ResizeConfig {
    /// Validate output settings and batch limits.
    ///
    /// Mode parameters are deliberately not checked.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output_quality) {
            return Err(ConfigError::Validation(
                "output_quality must be 1-100".into(),
            ));
        }
        self.background_color
            .parse::<Background>()
            .map_err(|e| ConfigError::Validation(format!("background_color: {e}")))?;
        if self.sources.max_files == 0 {
            return Err(ConfigError::Validation(
                "sources.max_files must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The active mode with only its own parameters.
    ///
    /// An unrecognized mode name resolves to a parameterless percentage,
    /// which keeps the original size.
    pub fn resize_mode(&self) -> ResizeMode {
        match self.mode.as_str() {
            "percentage" => ResizeMode::Percentage {
                percent: self.percentage,
            },
            "file_size" | "fileSize" => ResizeMode::TargetFileSize {
                max_kilobytes: self.max_file_size_kb,
            },
            "dimensions" => ResizeMode::ExactDimensions {
                width: self.target_width,
                height: self.target_height,
                pad: self.use_padding,
            },
            "width" => ResizeMode::FixedWidth {
                width: self.target_width,
            },
            "height" => ResizeMode::FixedHeight {
                height: self.target_height,
            },
            "longest_side" | "longestSide" => ResizeMode::LongestSide {
                max: self.max_longest_side,
            },
            other => {
                tracing::warn!(mode = other, "unrecognized resize mode, keeping original size");
                ResizeMode::Percentage { percent: None }
            }
        }
    }

    /// Everything the pipeline needs per image.
    pub fn transform_config(&self) -> Result<TransformConfig, ConfigError> {
        self.validate()?;
        Ok(TransformConfig {
            mode: self.resize_mode(),
            background: Background::parse(&self.background_color).unwrap_or_default(),
            format: self.output_format,
            quality: Quality::new(self.output_quality),
        })
    }
}

/// Switch to another mode, returning a fresh configuration.
///
/// Geometry parameters are reset (percentage goes back to 100 for the
/// percentage mode, width, height and longest side are cleared). The file
/// size target, output settings, padding, background and the
/// processing/sources sections carry over.
pub fn switch_mode(config: &ResizeConfig, mode: &str) -> ResizeConfig {
    ResizeConfig {
        mode: mode.to_string(),
        percentage: (mode == "percentage").then_some(100.0),
        target_width: None,
        target_height: None,
        max_longest_side: None,
        ..config.clone()
    }
}

/// What to do when one image fails to decode or encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Record the failure, leave the image out, and keep going.
    #[default]
    Skip,
    /// Stop the batch at the first failure; no archive is written.
    Abort,
}

impl std::str::FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            _ => Err(format!("unknown error policy: {s:?} (expected skip or abort)")),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, images are processed one at a time.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
    pub on_error: ErrorPolicy,
}

/// Resolve the effective worker count from config.
///
/// - `None` → 1 (sequential)
/// - `Some(n)` → `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(1)
}

/// Input collection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    /// Refuse batches larger than this.
    pub max_files: usize,
    /// Descend into subdirectories of directory inputs.
    pub recursive: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            max_files: 500,
            recursive: false,
        }
    }
}

/// Command-line overrides, applied on top of the loaded config.
///
/// A new `mode` goes through [`switch_mode`] first, so stale geometry of the
/// previous mode never leaks into the new one; the per-mode flags are applied
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub mode: Option<String>,
    pub percentage: Option<f64>,
    pub max_file_size_kb: Option<u32>,
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
    pub max_longest_side: Option<u32>,
    pub use_padding: Option<bool>,
    pub background_color: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub output_quality: Option<u32>,
    pub max_processes: Option<usize>,
    pub on_error: Option<ErrorPolicy>,
    pub recursive: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply(self, config: ResizeConfig) -> ResizeConfig {
        let mut config = match &self.mode {
            Some(mode) => switch_mode(&config, mode),
            None => config,
        };

        if self.percentage.is_some() {
            config.percentage = self.percentage;
        }
        if self.max_file_size_kb.is_some() {
            config.max_file_size_kb = self.max_file_size_kb;
        }
        if self.target_width.is_some() {
            config.target_width = self.target_width;
        }
        if self.target_height.is_some() {
            config.target_height = self.target_height;
        }
        if self.max_longest_side.is_some() {
            config.max_longest_side = self.max_longest_side;
        }
        if let Some(pad) = self.use_padding {
            config.use_padding = pad;
        }
        if let Some(color) = self.background_color {
            config.background_color = color;
        }
        if let Some(format) = self.output_format {
            config.output_format = format;
        }
        if let Some(quality) = self.output_quality {
            config.output_quality = quality;
        }
        if self.max_processes.is_some() {
            config.processing.max_processes = self.max_processes;
        }
        if let Some(policy) = self.on_error {
            config.processing.on_error = policy;
        }
        if let Some(recursive) = self.recursive {
            config.sources.recursive = recursive;
        }
        config
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ResizeConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ResizeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `bulk-resize.toml` from the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the defaults.
pub fn load_config(dir: &Path) -> Result<ResizeConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILENAME))
}

/// Load a config from an explicit file path.
///
/// Unlike [`load_config`], a missing file is an error: the caller asked for
/// this file by name.
pub fn load_explicit_config(path: &Path) -> Result<ResizeConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", path.display()),
        )));
    }
    load_config_file(path)
}

fn load_config_file(path: &Path) -> Result<ResizeConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `bulk-resize.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# bulk-resize Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags override this file. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Resize mode
# ---------------------------------------------------------------------------
# One of:
#   percentage    scale both sides by `percentage`
#   file_size     approximate a smaller file with a fixed 80% scale
#   dimensions    exact `target_width` x `target_height` box
#   width         set `target_width`, keep aspect ratio
#   height        set `target_height`, keep aspect ratio
#   longest_side  scale so the longer side is `max_longest_side`
#
# A mode whose parameters are missing keeps the original size.
mode = "percentage"

# Scale in percent (percentage mode).
percentage = 100

# Target size in KB (file_size mode). Informational only.
# max_file_size_kb = 500

# Target box in pixels (dimensions, width and height modes).
# target_width = 1200
# target_height = 800

# Longer side in pixels (longest_side mode).
# max_longest_side = 2048

# Dimensions mode only: fit the image inside the box and fill the border with
# `background_color` instead of stretching it.
use_padding = false

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
# Canvas fill color: #rgb, #rgba, #rrggbb or #rrggbbaa.
background_color = "#ffffff"

# jpeg, png or webp. Quality applies to JPEG and WebP; PNG is lossless.
output_format = "jpeg"

# Encoder quality (1 = smallest, 100 = best).
output_quality = 75

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Parallel workers. Omit to process one image at a time.
# Output order always follows input order.
# max_processes = 4

# What to do when an image cannot be decoded or encoded:
#   skip   leave it out, report it, finish the batch
#   abort  stop at the first failure, write nothing
on_error = "skip"

# ---------------------------------------------------------------------------
# Sources
# ---------------------------------------------------------------------------
[sources]
# Largest batch accepted.
max_files = 500

# Walk subdirectories of directory inputs.
recursive = false
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) {
        fs::write(dir.join(CONFIG_FILENAME), content).unwrap();
    }

    #[test]
    fn default_config_matches_original_settings_panel() {
        let config = ResizeConfig::default();
        assert_eq!(config.mode, "percentage");
        assert_eq!(config.percentage, Some(100.0));
        assert_eq!(config.output_quality, 75);
        assert_eq!(config.output_format, OutputFormat::Jpeg);
        assert!(!config.use_padding);
        assert_eq!(config.background_color, "#ffffff");
    }

    #[test]
    fn parse_partial_config() {
        let config: ResizeConfig = toml::from_str(
            r#"
mode = "width"
target_width = 640
"#,
        )
        .unwrap();
        assert_eq!(config.mode, "width");
        assert_eq!(config.target_width, Some(640));
        // Defaults preserved
        assert_eq!(config.output_quality, 75);
        assert_eq!(config.sources.max_files, 500);
    }

    #[test]
    fn parse_output_format() {
        let config: ResizeConfig = toml::from_str(r#"output_format = "webp""#).unwrap();
        assert_eq!(config.output_format, OutputFormat::Webp);

        let result: Result<ResizeConfig, _> = toml::from_str(r#"output_format = "gif""#);
        assert!(result.is_err());
    }

    // =========================================================================
    // resize_mode tests
    // =========================================================================

    #[test]
    fn resize_mode_reads_only_active_parameters() {
        let config = ResizeConfig {
            mode: "dimensions".to_string(),
            percentage: Some(10.0),
            target_width: Some(300),
            target_height: Some(200),
            max_longest_side: Some(99),
            use_padding: true,
            ..ResizeConfig::default()
        };
        assert_eq!(
            config.resize_mode(),
            ResizeMode::ExactDimensions {
                width: Some(300),
                height: Some(200),
                pad: true,
            }
        );
    }

    #[test]
    fn resize_mode_maps_every_name() {
        let config = ResizeConfig {
            percentage: Some(50.0),
            max_file_size_kb: Some(100),
            target_width: Some(1),
            target_height: Some(2),
            max_longest_side: Some(3),
            ..ResizeConfig::default()
        };
        let modes: Vec<ResizeMode> = MODE_NAMES
            .iter()
            .map(|name| switch_to_keep_params(&config, name).resize_mode())
            .collect();
        assert_eq!(
            modes,
            vec![
                ResizeMode::Percentage {
                    percent: Some(50.0)
                },
                ResizeMode::TargetFileSize {
                    max_kilobytes: Some(100)
                },
                ResizeMode::ExactDimensions {
                    width: Some(1),
                    height: Some(2),
                    pad: false
                },
                ResizeMode::FixedWidth { width: Some(1) },
                ResizeMode::FixedHeight { height: Some(2) },
                ResizeMode::LongestSide { max: Some(3) },
            ]
        );
    }

    fn switch_to_keep_params(config: &ResizeConfig, mode: &str) -> ResizeConfig {
        ResizeConfig {
            mode: mode.to_string(),
            ..config.clone()
        }
    }

    #[test]
    fn resize_mode_accepts_camel_case_aliases() {
        let config = ResizeConfig {
            mode: "longestSide".to_string(),
            max_longest_side: Some(10),
            ..ResizeConfig::default()
        };
        assert_eq!(config.resize_mode(), ResizeMode::LongestSide { max: Some(10) });
    }

    #[test]
    fn unrecognized_mode_keeps_original_size() {
        let config = ResizeConfig {
            mode: "squish".to_string(),
            ..ResizeConfig::default()
        };
        assert_eq!(config.resize_mode(), ResizeMode::Percentage { percent: None });
    }

    // =========================================================================
    // switch_mode tests
    // =========================================================================

    #[test]
    fn switch_mode_resets_parameters() {
        let config = ResizeConfig {
            mode: "dimensions".to_string(),
            target_width: Some(300),
            target_height: Some(200),
            ..ResizeConfig::default()
        };
        let switched = switch_mode(&config, "width");
        assert_eq!(switched.mode, "width");
        assert_eq!(switched.target_width, None);
        assert_eq!(switched.target_height, None);
        assert_eq!(switched.percentage, None);
    }

    #[test]
    fn switch_mode_keeps_file_size_target() {
        let config = ResizeConfig {
            mode: "file_size".to_string(),
            max_file_size_kb: Some(250),
            ..ResizeConfig::default()
        };
        let away = switch_mode(&config, "longest_side");
        assert_eq!(away.max_file_size_kb, Some(250));
        let back = switch_mode(&away, "file_size");
        assert_eq!(
            back.resize_mode(),
            ResizeMode::TargetFileSize {
                max_kilobytes: Some(250)
            }
        );
    }

    #[test]
    fn switch_to_percentage_restores_100() {
        let config = switch_mode(&ResizeConfig::default(), "longest_side");
        assert_eq!(config.percentage, None);
        let back = switch_mode(&config, "percentage");
        assert_eq!(back.percentage, Some(100.0));
    }

    #[test]
    fn switch_mode_preserves_output_settings() {
        let config = ResizeConfig {
            use_padding: true,
            background_color: "#000".to_string(),
            output_format: OutputFormat::Png,
            output_quality: 42,
            ..ResizeConfig::default()
        };
        let switched = switch_mode(&config, "dimensions");
        assert!(switched.use_padding);
        assert_eq!(switched.background_color, "#000");
        assert_eq!(switched.output_format, OutputFormat::Png);
        assert_eq!(switched.output_quality, 42);
        // Original is untouched
        assert_eq!(config.mode, "percentage");
    }

    // =========================================================================
    // Overrides
    // =========================================================================

    #[test]
    fn overrides_switch_mode_before_applying_parameters() {
        let config = ResizeConfig {
            mode: "dimensions".to_string(),
            target_width: Some(300),
            target_height: Some(200),
            ..ResizeConfig::default()
        };
        let overrides = ConfigOverrides {
            mode: Some("height".to_string()),
            target_height: Some(720),
            ..ConfigOverrides::default()
        };
        let config = overrides.apply(config);
        assert_eq!(config.mode, "height");
        assert_eq!(config.target_width, None);
        assert_eq!(config.target_height, Some(720));
    }

    #[test]
    fn overrides_without_mode_keep_parameters() {
        let config = ResizeConfig {
            mode: "dimensions".to_string(),
            target_width: Some(300),
            ..ResizeConfig::default()
        };
        let config = ConfigOverrides {
            target_height: Some(100),
            use_padding: Some(true),
            output_format: Some(OutputFormat::Webp),
            on_error: Some(ErrorPolicy::Abort),
            ..ConfigOverrides::default()
        }
        .apply(config);
        assert_eq!(config.target_width, Some(300));
        assert_eq!(config.target_height, Some(100));
        assert!(config.use_padding);
        assert_eq!(config.output_format, OutputFormat::Webp);
        assert_eq!(config.processing.on_error, ErrorPolicy::Abort);
    }

    // =========================================================================
    // transform_config
    // =========================================================================

    #[test]
    fn transform_config_parses_background() {
        let config = ResizeConfig {
            background_color: "#102030".to_string(),
            output_quality: 90,
            ..ResizeConfig::default()
        };
        let transform = config.transform_config().unwrap();
        assert_eq!(transform.background, Background([0x10, 0x20, 0x30, 255]));
        assert_eq!(transform.quality.value(), 90);
    }

    #[test]
    fn transform_config_rejects_invalid_output_settings() {
        let config = ResizeConfig {
            background_color: "tomato".to_string(),
            ..ResizeConfig::default()
        };
        assert!(matches!(
            config.transform_config(),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn default_processing_is_sequential_skip() {
        let config = ProcessingConfig::default();
        assert_eq!(config.max_processes, None);
        assert_eq!(config.on_error, ErrorPolicy::Skip);
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
            ..ProcessingConfig::default()
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
            ..ProcessingConfig::default()
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn parse_processing_config() {
        let config: ResizeConfig = toml::from_str(
            r#"
[processing]
max_processes = 4
on_error = "abort"
"#,
        )
        .unwrap();
        assert_eq!(config.processing.max_processes, Some(4));
        assert_eq!(config.processing.on_error, ErrorPolicy::Abort);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"output_quality = 75"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"output_quality = 60"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("output_quality").unwrap().as_integer(), Some(60));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[sources]
max_files = 500
recursive = false
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[sources]
recursive = true
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let sources = merged.get("sources").unwrap();
        assert_eq!(sources.get("recursive").unwrap().as_bool(), Some(true));
        assert_eq!(sources.get("max_files").unwrap().as_integer(), Some(500));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<ResizeConfig, _> = toml::from_str(r#"output_qualty = 90"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<ResizeConfig, _> = toml::from_str(
            r#"
[processing]
threads = 4
"#,
        );
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_quality_bounds() {
        let mut config = ResizeConfig::default();
        config.output_quality = 100;
        assert!(config.validate().is_ok());
        config.output_quality = 1;
        assert!(config.validate().is_ok());

        config.output_quality = 0;
        assert!(config.validate().is_err());
        config.output_quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output_quality"));
    }

    #[test]
    fn validate_ignores_mode_parameters() {
        let config = ResizeConfig {
            mode: "nonsense".to_string(),
            percentage: Some(-5.0),
            target_width: Some(0),
            ..ResizeConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_max_files_zero() {
        let mut config = ResizeConfig::default();
        config.sources.max_files = 0;
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, ResizeConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r##"
mode = "dimensions"
target_width = 300
target_height = 300
use_padding = true
background_color = "#000000"
"##,
        );

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.mode, "dimensions");
        assert!(config.use_padding);
        assert_eq!(config.background_color, "#000000");
        // Stock default survives the merge
        assert_eq!(config.percentage, Some(100.0));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "this is not valid toml [[[");
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "output_quality = 200");
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_explicit_config_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_explicit_config(&tmp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_explicit_config_reads_any_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("web.toml");
        fs::write(&path, r#"output_format = "png""#).unwrap();
        let config = load_explicit_config(&path).unwrap();
        assert_eq!(config.output_format, OutputFormat::Png);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ResizeConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ResizeConfig::default());
    }

    #[test]
    fn stock_config_toml_mentions_every_mode() {
        let content = stock_config_toml();
        for mode in MODE_NAMES {
            assert!(content.contains(mode), "missing mode {mode}");
        }
        assert!(content.contains("[processing]"));
        assert!(content.contains("[sources]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        assert!(val.get("mode").is_some());
        assert!(val.get("processing").is_some());
        assert!(val.get("sources").is_some());
        assert!(val.get("target_width").is_none());
    }
}
