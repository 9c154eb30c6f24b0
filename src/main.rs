use bulk_resize::config::{self, ConfigOverrides, ErrorPolicy, ResizeConfig};
use bulk_resize::imaging::OutputFormat;
use bulk_resize::process::{self, BatchOptions};
use bulk_resize::{archive, output, sources};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bulk-resize")]
#[command(about = "Resize a batch of images and package them into one archive")]
#[command(long_about = "\
Resize a batch of images and package them into one archive

Every image in the batch gets the same settings. Geometry is resolved per
image from its own size:

  percentage    scale both sides           --percentage 50
  file_size     fixed 80% scale            --max-file-size-kb 500
  dimensions    exact box                  --width 300 --height 300 [--pad]
  width         fixed width, keep aspect   --width 1200
  height        fixed height, keep aspect  --height 800
  longest_side  cap the longer side        --longest-side 2048

A mode with missing parameters keeps the original size. The canvas is always
filled with --background first, so transparent areas come out in that color.

Settings are read from ./bulk-resize.toml (or --config) and overridden by
flags. Run 'bulk-resize gen-config' for a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./bulk-resize.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by commands that resolve geometry.
#[derive(clap::Args, Clone, Default)]
struct SettingsArgs {
    /// Resize mode
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(config::MODE_NAMES))]
    mode: Option<String>,

    /// Scale in percent (percentage mode)
    #[arg(long)]
    percentage: Option<f64>,

    /// Target size in KB (file_size mode)
    #[arg(long)]
    max_file_size_kb: Option<u32>,

    /// Target width in pixels (dimensions and width modes)
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels (dimensions and height modes)
    #[arg(long)]
    height: Option<u32>,

    /// Longer side in pixels (longest_side mode)
    #[arg(long)]
    longest_side: Option<u32>,

    /// Letterbox into the box instead of stretching (dimensions mode);
    /// `--pad=false` turns off padding set in the config file
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pad: Option<bool>,

    /// Canvas fill color (#rgb, #rgba, #rrggbb, #rrggbbaa)
    #[arg(long)]
    background: Option<String>,

    /// Output format: jpeg, png or webp
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Encoder quality, 1-100
    #[arg(long)]
    quality: Option<u32>,

    /// Walk subdirectories of directory inputs
    #[arg(long)]
    recursive: bool,
}

impl SettingsArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            mode: self.mode.clone(),
            percentage: self.percentage,
            max_file_size_kb: self.max_file_size_kb,
            target_width: self.width,
            target_height: self.height,
            max_longest_side: self.longest_side,
            use_padding: self.pad,
            background_color: self.background.clone(),
            output_format: self.format,
            output_quality: self.quality,
            recursive: self.recursive.then_some(true),
            ..ConfigOverrides::default()
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Resize images and write the archive
    Resize {
        /// Image files and/or directories
        inputs: Vec<PathBuf>,

        /// Archive path, or a directory to write resized-images.tar.gz into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Also write a JSON report of artifacts and failures
        #[arg(long)]
        report: Option<PathBuf>,

        /// Parallel workers (default: sequential)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// What to do when an image fails: skip or abort
        #[arg(long)]
        on_error: Option<ErrorPolicy>,

        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Show what each image would become, without encoding anything
    Plan {
        /// Image files and/or directories
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Print a stock bulk-resize.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Resize {
            inputs,
            output: dest,
            report,
            jobs,
            on_error,
            settings,
        } => {
            let overrides = ConfigOverrides {
                max_processes: jobs,
                on_error,
                ..settings.overrides()
            };
            let config = resolve_settings(cli.config.as_deref(), overrides)?;
            let transform = config.transform_config()?;
            let options = BatchOptions {
                on_error: config.processing.on_error,
                threads: config::effective_threads(&config.processing),
            };

            let batch = sources::collect_sources(&inputs, &config.sources)?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::process(&batch, &transform, &options, Some(tx));
            output::join_printer(printer);
            let outcome = result?;
            drop(batch);

            let archive_path = archive::write_archive(outcome.artifacts(), &dest)?;
            if let Some(report_path) = report {
                write_report(&report_path, &outcome, &archive_path)?;
            }
            output::print_summary(&outcome, Some(&archive_path));
        }
        Command::Plan { inputs, settings } => {
            let config = resolve_settings(cli.config.as_deref(), settings.overrides())?;
            let transform = config.transform_config()?;
            let batch = sources::collect_sources(&inputs, &config.sources)?;
            output::print_plan(&process::plan(&batch, &transform));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Stock defaults → config file → command-line flags.
fn resolve_settings(
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<ResizeConfig, config::ConfigError> {
    let base = match config_path {
        Some(path) => config::load_explicit_config(path)?,
        None => config::load_config(Path::new("."))?,
    };
    let merged = overrides.apply(base);
    merged.validate()?;
    tracing::debug!(?merged, "resolved settings");
    Ok(merged)
}

fn write_report(
    path: &Path,
    outcome: &process::BatchOutcome,
    archive_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = serde_json::json!({
        "archive": archive_path.display().to_string(),
        "artifacts": outcome.summaries(),
        "failures": outcome.failures,
    });
    std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
    Ok(())
}
