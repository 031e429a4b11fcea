//! CaptionFlow CLI
//!
//! Headless access to the caption engine: inspect subtitle files, resolve the
//! frame at a timestamp, try out line breaking and convert between formats.
//! All structured output is JSON on stdout; logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

use captionflow_core::core::captions::{export_srt, export_vtt, load_file, SubtitleFormat};
use captionflow_core::core::text::{FixedAdvanceMeasurer, TextMeasurer};
use captionflow_core::{CaptionEngine, EngineSettings, IndexedCaptionSet, TimeMs};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "captionflow", version, about = "Caption timing and layout engine")]
struct Cli {
    /// Engine settings file (JSON); defaults are used when absent or invalid
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Summarize a subtitle file
    Inspect {
        file: PathBuf,
    },
    /// Resolve the caption frame at a timestamp
    At {
        file: PathBuf,
        /// Timestamp in milliseconds
        #[arg(long, allow_hyphen_values = true)]
        ms: TimeMs,
        /// Transition window override in milliseconds
        #[arg(long)]
        window: Option<TimeMs>,
    },
    /// Break text into caption lines
    Wrap {
        text: String,
        #[arg(long)]
        max_chars: Option<usize>,
        #[arg(long)]
        max_lines: Option<usize>,
        /// Pixel budget per line
        #[arg(long, requires = "font")]
        max_width: Option<f64>,
        /// Font descriptor used for measurement
        #[arg(long)]
        font: Option<String>,
        /// Fixed per-character advance in pixels; approximated when omitted
        #[arg(long)]
        advance: Option<f64>,
    },
    /// Convert a subtitle file to SRT or WebVTT
    Convert {
        file: PathBuf,
        #[arg(long, value_enum)]
        to: ExportFormat,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write next to the input, named with the target format's extension
        #[arg(long, conflicts_with = "output")]
        write: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Srt,
    Vtt,
}

impl From<ExportFormat> for SubtitleFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Srt => SubtitleFormat::Srt,
            ExportFormat::Vtt => SubtitleFormat::Vtt,
        }
    }
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport {
    file: String,
    format: SubtitleFormat,
    segments: usize,
    word_timed_segments: usize,
    duration_ms: TimeMs,
    sorted_ascending: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WrapReport {
    lines: Vec<String>,
    was_truncated: bool,
    pixel_mode: bool,
}

// =============================================================================
// Entry Point
// =============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_dir.as_deref(), cli.verbose);
    run(cli)
}

fn init_logging(log_dir: Option<&Path>, verbose: bool) {
    use tracing_subscriber::prelude::*;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions));

    // File logging is best effort
    let file_layer = log_dir.and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        let file_appender = tracing_appender::rolling::daily(dir, "captionflow.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = LOG_GUARD.set(guard);
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
    });

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref());
    debug!("Effective settings: {:?}", settings);

    match cli.command {
        Commands::Inspect { file } => print_json(&inspect(&file)?),
        Commands::At { file, ms, window } => {
            let mut settings = settings;
            if let Some(window) = window {
                settings.transition_window_ms = window;
            }
            let set = IndexedCaptionSet::new(read_captions(&file)?);
            let engine = CaptionEngine::approximate(settings);
            print_json(&engine.frame_at(&set, ms))
        }
        Commands::Wrap {
            text,
            max_chars,
            max_lines,
            max_width,
            font,
            advance,
        } => {
            let mut settings = settings;
            if let Some(max_chars) = max_chars {
                settings.max_chars_per_line = max_chars;
            }
            if let Some(max_lines) = max_lines {
                settings.max_lines = max_lines;
            }
            if max_width.is_some() {
                settings.max_width_px = max_width;
            }
            if font.is_some() {
                settings.font = font;
            }

            let measurer = advance
                .map(|px| Arc::new(FixedAdvanceMeasurer::new(px)) as Arc<dyn TextMeasurer>);
            let engine = CaptionEngine::new(settings, measurer);
            let result = engine.layout_text(&text);

            print_json(&WrapReport {
                lines: result.texts(),
                was_truncated: result.was_truncated,
                pixel_mode: engine.settings().wrap_options().is_pixel_mode(),
            })
        }
        Commands::Convert {
            file,
            to,
            output,
            write,
        } => {
            let destination = convert_destination(&file, to, output, write)?;
            let segments = read_captions(&file)?;
            let content = match to {
                ExportFormat::Srt => export_srt(&segments),
                ExportFormat::Vtt => export_vtt(&segments),
            };

            match destination {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {} segment(s) to {}", segments.len(), path.display());
                }
                None => println!("{}", content),
            }
            Ok(())
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn load_settings(path: Option<&Path>) -> EngineSettings {
    match path {
        Some(path) => EngineSettings::load(path),
        None => EngineSettings::default(),
    }
}

/// Where `convert` writes; `None` means stdout
fn convert_destination(
    file: &Path,
    to: ExportFormat,
    output: Option<PathBuf>,
    write: bool,
) -> Result<Option<PathBuf>> {
    if output.is_some() || !write {
        return Ok(output);
    }

    let sibling = file.with_extension(SubtitleFormat::from(to).extension());
    if sibling == file {
        bail!(
            "{} is already in the target format; pass --output instead",
            file.display()
        );
    }
    Ok(Some(sibling))
}

fn read_captions(file: &Path) -> Result<Vec<captionflow_core::CaptionSegment>> {
    load_file(file).with_context(|| format!("Failed to load captions from {}", file.display()))
}

fn inspect(file: &Path) -> Result<InspectReport> {
    let format = SubtitleFormat::from_path(file)
        .with_context(|| format!("Cannot detect subtitle format of {}", file.display()))?;
    let segments = read_captions(file)?;
    let word_timed_segments = segments
        .iter()
        .filter(|s| !s.word_slice().is_empty())
        .count();
    let set = IndexedCaptionSet::new(segments);

    Ok(InspectReport {
        file: file.display().to_string(),
        format,
        segments: set.len(),
        word_timed_segments,
        duration_ms: set.duration_ms(),
        sorted_ascending: set.is_sorted_ascending(),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
