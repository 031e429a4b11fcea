//! Engine Settings
//!
//! Layout and timing configuration with:
//! - Defaults for every field, so partial files load
//! - Tolerant normalization instead of validation errors
//! - Atomic file writes (temp file + rename)

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::text::{
    WrapOptions, DEFAULT_MAX_CHARS_PER_LINE, DEFAULT_MAX_LINES, DEFAULT_MEASURE_CACHE_CAPACITY,
};
use crate::core::{CoreResult, FontDescriptor, TimeMs};

/// Default crossfade window around caption edges
pub const DEFAULT_TRANSITION_WINDOW_MS: TimeMs = 200;

const MAX_CHARS_PER_LINE_LIMIT: usize = 500;
const MAX_LINES_LIMIT: usize = 20;
const TRANSITION_WINDOW_LIMIT_MS: TimeMs = 10_000;
const CACHE_CAPACITY_LIMIT: usize = 1_000_000;

/// Caption engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    /// Character budget per line when no pixel width is set
    #[serde(default = "default_max_chars_per_line")]
    pub max_chars_per_line: usize,

    /// Lines kept before truncating
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Pixel budget per line; enables measured wrapping together with `font`
    #[serde(default)]
    pub max_width_px: Option<f64>,

    /// Font descriptor handed to the measurer
    #[serde(default)]
    pub font: Option<FontDescriptor>,

    /// Fade length at caption edges, and neighbour lookahead
    #[serde(default = "default_transition_window_ms")]
    pub transition_window_ms: TimeMs,

    /// Entries kept in the measurement cache
    #[serde(default = "default_measure_cache_capacity")]
    pub measure_cache_capacity: usize,
}

fn default_max_chars_per_line() -> usize {
    DEFAULT_MAX_CHARS_PER_LINE
}

fn default_max_lines() -> usize {
    DEFAULT_MAX_LINES
}

fn default_transition_window_ms() -> TimeMs {
    DEFAULT_TRANSITION_WINDOW_MS
}

fn default_measure_cache_capacity() -> usize {
    DEFAULT_MEASURE_CACHE_CAPACITY
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_chars_per_line: default_max_chars_per_line(),
            max_lines: default_max_lines(),
            max_width_px: None,
            font: None,
            transition_window_ms: default_transition_window_ms(),
            measure_cache_capacity: default_measure_cache_capacity(),
        }
    }
}

impl EngineSettings {
    /// Normalize values into supported ranges.
    ///
    /// Out-of-range values are corrected rather than rejected, so an old or
    /// hand-edited file still produces a usable engine.
    pub fn normalize(&mut self) {
        self.max_chars_per_line = self
            .max_chars_per_line
            .clamp(1, MAX_CHARS_PER_LINE_LIMIT);
        self.max_lines = self.max_lines.clamp(1, MAX_LINES_LIMIT);
        self.transition_window_ms = self
            .transition_window_ms
            .clamp(0, TRANSITION_WINDOW_LIMIT_MS);
        self.measure_cache_capacity = self.measure_cache_capacity.clamp(1, CACHE_CAPACITY_LIMIT);

        self.max_width_px = self.max_width_px.filter(|w| w.is_finite() && *w > 0.0);

        self.font = self
            .font
            .take()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
    }

    /// Returns a normalized copy
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Line-breaking options derived from these settings
    pub fn wrap_options(&self) -> WrapOptions {
        WrapOptions {
            max_chars_per_line: self.max_chars_per_line,
            max_lines: self.max_lines,
            max_width_px: self.max_width_px,
            font: self.font.clone(),
        }
    }

    /// Load settings from a JSON file, returning defaults if it is missing or invalid
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("Settings file {:?} not found, using defaults", path);
            return Self::default();
        }

        match Self::read(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings from {:?}, using defaults: {}", path, e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path)?;
        let settings = serde_json::from_str::<Self>(&content)?;
        Ok(settings.normalized())
    }

    /// Save settings as pretty JSON using an atomic write (temp file + rename)
    ///
    /// Returns the normalized settings that were written.
    pub fn save(&self, path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let normalized = self.clone().normalized();
        let content = serde_json::to_string_pretty(&normalized)?;

        let temp_path = path.with_extension("json.tmp");
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        if cfg!(windows) && path.exists() {
            // rename does not overwrite on Windows
            fs::remove_file(path)?;
        }
        fs::rename(&temp_path, path)?;

        info!("Settings saved to {:?}", path);
        Ok(normalized)
    }
}

// =============================================================================
// Tests
// =============================================================================
