//! Caption Engine
//!
//! Per-frame facade used by the renderer. Bundles the settings with a shared
//! [`TextMetrics`] and turns `(captions, t)` into everything needed to draw
//! one frame.
//!
//! ```text
//! ┌──────────────────┐    ┌────────────────┐    ┌─────────────────┐
//! │ IndexedCaptionSet│───▶│ timing lookups │───▶│                 │
//! └──────────────────┘    └────────────────┘    │  CaptionFrame   │
//! ┌──────────────────┐    ┌────────────────┐    │                 │
//! │  EngineSettings  │───▶│ wrap + metrics │───▶│                 │
//! └──────────────────┘    └────────────────┘    └─────────────────┘
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::captions::CaptionSegment;
use crate::core::settings::EngineSettings;
use crate::core::text::{
    tokenize_text, wrap, CacheStats, TextMeasurer, TextMetrics, Token, WrapResult,
};
use crate::core::timing::{
    get_active_word_index, get_adjacent_captions, get_transition_progress, IndexedCaptionSet,
    TransitionDirection,
};
use crate::core::TimeMs;

// =============================================================================
// Frame
// =============================================================================

/// Everything the renderer needs for one timestamp
///
/// Line token payloads are indices into the current segment's words, or
/// `None` when the segment has no word timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionFrame {
    pub time_ms: TimeMs,
    pub current_index: Option<usize>,
    pub current: Option<CaptionSegment>,
    pub previous_index: Option<usize>,
    pub previous: Option<CaptionSegment>,
    pub next_index: Option<usize>,
    pub next: Option<CaptionSegment>,
    /// Fade-in progress of the current segment, 0.0 without one
    pub fade_in: f64,
    /// Fade-out progress of the current segment, 0.0 without one
    pub fade_out: f64,
    pub layout: WrapResult<Option<usize>>,
    /// Index into the current segment's words
    pub active_word_index: Option<usize>,
}

impl CaptionFrame {
    /// Returns true if a segment is on screen
    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    /// Combined opacity of the current segment
    pub fn opacity(&self) -> f64 {
        self.fade_in.min(self.fade_out)
    }

    /// Index of the rendered line holding the active word
    pub fn active_line_index(&self) -> Option<usize> {
        let word = self.active_word_index?;
        self.layout
            .lines
            .iter()
            .position(|line| line.tokens.iter().any(|t| t.payload == Some(word)))
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Caption timing and layout engine
#[derive(Debug)]
pub struct CaptionEngine {
    settings: EngineSettings,
    metrics: Arc<TextMetrics>,
}

impl CaptionEngine {
    /// Creates an engine; settings are normalized first
    pub fn new(settings: EngineSettings, measurer: Option<Arc<dyn TextMeasurer>>) -> Self {
        let settings = settings.normalized();
        let metrics = Arc::new(TextMetrics::new(measurer, settings.measure_cache_capacity));
        Self { settings, metrics }
    }

    /// Creates an engine without a host measurer
    pub fn approximate(settings: EngineSettings) -> Self {
        Self::new(settings, None)
    }

    /// Creates an engine sharing existing metrics (and their cache)
    pub fn with_metrics(settings: EngineSettings, metrics: Arc<TextMetrics>) -> Self {
        Self {
            settings: settings.normalized(),
            metrics,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<TextMetrics> {
        &self.metrics
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.metrics.stats()
    }

    /// Wraps arbitrary text under the configured options
    pub fn layout_text(&self, text: &str) -> WrapResult<()> {
        wrap(
            tokenize_text(text),
            &self.settings.wrap_options(),
            &self.metrics,
        )
    }

    /// Wraps a segment, keeping word indices on the tokens when word timing exists
    pub fn layout_segment(&self, segment: &CaptionSegment) -> WrapResult<Option<usize>> {
        let options = self.settings.wrap_options();
        match segment.words.as_deref() {
            Some(words) if !words.is_empty() => {
                let tokens = words
                    .iter()
                    .enumerate()
                    .map(|(i, w)| Token::new(w.word.as_str(), Some(i)));
                wrap(tokens, &options, &self.metrics)
            }
            _ => {
                let tokens = segment
                    .text
                    .split_whitespace()
                    .map(|w| Token::new(w, None));
                wrap(tokens, &options, &self.metrics)
            }
        }
    }

    /// Resolves the frame at `t`
    pub fn frame_at(&self, set: &IndexedCaptionSet<CaptionSegment>, t: TimeMs) -> CaptionFrame {
        let window = self.settings.transition_window_ms;
        let adjacent = get_adjacent_captions(set, t, window);

        let (fade_in, fade_out, layout, active_word_index) = match adjacent.current {
            Some(current) => (
                get_transition_progress(current, t, window, TransitionDirection::In),
                get_transition_progress(current, t, window, TransitionDirection::Out),
                self.layout_segment(current),
                get_active_word_index(current.word_slice(), t),
            ),
            None => (
                0.0,
                0.0,
                WrapResult {
                    lines: Vec::new(),
                    was_truncated: false,
                },
                None,
            ),
        };

        debug!(
            "Frame at {}ms: current={:?} previous={:?} next={:?}",
            t, adjacent.current_index, adjacent.previous_index, adjacent.next_index
        );

        CaptionFrame {
            time_ms: t,
            current_index: adjacent.current_index,
            current: adjacent.current.cloned(),
            previous_index: adjacent.previous_index,
            previous: adjacent.previous.cloned(),
            next_index: adjacent.next_index,
            next: adjacent.next.cloned(),
            fade_in,
            fade_out,
            layout,
            active_word_index,
        }
    }
}

impl Default for CaptionEngine {
    fn default() -> Self {
        Self::approximate(EngineSettings::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
