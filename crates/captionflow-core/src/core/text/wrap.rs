//! Line Breaking
//!
//! Greedy line packing over generic tokens. Each line takes the longest run
//! of tokens that fits, found by binary search over the run end; this is
//! valid because adding a token never makes a run fit better.
//!
//! Two fit predicates exist:
//! - character count: token lengths plus single spaces against `max_chars_per_line`
//! - pixels: the measured width of the space-joined run against `max_width_px`
//!
//! A token that does not fit on a line by itself is cut and suffixed with an
//! ellipsis. Payloads travel with their tokens, so callers can map rendered
//! lines back to word timing.

use serde::{Deserialize, Serialize};

use super::measure::TextMetrics;
use crate::core::captions::{collapse_whitespace, WordTimestamp};
use crate::core::FontDescriptor;

/// Glyph appended to hard-truncated tokens
pub const ELLIPSIS: &str = "…";

pub const DEFAULT_MAX_CHARS_PER_LINE: usize = 28;

pub const DEFAULT_MAX_LINES: usize = 2;

// =============================================================================
// Tokens & Options
// =============================================================================

/// Display text plus an opaque payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token<P> {
    pub display_text: String,
    pub payload: P,
}

impl<P> Token<P> {
    pub fn new(display_text: impl Into<String>, payload: P) -> Self {
        Self {
            display_text: display_text.into(),
            payload,
        }
    }
}

/// Splits caption text on whitespace into payload-free tokens
pub fn tokenize_text(text: &str) -> Vec<Token<()>> {
    text.split_whitespace().map(|w| Token::new(w, ())).collect()
}

/// One token per timed word, carrying the word timing as payload
pub fn word_tokens(words: &[WordTimestamp]) -> Vec<Token<WordTimestamp>> {
    words
        .iter()
        .map(|w| Token::new(w.word.as_str(), w.clone()))
        .collect()
}

/// Wrapping limits
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapOptions {
    pub max_chars_per_line: usize,
    pub max_lines: usize,
    /// Pixel budget; only used together with `font`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width_px: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontDescriptor>,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            max_chars_per_line: DEFAULT_MAX_CHARS_PER_LINE,
            max_lines: DEFAULT_MAX_LINES,
            max_width_px: None,
            font: None,
        }
    }
}

impl WrapOptions {
    pub fn with_max_chars(mut self, max_chars_per_line: usize) -> Self {
        self.max_chars_per_line = max_chars_per_line;
        self
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Enables pixel mode
    pub fn with_pixel_width(mut self, max_width_px: f64, font: impl Into<String>) -> Self {
        self.max_width_px = Some(max_width_px);
        self.font = Some(font.into());
        self
    }

    /// Returns true if both a positive pixel budget and a font are set
    pub fn is_pixel_mode(&self) -> bool {
        self.max_width_px.is_some_and(|w| w > 0.0) && self.font.is_some()
    }
}

// =============================================================================
// Results
// =============================================================================

/// One display line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedLine<P> {
    pub tokens: Vec<Token<P>>,
    /// True when the line is a single token cut to fit
    pub hard_truncated: bool,
}

impl<P> WrappedLine<P> {
    /// Tokens joined with single spaces
    pub fn text(&self) -> String {
        join_run(&self.tokens)
    }
}

/// Output of [`wrap`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapResult<P> {
    pub lines: Vec<WrappedLine<P>>,
    /// True when tokens were left over after `max_lines`
    pub was_truncated: bool,
}

impl<P> WrapResult<P> {
    pub fn texts(&self) -> Vec<String> {
        self.lines.iter().map(WrappedLine::text).collect()
    }
}

// =============================================================================
// Fit Predicates
// =============================================================================

enum FitMode<'a> {
    Chars(usize),
    Pixels {
        max_width: f64,
        font: &'a str,
        metrics: &'a TextMetrics,
    },
}

impl<'a> FitMode<'a> {
    fn select(options: &'a WrapOptions, metrics: &'a TextMetrics) -> Self {
        if !options.is_pixel_mode() {
            return Self::Chars(options.max_chars_per_line);
        }
        match (options.max_width_px, options.font.as_deref()) {
            (Some(max_width), Some(font)) => Self::Pixels {
                max_width,
                font,
                metrics,
            },
            _ => Self::Chars(options.max_chars_per_line),
        }
    }

    fn fits_run<P>(&self, run: &[Token<P>]) -> bool {
        match self {
            Self::Chars(max) => {
                let letters: usize = run.iter().map(|t| t.display_text.chars().count()).sum();
                letters + run.len().saturating_sub(1) <= *max
            }
            Self::Pixels { .. } => self.fits_text(&join_run(run)),
        }
    }

    fn fits_text(&self, text: &str) -> bool {
        match self {
            Self::Chars(max) => text.chars().count() <= *max,
            Self::Pixels {
                max_width,
                font,
                metrics,
            } => metrics.width(text, font) <= *max_width,
        }
    }

    /// Cuts `text` so that the kept prefix plus the ellipsis fits
    fn truncate(&self, text: &str) -> String {
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();

        let kept = match self {
            Self::Chars(max) => char_prefix(text, &boundaries, max.saturating_sub(1)),
            Self::Pixels { .. } => {
                let (mut lo, mut hi) = (0usize, boundaries.len().saturating_sub(2));
                while lo < hi {
                    let mid = lo + (hi - lo + 1) / 2;
                    let candidate = char_prefix(text, &boundaries, mid);
                    if self.fits_text(&format!("{}{}", candidate, ELLIPSIS)) {
                        lo = mid;
                    } else {
                        hi = mid - 1;
                    }
                }
                char_prefix(text, &boundaries, lo)
            }
        };

        format!("{}{}", kept, ELLIPSIS)
    }
}

/// First `chars` characters of `text`, right-trimmed
fn char_prefix<'t>(text: &'t str, boundaries: &[usize], chars: usize) -> &'t str {
    let end = boundaries[chars.min(boundaries.len() - 1)];
    text[..end].trim_end()
}

fn join_run<P>(run: &[Token<P>]) -> String {
    run.iter()
        .map(|t| t.display_text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Wrapping
// =============================================================================

enum Planned {
    Run(usize),
    Truncated(String),
}

/// Packs tokens into at most `options.max_lines` lines
///
/// Token text is whitespace-collapsed first and empty tokens are dropped.
pub fn wrap<P>(
    tokens: impl IntoIterator<Item = Token<P>>,
    options: &WrapOptions,
    metrics: &TextMetrics,
) -> WrapResult<P> {
    let tokens: Vec<Token<P>> = tokens
        .into_iter()
        .filter_map(|mut token| {
            token.display_text = collapse_whitespace(&token.display_text);
            (!token.display_text.is_empty()).then_some(token)
        })
        .collect();

    let mode = FitMode::select(options, metrics);
    let total = tokens.len();
    let mut plan = Vec::new();
    let mut cursor = 0;

    while cursor < total && plan.len() < options.max_lines {
        if !mode.fits_run(&tokens[cursor..cursor + 1]) {
            plan.push(Planned::Truncated(mode.truncate(&tokens[cursor].display_text)));
            cursor += 1;
            continue;
        }

        // Largest end in (cursor, total] whose run still fits
        let (mut lo, mut hi) = (cursor + 1, total);
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if mode.fits_run(&tokens[cursor..mid]) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }

        plan.push(Planned::Run(lo - cursor));
        cursor = lo;
    }

    let was_truncated = cursor < total;
    let mut remaining = tokens.into_iter();
    let lines = plan
        .into_iter()
        .filter_map(|planned| match planned {
            Planned::Run(count) => Some(WrappedLine {
                tokens: remaining.by_ref().take(count).collect(),
                hard_truncated: false,
            }),
            Planned::Truncated(text) => remaining.next().map(|mut token| {
                token.display_text = text;
                WrappedLine {
                    tokens: vec![token],
                    hard_truncated: true,
                }
            }),
        })
        .collect();

    WrapResult {
        lines,
        was_truncated,
    }
}

// =============================================================================
// Tests
// =============================================================================
