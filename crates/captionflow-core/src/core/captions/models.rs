//! Caption Data Models
//!
//! Defines the caption segment and word timestamp records produced by
//! ingestion and consumed by the timing index and the line breaker.
//!
//! Both records serialize with camelCase keys, matching the JSON shapes
//! accepted on input.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use crate::core::{TimeMs, Timed};

// =============================================================================
// Word Timestamp
// =============================================================================

/// Timing for a single spoken word
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordTimestamp {
    /// Start time in milliseconds (inclusive)
    #[serde(alias = "start_ms", deserialize_with = "deserialize_ms")]
    pub start_ms: TimeMs,
    /// End time in milliseconds (exclusive)
    #[serde(alias = "end_ms", deserialize_with = "deserialize_ms")]
    pub end_ms: TimeMs,
    /// The word as displayed
    pub word: String,
}

impl WordTimestamp {
    /// Creates a new word timestamp
    pub fn new(start_ms: TimeMs, end_ms: TimeMs, word: &str) -> Self {
        Self {
            start_ms,
            end_ms,
            word: word.to_string(),
        }
    }

    /// Returns true if the word closes a sentence
    pub fn ends_sentence(&self) -> bool {
        self.word.trim_end().ends_with(['.', '!', '?', '…'])
    }
}

impl Timed for WordTimestamp {
    fn start_ms(&self) -> TimeMs {
        self.start_ms
    }

    fn end_ms(&self) -> TimeMs {
        self.end_ms
    }
}

// =============================================================================
// Caption Segment
// =============================================================================

/// A time-bounded span of caption text
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionSegment {
    /// Start time in milliseconds (inclusive)
    #[serde(alias = "start_ms", deserialize_with = "deserialize_ms")]
    pub start_ms: TimeMs,
    /// End time in milliseconds (exclusive)
    #[serde(alias = "end_ms", deserialize_with = "deserialize_ms")]
    pub end_ms: TimeMs,
    /// Display text, single line, whitespace collapsed
    pub text: String,
    /// Optional per-word timing in original input order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordTimestamp>>,
}

impl CaptionSegment {
    /// Creates a new segment without word timing
    pub fn new(start_ms: TimeMs, end_ms: TimeMs, text: &str) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.to_string(),
            words: None,
        }
    }

    /// Builds a segment spanning a run of words.
    ///
    /// Returns `None` for an empty run.
    pub fn from_words(words: Vec<WordTimestamp>) -> Option<Self> {
        let first = words.first()?;
        let last = words.last()?;
        let text = words
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Some(Self {
            start_ms: first.start_ms,
            end_ms: last.end_ms,
            text,
            words: Some(words),
        })
    }

    /// Returns true if the span can ever be active
    pub fn is_meaningful(&self) -> bool {
        self.start_ms < self.end_ms
    }

    /// Word timing, empty when the segment has none
    pub fn word_slice(&self) -> &[WordTimestamp] {
        self.words.as_deref().unwrap_or(&[])
    }
}

impl Timed for CaptionSegment {
    fn start_ms(&self) -> TimeMs {
        self.start_ms
    }

    fn end_ms(&self) -> TimeMs {
        self.end_ms
    }
}

/// Largest timestamp magnitude accepted from JSON sources
pub const MAX_SOURCE_TIMESTAMP_MS: TimeMs = TimeMs::MAX / 2;

/// Accepts integer or real JSON numbers, rounding reals to the nearest millisecond
///
/// Values beyond [`MAX_SOURCE_TIMESTAMP_MS`] are rejected, so span arithmetic
/// on loaded timing stays in range.
fn deserialize_ms<'de, D>(deserializer: D) -> Result<TimeMs, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(D::Error::custom("timestamp must be a finite number"));
    }
    let rounded = value.round();
    if rounded.abs() > MAX_SOURCE_TIMESTAMP_MS as f64 {
        return Err(D::Error::custom(format!(
            "timestamp {} is out of range",
            value
        )));
    }
    Ok(rounded as TimeMs)
}

// =============================================================================
// Tests
// =============================================================================
