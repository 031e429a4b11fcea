//! Subtitle Ingestion
//!
//! Turns raw subtitle bytes into an ordered list of [`CaptionSegment`]s.
//!
//! - SRT and VTT go through the tolerant cue parsers in `formats`
//! - JSON accepts segment arrays, word arrays, or `{ "words": [...] }`
//! - Bare word timing is grouped into segments by [`group_words`]

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::formats::{collapse_whitespace, normalize_source, parse_srt, parse_vtt};
use super::{CaptionSegment, WordTimestamp};
use crate::core::{CoreResult, ParseError, TimeMs};

// =============================================================================
// Grouping Limits
// =============================================================================

/// Maximum words in one grouped segment
pub const MAX_WORDS_PER_GROUP: usize = 7;

/// Maximum span of one grouped segment
pub const MAX_GROUP_SPAN_MS: TimeMs = 2500;

// =============================================================================
// Format Detection
// =============================================================================

/// Supported subtitle source formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleFormat {
    /// SubRip (.srt)
    Srt,
    /// WebVTT (.vtt)
    Vtt,
    /// Segment or word timing as JSON (.json)
    Json,
}

impl SubtitleFormat {
    /// Resolves a file extension, case-insensitively, with or without a leading dot
    pub fn from_extension(ext: &str) -> Result<Self, ParseError> {
        let normalized = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            "json" => Ok(Self::Json),
            _ => Err(ParseError::UnsupportedExtension(ext.to_string())),
        }
    }

    /// Resolves the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ParseError::UnsupportedExtension(path.display().to_string()))?;
        Self::from_extension(ext)
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Json => "json",
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Parses raw subtitle bytes in the given format
///
/// Invalid UTF-8 is replaced rather than rejected. Malformed SRT/VTT cue
/// blocks are skipped; only JSON of an unsupported shape fails the load.
pub fn load(raw: &[u8], format: SubtitleFormat) -> Result<Vec<CaptionSegment>, ParseError> {
    let content = String::from_utf8_lossy(raw);

    let segments = match format {
        SubtitleFormat::Srt => parse_srt(&content),
        SubtitleFormat::Vtt => parse_vtt(&content),
        SubtitleFormat::Json => parse_json(&content)?,
    };

    debug!(
        "Loaded {} segment(s) from {:?} source ({} bytes)",
        segments.len(),
        format,
        raw.len()
    );
    Ok(segments)
}

/// Reads a subtitle file and parses it according to its extension
pub fn load_file(path: impl AsRef<Path>) -> CoreResult<Vec<CaptionSegment>> {
    let path = path.as_ref();
    let format = SubtitleFormat::from_path(path)?;
    let raw = std::fs::read(path)?;
    Ok(load(&raw, format)?)
}

// =============================================================================
// JSON Sources
// =============================================================================

/// The three accepted JSON layouts
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonSource {
    Segments(Vec<CaptionSegment>),
    Words(Vec<WordTimestamp>),
    WordList { words: Vec<WordTimestamp> },
}

/// Parses JSON caption data
pub fn parse_json(content: &str) -> Result<Vec<CaptionSegment>, ParseError> {
    let normalized = normalize_source(content);

    let source: JsonSource = serde_json::from_str(&normalized).map_err(|e| {
        ParseError::UnsupportedFormat(format!(
            "expected a segment array, a word array or {{\"words\": [...]}} ({})",
            e
        ))
    })?;

    let segments = match source {
        JsonSource::Segments(segments) => segments.into_iter().map(clean_segment).collect(),
        JsonSource::Words(words) | JsonSource::WordList { words } => {
            group_words(clean_words(words))
        }
    };

    Ok(segments)
}

fn clean_segment(mut segment: CaptionSegment) -> CaptionSegment {
    segment.text = collapse_whitespace(&segment.text);
    if let Some(words) = segment.words.take() {
        let words = clean_words(words);
        warn_if_unsorted(&words);
        segment.words = Some(words);
    }
    segment
}

fn clean_words(words: Vec<WordTimestamp>) -> Vec<WordTimestamp> {
    words
        .into_iter()
        .filter_map(|mut w| {
            w.word = collapse_whitespace(&w.word);
            (!w.word.is_empty()).then_some(w)
        })
        .collect()
}

fn warn_if_unsorted(words: &[WordTimestamp]) {
    if words.windows(2).any(|pair| pair[0].start_ms > pair[1].start_ms) {
        warn!(
            "Word timing is not ascending by start time ({} words); word lookups assume sorted input",
            words.len()
        );
    }
}

// =============================================================================
// Word Grouping
// =============================================================================

/// Groups bare word timing into caption segments
///
/// Scans forward once. The buffer is flushed before adding a word when the
/// word would push it past [`MAX_WORDS_PER_GROUP`] words or
/// [`MAX_GROUP_SPAN_MS`], or when the last buffered word ends a sentence.
pub fn group_words(words: Vec<WordTimestamp>) -> Vec<CaptionSegment> {
    warn_if_unsorted(&words);

    let mut segments = Vec::new();
    let mut buffer: Vec<WordTimestamp> = Vec::new();

    for word in words {
        if let (Some(first), Some(last)) = (buffer.first(), buffer.last()) {
            let too_many = buffer.len() + 1 > MAX_WORDS_PER_GROUP;
            let too_long = word.end_ms.saturating_sub(first.start_ms) > MAX_GROUP_SPAN_MS;
            if too_many || too_long || last.ends_sentence() {
                segments.extend(CaptionSegment::from_words(std::mem::take(&mut buffer)));
            }
        }
        buffer.push(word);
    }
    segments.extend(CaptionSegment::from_words(buffer));

    segments
}

// =============================================================================
// Tests
// =============================================================================
