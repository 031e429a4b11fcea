//! Caption Format Parsers and Exporters
//!
//! Supports parsing and exporting captions in:
//! - SRT (SubRip)
//! - VTT (WebVTT)
//!
//! Parsing is tolerant: a cue block without a valid time line, or whose text
//! is empty after cleanup, is skipped instead of failing the file.
//!
//! # Example
//!
//! ```rust,ignore
//! use captionflow_core::core::captions::{parse_srt, export_vtt};
//!
//! let srt_content = std::fs::read_to_string("subtitles.srt")?;
//! let segments = parse_srt(&srt_content);
//! let vtt_content = export_vtt(&segments);
//! ```

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::CaptionSegment;
use crate::core::{ParseError, TimeMs};

// =============================================================================
// Patterns
// =============================================================================

static TIMECODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})(?:[.,](\d{1,3}))?$").expect("static timecode pattern")
});

static TIME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|\s)(\d{1,2}:\d{2}:\d{2}(?:[.,]\d{1,3})?)\s*-->\s*(\d{1,2}:\d{2}:\d{2}(?:[.,]\d{1,3})?)(?:\s|$)",
    )
    .expect("static time line pattern")
});

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static tag pattern"));

static VOICE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?v(?:[\s.][^>]*)?>").expect("static voice tag pattern"));

static SHORT_VTT_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[\s>])(\d{2}:\d{2}\.\d{1,3})\b").expect("static short timestamp pattern")
});

// =============================================================================
// Text Normalization
// =============================================================================

/// Removes a leading byte-order mark and converts CRLF/CR line endings to LF
pub fn normalize_source(content: &str) -> String {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Collapses runs of whitespace into single spaces and trims both ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips markup-like `<...>` tags
fn strip_tags(text: &str) -> String {
    MARKUP_TAG.replace_all(text, "").into_owned()
}

// =============================================================================
// Timecodes
// =============================================================================

/// Parses a timecode (`H:MM:SS`, `HH:MM:SS,mmm` or `HH:MM:SS.mmm`) into milliseconds
///
/// Fractions shorter than three digits are right-padded, so `"00:00:01.5"`
/// is 1500 ms.
pub fn parse_timecode(ts: &str) -> Result<TimeMs, ParseError> {
    let trimmed = ts.trim();
    let invalid = || ParseError::InvalidTimecode(trimmed.to_string());

    let caps = TIMECODE.captures(trimmed).ok_or_else(invalid)?;
    let field = |i: usize| -> Result<TimeMs, ParseError> {
        caps[i].parse::<TimeMs>().map_err(|_| invalid())
    };

    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    let millis = match caps.get(4) {
        Some(m) => format!("{:0<3}", m.as_str())
            .parse::<TimeMs>()
            .map_err(|_| invalid())?,
        None => 0,
    };

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1000 + millis)
}

/// Formats milliseconds as `HH:MM:SS{separator}mmm`. Negative input clamps to zero.
pub fn format_timecode(ms: TimeMs, separator: char) -> String {
    let total_ms = ms.max(0);
    let millis = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, mins, secs, separator, millis
    )
}

/// Finds `start --> end` in a line; trailing cue settings are ignored
fn parse_time_line(line: &str) -> Option<(TimeMs, TimeMs)> {
    let caps = TIME_LINE.captures(line)?;
    let start = parse_timecode(&caps[1]).ok()?;
    let end = parse_timecode(&caps[2]).ok()?;
    Some((start, end))
}

// =============================================================================
// SRT Format
// =============================================================================

/// Parses SRT (SubRip) content into caption segments
///
/// # SRT Format
///
/// ```text
/// 1
/// 00:00:01,000 --> 00:00:04,000
/// First caption text
///
/// 2
/// 00:00:05,500 --> 00:00:08,000
/// Second caption text
/// with multiple lines
/// ```
///
/// Multi-line cue text is joined with single spaces.
pub fn parse_srt(content: &str) -> Vec<CaptionSegment> {
    let normalized = normalize_source(content);
    parse_cue_blocks(&normalized)
}

/// Shared cue-body parser for SRT and preprocessed VTT
fn parse_cue_blocks(normalized: &str) -> Vec<CaptionSegment> {
    let mut segments = Vec::new();
    let mut skipped = 0usize;

    for block in split_blocks(normalized) {
        match parse_cue_block(&block) {
            Some(segment) => segments.push(segment),
            None => {
                skipped += 1;
                debug!(
                    "Skipping cue block: {:?}",
                    block.first().copied().unwrap_or_default()
                );
            }
        }
    }

    debug!(
        "Parsed {} cue(s), skipped {} block(s)",
        segments.len(),
        skipped
    );
    segments
}

/// Splits content into blank-line separated blocks of lines
fn split_blocks(normalized: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in normalized.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn parse_cue_block(lines: &[&str]) -> Option<CaptionSegment> {
    let (time_idx, (start_ms, end_ms)) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| parse_time_line(line).map(|span| (i, span)))?;

    let joined = lines[time_idx + 1..].join(" ");
    let text = collapse_whitespace(&strip_tags(&joined));
    if text.is_empty() {
        return None;
    }

    Some(CaptionSegment::new(start_ms, end_ms, &text))
}

/// Exports segments to SRT format
pub fn export_srt(segments: &[CaptionSegment]) -> String {
    let mut output = String::new();

    for (index, segment) in segments.iter().enumerate() {
        output.push_str(&format!("{}\n", index + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_timecode(segment.start_ms, ','),
            format_timecode(segment.end_ms, ',')
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output.trim_end().to_string()
}

// =============================================================================
// VTT Format
// =============================================================================

/// Parses WebVTT content into caption segments
///
/// # VTT Format
///
/// ```text
/// WEBVTT
/// Kind: captions
/// Language: en
///
/// intro
/// 00:00:01.000 --> 00:00:04.000 align:start
/// <v Narrator>First caption text</v>
/// ```
///
/// The header block, `NOTE`/`STYLE`/`REGION` blocks and cue identifiers are
/// dropped, voice tags are stripped, and the remaining cues go through the
/// SRT cue parser.
pub fn parse_vtt(content: &str) -> Vec<CaptionSegment> {
    let normalized = normalize_source(content);
    let prepared = prepare_vtt(&normalized);
    parse_cue_blocks(&prepared)
}

fn prepare_vtt(normalized: &str) -> String {
    let mut kept: Vec<String> = Vec::new();

    for (i, block) in split_blocks(normalized).into_iter().enumerate() {
        let head = block[0].trim_start();
        if i == 0 && head.starts_with("WEBVTT") {
            continue;
        }
        if head.starts_with("NOTE") || head.starts_with("STYLE") || head.starts_with("REGION") {
            continue;
        }

        // Cue identifiers sit above the time line
        let body = match block.iter().position(|l| l.contains("-->")) {
            Some(time_idx) => &block[time_idx..],
            None => &block[..],
        };

        let text = body
            .iter()
            .map(|line| {
                if line.contains("-->") {
                    SHORT_VTT_TIMESTAMP
                        .replace_all(line, "${1}00:${2}")
                        .into_owned()
                } else {
                    VOICE_TAG.replace_all(line, "").into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        kept.push(text);
    }

    kept.join("\n\n")
}

/// Exports segments to WebVTT format
pub fn export_vtt(segments: &[CaptionSegment]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for segment in segments {
        output.push_str(&format!(
            "{} --> {}\n",
            format_timecode(segment.start_ms, '.'),
            format_timecode(segment.end_ms, '.')
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output.trim_end().to_string()
}

// =============================================================================
// Tests
// =============================================================================
