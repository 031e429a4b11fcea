//! Caption System Module
//!
//! Subtitle ingestion and normalization:
//! - Caption data models (CaptionSegment, WordTimestamp)
//! - SRT and VTT parsing and export
//! - JSON segment/word sources and word grouping
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Caption System                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  models.rs     - Data structures (CaptionSegment, WordTimestamp)│
//! │  formats.rs    - Timecodes, SRT/VTT parsing and export          │
//! │  ingest.rs     - Format detection, JSON sources, word grouping  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use captionflow_core::core::captions::{load_file, export_vtt};
//!
//! let segments = load_file("subtitles.srt")?;
//! let vtt_content = export_vtt(&segments);
//! ```

mod formats;
mod ingest;
mod models;

// Re-export models
pub use models::{CaptionSegment, WordTimestamp, MAX_SOURCE_TIMESTAMP_MS};

// Re-export format functions
pub use formats::{
    collapse_whitespace, export_srt, export_vtt, format_timecode, normalize_source, parse_srt,
    parse_timecode, parse_vtt,
};

// Re-export ingestion
pub use ingest::{
    group_words, load, load_file, parse_json, SubtitleFormat, MAX_GROUP_SPAN_MS,
    MAX_WORDS_PER_GROUP,
};
