//! CaptionFlow Core Library
//!
//! Caption timing and layout engine for video composition.
//! Loads SRT, WebVTT and JSON captions, answers "which caption is on screen
//! at `t`?", measures text through a cached host measurer and breaks caption
//! text into display lines.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use captionflow_core::{load_file, CaptionEngine, EngineSettings, IndexedCaptionSet};
//!
//! let captions = IndexedCaptionSet::new(load_file("talk.srt")?);
//! let engine = CaptionEngine::approximate(EngineSettings::default());
//! let frame = engine.frame_at(&captions, 1_500);
//! ```

pub mod core;

pub use crate::core::captions::{
    export_srt, export_vtt, load, load_file, CaptionSegment, SubtitleFormat, WordTimestamp,
};
pub use crate::core::engine::{CaptionEngine, CaptionFrame};
pub use crate::core::settings::EngineSettings;
pub use crate::core::text::{wrap, TextMeasurer, TextMetrics, WrapOptions, WrapResult};
pub use crate::core::timing::{
    get_active, get_active_word_index, get_adjacent_captions, get_transition_progress,
    IndexedCaptionSet,
};
pub use crate::core::{CoreError, CoreResult, ParseError, TimeMs, Timed};
