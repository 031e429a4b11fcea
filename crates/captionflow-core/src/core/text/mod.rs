//! Text Layout Module
//!
//! Measures caption text and breaks it into display lines.
//!
//! - `cache.rs`   - LRU cache of (font, text) widths
//! - `measure.rs` - host measurer capability and cached metrics
//! - `wrap.rs`    - greedy line breaking in character or pixel mode
//!
//! # Example
//!
//! ```rust,ignore
//! use captionflow_core::core::text::{tokenize_text, wrap, TextMetrics, WrapOptions};
//!
//! let metrics = TextMetrics::approximate(5000);
//! let result = wrap(tokenize_text("Hello world"), &WrapOptions::default(), &metrics);
//! assert_eq!(result.texts(), vec!["Hello world"]);
//! ```

mod cache;
mod measure;
mod wrap;

pub use cache::{CacheStats, MeasureKey, TextMeasureCache, DEFAULT_MEASURE_CACHE_CAPACITY};
pub use measure::{
    approximate_width, FixedAdvanceMeasurer, TextMeasurer, TextMetrics, APPROXIMATE_CHAR_WIDTH_PX,
};
pub use wrap::{
    tokenize_text, word_tokens, wrap, Token, WrapOptions, WrapResult, WrappedLine,
    DEFAULT_MAX_CHARS_PER_LINE, DEFAULT_MAX_LINES, ELLIPSIS,
};
