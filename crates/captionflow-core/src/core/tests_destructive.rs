//! Destructive and Edge Case Tests for the Caption Engine
//!
//! These tests verify the robustness of ingestion, lookups and layout against
//! hostile input, inverted spans and degenerate configuration.

use std::sync::Arc;

use crate::core::captions::{
    load, parse_json, parse_srt, parse_timecode, parse_vtt, CaptionSegment, SubtitleFormat,
    WordTimestamp,
};
use crate::core::engine::CaptionEngine;
use crate::core::settings::EngineSettings;
use crate::core::text::{
    tokenize_text, wrap, TextMeasureCache, TextMetrics, WrapOptions, ELLIPSIS,
};
use crate::core::timing::{
    get_active, get_active_word_index, get_adjacent_captions, get_transition_progress,
    IndexedCaptionSet, TransitionDirection,
};
use crate::core::{ParseError, Timed};

#[test]
fn test_destructive_binary_garbage_srt() {
    let mut raw = vec![0xFF, 0xFE, 0x00, 0x80];
    raw.extend_from_slice(b"\n\n1\n00:00:01,000 --> 00:00:02,000\nStill here\n");

    let segments = load(&raw, SubtitleFormat::Srt).unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, "Still here");
}

#[test]
fn test_destructive_malformed_blocks_skipped() {
    let srt = "1\n00:00:01,000 --> banana\nBroken\n\n\
               2\nno timing at all\n\n\
               3\n00:00:03,000 --> 00:00:04,000\n\n\
               4\n00:00:05,000 --> 00:00:06,000\nKept\n";

    let segments = parse_srt(srt);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].start_ms, 5000);
}

#[test]
fn test_destructive_empty_sources() {
    assert!(parse_srt("").is_empty());
    assert!(parse_vtt("").is_empty());
    assert!(parse_vtt("WEBVTT\n\n").is_empty());
    assert!(parse_json("[]").unwrap().is_empty());
}

#[test]
fn test_destructive_json_wrong_shape() {
    let err = parse_json(r#"{"captions": 42}"#).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedFormat(_)));

    let err = parse_json("not json at all").unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedFormat(_)));
}

#[test]
fn test_destructive_timecode_garbage() {
    for bad in ["", "::", "1:2:3", "aa:bb:cc", "00:00:01,0000", "-01:00:00,000"] {
        assert!(
            matches!(parse_timecode(bad), Err(ParseError::InvalidTimecode(_))),
            "expected {:?} to be rejected",
            bad
        );
    }
}

#[test]
fn test_destructive_huge_timestamp() {
    assert_eq!(parse_timecode("99:59:59,999").unwrap(), 359_999_999);

    let set = IndexedCaptionSet::new(vec![CaptionSegment::new(0, 359_999_999, "long")]);
    assert_eq!(get_active(&set, 359_999_998).index, Some(0));
    assert!(!get_active(&set, i64::MAX).is_found());
    assert!(!get_active(&set, i64::MIN).is_found());
}

#[test]
fn test_destructive_adjacent_at_time_extremes() {
    let set = IndexedCaptionSet::new(vec![
        CaptionSegment::new(0, 1000, "a"),
        CaptionSegment::new(1000, 2000, "b"),
    ]);

    for t in [i64::MIN, i64::MAX] {
        let adjacent = get_adjacent_captions(&set, t, 200);
        assert!(adjacent.current.is_none());
        assert!(adjacent.previous.is_none());
        assert!(adjacent.next.is_none());
    }

    let unsorted = IndexedCaptionSet::new(vec![
        CaptionSegment::new(1000, 2000, "b"),
        CaptionSegment::new(0, 1000, "a"),
    ]);
    assert_eq!(
        get_adjacent_captions(&unsorted, i64::MIN, i64::MAX).next_index,
        Some(1)
    );
    assert!(get_adjacent_captions(&unsorted, i64::MIN, 200).next.is_none());
}

#[test]
fn test_destructive_transition_at_time_extremes() {
    let item = CaptionSegment::new(-5, 1000, "edge");

    assert_eq!(get_transition_progress(&item, i64::MAX, 200, TransitionDirection::In), 1.0);
    assert_eq!(get_transition_progress(&item, i64::MAX, 200, TransitionDirection::Out), 0.0);
    assert_eq!(get_transition_progress(&item, i64::MIN, 200, TransitionDirection::In), 0.0);
    assert_eq!(get_transition_progress(&item, i64::MIN, 200, TransitionDirection::Out), 1.0);

    let wide = CaptionSegment::new(i64::MIN, i64::MAX, "everything");
    assert_eq!(get_transition_progress(&wide, i64::MAX, 200, TransitionDirection::In), 1.0);
    assert_eq!(get_transition_progress(&wide, i64::MIN, 200, TransitionDirection::Out), 1.0);
    assert_eq!(wide.duration_ms(), i64::MAX);
}

#[test]
fn test_destructive_inverted_and_empty_spans_never_active() {
    let set = IndexedCaptionSet::new(vec![
        CaptionSegment::new(1000, 500, "inverted"),
        CaptionSegment::new(2000, 2000, "empty"),
    ]);

    for t in [400, 500, 750, 1000, 2000] {
        let lookup = get_active(&set, t);
        assert!(!lookup.is_found());
        assert_eq!(lookup.index_or_sentinel(), -1);
    }
}

#[test]
fn test_destructive_lookup_on_empty_set() {
    let set: IndexedCaptionSet<CaptionSegment> = IndexedCaptionSet::new(Vec::new());
    assert!(!get_active(&set, 0).is_found());

    let adjacent = get_adjacent_captions(&set, 0, 1000);
    assert!(adjacent.current.is_none());
    assert!(adjacent.previous.is_none());
    assert!(adjacent.next.is_none());

    assert_eq!(get_active_word_index::<WordTimestamp>(&[], 0), None);
}

#[test]
fn test_destructive_overlapping_unsorted_first_match_wins() {
    let set = IndexedCaptionSet::new(vec![
        CaptionSegment::new(500, 3000, "late but wide"),
        CaptionSegment::new(0, 2000, "early"),
    ]);
    assert!(!set.is_sorted_ascending());
    assert_eq!(get_active(&set, 1000).index, Some(0));
    assert_eq!(get_active(&set, 100).index, Some(1));
}

#[test]
fn test_destructive_negative_window() {
    let set = IndexedCaptionSet::new(vec![
        CaptionSegment::new(0, 1000, "a"),
        CaptionSegment::new(1000, 2000, "b"),
    ]);
    let adjacent = get_adjacent_captions(&set, 1000, -100);
    assert_eq!(adjacent.current_index, Some(1));
    assert!(adjacent.previous.is_none());
    assert!(adjacent.next.is_none());
}

#[test]
fn test_destructive_wrap_zero_limits() {
    let metrics = TextMetrics::approximate(8);

    let options = WrapOptions::default().with_max_lines(0);
    let result = wrap(tokenize_text("anything here"), &options, &metrics);
    assert!(result.lines.is_empty());
    assert!(result.was_truncated);

    let options = WrapOptions::default().with_max_chars(0).with_max_lines(1);
    let result = wrap(tokenize_text("word"), &options, &metrics);
    assert_eq!(result.texts(), vec![ELLIPSIS]);
    assert!(result.lines[0].hard_truncated);
}

#[test]
fn test_destructive_wrap_whitespace_only() {
    let metrics = TextMetrics::approximate(8);
    let result = wrap(tokenize_text(" \t\n  "), &WrapOptions::default(), &metrics);
    assert!(result.lines.is_empty());
    assert!(!result.was_truncated);
}

#[test]
fn test_destructive_wrap_multibyte_truncation() {
    let metrics = TextMetrics::approximate(8);
    let options = WrapOptions::default().with_max_chars(4).with_max_lines(1);
    let result = wrap(tokenize_text("日本語テキスト"), &options, &metrics);

    assert_eq!(result.texts(), vec![format!("日本語{}", ELLIPSIS)]);
}

#[test]
fn test_destructive_pixel_mode_with_failing_measurer() {
    let metrics = TextMetrics::with_measurer(|_: &str, _: &str| Some(-5.0), 8);
    let options = WrapOptions::default()
        .with_pixel_width(40.0, "16px Inter")
        .with_max_lines(3);

    // Negative widths are rejected; the 10px-per-char approximation applies
    let result = wrap(tokenize_text("ab cd efgh"), &options, &metrics);
    assert_eq!(result.texts(), vec!["ab", "cd", "efgh"]);
    assert_eq!(metrics.stats().size, 0);
}

#[test]
fn test_destructive_cache_zero_capacity() {
    let mut cache = TextMeasureCache::new(0);
    cache.set(crate::core::text::MeasureKey::new("f", "a"), 1.0);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().capacity, 1);
}

#[test]
fn test_destructive_engine_hostile_settings() {
    let settings = EngineSettings {
        max_chars_per_line: usize::MAX,
        max_lines: usize::MAX,
        max_width_px: Some(f64::INFINITY),
        font: Some("16px Inter".to_string()),
        transition_window_ms: i64::MAX,
        measure_cache_capacity: usize::MAX,
    };
    let engine = CaptionEngine::new(settings, None);

    assert_eq!(engine.settings().max_chars_per_line, 500);
    assert_eq!(engine.settings().max_lines, 20);
    assert_eq!(engine.settings().max_width_px, None);
    assert_eq!(engine.settings().transition_window_ms, 10_000);

    let set = IndexedCaptionSet::new(vec![CaptionSegment::new(0, 1000, "hello")]);
    let frame = engine.frame_at(&set, 500);
    assert_eq!(frame.fade_in, 0.05);
    assert_eq!(frame.layout.texts(), vec!["hello"]);
}

#[test]
fn test_destructive_engine_shared_across_threads() {
    let engine = Arc::new(CaptionEngine::default());
    let set = Arc::new(IndexedCaptionSet::new(vec![
        CaptionSegment::new(0, 1000, "one"),
        CaptionSegment::new(1000, 2000, "two"),
    ]));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let set = Arc::clone(&set);
            std::thread::spawn(move || {
                let frame = engine.frame_at(&set, 500 + i * 400);
                frame.current_index
            })
        })
        .collect();

    let indices: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(indices, vec![Some(0), Some(0), Some(1), Some(1)]);
}
