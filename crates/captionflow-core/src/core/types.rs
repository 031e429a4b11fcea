//! CaptionFlow Core Type Definitions
//!
//! Defines fundamental types shared by ingestion, timing and layout.

// =============================================================================
// Time Types
// =============================================================================

/// Time in integer milliseconds
pub type TimeMs = i64;

/// Font descriptor handed to the host measurer (e.g. "bold 48px Inter")
pub type FontDescriptor = String;

// =============================================================================
// Timed Items
// =============================================================================

/// Anything occupying a half-open `[start_ms, end_ms)` span on the timeline.
///
/// The timing index is generic over this trait so captions and words share
/// one lookup implementation.
pub trait Timed {
    /// Inclusive start
    fn start_ms(&self) -> TimeMs;

    /// Exclusive end
    fn end_ms(&self) -> TimeMs;

    /// Returns true if `t` falls inside `[start_ms, end_ms)`.
    ///
    /// Inverted and zero-length spans never contain anything.
    fn contains(&self, t: TimeMs) -> bool {
        self.start_ms() <= t && t < self.end_ms()
    }

    /// Span length, zero for inverted spans
    fn duration_ms(&self) -> TimeMs {
        self.end_ms().saturating_sub(self.start_ms()).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Span(TimeMs, TimeMs);

    impl Timed for Span {
        fn start_ms(&self) -> TimeMs {
            self.0
        }
        fn end_ms(&self) -> TimeMs {
            self.1
        }
    }

    #[test]
    fn test_contains_is_half_open() {
        let span = Span(500, 1500);
        assert!(!span.contains(499));
        assert!(span.contains(500));
        assert!(span.contains(1499));
        assert!(!span.contains(1500));
    }

    #[test]
    fn test_inverted_span_never_contains() {
        let span = Span(2000, 1000);
        assert!(!span.contains(1500));
        assert!(!span.contains(2000));
        assert_eq!(span.duration_ms(), 0);

        let empty = Span(1000, 1000);
        assert!(!empty.contains(1000));
    }
}
