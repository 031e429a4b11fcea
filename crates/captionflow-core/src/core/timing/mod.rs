//! Timing Index Module
//!
//! Answers "what is on screen at `t`?" for caption and word sequences.
//!
//! Lookups binary-search sequences that are ascending by start time and fall
//! back to a linear scan otherwise. Sortedness is computed once when an
//! [`IndexedCaptionSet`] is built and never changes afterwards, so a set can
//! be shared across render threads without locking.
//!
//! All intervals are half-open: `[start_ms, end_ms)`.

use serde::{Deserialize, Serialize};

use crate::core::{TimeMs, Timed};

// =============================================================================
// Indexed Set
// =============================================================================

/// An immutable timed sequence with its precomputed sortedness flag
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedCaptionSet<T> {
    items: Vec<T>,
    sorted_ascending: bool,
}

impl<T: Timed> IndexedCaptionSet<T> {
    /// Wraps items in their given order
    pub fn new(items: Vec<T>) -> Self {
        let sorted_ascending = items
            .windows(2)
            .all(|pair| pair[0].start_ms() <= pair[1].start_ms());
        Self {
            items,
            sorted_ascending,
        }
    }

    /// Sorts items by start time (stable) before wrapping them
    pub fn sorted(mut items: Vec<T>) -> Self {
        items.sort_by_key(|item| item.start_ms());
        Self {
            items,
            sorted_ascending: true,
        }
    }

    /// Returns true if lookups take the binary-search path
    pub fn is_sorted_ascending(&self) -> bool {
        self.sorted_ascending
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Latest end time across all items, zero when empty
    pub fn duration_ms(&self) -> TimeMs {
        self.items
            .iter()
            .map(|item| item.end_ms())
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Items overlapping the half-open window `[start_ms, end_ms)`
    pub fn items_in_range(&self, start_ms: TimeMs, end_ms: TimeMs) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| item.start_ms() < end_ms && item.end_ms() > start_ms)
            .collect()
    }
}

impl<T: Timed> From<Vec<T>> for IndexedCaptionSet<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

// =============================================================================
// Lookup Results
// =============================================================================

/// Result of an active-item lookup; `None` in both fields means not found
#[derive(Debug, PartialEq)]
pub struct ActiveLookup<'a, T> {
    pub item: Option<&'a T>,
    pub index: Option<usize>,
}

impl<T> Clone for ActiveLookup<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ActiveLookup<'_, T> {}

impl<'a, T> ActiveLookup<'a, T> {
    pub fn not_found() -> Self {
        Self {
            item: None,
            index: None,
        }
    }

    fn found(items: &'a [T], index: usize) -> Self {
        Self {
            item: items.get(index),
            index: Some(index),
        }
    }

    pub fn is_found(&self) -> bool {
        self.index.is_some()
    }

    /// Index with `-1` standing in for "not found"
    pub fn index_or_sentinel(&self) -> i64 {
        self.index.map_or(-1, |i| i as i64)
    }
}

/// Current, previous and next items around a timestamp, for crossfades
#[derive(Debug, PartialEq)]
pub struct AdjacentCaptions<'a, T> {
    pub current: Option<&'a T>,
    pub current_index: Option<usize>,
    pub previous: Option<&'a T>,
    pub previous_index: Option<usize>,
    pub next: Option<&'a T>,
    pub next_index: Option<usize>,
}

impl<T> Default for AdjacentCaptions<'_, T> {
    fn default() -> Self {
        Self {
            current: None,
            current_index: None,
            previous: None,
            previous_index: None,
            next: None,
            next_index: None,
        }
    }
}

/// Which edge of an item a transition runs on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionDirection {
    /// Fade in from `start_ms`
    In,
    /// Fade out towards `end_ms`
    Out,
}

// =============================================================================
// Lookups
// =============================================================================

/// Index of the rightmost item whose start is `<= t`; items must be ascending
fn search_cursor<T: Timed>(items: &[T], t: TimeMs) -> Option<usize> {
    items
        .partition_point(|item| item.start_ms() <= t)
        .checked_sub(1)
}

/// Finds the item active at `t`
///
/// Sorted sets are binary-searched and a gap between items is a miss.
/// Unsorted sets are scanned linearly and the first covering item wins.
pub fn get_active<T: Timed>(set: &IndexedCaptionSet<T>, t: TimeMs) -> ActiveLookup<'_, T> {
    let items = set.items();

    if !set.is_sorted_ascending() {
        return items
            .iter()
            .position(|item| item.contains(t))
            .map_or_else(ActiveLookup::not_found, |i| ActiveLookup::found(items, i));
    }

    match search_cursor(items, t) {
        Some(i) if items[i].contains(t) => ActiveLookup::found(items, i),
        _ => ActiveLookup::not_found(),
    }
}

/// Finds the index of the word active at `t`
///
/// Words must be ascending by start time. There is no unsorted fallback;
/// wrap unsorted words in an [`IndexedCaptionSet`] and use [`get_active`].
pub fn get_active_word_index<T: Timed>(words: &[T], t: TimeMs) -> Option<usize> {
    search_cursor(words, t).filter(|&i| words[i].contains(t))
}

/// Finds the current item plus the neighbours that are inside a transition window
///
/// `previous` is reported only while `0 <= t - previous.end_ms < window_ms`
/// and only when an item is current. `next` is reported while
/// `0 < next.start_ms - t <= window_ms`; in a gap it previews the upcoming item.
pub fn get_adjacent_captions<T: Timed>(
    set: &IndexedCaptionSet<T>,
    t: TimeMs,
    window_ms: TimeMs,
) -> AdjacentCaptions<'_, T> {
    let items = set.items();
    let current = get_active(set, t).index;

    let (previous_candidate, next_candidate) = match current {
        Some(c) => (c.checked_sub(1), Some(c + 1)),
        None if set.is_sorted_ascending() => {
            (None, Some(search_cursor(items, t).map_or(0, |i| i + 1)))
        }
        None => (None, upcoming_unsorted(items, t)),
    };

    let previous_index = previous_candidate.filter(|&i| {
        items
            .get(i)
            .is_some_and(|p| (0..window_ms).contains(&t.saturating_sub(p.end_ms())))
    });
    let next_index = next_candidate.filter(|&i| {
        items.get(i).is_some_and(|n| {
            let lead = n.start_ms().saturating_sub(t);
            lead > 0 && lead <= window_ms
        })
    });

    AdjacentCaptions {
        current: current.and_then(|i| items.get(i)),
        current_index: current,
        previous: previous_index.and_then(|i| items.get(i)),
        previous_index,
        next: next_index.and_then(|i| items.get(i)),
        next_index,
    }
}

/// Earliest-starting item that starts after `t`
fn upcoming_unsorted<T: Timed>(items: &[T], t: TimeMs) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.start_ms() > t)
        .min_by_key(|(_, item)| item.start_ms())
        .map(|(i, _)| i)
}

/// Progress (0.0 – 1.0) of a fade at one edge of an item
pub fn get_transition_progress<T: Timed>(
    item: &T,
    t: TimeMs,
    transition_ms: TimeMs,
    direction: TransitionDirection,
) -> f64 {
    match direction {
        TransitionDirection::In => {
            let d = t.saturating_sub(item.start_ms());
            if d < 0 {
                0.0
            } else if d >= transition_ms {
                1.0
            } else {
                d as f64 / transition_ms as f64
            }
        }
        TransitionDirection::Out => {
            let d = item.end_ms().saturating_sub(t);
            if d <= 0 {
                0.0
            } else if d >= transition_ms {
                1.0
            } else {
                d as f64 / transition_ms as f64
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::{CaptionSegment, WordTimestamp};

    fn seg(start: TimeMs, end: TimeMs, text: &str) -> CaptionSegment {
        CaptionSegment::new(start, end, text)
    }

    fn gap_free() -> Vec<CaptionSegment> {
        vec![seg(0, 1000, "a"), seg(1000, 2000, "b"), seg(2000, 3000, "c")]
    }

    // -------------------------------------------------------------------------
    // Indexed Set Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_sortedness_flag() {
        assert!(IndexedCaptionSet::new(gap_free()).is_sorted_ascending());
        assert!(IndexedCaptionSet::<CaptionSegment>::new(Vec::new()).is_sorted_ascending());

        let mut reversed = gap_free();
        reversed.reverse();
        let set = IndexedCaptionSet::new(reversed.clone());
        assert!(!set.is_sorted_ascending());

        let sorted = IndexedCaptionSet::sorted(reversed);
        assert!(sorted.is_sorted_ascending());
        assert_eq!(sorted.items()[0].text, "a");
    }

    #[test]
    fn test_duration_and_range() {
        let set = IndexedCaptionSet::new(gap_free());
        assert_eq!(set.duration_ms(), 3000);
        assert_eq!(set.items_in_range(900, 1100).len(), 2);
        assert_eq!(set.items_in_range(3000, 4000).len(), 0);
        assert_eq!(IndexedCaptionSet::<CaptionSegment>::new(vec![]).duration_ms(), 0);
    }

    // -------------------------------------------------------------------------
    // Active Lookup Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_get_active_middle() {
        let set = IndexedCaptionSet::new(gap_free());
        let hit = get_active(&set, 1500);
        assert_eq!(hit.index, Some(1));
        assert_eq!(hit.item.unwrap().text, "b");
    }

    #[test]
    fn test_get_active_boundaries() {
        let set = IndexedCaptionSet::new(vec![seg(500, 1500, "x")]);
        assert!(!get_active(&set, 499).is_found());
        assert!(get_active(&set, 500).is_found());
        assert!(get_active(&set, 1499).is_found());
        assert!(!get_active(&set, 1500).is_found());
        assert_eq!(get_active(&set, 1500).index_or_sentinel(), -1);
    }

    #[test]
    fn test_get_active_covers_whole_gap_free_range() {
        let set = IndexedCaptionSet::new(gap_free());
        for t in (0..3000).step_by(37) {
            let hit = get_active(&set, t);
            let expected = (t / 1000) as usize;
            assert_eq!(hit.index, Some(expected), "t = {t}");
        }
        assert!(!get_active(&set, -1).is_found());
        assert!(!get_active(&set, 3000).is_found());
    }

    #[test]
    fn test_get_active_gap_is_miss() {
        let set = IndexedCaptionSet::new(vec![seg(0, 1000, "a"), seg(2000, 3000, "b")]);
        assert!(!get_active(&set, 1500).is_found());
        assert_eq!(get_active(&set, 2000).index, Some(1));
    }

    #[test]
    fn test_get_active_empty() {
        let set = IndexedCaptionSet::<CaptionSegment>::new(Vec::new());
        assert_eq!(get_active(&set, 0), ActiveLookup::not_found());
    }

    #[test]
    fn test_get_active_permutation_invariant() {
        let sorted = IndexedCaptionSet::new(gap_free());
        let permutations = [vec![2, 0, 1], vec![1, 2, 0], vec![2, 1, 0], vec![0, 2, 1]];

        for order in permutations {
            let shuffled: Vec<_> = order.iter().map(|&i| gap_free()[i].clone()).collect();
            let set = IndexedCaptionSet::new(shuffled);
            assert!(!set.is_sorted_ascending());

            for t in [-5, 0, 999, 1000, 1500, 2999, 3000] {
                let expected = get_active(&sorted, t).item.map(|s| s.text.clone());
                let actual = get_active(&set, t).item.map(|s| s.text.clone());
                assert_eq!(actual, expected, "order {order:?}, t = {t}");
            }
        }
    }

    #[test]
    fn test_inverted_segment_never_active() {
        let set = IndexedCaptionSet::new(vec![seg(0, 1000, "a"), seg(2000, 1500, "bad")]);
        assert!(!get_active(&set, 1800).is_found());
        assert!(!get_active(&set, 2000).is_found());
    }

    #[test]
    fn test_get_active_word_index() {
        let words = vec![
            WordTimestamp::new(0, 200, "one"),
            WordTimestamp::new(250, 500, "two"),
            WordTimestamp::new(500, 900, "three"),
        ];

        assert_eq!(get_active_word_index(&words, 0), Some(0));
        assert_eq!(get_active_word_index(&words, 220), None);
        assert_eq!(get_active_word_index(&words, 500), Some(2));
        assert_eq!(get_active_word_index(&words, 900), None);
        assert_eq!(get_active_word_index::<WordTimestamp>(&[], 10), None);
    }

    // -------------------------------------------------------------------------
    // Adjacent Caption Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_adjacent_inside_current() {
        let set = IndexedCaptionSet::new(gap_free());

        let early = get_adjacent_captions(&set, 1050, 200);
        assert_eq!(early.current_index, Some(1));
        assert_eq!(early.previous_index, Some(0));
        assert_eq!(early.next_index, None);

        let late = get_adjacent_captions(&set, 1900, 200);
        assert_eq!(late.current_index, Some(1));
        assert_eq!(late.previous_index, None);
        assert_eq!(late.next_index, Some(2));
        assert_eq!(late.next.unwrap().text, "c");
    }

    #[test]
    fn test_adjacent_window_edges() {
        let set = IndexedCaptionSet::new(gap_free());

        // previous: 0 <= t - end < window
        assert_eq!(get_adjacent_captions(&set, 1000, 200).previous_index, Some(0));
        assert_eq!(get_adjacent_captions(&set, 1199, 200).previous_index, Some(0));
        assert_eq!(get_adjacent_captions(&set, 1200, 200).previous_index, None);

        // next: 0 < start - t <= window
        assert_eq!(get_adjacent_captions(&set, 1800, 200).next_index, Some(2));
        assert_eq!(get_adjacent_captions(&set, 1799, 200).next_index, None);
    }

    #[test]
    fn test_adjacent_in_gap_previews_next_only() {
        let set = IndexedCaptionSet::new(vec![seg(0, 1000, "a"), seg(1300, 2000, "b")]);

        let mid_gap = get_adjacent_captions(&set, 1150, 200);
        assert_eq!(mid_gap.current, None);
        assert_eq!(mid_gap.previous, None);
        assert_eq!(mid_gap.next_index, Some(1));

        let far = get_adjacent_captions(&set, 1050, 200);
        assert_eq!(far, AdjacentCaptions::default());
    }

    #[test]
    fn test_adjacent_before_first() {
        let set = IndexedCaptionSet::new(vec![seg(500, 1000, "a")]);
        let before = get_adjacent_captions(&set, 400, 200);
        assert_eq!(before.current, None);
        assert_eq!(before.next_index, Some(0));

        let after = get_adjacent_captions(&set, 1100, 200);
        assert_eq!(after, AdjacentCaptions::default());
    }

    #[test]
    fn test_adjacent_unsorted() {
        let set = IndexedCaptionSet::new(vec![seg(2000, 3000, "late"), seg(0, 1000, "early")]);

        let gap = get_adjacent_captions(&set, 1900, 200);
        assert_eq!(gap.current, None);
        assert_eq!(gap.next.unwrap().text, "late");

        let current = get_adjacent_captions(&set, 500, 200);
        assert_eq!(current.current.unwrap().text, "early");
    }

    // -------------------------------------------------------------------------
    // Transition Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_transition_in() {
        let s = seg(1000, 2000, "x");
        assert_eq!(get_transition_progress(&s, 900, 200, TransitionDirection::In), 0.0);
        assert_eq!(get_transition_progress(&s, 1000, 200, TransitionDirection::In), 0.0);
        assert_eq!(get_transition_progress(&s, 1050, 200, TransitionDirection::In), 0.25);
        assert_eq!(get_transition_progress(&s, 1200, 200, TransitionDirection::In), 1.0);
    }

    #[test]
    fn test_transition_out() {
        let s = seg(1000, 2000, "x");
        assert_eq!(get_transition_progress(&s, 1500, 200, TransitionDirection::Out), 1.0);
        assert_eq!(get_transition_progress(&s, 1900, 200, TransitionDirection::Out), 0.5);
        assert_eq!(get_transition_progress(&s, 2000, 200, TransitionDirection::Out), 0.0);
        assert_eq!(get_transition_progress(&s, 2100, 200, TransitionDirection::Out), 0.0);
    }

    #[test]
    fn test_transition_zero_length() {
        let s = seg(1000, 2000, "x");
        assert_eq!(get_transition_progress(&s, 1000, 0, TransitionDirection::In), 1.0);
        assert_eq!(get_transition_progress(&s, 1999, 0, TransitionDirection::Out), 1.0);
    }
}
