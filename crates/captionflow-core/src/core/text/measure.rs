//! Text Measurement
//!
//! The host render environment supplies a [`TextMeasurer`]; [`TextMetrics`]
//! puts an LRU cache in front of it and falls back to a per-character
//! approximation when no measurer is installed or a measurement fails.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{trace, warn};

use super::cache::{CacheStats, MeasureKey, TextMeasureCache};

/// Advance per character used when no real measurement is available
pub const APPROXIMATE_CHAR_WIDTH_PX: f64 = 10.0;

// =============================================================================
// Measurer Capability
// =============================================================================

/// Host-provided synchronous text measurement
pub trait TextMeasurer: Send + Sync {
    /// Width of `text` rendered with `font`, or `None` if it cannot be measured
    fn measure(&self, text: &str, font: &str) -> Option<f64>;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str, &str) -> Option<f64> + Send + Sync,
{
    fn measure(&self, text: &str, font: &str) -> Option<f64> {
        self(text, font)
    }
}

/// Measurer with a constant advance per character, ignoring the font
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceMeasurer {
    pub advance_px: f64,
}

impl FixedAdvanceMeasurer {
    pub fn new(advance_px: f64) -> Self {
        Self { advance_px }
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure(&self, text: &str, _font: &str) -> Option<f64> {
        Some(text.chars().count() as f64 * self.advance_px)
    }
}

/// Fallback width estimate
pub fn approximate_width(text: &str) -> f64 {
    text.chars().count() as f64 * APPROXIMATE_CHAR_WIDTH_PX
}

// =============================================================================
// Cached Metrics
// =============================================================================

/// Cached text measurement, shareable across render threads
pub struct TextMetrics {
    measurer: Option<Arc<dyn TextMeasurer>>,
    cache: Mutex<TextMeasureCache>,
}

impl TextMetrics {
    /// Creates metrics backed by an optional host measurer
    pub fn new(measurer: Option<Arc<dyn TextMeasurer>>, cache_capacity: usize) -> Self {
        Self {
            measurer,
            cache: Mutex::new(TextMeasureCache::new(cache_capacity)),
        }
    }

    /// Creates metrics backed by the given measurer
    pub fn with_measurer(measurer: impl TextMeasurer + 'static, cache_capacity: usize) -> Self {
        Self::new(Some(Arc::new(measurer)), cache_capacity)
    }

    /// Creates metrics that only use the approximation
    pub fn approximate(cache_capacity: usize) -> Self {
        Self::new(None, cache_capacity)
    }

    pub fn has_measurer(&self) -> bool {
        self.measurer.is_some()
    }

    /// Width of `text` in `font`
    ///
    /// Only real measurements are cached. Approximated widths never enter the
    /// cache and are recomputed on every call, so a measurer that fails once
    /// and succeeds later is not shadowed by the stale estimate.
    pub fn width(&self, text: &str, font: &str) -> f64 {
        let key = MeasureKey::new(font, text);
        if let Some(width) = self.lock_cache().get(&key) {
            return width;
        }

        let measured = self
            .measurer
            .as_ref()
            .and_then(|m| m.measure(text, font))
            .filter(|w| w.is_finite() && *w >= 0.0);

        match measured {
            Some(width) => {
                self.lock_cache().set(key, width);
                width
            }
            None => {
                trace!("Approximating width of {:?} in {:?}", text, font);
                approximate_width(text)
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    /// Drops cached measurements and resets the counters
    pub fn clear(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> MutexGuard<'_, TextMeasureCache> {
        self.cache.lock().unwrap_or_else(|poisoned| {
            warn!("Measurement cache lock was poisoned; continuing with cached data");
            poisoned.into_inner()
        })
    }
}

impl fmt::Debug for TextMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextMetrics")
            .field("has_measurer", &self.has_measurer())
            .field("stats", &self.stats())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
