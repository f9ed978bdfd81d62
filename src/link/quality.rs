//! # Link Quality Monitor
//!
//! Samples the wireless-quality counter, tracks its running min/max and maps
//! it onto a number of lit feedback indicators.
//!
//! ## Indicator Mapping
//!
//! The usable range of raw quality units (`30..=70` by default) is spread
//! linearly over the indicators:
//!
//! ```text
//! level = clamp((quality - low) * count / (high - low), 0, count)
//! ```
//!
//! ```
//! use pizlink::link::quality::IndicatorScale;
//!
//! let scale = IndicatorScale::new(5, 30, 70);
//! assert_eq!(scale.level(30), 0);
//! assert_eq!(scale.level(50), 2);
//! assert_eq!(scale.level(90), 5);
//! ```

use super::wireless::WirelessQuality;

/// Link quality value meaning "unknown".
pub const QUALITY_UNAVAILABLE: i32 = -1;

/// Running min/max of the real link-quality readings seen so far.
///
/// Seeded at `min = 100`, `max = 0` so the first reading updates both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkQualityStats {
    pub min: i32,
    pub max: i32,
}

impl Default for LinkQualityStats {
    fn default() -> Self {
        Self { min: 100, max: 0 }
    }
}

impl LinkQualityStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a reading into the running stats.
    ///
    /// The unavailable sentinel is skipped; returns whether the value was used.
    pub fn update(&mut self, quality: i32) -> bool {
        if quality == QUALITY_UNAVAILABLE {
            return false;
        }
        self.min = self.min.min(quality);
        self.max = self.max.max(quality);
        true
    }
}

/// Linear map from raw link quality to a lit-indicator count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorScale {
    count: usize,
    low: i32,
    high: i32,
}

impl IndicatorScale {
    /// Creates a scale over `count` indicators for qualities `low..=high`.
    ///
    /// `high` is forced above `low`.
    #[must_use]
    pub fn new(count: usize, low: i32, high: i32) -> Self {
        Self {
            count,
            low,
            high: high.max(low + 1),
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of indicators to light for `quality`, rounded down.
    #[must_use]
    pub fn level(&self, quality: i32) -> usize {
        let span = i64::from(self.high - self.low);
        let scaled = (i64::from(quality) - i64::from(self.low)) * self.count as i64 / span;
        scaled.clamp(0, self.count as i64) as usize
    }
}

/// Samples the local wireless driver and keeps running stats.
pub struct LinkQualityMonitor {
    source: Box<dyn WirelessQuality>,
    stats: LinkQualityStats,
}

impl std::fmt::Debug for LinkQualityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkQualityMonitor")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl LinkQualityMonitor {
    pub fn new(source: Box<dyn WirelessQuality>) -> Self {
        Self {
            source,
            stats: LinkQualityStats::default(),
        }
    }

    /// Reads the current quality, `-1` when the driver has nothing to report.
    #[must_use]
    pub fn sample(&self) -> i32 {
        self.source.read().unwrap_or(QUALITY_UNAVAILABLE)
    }

    /// Folds a sampled value into the running stats, skipping `-1`.
    pub fn update_stats(&mut self, quality: i32) -> bool {
        self.stats.update(quality)
    }

    #[must_use]
    pub fn stats(&self) -> LinkQualityStats {
        self.stats
    }
}
