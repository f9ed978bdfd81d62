//! # Smoothing Buffer
//!
//! Fixed-capacity moving average used to damp ADC noise before a reading
//! becomes a command.
//!
//! The average covers the last `min(count, capacity)` samples; once full,
//! the oldest sample is overwritten first. An empty buffer averages to `0`.
//!
//! ```
//! use pizlink::signal::smoothing::SmoothingBuffer;
//!
//! let mut buf = SmoothingBuffer::new(3);
//! assert_eq!(buf.average(), 0.0);
//!
//! buf.add(10);
//! buf.add(20);
//! assert_eq!(buf.average(), 15.0);
//!
//! buf.add(30);
//! buf.add(40); // overwrites 10
//! assert_eq!(buf.average(), 30.0);
//! ```

/// Ring of the most recent samples with a running sum.
#[derive(Debug, Clone)]
pub struct SmoothingBuffer {
    samples: Vec<u16>,
    index: usize,
    count: usize,
    sum: u64,
}

impl Default for SmoothingBuffer {
    /// A pass-through buffer (capacity 1).
    fn default() -> Self {
        Self::new(1)
    }
}

impl SmoothingBuffer {
    /// Creates a buffer holding `capacity` samples. A capacity of 0 is treated as 1.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0; capacity.max(1)],
            index: 0,
            count: 0,
            sum: 0,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Number of valid samples (saturates at capacity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Adds a sample, overwriting the oldest one when full.
    pub fn add(&mut self, value: u16) {
        let full = self.count == self.samples.len();
        let slot = &mut self.samples[self.index];
        if full {
            self.sum -= u64::from(*slot);
        } else {
            self.count += 1;
        }
        *slot = value;
        self.sum += u64::from(value);
        self.index = (self.index + 1) % self.samples.len();
    }

    /// Mean of the valid samples, `0.0` when empty.
    #[must_use]
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum as f64 / self.count as f64
    }

    /// Mean rounded to the nearest raw reading.
    #[must_use]
    pub fn average_raw(&self) -> u16 {
        self.average().round().clamp(0.0, f64::from(u16::MAX)) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_average_is_zero() {
        let buf = SmoothingBuffer::new(5);
        assert_eq!(buf.average(), 0.0);
        assert_eq!(buf.average_raw(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_partial_fill_is_exact_mean() {
        let mut buf = SmoothingBuffer::new(5);
        buf.add(1);
        buf.add(2);
        assert_eq!(buf.average(), 1.5);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_overflow_keeps_last_n() {
        let mut buf = SmoothingBuffer::new(3);
        for v in [100, 200, 300, 400, 500] {
            buf.add(v);
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.average(), 400.0);
    }

    #[test]
    fn test_matches_naive_mean_over_many_samples() {
        let mut buf = SmoothingBuffer::new(5);
        let mut history: Vec<u16> = Vec::new();
        for i in 0..40u32 {
            let v = ((i * 7919) % 65536) as u16;
            buf.add(v);
            history.push(v);
            let window = &history[history.len().saturating_sub(5)..];
            let expected = window.iter().map(|&x| x as f64).sum::<f64>() / window.len() as f64;
            assert_eq!(buf.average(), expected, "after {} samples", i + 1);
        }
    }

    #[test]
    fn test_capacity_one_is_pass_through() {
        let mut buf = SmoothingBuffer::default();
        assert_eq!(buf.capacity(), 1);
        buf.add(1234);
        buf.add(65535);
        assert_eq!(buf.average_raw(), 65535);
    }

    #[test]
    fn test_zero_capacity_is_treated_as_one() {
        let mut buf = SmoothingBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
        buf.add(7);
        assert_eq!(buf.average(), 7.0);
    }

    #[test]
    fn test_average_raw_rounds() {
        let mut buf = SmoothingBuffer::new(2);
        buf.add(1);
        buf.add(2);
        assert_eq!(buf.average_raw(), 2);
    }
}
