//! Link counters reported in the handheld's periodic status log.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct LinkCounters {
    born: Instant,
    /// Control messages sent since startup
    pub packets: u64,
    /// Successful connections since startup
    pub connects: u64,
    last_report: Option<Instant>,
}

impl Default for LinkCounters {
    fn default() -> Self {
        Self {
            born: Instant::now(),
            packets: 0,
            connects: 0,
            last_report: None,
        }
    }
}

impl LinkCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.born.elapsed()
    }

    /// Messages per second since startup.
    #[must_use]
    pub fn message_rate(&self) -> f64 {
        let secs = self.uptime().as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.packets as f64 / secs
    }

    /// True at most once per `interval`; the first call is always due.
    pub fn report_due(&mut self, interval: Duration) -> bool {
        let now = Instant::now();
        match self.last_report {
            Some(last) if now.duration_since(last) < interval => false,
            _ => {
                self.last_report = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_due_once_per_interval() {
        let mut counters = LinkCounters::new();
        assert!(counters.report_due(Duration::from_secs(60)));
        assert!(!counters.report_due(Duration::from_secs(60)));
        assert!(counters.report_due(Duration::ZERO));
    }

    #[test]
    fn test_message_rate() {
        let mut counters = LinkCounters::new();
        assert_eq!(counters.packets, 0);
        std::thread::sleep(Duration::from_millis(10));
        counters.packets = 10;
        let rate = counters.message_rate();
        assert!(rate > 0.0 && rate <= 1000.0, "rate {}", rate);
    }
}
