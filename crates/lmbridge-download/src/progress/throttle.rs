//! Progress throttling.
//!
//! The fetcher samples every 200ms; a user only needs to hear about a
//! download when it has moved noticeably or has been quiet for a while.

use std::time::Duration;

use lmbridge_core::FetchProgress;
use tokio::time::Instant;

/// Rate-limiter for progress notifications.
///
/// Emits when the percentage has grown by more than `min_step` points since
/// the last emitted sample, or when `max_silence` has passed.
#[derive(Debug)]
pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    last_percentage: u8,
    min_step: u8,
    max_silence: Duration,
}

impl ProgressThrottle {
    pub const fn new(min_step: u8, max_silence: Duration) -> Self {
        Self {
            last_emit: None,
            last_percentage: 0,
            min_step,
            max_silence,
        }
    }

    /// 5 points or 2 seconds.
    pub const fn default_interval() -> Self {
        Self::new(5, Duration::from_secs(2))
    }

    /// Check whether `progress` is worth reporting, recording it if so.
    pub fn should_emit(&mut self, progress: &FetchProgress) -> bool {
        let now = Instant::now();
        let due = match self.last_emit {
            None => true,
            Some(last) => {
                progress.percentage > self.last_percentage.saturating_add(self.min_step)
                    || now.duration_since(last) > self.max_silence
            }
        };
        if due {
            self.last_emit = Some(now);
            self.last_percentage = progress.percentage;
        }
        due
    }

    /// Force the next check to return true.
    pub const fn reset(&mut self) {
        self.last_emit = None;
        self.last_percentage = 0;
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::default_interval()
    }
}

/// Human-readable throughput: `MB/s` above 1000 KB/s, else `KB/s`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_speed(kbps: u64) -> String {
    if kbps > 1000 {
        format!("{:.2} MB/s", kbps as f64 / 1000.0)
    } else {
        format!("{kbps} KB/s")
    }
}
