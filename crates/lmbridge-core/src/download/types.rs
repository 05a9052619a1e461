//! Progress samples and acquisition results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One aggregate progress sample of a fetch session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FetchProgress {
    /// Whole percent in `0..=100`.
    pub percentage: u8,
    /// Bytes per millisecond since the previous sample, which is numerically KB/s.
    pub throughput_kbps: u64,
    /// Bytes written so far across all files.
    pub transferred: u64,
    /// Sum of the sizes learned so far.
    pub expected: u64,
}

impl FetchProgress {
    /// Compute a sample from aggregate totals.
    ///
    /// `expected` under-counts until every transfer has reported its size, so
    /// the result is clamped to 100.
    #[must_use]
    pub fn compute(transferred: u64, expected: u64, delta_bytes: u64, elapsed_ms: u64) -> Self {
        let pct = transferred.saturating_mul(100) / expected.max(1);
        Self {
            percentage: u8::try_from(pct.min(100)).unwrap_or(100),
            throughput_kbps: delta_bytes / elapsed_ms.max(1),
            transferred,
            expected,
        }
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.percentage >= 100
    }
}

/// A model directory that passed local validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedModel {
    /// Encoded model id (single component).
    pub model_id: String,
    pub path: PathBuf,
    pub valid: bool,
}
