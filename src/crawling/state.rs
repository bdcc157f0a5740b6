//! # Run Statistics
//!
//! Counters kept by the aggregator while it folds events into the result
//! maps. Owned by the aggregator's control flow; no locking needed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-run crawling statistics
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlingStats {
    /// Pages submitted to the run
    pub pages_total: usize,

    /// Pages that signalled completion (success or failure)
    pub pages_completed: usize,

    /// Pages whose fetch or decode failed
    pub pages_failed: usize,

    /// Pages that never signalled completion (cancelled or lost worker)
    pub pages_abandoned: usize,

    /// Product events received (before dedup)
    pub products_received: u64,

    /// Price point events received (before dedup)
    pub price_points_received: u64,

    /// Vendor events received (before dedup)
    pub vendors_received: u64,

    /// Rows skipped by the normalizer
    pub rows_failed: u64,

    /// Product overwrites (one warning each)
    pub duplicate_products: u64,

    /// Price point overwrites (one warning each)
    pub duplicate_price_points: u64,

    /// Whether the run was stopped through its cancellation token
    pub cancelled: bool,

    /// Wall time from first dispatch to completion
    pub elapsed: Duration,
}

impl CrawlingStats {
    #[must_use]
    pub fn new(pages_total: usize) -> Self {
        Self {
            pages_total,
            ..Self::default()
        }
    }

    /// Pages still outstanding
    #[must_use]
    pub const fn pages_remaining(&self) -> usize {
        self.pages_total
            .saturating_sub(self.pages_completed + self.pages_abandoned)
    }

    /// Fraction of completed pages that succeeded, in percent
    #[must_use]
    pub fn page_success_rate(&self) -> f64 {
        if self.pages_completed == 0 {
            return 0.0;
        }
        let succeeded = self.pages_completed.saturating_sub(self.pages_failed);
        (succeeded as f64 / self.pages_completed as f64) * 100.0
    }
}
