//! # Run Telemetry
//!
//! Logging capability handed to each component explicitly instead of being
//! looked up from process-wide state. The default implementation writes
//! through `tracing`; [`CountingTelemetry`] additionally keeps counters so
//! callers (and tests) can observe how many anomalies were reported.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, info, warn};

use crate::domain::{PricePoint, Product};

use super::pages::Page;
use super::state::CrawlingStats;
use super::tasks::CollectError;

/// Observer for notable events of a catalog run
pub trait RunTelemetry: Send + Sync + 'static {
    fn run_started(&self, _total_pages: usize, _parallelism: usize) {}

    fn page_started(&self, page: Page, total_pages: usize);

    fn rows_received(&self, _page: u32, _rows: usize) {}

    fn row_normalized(&self, _page: u32, _product: &Product) {}

    /// A product identity was seen again; the new value overwrites the old one
    fn duplicate_product(&self, product: &Product);

    /// A price point for an already-priced product overwrites the old one
    fn duplicate_price_point(&self, price_point: &PricePoint);

    fn collect_error(&self, error: &CollectError);

    fn page_done(&self, page: u32, remaining: usize);

    fn run_finished(&self, _stats: &CrawlingStats) {}
}

/// `tracing` backed telemetry (default)
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TracingTelemetry {
    #[must_use]
    pub fn shared() -> Arc<dyn RunTelemetry> {
        Arc::new(Self)
    }
}

impl RunTelemetry for TracingTelemetry {
    fn run_started(&self, total_pages: usize, parallelism: usize) {
        info!(total_pages, parallelism, "🚀 collector routine started");
    }

    fn page_started(&self, page: Page, total_pages: usize) {
        info!(
            page = page.number,
            page_size = page.size,
            total = total_pages,
            "fetching page"
        );
    }

    fn rows_received(&self, page: u32, rows: usize) {
        debug!(page, rows, "reading rows");
    }

    fn row_normalized(&self, page: u32, product: &Product) {
        debug!(page, id = %product.id, "reading row: {}", product);
    }

    fn duplicate_product(&self, product: &Product) {
        warn!(id = %product.id, name = %product.name, "duplicate product");
    }

    fn duplicate_price_point(&self, price_point: &PricePoint) {
        warn!(id = %price_point.product_id, "duplicate price point");
    }

    fn collect_error(&self, error: &CollectError) {
        match error {
            CollectError::Page { page, source } => {
                error!(page, error = %source, "❌ page fetch failed");
            }
            CollectError::Row { page, .. } => {
                error!(page, "{}", error);
            }
        }
    }

    fn page_done(&self, page: u32, remaining: usize) {
        debug!(page, remaining, "page done");
    }

    fn run_finished(&self, stats: &CrawlingStats) {
        info!(
            pages_completed = stats.pages_completed,
            pages_failed = stats.pages_failed,
            rows_failed = stats.rows_failed,
            duplicate_products = stats.duplicate_products,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "✅ all routines done"
        );
    }
}

/// Telemetry that counts reported events and forwards them to an inner sink
pub struct CountingTelemetry {
    inner: Arc<dyn RunTelemetry>,
    pages_started: AtomicU64,
    pages_done: AtomicU64,
    duplicate_products: AtomicU64,
    duplicate_price_points: AtomicU64,
    page_errors: AtomicU64,
    row_errors: AtomicU64,
}

/// Point-in-time copy of [`CountingTelemetry`] counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryCounts {
    pub pages_started: u64,
    pub pages_done: u64,
    pub duplicate_products: u64,
    pub duplicate_price_points: u64,
    pub page_errors: u64,
    pub row_errors: u64,
}

impl CountingTelemetry {
    #[must_use]
    pub fn new(inner: Arc<dyn RunTelemetry>) -> Self {
        Self {
            inner,
            pages_started: AtomicU64::new(0),
            pages_done: AtomicU64::new(0),
            duplicate_products: AtomicU64::new(0),
            duplicate_price_points: AtomicU64::new(0),
            page_errors: AtomicU64::new(0),
            row_errors: AtomicU64::new(0),
        }
    }

    /// Counting wrapper around [`TracingTelemetry`]
    #[must_use]
    pub fn with_tracing() -> Self {
        Self::new(TracingTelemetry::shared())
    }

    #[must_use]
    pub fn counts(&self) -> TelemetryCounts {
        TelemetryCounts {
            pages_started: self.pages_started.load(Ordering::Relaxed),
            pages_done: self.pages_done.load(Ordering::Relaxed),
            duplicate_products: self.duplicate_products.load(Ordering::Relaxed),
            duplicate_price_points: self.duplicate_price_points.load(Ordering::Relaxed),
            page_errors: self.page_errors.load(Ordering::Relaxed),
            row_errors: self.row_errors.load(Ordering::Relaxed),
        }
    }
}

impl RunTelemetry for CountingTelemetry {
    fn run_started(&self, total_pages: usize, parallelism: usize) {
        self.inner.run_started(total_pages, parallelism);
    }

    fn page_started(&self, page: Page, total_pages: usize) {
        self.pages_started.fetch_add(1, Ordering::Relaxed);
        self.inner.page_started(page, total_pages);
    }

    fn rows_received(&self, page: u32, rows: usize) {
        self.inner.rows_received(page, rows);
    }

    fn row_normalized(&self, page: u32, product: &Product) {
        self.inner.row_normalized(page, product);
    }

    fn duplicate_product(&self, product: &Product) {
        self.duplicate_products.fetch_add(1, Ordering::Relaxed);
        self.inner.duplicate_product(product);
    }

    fn duplicate_price_point(&self, price_point: &PricePoint) {
        self.duplicate_price_points.fetch_add(1, Ordering::Relaxed);
        self.inner.duplicate_price_point(price_point);
    }

    fn collect_error(&self, error: &CollectError) {
        if error.is_page_scoped() {
            self.page_errors.fetch_add(1, Ordering::Relaxed);
        } else {
            self.row_errors.fetch_add(1, Ordering::Relaxed);
        }
        self.inner.collect_error(error);
    }

    fn page_done(&self, page: u32, remaining: usize) {
        self.pages_done.fetch_add(1, Ordering::Relaxed);
        self.inner.page_done(page, remaining);
    }

    fn run_finished(&self, stats: &CrawlingStats) {
        self.inner.run_finished(stats);
    }
}
