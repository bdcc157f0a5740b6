//! # Fan-in Aggregator
//!
//! 모든 워커 이벤트를 하나의 제어 흐름에서 병합합니다.
//! - 결과 맵과 남은 페이지 집합의 유일한 소유자 (락 없음)
//! - 같은 식별자는 나중에 도착한 값이 덮어씀 (product/price point는 경고)
//! - 남은 페이지 집합이 비면 완료

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::{PricePoint, Product, Vendor};

use super::pages::PageSource;
use super::state::CrawlingStats;
use super::tasks::CollectorEvent;
use super::telemetry::RunTelemetry;

/// Aggregator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Collecting,
    Complete,
}

/// Final result of one run; map order is arbitrary
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectedCatalog {
    pub products: HashMap<String, Product>,
    pub price_points: HashMap<String, PricePoint>,
    pub vendors: HashMap<String, Vendor>,
    pub stats: CrawlingStats,
}

impl CollectedCatalog {
    /// Products sorted by id
    #[must_use]
    pub fn sorted_products(&self) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.products.values().collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        products
    }

    /// Price points sorted by product id
    #[must_use]
    pub fn sorted_price_points(&self) -> Vec<&PricePoint> {
        let mut points: Vec<&PricePoint> = self.price_points.values().collect();
        points.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        points
    }
}

/// Single-owner merge of worker events
pub struct FanInAggregator {
    remaining: HashSet<u32>,
    products: HashMap<String, Product>,
    price_points: HashMap<String, PricePoint>,
    vendors: HashMap<String, Vendor>,
    stats: CrawlingStats,
    telemetry: Arc<dyn RunTelemetry>,
    started_at: Instant,
}

impl FanInAggregator {
    #[must_use]
    pub fn new(pages: &PageSource, telemetry: Arc<dyn RunTelemetry>) -> Self {
        Self {
            remaining: pages.numbers().iter().copied().collect(),
            products: HashMap::new(),
            price_points: HashMap::new(),
            vendors: HashMap::new(),
            stats: CrawlingStats::new(pages.len()),
            telemetry,
            started_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn state(&self) -> AggregatorState {
        if self.remaining.is_empty() {
            AggregatorState::Complete
        } else {
            AggregatorState::Collecting
        }
    }

    #[must_use]
    pub fn remaining_pages(&self) -> usize {
        self.remaining.len()
    }

    #[must_use]
    pub const fn stats(&self) -> &CrawlingStats {
        &self.stats
    }

    /// Applies one event and reports the resulting state
    pub fn handle(&mut self, event: CollectorEvent) -> AggregatorState {
        match event {
            CollectorEvent::Product(product) => {
                self.stats.products_received += 1;
                if self.products.contains_key(&product.id) {
                    self.stats.duplicate_products += 1;
                    self.telemetry.duplicate_product(&product);
                }
                self.products.insert(product.id.clone(), product);
            }
            CollectorEvent::PricePoint(price_point) => {
                self.stats.price_points_received += 1;
                if self.price_points.contains_key(&price_point.product_id) {
                    self.stats.duplicate_price_points += 1;
                    self.telemetry.duplicate_price_point(&price_point);
                }
                self.price_points
                    .insert(price_point.product_id.clone(), price_point);
            }
            CollectorEvent::Vendor(vendor) => {
                self.stats.vendors_received += 1;
                self.vendors.insert(vendor.id.clone(), vendor);
            }
            CollectorEvent::Error(error) => {
                if error.is_page_scoped() {
                    self.stats.pages_failed += 1;
                } else {
                    self.stats.rows_failed += 1;
                }
                self.telemetry.collect_error(&error);
            }
            CollectorEvent::PageDone(page) => {
                if self.remaining.remove(&page) {
                    self.stats.pages_completed += 1;
                    self.telemetry.page_done(page, self.remaining.len());
                } else {
                    debug!(page, "ignoring done signal for unknown or finished page");
                }
            }
        }
        self.state()
    }

    /// Receives until every page has signalled done
    ///
    /// Returns early with partial results when `cancel` fires or when every
    /// sender is gone while pages are still outstanding.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<CollectorEvent>,
        cancel: Option<CancellationToken>,
    ) -> CollectedCatalog {
        let cancel = cancel.unwrap_or_default();

        while self.state() == AggregatorState::Collecting {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    warn!(remaining = self.remaining.len(), "🛑 collection cancelled");
                    self.stats.cancelled = true;
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => {
                        self.handle(event);
                    }
                    None => {
                        let mut missing: Vec<u32> = self.remaining.iter().copied().collect();
                        missing.sort_unstable();
                        warn!(?missing, "⚠️ all workers gone before signalling done");
                        break;
                    }
                },
            }
        }

        self.finish()
    }

    /// Consumes the aggregator; outstanding pages count as abandoned
    #[must_use]
    pub fn finish(mut self) -> CollectedCatalog {
        self.stats.pages_abandoned = self.remaining.len();
        self.stats.elapsed = self.started_at.elapsed();
        CollectedCatalog {
            products: self.products,
            price_points: self.price_points,
            vendors: self.vendors,
            stats: self.stats,
        }
    }
}
