//! # Page Worker Module
//!
//! 페이지 하나를 처리하는 워커: fetch → normalize → emit → release → done
//! - 결과 맵에 직접 접근하지 않고 이벤트만 전송
//! - 페이지 실패, 행 실패 모두 이벤트로 보고하고 계속 진행

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::crawling::admission::{AdmissionController, AdmissionToken};
use crate::crawling::pages::Page;
use crate::crawling::tasks::{CollectError, CollectorEvent};
use crate::crawling::telemetry::RunTelemetry;

pub mod page_fetcher;
pub mod row_normalizer;

pub use page_fetcher::{CatalogTransport, ListingQuery, PageFetcher, RawRow};
pub use row_normalizer::{NormalizedRow, RowNormalizer};

/// 페이지 단위 워커 에러
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Task was cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Per-page task body, cloned into every spawned worker
#[derive(Clone)]
pub struct PageWorker {
    fetcher: PageFetcher,
    normalizer: Arc<RowNormalizer>,
    admission: AdmissionController,
    events: mpsc::Sender<CollectorEvent>,
    telemetry: Arc<dyn RunTelemetry>,
    cancel: Option<CancellationToken>,
}

impl PageWorker {
    #[must_use]
    pub fn new(
        fetcher: PageFetcher,
        normalizer: Arc<RowNormalizer>,
        admission: AdmissionController,
        events: mpsc::Sender<CollectorEvent>,
        telemetry: Arc<dyn RunTelemetry>,
    ) -> Self {
        Self {
            fetcher,
            normalizer,
            admission,
            events,
            telemetry,
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Processes one admitted page
    ///
    /// Always hands the admission token back. `PageDone` is the last event
    /// this worker sends for `page`, and it is sent exactly once unless the
    /// run was cancelled or the aggregator has gone away.
    pub async fn run(self, page: Page, token: AdmissionToken, total_pages: usize) {
        self.telemetry.page_started(page, total_pages);

        let completed = self.process(page).await;

        if !completed || self.is_cancelled() {
            drop(token);
            debug!(page = page.number, "🛑 page worker stopped early");
            return;
        }

        self.admission.release(token).await;
        self.emit(CollectorEvent::PageDone(page.number)).await;
    }

    /// Returns `false` once events can no longer be delivered
    async fn process(&self, page: Page) -> bool {
        let rows = match self.fetch(page).await {
            Ok(rows) => rows,
            Err(WorkerError::Cancelled) if self.is_cancelled() => return false,
            Err(source) => {
                return self
                    .emit(CollectorEvent::Error(CollectError::Page {
                        page: page.number,
                        source,
                    }))
                    .await;
            }
        };

        for row in &rows {
            let delivered = match self.normalizer.normalize(row) {
                Ok(normalized) => {
                    self.telemetry.row_normalized(page.number, &normalized.product);
                    self.emit(CollectorEvent::Product(normalized.product)).await
                        && self
                            .emit(CollectorEvent::PricePoint(normalized.price_point))
                            .await
                        && self.emit(CollectorEvent::Vendor(normalized.vendor)).await
                }
                Err(source) => {
                    self.emit(CollectorEvent::Error(CollectError::Row {
                        page: page.number,
                        title: row.title.clone(),
                        id: row.id().to_string(),
                        source,
                    }))
                    .await
                }
            };
            if !delivered {
                return false;
            }
        }
        true
    }

    async fn fetch(&self, page: Page) -> Result<Vec<RawRow>, WorkerError> {
        match &self.cancel {
            Some(cancel) => tokio::select! {
                biased;
                () = cancel.cancelled() => Err(WorkerError::Cancelled),
                rows = self.fetcher.fetch(page) => rows,
            },
            None => self.fetcher.fetch(page).await,
        }
    }

    /// Bounded send; `false` when the receiver is gone or the run was cancelled
    async fn emit(&self, event: CollectorEvent) -> bool {
        let sent = match &self.cancel {
            Some(cancel) => tokio::select! {
                biased;
                () = cancel.cancelled() => false,
                sent = self.events.send(event) => sent.is_ok(),
            },
            None => self.events.send(event).await.is_ok(),
        };
        if !sent {
            debug!("📭 collector channel unavailable");
        }
        sent
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawling::telemetry::TracingTelemetry;
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedTransport(Result<String, WorkerError>);

    #[async_trait]
    impl CatalogTransport for FixedTransport {
        async fn fetch_listing(&self, _query: &ListingQuery) -> Result<String, WorkerError> {
            self.0.clone()
        }
    }

    fn worker(
        body: Result<String, WorkerError>,
        admission: AdmissionController,
    ) -> (PageWorker, mpsc::Receiver<CollectorEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let telemetry = TracingTelemetry::shared();
        let fetcher = PageFetcher::new(Arc::new(FixedTransport(body)), telemetry.clone());
        let worker = PageWorker::new(
            fetcher,
            Arc::new(RowNormalizer::default()),
            admission,
            tx,
            telemetry,
        );
        (worker, rx)
    }

    async fn drain(mut rx: mpsc::Receiver<CollectorEvent>) -> Vec<CollectorEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn emits_entities_then_row_error_then_done() {
        let body = r#"{"hits":{"hits":[
            {"_source":{"title":"Melk","imageGtin":"1","measurementType":"l","measurementValue":1,"supplierId":7}},
            {"_source":{"title":"Rart","imageGtin":"2","measurementType":"xyz"}}
        ]}}"#;
        let admission = AdmissionController::new(1, Duration::ZERO);
        let (worker, rx) = worker(Ok(body.to_string()), admission.clone());

        let token = admission.acquire().await.unwrap();
        worker.run(Page::new(4, 5), token, 1).await;

        let kinds: Vec<&str> = drain(rx).await.iter().map(CollectorEvent::kind).collect();
        assert_eq!(
            kinds,
            ["product", "price_point", "vendor", "error", "page_done"]
        );
        assert_eq!(admission.available_tokens(), 1);
    }

    #[tokio::test]
    async fn page_failure_still_signals_done() {
        let admission = AdmissionController::new(1, Duration::ZERO);
        let (worker, rx) = worker(Err(WorkerError::NetworkError("reset".into())), admission.clone());

        let token = admission.acquire().await.unwrap();
        worker.run(Page::new(9, 5), token, 1).await;

        let events = drain(rx).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            CollectorEvent::Error(CollectError::Page { page: 9, .. })
        ));
        assert!(matches!(events[1], CollectorEvent::PageDone(9)));
    }

    #[tokio::test]
    async fn cancelled_worker_returns_token_without_done() {
        let admission = AdmissionController::new(1, Duration::from_secs(60));
        let (worker, rx) = worker(Ok("{}".to_string()), admission.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let token = admission.acquire().await.unwrap();
        worker.with_cancellation(cancel).run(Page::new(1, 5), token, 1).await;

        assert!(drain(rx).await.is_empty());
        assert_eq!(admission.available_tokens(), 1);
    }
}
