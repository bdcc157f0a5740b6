//! # Crawling Module
//!
//! 카탈로그 페이지 수집 엔진
//! - 명시적 모듈 구조 (mod.rs 비사용)
//! - 워커는 이벤트만 전송, 결과 병합은 aggregator 하나가 담당
//! - transport는 trait으로 주입 (HTTP 구현은 infrastructure)

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub mod admission;
pub mod aggregator;
pub mod orchestrator;
pub mod pages;
pub mod request;
pub mod state;
pub mod tasks;
pub mod telemetry;
pub mod workers;

pub use admission::{AdmissionController, AdmissionError, AdmissionToken};
pub use aggregator::{AggregatorState, CollectedCatalog, FanInAggregator};
pub use orchestrator::{CrawlingOrchestrator, OrchestratorConfig};
pub use pages::{Page, PageSource};
pub use request::{CrawlRequest, CrawlRequestBuilder, CrawlRequestError};
pub use state::CrawlingStats;
pub use tasks::{CollectError, CollectorEvent};
pub use telemetry::{CountingTelemetry, RunTelemetry, TelemetryCounts, TracingTelemetry};
pub use workers::{
    CatalogTransport, ListingQuery, NormalizedRow, PageFetcher, PageWorker, RawRow, RowNormalizer,
    WorkerError,
};

/// 크롤링 엔진 에러 타입
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CrawlingEngineError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Engine is already running")]
    AlreadyRunning,
}

impl From<CrawlRequestError> for CrawlingEngineError {
    fn from(e: CrawlRequestError) -> Self {
        Self::ConfigurationError(e.to_string())
    }
}

/// 카탈로그 수집 엔진 (한 번에 하나의 실행만 허용)
pub struct CatalogCrawler {
    orchestrator: CrawlingOrchestrator,
    request: CrawlRequest,
    running: Mutex<()>,
}

impl CatalogCrawler {
    #[must_use]
    pub fn new(
        request: CrawlRequest,
        transport: Arc<dyn CatalogTransport>,
        telemetry: Arc<dyn RunTelemetry>,
    ) -> Self {
        Self::with_orchestrator(request, CrawlingOrchestrator::new(transport, telemetry))
    }

    #[must_use]
    pub fn with_orchestrator(request: CrawlRequest, orchestrator: CrawlingOrchestrator) -> Self {
        Self {
            orchestrator,
            request,
            running: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn request(&self) -> &CrawlRequest {
        &self.request
    }

    /// 전체 페이지 수집 실행
    pub async fn run(&self) -> Result<CollectedCatalog, CrawlingEngineError> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| CrawlingEngineError::AlreadyRunning)?;

        info!(
            pages = self.request.pages().len(),
            parallelism = self.request.parallelism(),
            delay_ms = self.request.rate_limit().as_millis() as u64,
            "🚀 Starting catalog crawl"
        );
        Ok(self.orchestrator.execute(&self.request).await)
    }

    /// 취소 가능한 수집 실행; 취소 시 그때까지 모은 결과 반환
    pub async fn run_with_cancellation(
        &self,
        cancel: CancellationToken,
    ) -> Result<CollectedCatalog, CrawlingEngineError> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| CrawlingEngineError::AlreadyRunning)?;

        info!(
            pages = self.request.pages().len(),
            parallelism = self.request.parallelism(),
            "🚀 Starting cancellable catalog crawl"
        );
        Ok(self
            .orchestrator
            .execute_with_cancellation(&self.request, cancel)
            .await)
    }
}
