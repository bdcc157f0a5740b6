//! # Crawling Orchestrator
//!
//! Wires one run together: a dispatcher task admits pages through the
//! admission controller and spawns a worker per page, while the fan-in
//! aggregator runs on the caller's task until every page is done.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::crawling::admission::AdmissionController;
use crate::crawling::aggregator::{CollectedCatalog, FanInAggregator};
use crate::crawling::pages::PageSource;
use crate::crawling::request::CrawlRequest;
use crate::crawling::telemetry::RunTelemetry;
use crate::crawling::workers::{CatalogTransport, PageFetcher, PageWorker, RowNormalizer};

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Capacity of the worker → aggregator event channel
    pub channel_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

/// Runs catalog collections against one transport
pub struct CrawlingOrchestrator {
    transport: Arc<dyn CatalogTransport>,
    normalizer: Arc<RowNormalizer>,
    telemetry: Arc<dyn RunTelemetry>,
    config: OrchestratorConfig,
}

impl CrawlingOrchestrator {
    #[must_use]
    pub fn new(transport: Arc<dyn CatalogTransport>, telemetry: Arc<dyn RunTelemetry>) -> Self {
        Self {
            transport,
            normalizer: Arc::new(RowNormalizer::default()),
            telemetry,
            config: OrchestratorConfig::default(),
        }
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: RowNormalizer) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Collects every requested page; partial failures are reported, never returned
    pub async fn execute(&self, request: &CrawlRequest) -> CollectedCatalog {
        self.run(request, None).await
    }

    /// Like [`execute`](Self::execute), returning what was collected so far
    /// once `cancel` fires
    pub async fn execute_with_cancellation(
        &self,
        request: &CrawlRequest,
        cancel: CancellationToken,
    ) -> CollectedCatalog {
        self.run(request, Some(cancel)).await
    }

    async fn run(&self, request: &CrawlRequest, cancel: Option<CancellationToken>) -> CollectedCatalog {
        let pages = request.pages().clone();
        self.telemetry.run_started(pages.len(), request.parallelism());

        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let admission = AdmissionController::new(request.parallelism(), request.rate_limit());

        let mut worker = PageWorker::new(
            PageFetcher::new(self.transport.clone(), self.telemetry.clone()),
            self.normalizer.clone(),
            admission.clone(),
            tx,
            self.telemetry.clone(),
        );
        if let Some(cancel) = &cancel {
            worker = worker.with_cancellation(cancel.clone());
        }

        let aggregator = FanInAggregator::new(&pages, self.telemetry.clone());
        let dispatcher = Self::spawn_dispatcher(pages, admission, worker, cancel.clone());

        let catalog = aggregator.run(rx, cancel).await;

        if let Err(e) = dispatcher.await {
            error!("❌ dispatcher task failed: {}", e);
        }

        self.telemetry.run_finished(&catalog.stats);
        catalog
    }

    /// Admits pages in order, one spawned worker per admitted page
    fn spawn_dispatcher(
        pages: PageSource,
        admission: AdmissionController,
        worker: PageWorker,
        cancel: Option<CancellationToken>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let total = pages.len();
            let cancel = cancel.unwrap_or_default();
            let mut handles = Vec::with_capacity(total);

            for page in pages.iter() {
                let token = match admission.acquire_cancellable(&cancel).await {
                    Ok(token) => token,
                    Err(e) => {
                        info!(page = page.number, "🛑 dispatch stopped: {}", e);
                        break;
                    }
                };
                let worker = worker.clone();
                handles.push(tokio::spawn(worker.run(page, token, total)));
            }
            debug!(dispatched = handles.len(), total, "📤 all pages dispatched");

            // 워커들이 끝나면 채널이 닫히도록 원본 sender 해제
            drop(worker);

            for handle in handles {
                if let Err(e) = handle.await {
                    error!("❌ page worker panicked: {}", e);
                }
            }
        })
    }
}
