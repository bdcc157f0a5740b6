#![allow(missing_docs)]

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use catalog_price_crawler_lib::crawling::{
    CatalogCrawler, CrawlingOrchestrator, OrchestratorConfig, TracingTelemetry,
};
use catalog_price_crawler_lib::infrastructure::{
    ConfigManager, HttpClient, init_logging_with_config, log_system_info, write_catalog,
};

/// Usage: `catalog-price-crawler [config-file]`
#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => ConfigManager::with_path(path).load_config()?,
        None => ConfigManager::new()?.initialize_on_first_run().await?,
    };

    init_logging_with_config(config.logging.clone())?;
    log_system_info();

    let request = config
        .crawler
        .to_crawl_request()
        .context("Invalid crawler configuration")?;

    // Ctrl-C → 지금까지 수집한 결과만 출력
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("🛑 Interrupt received, stopping crawl");
                cancel.cancel();
            }
        });
    }

    let transport = HttpClient::from_settings(&config.http)?.with_cancellation(cancel.clone());
    let orchestrator = CrawlingOrchestrator::new(Arc::new(transport), TracingTelemetry::shared())
        .with_config(OrchestratorConfig {
            channel_capacity: config.crawler.channel_capacity,
        });
    let crawler = CatalogCrawler::with_orchestrator(request, orchestrator);

    let catalog = crawler.run_with_cancellation(cancel).await?;

    let mut stdout = std::io::stdout().lock();
    write_catalog(&mut stdout, &catalog)?;
    stdout.flush()?;

    let stats = &catalog.stats;
    info!(
        products = catalog.products.len(),
        price_points = catalog.price_points.len(),
        vendors = catalog.vendors.len(),
        pages_failed = stats.pages_failed,
        rows_failed = stats.rows_failed,
        cancelled = stats.cancelled,
        "🏁 Crawl finished in {:.1}s ({:.1}% pages ok)",
        stats.elapsed.as_secs_f64(),
        stats.page_success_rate()
    );
    Ok(())
}
