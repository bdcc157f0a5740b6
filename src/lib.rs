//! Catalog Price Crawler - grocery catalog fetch orchestration
//!
//! Pulls paginated product listings from a retailer's catalog API with a
//! bounded, rate-shaped worker pool and merges them into deduplicated
//! products, price points and vendors.

// Module declarations
pub mod crawling;
pub mod domain;
pub mod infrastructure;

pub use crawling::{CatalogCrawler, CollectedCatalog, CrawlRequest, CrawlingEngineError};
