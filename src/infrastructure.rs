//! Infrastructure layer: configuration, logging, HTTP transport and export

pub mod config; // Configuration constants and layered loading
pub mod export;
pub mod logging; // Logging infrastructure
pub mod simple_http_client;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, CrawlerSettings, HttpSettings, LoggingConfig, ngdata};
pub use export::write_catalog;
pub use logging::{init_logging, init_logging_with_config, log_system_info};
pub use simple_http_client::{HttpClient, HttpClientConfig};
