//! Configuration infrastructure
//!
//! Configuration is layered with the `config` crate:
//! 1. Built-in defaults (the `defaults` module below)
//! 2. Optional config file (JSON/TOML, by extension)
//! 3. Environment variables, `CATALOG_CRAWLER__SECTION__KEY`

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::crawling::{CrawlRequest, CrawlRequestError};

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub crawler: CrawlerSettings,
    pub http: HttpSettings,
    pub logging: LoggingConfig,
}

/// Run shape handed to the crawling core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerSettings {
    /// Pages in flight at once
    pub parallelism: usize,

    /// Rows requested per page
    pub page_size: u32,

    /// Minimum hold time of an admission slot after its page finishes
    pub rate_limit_ms: u64,

    /// First page (inclusive)
    pub start_page: u32,

    /// Last page (inclusive)
    pub end_page: u32,

    /// Worker → aggregator channel capacity
    pub channel_capacity: usize,
}

/// Catalog API transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub base_url: String,
    pub request_timeout_seconds: u64,
    pub user_agent: String,

    /// Extra request quota on top of admission control; 0 disables it
    pub max_requests_per_second: u32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// JSON formatted file logs
    pub json_format: bool,

    /// Console output (stderr)
    pub console_output: bool,

    /// File output
    pub file_output: bool,

    /// Log directory; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,

    pub file_name: String,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Target-specific levels (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            parallelism: defaults::PARALLELISM,
            page_size: defaults::PAGE_SIZE,
            rate_limit_ms: defaults::RATE_LIMIT_MS,
            start_page: defaults::START_PAGE,
            end_page: defaults::END_PAGE,
            channel_capacity: defaults::CHANNEL_CAPACITY,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: ngdata::PRODUCTS_URL.to_string(),
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            max_files: defaults::LOG_MAX_FILES,
            auto_cleanup_logs: defaults::LOG_AUTO_CLEANUP,
            module_filters: [
                ("reqwest", "info"),
                ("hyper", "warn"),
                ("h2", "warn"),
                ("tokio", "info"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        }
    }
}

impl CrawlerSettings {
    /// Validates and converts into the core's run configuration
    pub fn to_crawl_request(&self) -> Result<CrawlRequest, CrawlRequestError> {
        CrawlRequest::builder()
            .parallel(self.parallelism)
            .page_size(self.page_size)
            .rate_limit(Duration::from_millis(self.rate_limit_ms))
            .page_range(self.start_page, self.end_page)
            .build()
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    config_path: PathBuf,
    file_required: bool,
    env_source: Option<config::Map<String, String>>,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Manager for the per-user config file (optional)
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self {
            config_path,
            file_required: false,
            env_source: None,
        })
    }

    /// Manager for an explicit config file, which must exist
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            file_required: true,
            env_source: None,
        }
    }

    /// Reads overrides from `vars` instead of the process environment
    #[must_use]
    pub fn with_env_source(mut self, vars: HashMap<String, String>) -> Self {
        self.env_source = Some(vars.into_iter().collect());
        self
    }

    /// Merges defaults, file and environment into one [`AppConfig`]
    pub fn load_config(&self) -> Result<AppConfig> {
        let defaults = Config::try_from(&AppConfig::default())
            .context("Failed to build default configuration")?;

        let environment = Environment::with_prefix(defaults::ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(self.env_source.clone());

        let config: AppConfig = Config::builder()
            .add_source(defaults)
            .add_source(File::from(self.config_path.as_path()).required(self.file_required))
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to load configuration from {:?}", self.config_path))?
            .try_deserialize()
            .context("Invalid configuration")?;

        info!("Loaded configuration (file: {:?})", self.config_path);
        Ok(config)
    }

    /// Writes the default configuration when no file exists yet, then loads
    pub async fn initialize_on_first_run(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("🎉 First run detected - writing default configuration");
            self.save_config(&AppConfig::default()).await?;
        }
        self.load_config()
    }

    /// Save configuration to file (pretty JSON)
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// NG Data platform (Meny) catalog API
pub mod ngdata {
    /// Product listing endpoint for the Meny chain and store
    pub const PRODUCTS_URL: &str =
        "https://platform-rest-prod.ngdata.no/api/products/1300/7080001150488";

    pub const PARAM_PAGE: &str = "page";
    pub const PARAM_PAGE_SIZE: &str = "page_size";

    /// Query parameters sent with every listing request
    pub const FIXED_QUERY: &[(&str, &str)] = &[
        ("full_response", "true"),
        ("fieldset", "maximal"),
        ("facets", "Category,Allergen"),
        ("showNotForSale", "false"),
    ];
}

/// Default configuration values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "catalog-price-crawler";
    pub const CONFIG_FILE_NAME: &str = "config.json";
    pub const ENV_PREFIX: &str = "CATALOG_CRAWLER";

    pub const PARALLELISM: usize = 4;
    pub const PAGE_SIZE: u32 = 100;
    pub const RATE_LIMIT_MS: u64 = 500;
    pub const START_PAGE: u32 = 1;
    pub const END_PAGE: u32 = 500;
    pub const CHANNEL_CAPACITY: usize = 256;

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;
    pub const USER_AGENT: &str = concat!("catalog-price-crawler/", env!("CARGO_PKG_VERSION"));
    pub const MAX_REQUESTS_PER_SECOND: u32 = 0;

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;
    pub const LOG_FILE_NAME: &str = "catalog-price-crawler.log";
    pub const LOG_MAX_FILES: u32 = 5;
    pub const LOG_AUTO_CLEANUP: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager_in(dir: &TempDir, file: &str) -> ConfigManager {
        ConfigManager::with_path(dir.path().join(file)).with_env_source(HashMap::new())
    }

    #[test]
    fn defaults_match_deployment_shape() {
        let config = AppConfig::default();
        let request = config.crawler.to_crawl_request().unwrap();

        assert_eq!(request.parallelism(), 4);
        assert_eq!(request.page_size(), 100);
        assert_eq!(request.rate_limit(), Duration::from_millis(500));
        assert_eq!(request.pages().len(), 500);
        assert_eq!(config.http.base_url, ngdata::PRODUCTS_URL);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("crawler.json"),
            r#"{"crawler": {"parallelism": 2, "end_page": 3}}"#,
        )
        .unwrap();

        let config = manager_in(&dir, "crawler.json").load_config().unwrap();
        assert_eq!(config.crawler.parallelism, 2);
        assert_eq!(config.crawler.end_page, 3);
        assert_eq!(config.crawler.page_size, defaults::PAGE_SIZE);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("crawler.toml"),
            "[crawler]\nparallelism = 2\n",
        )
        .unwrap();

        let env = HashMap::from([
            ("CATALOG_CRAWLER__CRAWLER__PARALLELISM".to_string(), "8".to_string()),
            ("CATALOG_CRAWLER__LOGGING__LEVEL".to_string(), "debug".to_string()),
        ]);
        let config = ConfigManager::with_path(dir.path().join("crawler.toml"))
            .with_env_source(env)
            .load_config()
            .unwrap();

        assert_eq!(config.crawler.parallelism, 8);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(manager_in(&dir, "absent.json").load_config().is_err());
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let settings = CrawlerSettings {
            parallelism: 0,
            ..CrawlerSettings::default()
        };
        assert_eq!(
            settings.to_crawl_request(),
            Err(CrawlRequestError::ZeroParallelism)
        );
    }

    #[tokio::test]
    async fn first_run_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested/config.json"))
            .with_env_source(HashMap::new());

        let config = manager.initialize_on_first_run().await.unwrap();

        assert!(manager.config_path().exists());
        assert_eq!(config, AppConfig::default());
    }
}
