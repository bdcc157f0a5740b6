//! HTTP transport for the catalog listing API
//!
//! reqwest client with an optional request quota (governor) and
//! cancellation support. Implements [`CatalogTransport`].

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, ClientBuilder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::crawling::workers::{CatalogTransport, ListingQuery, WorkerError};
use crate::infrastructure::config::{HttpSettings, ngdata};

/// Configuration for HTTP client behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Listing endpoint without query string
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Maximum requests per second; 0 disables the quota
    pub max_requests_per_second: u32,
}

impl HttpClientConfig {
    pub fn from_settings(settings: &HttpSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            timeout_seconds: settings.request_timeout_seconds,
            user_agent: settings.user_agent.clone(),
            max_requests_per_second: settings.max_requests_per_second,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_settings(&HttpSettings::default())
    }
}

/// Catalog API client
pub struct HttpClient {
    client: Client,
    base_url: Url,
    rate_limiter: Option<DefaultDirectRateLimiter>,
    cancellation: Option<CancellationToken>,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, WorkerError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            WorkerError::ConfigurationError(format!("invalid base url {}: {e}", config.base_url))
        })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| {
                WorkerError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
            })?;

        let rate_limiter = NonZeroU32::new(config.max_requests_per_second)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        info!(
            base_url = %base_url,
            timeout_s = config.timeout_seconds,
            rps = config.max_requests_per_second,
            "🌐 HttpClient ready"
        );

        Ok(Self {
            client,
            base_url,
            rate_limiter,
            cancellation: None,
            config,
        })
    }

    pub fn from_settings(settings: &HttpSettings) -> Result<Self, WorkerError> {
        Self::with_config(HttpClientConfig::from_settings(settings))
    }

    /// Aborts in-flight requests once `token` fires
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Full listing URL: base + page parameters + fixed parameters
    pub fn listing_url(&self, query: &ListingQuery) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair(ngdata::PARAM_PAGE, &query.page.to_string())
                .append_pair(ngdata::PARAM_PAGE_SIZE, &query.page_size.to_string());
            for (key, value) in ngdata::FIXED_QUERY {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    /// GET `url` and return the body of a 2xx response
    pub async fn fetch_text(&self, url: Url) -> Result<String, WorkerError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        debug!("🌐 HTTP GET: {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| WorkerError::NetworkError(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            error!("❌ HTTP error {}: {}", status, url);
            return Err(WorkerError::HttpError(status.as_u16(), url.to_string()));
        }

        response
            .text()
            .await
            .map_err(|e| WorkerError::NetworkError(format!("Failed to read response body: {e}")))
    }
}

#[async_trait]
impl CatalogTransport for HttpClient {
    async fn fetch_listing(&self, query: &ListingQuery) -> Result<String, WorkerError> {
        let url = self.listing_url(query);
        match &self.cancellation {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => {
                    warn!("🛑 HTTP request cancelled for page {}", query.page);
                    Err(WorkerError::Cancelled)
                }
                body = self.fetch_text(url) => body,
            },
            None => self.fetch_text(url).await,
        }
    }
}
