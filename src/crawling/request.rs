//! # Crawl Request
//!
//! 한 번의 수집 실행에 필요한 설정값 (병렬도, 페이지 크기, 지연, 페이지 목록)

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pages::PageSource;

/// Builder defaults
pub mod defaults {
    pub const PARALLELISM: usize = 1;
    pub const PAGE_SIZE: u32 = 5;
    pub const PAGES: [u32; 1] = [1];
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlRequestError {
    #[error("parallelism must be greater than zero")]
    ZeroParallelism,

    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

/// Validated run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    parallelism: usize,
    page_size: u32,
    rate_limit: Duration,
    pages: PageSource,
}

impl CrawlRequest {
    #[must_use]
    pub fn builder() -> CrawlRequestBuilder {
        CrawlRequestBuilder::default()
    }

    #[must_use]
    pub const fn parallelism(&self) -> usize {
        self.parallelism
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Minimum time each admission token is held after its page finishes
    #[must_use]
    pub const fn rate_limit(&self) -> Duration {
        self.rate_limit
    }

    #[must_use]
    pub const fn pages(&self) -> &PageSource {
        &self.pages
    }
}

impl Default for CrawlRequest {
    fn default() -> Self {
        Self {
            parallelism: defaults::PARALLELISM,
            page_size: defaults::PAGE_SIZE,
            rate_limit: Duration::ZERO,
            pages: PageSource::new(defaults::PAGES, defaults::PAGE_SIZE),
        }
    }
}

/// Builder for [`CrawlRequest`]; unset values fall back to [`defaults`]
#[derive(Debug, Clone)]
pub struct CrawlRequestBuilder {
    parallelism: usize,
    page_size: u32,
    rate_limit: Duration,
    pages: Vec<u32>,
}

impl Default for CrawlRequestBuilder {
    fn default() -> Self {
        Self {
            parallelism: defaults::PARALLELISM,
            page_size: defaults::PAGE_SIZE,
            rate_limit: Duration::ZERO,
            pages: defaults::PAGES.to_vec(),
        }
    }
}

impl CrawlRequestBuilder {
    #[must_use]
    pub const fn parallel(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    #[must_use]
    pub const fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub const fn rate_limit(mut self, delay: Duration) -> Self {
        self.rate_limit = delay;
        self
    }

    /// Replaces the page list
    #[must_use]
    pub fn pages(mut self, pages: impl IntoIterator<Item = u32>) -> Self {
        self.pages = pages.into_iter().collect();
        self
    }

    /// Replaces the page list with `start..=end`
    #[must_use]
    pub fn page_range(self, start: u32, end: u32) -> Self {
        self.pages(start..=end)
    }

    pub fn build(self) -> Result<CrawlRequest, CrawlRequestError> {
        if self.parallelism == 0 {
            return Err(CrawlRequestError::ZeroParallelism);
        }
        if self.page_size == 0 {
            return Err(CrawlRequestError::ZeroPageSize);
        }
        Ok(CrawlRequest {
            parallelism: self.parallelism,
            page_size: self.page_size,
            rate_limit: self.rate_limit,
            pages: PageSource::new(self.pages, self.page_size),
        })
    }
}
