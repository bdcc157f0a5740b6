//! # Collector Event Definitions
//!
//! Messages sent from page workers to the fan-in aggregator.
//! Every message is an owned value; workers never touch the result maps.

use thiserror::Error;

use crate::domain::{PricePoint, Product, UnitError, Vendor};

use super::workers::WorkerError;

/// Failure reported by a worker, scoped to a page or to a single row
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectError {
    /// Fetching or decoding the page failed; the page contributes nothing
    #[error("page {page} failed: {source}")]
    Page {
        page: u32,
        #[source]
        source: WorkerError,
    },

    /// One row could not be normalized; the rest of the page is unaffected
    #[error("error: {source} (row='{title}' id='{id}')")]
    Row {
        page: u32,
        title: String,
        id: String,
        #[source]
        source: UnitError,
    },
}

impl CollectError {
    #[must_use]
    pub const fn page(&self) -> u32 {
        match self {
            Self::Page { page, .. } | Self::Row { page, .. } => *page,
        }
    }

    #[must_use]
    pub const fn is_page_scoped(&self) -> bool {
        matches!(self, Self::Page { .. })
    }
}

/// Inbound event for the aggregator
#[derive(Debug, Clone)]
pub enum CollectorEvent {
    Product(Product),
    PricePoint(PricePoint),
    Vendor(Vendor),
    Error(CollectError),
    /// Sent exactly once per page, after all of that page's other events
    PageDone(u32),
}

impl CollectorEvent {
    /// Event class name for telemetry
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Product(_) => "product",
            Self::PricePoint(_) => "price_point",
            Self::Vendor(_) => "vendor",
            Self::Error(_) => "error",
            Self::PageDone(_) => "page_done",
        }
    }
}
