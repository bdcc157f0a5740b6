//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use catalog_price_crawler_lib::crawling::{CatalogTransport, ListingQuery, WorkerError};

/// One listing row in wire format
pub fn row(gtin: &str, title: &str, unit: &str, supplier: i64, price: f64) -> Value {
    json!({
        "title": title,
        "subtitle": format!("{title} beskrivelse"),
        "vendor": format!("Leverandør {supplier}"),
        "isOffer": false,
        "imageGtin": gtin,
        "pricePerUnit": price,
        "pricePerUnitOriginal": price,
        "measurementValue": 1.0,
        "measurementType": unit,
        "unit": "stk",
        "storeId": "7080001150488",
        "categoryName": "Meieri",
        "supplierId": supplier,
    })
}

/// Listing envelope around `rows`
pub fn listing(rows: &[Value]) -> String {
    let hits: Vec<Value> = rows.iter().map(|r| json!({ "_source": r })).collect();
    json!({ "hits": { "total": { "value": rows.len() }, "hits": hits } }).to_string()
}

/// What the scripted transport does for one page
#[derive(Clone)]
pub enum PageScript {
    Body(String),
    Fail(WorkerError),
    /// Never answers
    Hang,
}

/// In-memory transport with per-page scripts and in-flight tracking
pub struct ScriptedTransport {
    pages: HashMap<u32, PageScript>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            latency: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn page(mut self, page: u32, script: PageScript) -> Self {
        self.pages.insert(page, script);
        self
    }

    pub fn rows(self, page: u32, rows: &[Value]) -> Self {
        self.page(page, PageScript::Body(listing(rows)))
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogTransport for ScriptedTransport {
    async fn fetch_listing(&self, query: &ListingQuery) -> Result<String, WorkerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let script = self
            .pages
            .get(&query.page)
            .cloned()
            .unwrap_or_else(|| PageScript::Body(listing(&[])));

        let result = match script {
            PageScript::Body(body) => Ok(body),
            PageScript::Fail(err) => Err(err),
            PageScript::Hang => futures::future::pending().await,
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
