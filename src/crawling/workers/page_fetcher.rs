//! # Page Fetcher
//!
//! 한 페이지 목록을 transport로 가져와서 `RawRow` 배치로 디코딩합니다.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crawling::pages::Page;
use crate::crawling::telemetry::RunTelemetry;

use super::WorkerError;

/// One listing record as delivered by the catalog API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRow {
    pub title: String,
    pub subtitle: String,
    pub vendor: String,
    pub is_offer: bool,
    pub image_gtin: String,
    pub price_per_unit: f64,
    pub price_per_unit_original: f64,
    pub measurement_value: f64,
    pub measurement_type: String,
    pub unit: String,
    pub store_id: String,
    pub category_name: String,
    pub supplier_id: i64,
}

impl RawRow {
    /// Product identity of this row
    #[must_use]
    pub fn id(&self) -> &str {
        &self.image_gtin
    }
}

/// Per-page query; fixed facet/field parameters are the transport's concern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingQuery {
    pub page: u32,
    pub page_size: u32,
}

impl From<Page> for ListingQuery {
    fn from(page: Page) -> Self {
        Self {
            page: page.number,
            page_size: page.size,
        }
    }
}

/// Source of raw listing payloads
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    /// Performs one retrieval and returns the response body
    async fn fetch_listing(&self, query: &ListingQuery) -> Result<String, WorkerError>;
}

#[derive(Debug, Default, Deserialize)]
struct ListingEnvelope {
    #[serde(default)]
    hits: HitsSection,
}

#[derive(Debug, Default, Deserialize)]
struct HitsSection {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: RawRow,
}

/// Retrieves and decodes a single page
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn CatalogTransport>,
    telemetry: Arc<dyn RunTelemetry>,
}

impl PageFetcher {
    #[must_use]
    pub fn new(transport: Arc<dyn CatalogTransport>, telemetry: Arc<dyn RunTelemetry>) -> Self {
        Self {
            transport,
            telemetry,
        }
    }

    /// 한 번의 요청 + 디코딩. 실패는 페이지 단위 에러
    pub async fn fetch(&self, page: Page) -> Result<Vec<RawRow>, WorkerError> {
        let query = ListingQuery::from(page);
        let body = self.transport.fetch_listing(&query).await?;
        let rows = Self::decode(&body)?;

        debug!(page = page.number, bytes = body.len(), rows = rows.len(), "📄 page decoded");
        self.telemetry.rows_received(page.number, rows.len());
        Ok(rows)
    }

    /// Decodes `{"hits":{"hits":[{"_source":{..}}]}}`, keeping row order
    pub fn decode(body: &str) -> Result<Vec<RawRow>, WorkerError> {
        let envelope: ListingEnvelope = serde_json::from_str(body)
            .map_err(|e| WorkerError::ParseError(format!("listing payload: {e}")))?;
        Ok(envelope.hits.hits.into_iter().map(|hit| hit.source).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawling::telemetry::TracingTelemetry;
    use std::sync::Mutex;

    struct StubTransport {
        body: Result<String, WorkerError>,
        seen: Mutex<Vec<ListingQuery>>,
    }

    #[async_trait]
    impl CatalogTransport for StubTransport {
        async fn fetch_listing(&self, query: &ListingQuery) -> Result<String, WorkerError> {
            self.seen.lock().unwrap().push(*query);
            self.body.clone()
        }
    }

    fn fetcher(body: Result<String, WorkerError>) -> (PageFetcher, Arc<StubTransport>) {
        let transport = Arc::new(StubTransport {
            body,
            seen: Mutex::new(Vec::new()),
        });
        let fetcher = PageFetcher::new(transport.clone(), TracingTelemetry::shared());
        (fetcher, transport)
    }

    #[tokio::test]
    async fn decodes_rows_in_order() {
        let body = r#"{
            "hits": {"total": 2, "hits": [
                {"_id": "a", "_source": {"title": "Lettmelk", "imageGtin": "7038010000065",
                    "measurementType": "l", "measurementValue": 1.0, "supplierId": 42,
                    "pricePerUnit": 21.9, "storeId": "7080001150488", "isOffer": false}},
                {"_source": {"title": "Egg", "imageGtin": "7039610000318", "measurementType": "stk"}}
            ]}
        }"#;
        let (fetcher, transport) = fetcher(Ok(body.to_string()));

        let rows = fetcher.fetch(Page::new(3, 100)).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Lettmelk");
        assert_eq!(rows[0].supplier_id, 42);
        assert_eq!(rows[1].id(), "7039610000318");
        assert_eq!(rows[1].supplier_id, 0);
        assert_eq!(
            transport.seen.lock().unwrap().as_slice(),
            &[ListingQuery {
                page: 3,
                page_size: 100
            }]
        );
    }

    #[test]
    fn missing_sections_decode_as_empty() {
        assert!(PageFetcher::decode("{}").unwrap().is_empty());
        assert!(PageFetcher::decode(r#"{"hits":{}}"#).unwrap().is_empty());
    }

    #[test]
    fn wrong_field_type_is_a_parse_error() {
        let err = PageFetcher::decode(r#"{"hits":{"hits":[{"_source":{"supplierId":"x"}}]}}"#)
            .unwrap_err();
        assert!(matches!(err, WorkerError::ParseError(_)));

        let err = PageFetcher::decode("<html>").unwrap_err();
        assert!(matches!(err, WorkerError::ParseError(_)));
    }

    #[tokio::test]
    async fn transport_failure_is_passed_through() {
        let (fetcher, _) = fetcher(Err(WorkerError::HttpError(500, "http://x".to_string())));
        let err = fetcher.fetch(Page::new(1, 5)).await.unwrap_err();
        assert_eq!(err, WorkerError::HttpError(500, "http://x".to_string()));
    }
}
