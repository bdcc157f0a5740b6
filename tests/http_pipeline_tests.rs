//! HTTP transport → engine → export, against a local mock catalog API
mod common;

use std::sync::Arc;

use mockito::{Matcher, Server};
use serde_json::Value;

use catalog_price_crawler_lib::crawling::{CatalogCrawler, CountingTelemetry, CrawlRequest};
use catalog_price_crawler_lib::infrastructure::{HttpClient, HttpClientConfig, write_catalog};

use common::{listing, row};

const LISTING_PATH: &str = "/api/products/1300/7080001150488";

async fn mock_page(server: &mut Server, page: &str, status: usize, body: String) -> mockito::Mock {
    server
        .mock("GET", LISTING_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), page.into()),
            Matcher::UrlEncoded("page_size".into(), "2".into()),
            Matcher::UrlEncoded("full_response".into(), "true".into()),
            Matcher::UrlEncoded("showNotForSale".into(), "false".into()),
        ]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn crawl_over_http_and_export() {
    let mut server = Server::new_async().await;
    let page1 = mock_page(
        &mut server,
        "1",
        200,
        listing(&[row("7038010000065", "Lettmelk", "l", 11, 21.9), row("7039610000318", "Egg", "stk", 12, 44.0)]),
    )
    .await;
    let page2 = mock_page(
        &mut server,
        "2",
        200,
        listing(&[row("7038010055720", "Norvegia", "g", 11, 179.8), row("0000000000000", "Rart", "xyz", 11, 1.0)]),
    )
    .await;
    let page3 = mock_page(&mut server, "3", 500, "Error".to_string()).await;

    let transport = HttpClient::with_config(HttpClientConfig {
        base_url: format!("{}{LISTING_PATH}", server.url()),
        timeout_seconds: 5,
        ..HttpClientConfig::default()
    })
    .expect("client");
    let telemetry = Arc::new(CountingTelemetry::with_tracing());
    let request = CrawlRequest::builder()
        .parallel(2)
        .page_size(2)
        .page_range(1, 3)
        .build()
        .expect("request");
    let crawler = CatalogCrawler::new(request, Arc::new(transport), telemetry.clone());

    let catalog = crawler.run().await.expect("run");

    page1.assert_async().await;
    page2.assert_async().await;
    page3.assert_async().await;

    assert_eq!(catalog.products.len(), 3);
    assert_eq!(catalog.vendors.len(), 2);
    assert_eq!(catalog.stats.pages_failed, 1);
    assert_eq!(catalog.stats.rows_failed, 1);
    assert_eq!(telemetry.counts().pages_done, 3);

    let mut out = Vec::new();
    write_catalog(&mut out, &catalog).expect("export");
    let text = String::from_utf8(out).expect("utf-8");

    // 3 price points then 3 products, each a standalone JSON document
    let documents: Vec<Value> = serde_json::Deserializer::from_str(&text)
        .into_iter::<Value>()
        .collect::<Result<_, _>>()
        .expect("valid JSON stream");
    assert_eq!(documents.len(), 6);
    assert!(documents[..3].iter().all(|d| d.get("productId").is_some()));
    assert!(documents[3..].iter().all(|d| d.get("qty").is_some()));

    let cheese = documents
        .iter()
        .find(|d| d["id"] == "7038010055720")
        .expect("cheese product");
    assert_eq!(cheese["qty"]["unit"], "kg");
    assert_eq!(cheese["vendorId"], "11");
    assert_eq!(cheese["imageUrl"], "7038010055720");
    assert_eq!(cheese["categories"], Value::Array(Vec::new()));

    let milk_price = documents[..3]
        .iter()
        .find(|d| d["productId"] == "7038010000065")
        .expect("milk price");
    assert_eq!(milk_price["retailId"], "meny");
    assert_eq!(milk_price["storeId"], "7080001150488");
    assert_eq!(milk_price["isOffer"], false);
}
