//! Catalog export
//!
//! One pretty-printed JSON document per entity, each followed by a newline:
//! every price point first, then every product. Entities are written in id
//! order so that repeated runs produce comparable output.

use std::io::Write;

use anyhow::{Context, Result};

use crate::crawling::CollectedCatalog;

/// Writes price points then products to `writer`
pub fn write_catalog<W: Write>(writer: &mut W, catalog: &CollectedCatalog) -> Result<()> {
    for price_point in catalog.sorted_price_points() {
        let json = price_point.to_json_pretty()?;
        writeln!(writer, "{json}")
            .with_context(|| format!("Failed to write price point {}", price_point.product_id))?;
    }
    for product in catalog.sorted_products() {
        let json = product.to_json_pretty()?;
        writeln!(writer, "{json}")
            .with_context(|| format!("Failed to write product {}", product.id))?;
    }
    writer.flush().context("Failed to flush catalog output")?;
    Ok(())
}
