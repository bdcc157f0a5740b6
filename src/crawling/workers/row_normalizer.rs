//! # Row Normalizer
//!
//! Converts one decoded listing row into the three domain entities.
//! Pure apart from reading the clock when no observation time is pinned.

use chrono::{DateTime, NaiveTime, Utc};

use crate::domain::constants::retailer::RETAILER_ID;
use crate::domain::{PricePoint, Product, UnitError, Vendor, Volume};

use super::page_fetcher::RawRow;

/// Entities produced from one row
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub product: Product,
    pub price_point: PricePoint,
    pub vendor: Vendor,
}

/// Row → (Product, PricePoint, Vendor)
#[derive(Debug, Clone)]
pub struct RowNormalizer {
    retailer_id: String,
    observed_at: Option<DateTime<Utc>>,
}

impl RowNormalizer {
    /// Normalizer stamping the current UTC day on each price point
    pub fn new(retailer_id: impl Into<String>) -> Self {
        Self {
            retailer_id: retailer_id.into(),
            observed_at: None,
        }
    }

    /// Normalizer with a fixed observation time (truncated to the day)
    pub fn with_observed_at(retailer_id: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            retailer_id: retailer_id.into(),
            observed_at: Some(truncate_to_day(observed_at)),
        }
    }

    #[must_use]
    pub fn retailer_id(&self) -> &str {
        &self.retailer_id
    }

    /// Fails only when the row's measurement type is not a known unit
    pub fn normalize(&self, row: &RawRow) -> Result<NormalizedRow, UnitError> {
        let qty = Volume::normalize(row.measurement_value, &row.measurement_type)?;
        let id = row.id().to_string();
        let vendor_id = row.supplier_id.to_string();

        let product = Product {
            id: id.clone(),
            name: row.title.clone(),
            description: row.subtitle.clone(),
            qty,
            vendor_id: Some(vendor_id.clone()),
            image_url: Some(row.image_gtin.clone()),
            categories: Vec::new(),
        };

        let price_point = PricePoint {
            product_id: id,
            retail_id: self.retailer_id.clone(),
            store_id: Some(row.store_id.clone()),
            price: row.price_per_unit,
            date: self
                .observed_at
                .unwrap_or_else(|| truncate_to_day(Utc::now())),
            is_offer: row.is_offer,
        };

        let vendor = Vendor {
            id: vendor_id,
            name: row.vendor.clone(),
        };

        Ok(NormalizedRow {
            product,
            price_point,
            vendor,
        })
    }
}

impl Default for RowNormalizer {
    fn default() -> Self {
        Self::new(RETAILER_ID)
    }
}

/// Midnight UTC of the given instant's day
#[must_use]
pub fn truncate_to_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}
