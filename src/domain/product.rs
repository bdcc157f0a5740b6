use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::volume::Volume;

/// Product category (the listing API never fills these in)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub parent: Option<Box<Category>>,
}

/// Product basic information from catalog listing pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String, // GTIN from the source row
    pub name: String,
    pub description: String,
    pub qty: Volume,
    #[serde(rename = "vendorId")]
    pub vendor_id: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub categories: Vec<Category>,
}

/// One price observation for a product at a retailer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(rename = "retailId")]
    pub retail_id: String,
    #[serde(rename = "storeId")]
    pub store_id: Option<String>,
    pub price: f64,
    /// Observation date, truncated to the UTC day
    pub date: DateTime<Utc>,
    #[serde(rename = "isOffer")]
    pub is_offer: bool,
}

/// Vendor (supplier) information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
}

const DESCRIPTION_PREVIEW_LEN: usize = 50;

impl Product {
    /// Pretty-printed JSON document (2-space indent)
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// 설명 미리보기: 50자를 넘으면 47자 + "..."
    fn short_description(&self) -> String {
        if self.description.chars().count() > DESCRIPTION_PREVIEW_LEN {
            let head: String = self
                .description
                .chars()
                .take(DESCRIPTION_PREVIEW_LEN - 3)
                .collect();
            format!("{head}...")
        } else {
            self.description.clone()
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Product '{} - {}' id={}>",
            self.name,
            self.short_description(),
            self.id
        )
    }
}

impl PricePoint {
    /// Pretty-printed JSON document (2-space indent)
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for PricePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<PricePoint '{}' {:.6}>", self.product_id, self.price)
    }
}
