//! 리테일러 및 도메인 상수들

/// Retailer constants for the catalog this crawler reads
pub mod retailer {
    /// Retailer identifier stamped on every price point
    pub const RETAILER_ID: &str = "meny";
}
