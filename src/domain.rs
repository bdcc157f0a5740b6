//! Domain module - Core entities and value objects
//!
//! Entities produced by a catalog run (products, price points, vendors)
//! and the unit normalization they depend on.
//!
//! Modern Rust module organization:
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod constants;
pub mod product;
pub mod volume;

pub use product::{Category, PricePoint, Product, Vendor};
pub use volume::{Unit, UnitError, Volume};
