//! # Page Source
//!
//! Ordered, finite set of catalog pages to fetch in one run.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One unit of paginated retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    #[must_use]
    pub const fn new(number: u32, size: u32) -> Self {
        Self { number, size }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {} (size {})", self.number, self.size)
    }
}

/// Ordered page identifiers plus the fixed page size
///
/// Duplicate page numbers are dropped on construction (first occurrence
/// wins) so that every page maps to exactly one completion signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSource {
    numbers: Vec<u32>,
    page_size: u32,
}

impl PageSource {
    pub fn new(pages: impl IntoIterator<Item = u32>, page_size: u32) -> Self {
        let mut seen = HashSet::new();
        let numbers = pages.into_iter().filter(|p| seen.insert(*p)).collect();
        Self { numbers, page_size }
    }

    /// Inclusive range `start..=end`; empty when `start > end`
    #[must_use]
    pub fn range(start: u32, end: u32, page_size: u32) -> Self {
        Self::new(start..=end, page_size)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    pub fn iter(&self) -> impl Iterator<Item = Page> + '_ {
        let size = self.page_size;
        self.numbers.iter().map(move |&number| Page { number, size })
    }
}
