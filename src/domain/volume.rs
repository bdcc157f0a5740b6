//! # Volume Value Object
//!
//! 소스 레코드의 측정 단위 문자열을 정규화된 수량으로 변환합니다.
//! 변환은 결정적이고 상태가 없습니다 (같은 입력 → 같은 출력).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical unit of a normalized quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Weight in kilograms
    #[serde(rename = "kg")]
    Weight,
    /// Volume in litres
    #[serde(rename = "L")]
    Volume,
    /// Count of pieces
    #[serde(rename = "pcs")]
    Amount,
}

impl Unit {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Weight => "kg",
            Self::Volume => "L",
            Self::Amount => "pcs",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unit normalization errors (row-scoped)
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitError {
    #[error("unknown unit: '{0}'")]
    UnknownUnit(String),
}

/// Normalized quantity: a value expressed in one canonical [`Unit`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub unit: Unit,
    pub value: f64,
}

impl Volume {
    #[must_use]
    pub const fn new(unit: Unit, value: f64) -> Self {
        Self { unit, value }
    }

    /// Converts a raw measurement into its canonical unit.
    ///
    /// Matching is case-insensitive. Anything outside the lookup table
    /// (including an empty string) is a [`UnitError::UnknownUnit`].
    pub fn normalize(value: f64, raw_unit: &str) -> Result<Self, UnitError> {
        let (unit, divisor) = match raw_unit.to_lowercase().as_str() {
            "kg" => (Unit::Weight, 1.0),
            "g" => (Unit::Weight, 1000.0),
            "hg" => (Unit::Weight, 100.0),
            "l" => (Unit::Volume, 1.0),
            "ml" => (Unit::Volume, 1000.0),
            "dl" => (Unit::Volume, 10.0),
            // 개수 단위 별칭들 (stk = stykk)
            "stk" | "c" | "pcs" => (Unit::Amount, 1.0),
            _ => return Err(UnitError::UnknownUnit(raw_unit.to_string())),
        };

        Ok(Self {
            unit,
            value: value / divisor,
        })
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
