//! Pricing tier domain entity

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Billable service a tier ladder belongs to (e.g. `ELECTRIC`, `WATER`).
///
/// Codes are normalized to upper case so `electric` and `ELECTRIC` address
/// the same ladder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ServiceCode(String);

impl ServiceCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ServiceCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<ServiceCode> for String {
    fn from(code: ServiceCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for ServiceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A priced quantity band for one billable service.
///
/// Dates are kept as received from the client: an unparseable
/// `effective_from`/`effective_until` must be representable so the
/// consistency engine can treat the tier as inactive instead of rejecting
/// the whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub service_code: ServiceCode,
    pub tier_order: i32,
    /// Inclusive lower bound. `None` counts as 0.
    #[serde(default)]
    pub min_quantity: Option<Decimal>,
    /// Inclusive upper bound. `None` marks the unbounded final tier.
    #[serde(default)]
    pub max_quantity: Option<Decimal>,
    pub unit_price: Decimal,
    #[serde(default)]
    pub effective_from: Option<String>,
    #[serde(default)]
    pub effective_until: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PricingTier {
    /// Lower bound with the `None` → 0 convention applied.
    pub fn min_or_zero(&self) -> Decimal {
        self.min_quantity.unwrap_or(Decimal::ZERO)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_quantity.is_none()
    }

    pub fn label(&self) -> TierLabel {
        TierLabel {
            id: self.id,
            tier_order: self.tier_order,
        }
    }
}

/// Parse a client-supplied date, dropping any time-of-day component.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 date-times and naive `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_tier_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Identifies a tier in consistency reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierLabel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub tier_order: i32,
}

/// Upper end of an uncovered band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapEnd {
    Finite(Decimal),
    /// No unbounded tier exists; everything from `Gap::from` upward is uncovered.
    Infinity,
}

impl Serialize for GapEnd {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(value) => Serialize::serialize(value, serializer),
            Self::Infinity => serializer.serialize_str("Infinity"),
        }
    }
}

/// A quantity band no active tier covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gap {
    pub from: Decimal,
    pub to: GapEnd,
}

impl Gap {
    pub fn is_missing_final_tier(&self) -> bool {
        self.to == GapEnd::Infinity
    }
}

/// Intersection of two tiers' bands. `to = None` extends to infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverlapRange {
    pub from: Decimal,
    pub to: Option<Decimal>,
}

/// A quantity band claimed by two active tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlap {
    pub tier1: TierLabel,
    pub tier2: TierLabel,
    pub overlap: OverlapRange,
}

/// Values needed to append a tier after the current ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTierDefaults {
    pub next_tier_order: i32,
    /// `None` when an unbounded tier already closes the ladder.
    pub min_quantity: Option<Decimal>,
    pub min_unit_price: Option<Decimal>,
}

impl NewTierDefaults {
    /// Nothing can be appended: an unbounded tier is active, or the top
    /// tier ends at the largest representable quantity.
    pub fn append_blocked(&self) -> bool {
        self.min_quantity.is_none()
    }
}
