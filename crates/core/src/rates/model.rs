//! Rate models and selection helpers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which rate table an entry belongs to.
///
/// A collection record persists the *farmer* rate; collector earnings are a
/// display-time computation from the *collector* rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    Collector,
    Farmer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateCacheEntry {
    pub rate_id: String,
    pub rate_per_liter: Decimal,
    /// ISO date the rate takes effect.
    pub effective_from: String,
    pub is_active: bool,
}

/// Pick the rate in force: the active entry with the most recent
/// `effective_from`. Dates are compared as parsed dates with a lexical
/// fallback for non-ISO values.
pub fn latest_effective(rates: &[RateCacheEntry]) -> Option<&RateCacheEntry> {
    rates
        .iter()
        .filter(|rate| rate.is_active)
        .max_by(|a, b| compare_effective_from(&a.effective_from, &b.effective_from))
}

fn compare_effective_from(a: &str, b: &str) -> std::cmp::Ordering {
    match (
        NaiveDate::parse_from_str(a, "%Y-%m-%d"),
        NaiveDate::parse_from_str(b, "%Y-%m-%d"),
    ) {
        (Ok(da), Ok(db)) => da.cmp(&db),
        _ => a.cmp(b),
    }
}

/// Display-time collector earnings for a delivered volume.
pub fn collector_earnings(liters: Decimal, collector_rate_per_liter: Decimal) -> Decimal {
    liters * collector_rate_per_liter
}
