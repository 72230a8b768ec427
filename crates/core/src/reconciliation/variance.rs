//! Variance between a collector-reported and a company-reported volume.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sign of the variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceType {
    Positive,
    Negative,
    None,
}

/// Computed variance. Ephemeral: derived on demand, persisted only as fields
/// on the approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceResult {
    pub collected_liters: Decimal,
    pub received_liters: Decimal,
    pub variance_liters: Decimal,
    pub variance_percentage: Decimal,
    pub variance_type: VarianceType,
}

/// Compare a collected volume against the received volume.
///
/// Referentially transparent: identical inputs always produce bit-identical
/// results, because the same function backs both live approval and the
/// portal's pre-submit preview.
pub fn calculate_variance(collected: Decimal, received: Decimal) -> VarianceResult {
    let variance_liters = received - collected;
    let variance_percentage = if collected.is_zero() {
        Decimal::ZERO
    } else {
        variance_liters / collected * Decimal::ONE_HUNDRED
    };
    let variance_type = if variance_liters > Decimal::ZERO {
        VarianceType::Positive
    } else if variance_liters < Decimal::ZERO {
        VarianceType::Negative
    } else {
        VarianceType::None
    };

    VarianceResult {
        collected_liters: collected,
        received_liters: received,
        variance_liters,
        variance_percentage,
        variance_type,
    }
}
