//! Penalty lookup against the externally configured rule table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{VarianceResult, VarianceType};

/// One penalty band. Bands are matched on the variance sign and the absolute
/// percentage magnitude falling inside `[min_percent, max_percent]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyRule {
    pub rule_id: String,
    pub variance_type: VarianceType,
    pub min_percent: Decimal,
    pub max_percent: Decimal,
    pub penalty_rate_per_liter: Decimal,
    pub is_active: bool,
}

/// Monetary penalty for a variance under the given active rules.
///
/// No matching rule is not an error: the penalty is simply zero. The penalty
/// of a matched rule is `|variance liters| × rule rate`.
pub fn calculate_penalty(variance: &VarianceResult, rules: &[PenaltyRule]) -> Decimal {
    if variance.variance_type == VarianceType::None {
        return Decimal::ZERO;
    }

    let magnitude = variance.variance_percentage.abs();
    let matched = rules.iter().find(|rule| {
        rule.is_active
            && rule.variance_type == variance.variance_type
            && magnitude >= rule.min_percent
            && magnitude <= rule.max_percent
    });

    match matched {
        Some(rule) => variance.variance_liters.abs() * rule.penalty_rate_per_liter,
        None => Decimal::ZERO,
    }
}
