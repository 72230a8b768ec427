//! Read-only batch preview for the portal's confirmation screen.
//!
//! Replicates the batch apportionment over already-fetched pending
//! collections and estimates penalties with a fixed illustrative rate. The
//! authoritative computation happens at approval time against the configured
//! rule table; this estimate is allowed to diverge and must be labeled as
//! such.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{apportion_received, calculate_variance, VarianceType};

/// Illustrative per-liter rate used only for preview estimates.
pub fn estimated_penalty_rate_per_liter() -> Decimal {
    Decimal::new(250, 2) // 2.50
}

/// One pending collection as already fetched by the portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDayCollection {
    pub collection_id: String,
    pub liters: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewLine {
    pub collection_id: String,
    pub collected_liters: Decimal,
    pub received_liters: Decimal,
    pub variance_liters: Decimal,
    pub variance_type: VarianceType,
    pub estimated_penalty: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPreview {
    /// Always true: the penalty figures use an illustrative rate, not the
    /// configured rule table.
    pub is_estimate: bool,
    pub lines: Vec<PreviewLine>,
    pub total_liters_collected: Decimal,
    pub total_liters_received: Decimal,
    pub total_estimated_penalty: Decimal,
}

/// Compute the would-be apportionment and estimated penalties for one
/// collector day, without touching any store.
pub fn preview_batch(
    pending: &[PendingDayCollection],
    total_received_liters: Option<Decimal>,
) -> BatchPreview {
    let collected: Vec<Decimal> = pending.iter().map(|c| c.liters).collect();
    let received = match total_received_liters {
        Some(total) => apportion_received(total, &collected),
        None => collected.clone(),
    };
    let rate = estimated_penalty_rate_per_liter();

    let mut total_collected = Decimal::ZERO;
    let mut total_received = Decimal::ZERO;
    let mut total_penalty = Decimal::ZERO;

    let lines = pending
        .iter()
        .zip(received)
        .map(|(collection, received_liters)| {
            let variance = calculate_variance(collection.liters, received_liters);
            let estimated_penalty = if variance.variance_type == VarianceType::None {
                Decimal::ZERO
            } else {
                variance.variance_liters.abs() * rate
            };

            total_collected += variance.collected_liters;
            total_received += variance.received_liters;
            total_penalty += estimated_penalty;

            PreviewLine {
                collection_id: collection.collection_id.clone(),
                collected_liters: variance.collected_liters,
                received_liters: variance.received_liters,
                variance_liters: variance.variance_liters,
                variance_type: variance.variance_type,
                estimated_penalty,
            }
        })
        .collect();

    BatchPreview {
        is_estimate: true,
        lines,
        total_liters_collected: total_collected,
        total_liters_received: total_received,
        total_estimated_penalty: total_penalty,
    }
}
