//! Approval workflow models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::VarianceType;

/// Server-side lifecycle of a collection, relevant subset. Transitions are
/// monotonic; there is no unapprove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteCollectionStatus {
    Collected,
    ApprovedForPayment,
    Paid,
}

/// A collection row as the approval workflow sees it on the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCollection {
    pub collection_id: String,
    pub collector_id: String,
    pub farmer_id: String,
    pub liters: Decimal,
    pub collection_date: NaiveDate,
    pub status: RemoteCollectionStatus,
    pub approved_for_company: bool,
    pub approval_id: Option<String>,
}

/// Immutable record of one reconciliation decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRecord {
    pub approval_id: String,
    pub collection_id: String,
    pub staff_id: String,
    pub collected_liters: Decimal,
    pub received_liters: Decimal,
    pub variance_liters: Decimal,
    pub variance_percentage: Decimal,
    pub variance_type: VarianceType,
    pub penalty_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Input to a single approval. `staff` accepts either a staff id or an
/// account id; the service normalizes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    pub collection_id: String,
    pub staff: String,
    pub received_liters: Decimal,
    pub notes: Option<String>,
}

/// Input to a batch approval of one collector's day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchApproveRequest {
    pub staff: String,
    pub collector_id: String,
    pub collection_date: NaiveDate,
    /// Single weighed total to apportion across the day's uncorrected
    /// records. Omitted means every record's received volume defaults to its
    /// collected volume.
    pub total_received_liters: Option<Decimal>,
}

/// Aggregate outcome of a batch approval.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchApprovalSummary {
    pub approved_count: usize,
    pub total_liters_collected: Decimal,
    pub total_liters_received: Decimal,
    pub total_variance: Decimal,
    pub total_penalty_amount: Decimal,
}

/// Split a weighed day total across collections proportionally to each
/// collection's share of the day's collected liters.
///
/// With a zero collected sum (a day of zero-liter entries) apportionment is
/// undefined; every record falls back to its own collected volume, which
/// makes the day a zero-variance one instead of a division by zero.
pub fn apportion_received(total_received: Decimal, collected: &[Decimal]) -> Vec<Decimal> {
    let sum: Decimal = collected.iter().copied().sum();
    if sum.is_zero() {
        return collected.to_vec();
    }
    collected
        .iter()
        .map(|liters| total_received * *liters / sum)
        .collect()
}
