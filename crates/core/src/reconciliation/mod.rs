//! Reconciliation: variance computation, penalty lookup, and the approval
//! workflow that records both against a collection.

mod approval;
mod model;
mod penalty;
mod preview;
mod variance;

pub use approval::{ApprovalService, ApprovalServiceTrait};
pub use model::*;
pub use penalty::{calculate_penalty, PenaltyRule};
pub use preview::{preview_batch, BatchPreview, PendingDayCollection, PreviewLine};
pub use variance::{calculate_variance, VarianceResult, VarianceType};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::Result;

/// Server-side collection and approval tables, as seen by the approval
/// workflow. Implemented over the hosted data service.
#[async_trait]
pub trait ApprovalStoreTrait: Send + Sync {
    async fn get_collection(&self, collection_id: &str) -> Result<Option<RemoteCollection>>;

    /// Collections for one collector on one calendar date that are still
    /// `approved_for_company = false`. That filter is the idempotency guard
    /// for batch re-invocation.
    async fn list_unapproved_for_day(
        &self,
        collector_id: &str,
        collection_date: NaiveDate,
    ) -> Result<Vec<RemoteCollection>>;

    async fn active_penalty_rules(&self) -> Result<Vec<PenaltyRule>>;

    async fn insert_approval(&self, approval: ApprovalRecord) -> Result<()>;

    /// Irreversibly flip `approved_for_company` and link the approval.
    async fn mark_collection_approved(&self, collection_id: &str, approval_id: &str) -> Result<()>;
}

/// Farmer-facing notification fan-out. Failures never fail the approval.
#[async_trait]
pub trait FarmerNotifierTrait: Send + Sync {
    async fn notify_approval(&self, farmer_id: &str, approval: &ApprovalRecord) -> Result<()>;
}
