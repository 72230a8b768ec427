//! Approval endpoints: single, batch, and the read-only batch preview.

use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use milkline_core::reconciliation::{
    preview_batch as compute_preview, ApprovalRecord, ApproveRequest, BatchApprovalSummary,
    BatchApproveRequest, BatchPreview, PendingDayCollection,
};

use crate::error::ApiResult;
use crate::events::{ServerEvent, APPROVAL_RECORDED, BATCH_APPROVAL_COMPLETE};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveBody {
    pub collection_id: String,
    /// Staff id or account id of the approving staff member.
    pub staff_id: String,
    pub received_liters: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchApproveBody {
    pub staff_id: String,
    pub collector_id: String,
    pub collection_date: NaiveDate,
    pub total_received_liters: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPreviewBody {
    pub collections: Vec<PendingDayCollection>,
    pub total_received_liters: Option<Decimal>,
}

pub async fn approve(
    State(state): State<AppState>,
    Json(body): Json<ApproveBody>,
) -> ApiResult<Json<ApprovalRecord>> {
    let approval = state
        .approval_service
        .approve(ApproveRequest {
            collection_id: body.collection_id,
            staff: body.staff_id,
            received_liters: body.received_liters,
            notes: body.notes,
        })
        .await?;

    info!(
        "Approved collection {} (variance {} l)",
        approval.collection_id, approval.variance_liters
    );
    state.event_bus.publish(ServerEvent::with_payload(
        APPROVAL_RECORDED,
        serde_json::to_value(&approval).unwrap_or_default(),
    ));
    Ok(Json(approval))
}

pub async fn batch_approve(
    State(state): State<AppState>,
    Json(body): Json<BatchApproveBody>,
) -> ApiResult<Json<BatchApprovalSummary>> {
    let summary = state
        .approval_service
        .batch_approve(BatchApproveRequest {
            staff: body.staff_id,
            collector_id: body.collector_id.clone(),
            collection_date: body.collection_date,
            total_received_liters: body.total_received_liters,
        })
        .await?;

    info!(
        "Batch-approved {} collections for collector {} on {}",
        summary.approved_count, body.collector_id, body.collection_date
    );
    state.event_bus.publish(ServerEvent::with_payload(
        BATCH_APPROVAL_COMPLETE,
        serde_json::to_value(&summary).unwrap_or_default(),
    ));
    Ok(Json(summary))
}

/// Pure preview over already-fetched pending collections; penalty figures use
/// an illustrative rate and are labeled as estimates.
pub async fn preview_batch(
    Json(body): Json<BatchPreviewBody>,
) -> ApiResult<Json<BatchPreview>> {
    Ok(Json(compute_preview(
        &body.collections,
        body.total_received_liters,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use milkline_core::reconciliation::{ApprovalServiceTrait, VarianceType};
    use milkline_core::Result;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct CannedApprovalService;

    #[async_trait]
    impl ApprovalServiceTrait for CannedApprovalService {
        async fn approve(&self, request: ApproveRequest) -> Result<ApprovalRecord> {
            Ok(ApprovalRecord {
                approval_id: "appr-1".to_string(),
                collection_id: request.collection_id,
                staff_id: "staff-1".to_string(),
                collected_liters: dec!(100),
                received_liters: request.received_liters,
                variance_liters: request.received_liters - dec!(100),
                variance_percentage: dec!(-5),
                variance_type: VarianceType::Negative,
                penalty_amount: dec!(50),
                notes: request.notes,
                created_at: "2026-03-10T08:00:00+00:00".to_string(),
            })
        }

        async fn batch_approve(
            &self,
            _request: BatchApproveRequest,
        ) -> Result<BatchApprovalSummary> {
            Ok(BatchApprovalSummary {
                approved_count: 2,
                total_liters_collected: dec!(20),
                total_liters_received: dec!(20),
                total_variance: dec!(0),
                total_penalty_amount: dec!(0),
            })
        }
    }

    fn state() -> AppState {
        AppState {
            approval_service: Arc::new(CannedApprovalService),
            event_bus: crate::events::EventBus::new(),
        }
    }

    #[tokio::test]
    async fn approve_publishes_the_recorded_event() {
        let state = state();
        let mut rx = state.event_bus.subscribe();

        let Json(approval) = approve(
            State(state),
            Json(ApproveBody {
                collection_id: "MC-1".to_string(),
                staff_id: "staff-1".to_string(),
                received_liters: dec!(95),
                notes: None,
            }),
        )
        .await
        .expect("approve");

        assert_eq!(approval.penalty_amount, dec!(50));
        let event = rx.recv().await.expect("event");
        assert_eq!(event.event, APPROVAL_RECORDED);
        assert_eq!(event.payload["collectionId"], "MC-1");
    }

    #[tokio::test]
    async fn batch_approve_publishes_the_summary() {
        let state = state();
        let mut rx = state.event_bus.subscribe();

        let Json(summary) = batch_approve(
            State(state),
            Json(BatchApproveBody {
                staff_id: "staff-1".to_string(),
                collector_id: "collector-1".to_string(),
                collection_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                total_received_liters: None,
            }),
        )
        .await
        .expect("batch");

        assert_eq!(summary.approved_count, 2);
        let event = rx.recv().await.expect("event");
        assert_eq!(event.event, BATCH_APPROVAL_COMPLETE);
    }

    #[tokio::test]
    async fn preview_is_labeled_an_estimate_and_publishes_nothing() {
        let state = state();
        let mut rx = state.event_bus.subscribe();

        let Json(preview) = preview_batch(Json(BatchPreviewBody {
            collections: vec![PendingDayCollection {
                collection_id: "MC-1".to_string(),
                liters: dec!(10),
            }],
            total_received_liters: Some(dec!(9)),
        }))
        .await
        .expect("preview");

        assert!(preview.is_estimate);
        assert_eq!(preview.lines.len(), 1);
        assert!(rx.try_recv().is_err());
    }
}
