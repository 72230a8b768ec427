//! Wire types for the hosted data service API.
//!
//! Domain-shaped payloads (farmers, rates, collections, penalty rules,
//! approvals) reuse the core structs directly; only envelopes and
//! service-specific responses live here.

use serde::{Deserialize, Serialize};

use milkline_core::collections::CollectionUpload;

/// Error body returned by the data service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    pub success: bool,
}

/// Request envelope for the idempotent collections upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertCollectionsRequest {
    pub collections: Vec<CollectionUpload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertCollectionsResponse {
    pub upserted_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUploadResponse {
    pub photo_url: String,
}

/// Marks a collection company-approved and links its approval record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkApprovedRequest {
    pub approval_id: String,
}

/// One message on the broadcast channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishEventRequest {
    pub channel: String,
    pub event: String,
    pub payload: serde_json::Value,
}
