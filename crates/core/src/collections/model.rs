//! Collection domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Remote payload limit: collections per upsert request.
pub const UPLOAD_BATCH_SIZE: usize = 50;

/// Bounded worker pool size for photo uploads within one batch.
pub const PHOTO_UPLOAD_CONCURRENCY: usize = 3;

/// Lifecycle status of a locally captured collection.
///
/// The stored status only ever moves from `pending_upload` to `uploaded`.
/// `Failed`
/// is a display state derived from the retry count (see
/// [`LocalCollectionRecord::display_status`]); the machine never stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    PendingUpload,
    Uploaded,
    Failed,
}

/// A collection record in the local outbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCollectionRecord {
    /// Outbox primary key; never sent to the server.
    pub local_id: String,
    /// Business identifier minted at capture time; idempotency key for the
    /// remote upsert.
    pub collection_id: String,
    pub farmer_id: String,
    /// Snapshot at creation time, never refreshed. The farmer cache is
    /// full-replaced on sync and the row may be gone before upload.
    pub farmer_name: String,
    pub collector_id: String,
    pub liters: Decimal,
    pub rate_per_liter: Decimal,
    /// liters × rate, fixed at capture time and not recomputed later.
    pub total_amount: Decimal,
    pub gps_latitude: f64,
    pub gps_longitude: f64,
    pub notes: Option<String>,
    /// App-local staged photo, deleted after a successful upload.
    pub photo_path: Option<String>,
    /// Audit linkage code, independent of server-side approval.
    pub verification_code: String,
    pub status: CollectionStatus,
    pub retry_count: i32,
    pub last_error_message: Option<String>,
    pub created_at: String,
    pub uploaded_at: Option<String>,
}

impl LocalCollectionRecord {
    /// Status as shown to the user: a pending record that has failed at least
    /// one batch attempt reads as `failed`, without losing its place in the
    /// queue.
    pub fn display_status(&self) -> CollectionStatus {
        match self.status {
            CollectionStatus::PendingUpload if self.retry_count > 0 => CollectionStatus::Failed,
            other => other,
        }
    }
}

/// Input to [`super::CollectionCaptureService`].
///
/// The caller is responsible for having a farmer selected and a GPS fix
/// acquired; capture only enforces non-negative liters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollection {
    pub farmer_id: String,
    pub farmer_name: String,
    pub collector_id: String,
    pub liters: Decimal,
    pub rate_per_liter: Decimal,
    pub gps_latitude: f64,
    pub gps_longitude: f64,
    pub notes: Option<String>,
    pub photo_uri: Option<String>,
}

/// What the capture flow hands back to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureReceipt {
    pub collection_id: String,
    pub verification_code: String,
}

/// Outcome of one uploader invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRunReport {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl UploadRunReport {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the run touched at least one record either way.
    pub fn has_activity(&self) -> bool {
        self.success > 0 || self.failed > 0
    }
}

/// Queue counters surfaced on the offline indicator / sync status card.
/// `failed` counts pending rows with at least one failed attempt, so it is a
/// subset of `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueTotals {
    pub pending: i64,
    pub failed: i64,
    pub uploaded: i64,
}

/// Wire shape of one collection in the remote upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionUpload {
    pub collection_id: String,
    pub farmer_id: String,
    pub farmer_name: String,
    pub collector_id: String,
    pub collector_staff_id: String,
    pub liters: Decimal,
    pub rate_per_liter: Decimal,
    pub total_amount: Decimal,
    pub gps_latitude: f64,
    pub gps_longitude: f64,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub verification_code: String,
    pub captured_at: String,
}
