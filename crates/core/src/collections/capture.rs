//! Collection capture: build a locally-valid record and enqueue it durably.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    CaptureReceipt, CollectionQueueRepositoryTrait, CollectionStatus, LocalCollectionRecord,
    LocalPhotoStoreTrait, NewCollection,
};
use crate::{Error, Result};

const VERIFICATION_CODE_LEN: usize = 6;
// No 0/O/1/I: codes get read out loud over the phone.
const VERIFICATION_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Mint the business identifier for a new collection: capture timestamp plus
/// a random suffix. This is the idempotency key for the remote upsert.
fn new_collection_id() -> String {
    let suffix: u16 = rand::thread_rng().gen();
    format!("MC-{}-{:04x}", Utc::now().timestamp_millis(), suffix)
}

fn new_verification_code() -> String {
    let mut rng = rand::thread_rng();
    (0..VERIFICATION_CODE_LEN)
        .map(|_| VERIFICATION_ALPHABET[rng.gen_range(0..VERIFICATION_ALPHABET.len())] as char)
        .collect()
}

#[async_trait]
pub trait CollectionCaptureServiceTrait: Send + Sync {
    /// Durably enqueue a new collection with status `pending_upload` and
    /// return its business id and verification code.
    async fn capture(&self, input: NewCollection) -> Result<CaptureReceipt>;
}

pub struct CollectionCaptureService {
    queue_repository: Arc<dyn CollectionQueueRepositoryTrait>,
    photo_store: Arc<dyn LocalPhotoStoreTrait>,
}

impl CollectionCaptureService {
    pub fn new(
        queue_repository: Arc<dyn CollectionQueueRepositoryTrait>,
        photo_store: Arc<dyn LocalPhotoStoreTrait>,
    ) -> Self {
        Self {
            queue_repository,
            photo_store,
        }
    }
}

#[async_trait]
impl CollectionCaptureServiceTrait for CollectionCaptureService {
    async fn capture(&self, input: NewCollection) -> Result<CaptureReceipt> {
        if input.liters < Decimal::ZERO {
            return Err(Error::validation("Collected liters must not be negative"));
        }

        let collection_id = new_collection_id();
        let verification_code = new_verification_code();

        // Stage the photo before the row exists: a crash in between leaves an
        // orphan file, never a dangling reference.
        let photo_path = match input.photo_uri.as_deref() {
            Some(uri) => Some(self.photo_store.stage(&collection_id, uri)?),
            None => None,
        };

        let total_amount = input.liters * input.rate_per_liter;
        let record = LocalCollectionRecord {
            local_id: Uuid::new_v4().to_string(),
            collection_id: collection_id.clone(),
            farmer_id: input.farmer_id,
            farmer_name: input.farmer_name,
            collector_id: input.collector_id,
            liters: input.liters,
            rate_per_liter: input.rate_per_liter,
            total_amount,
            gps_latitude: input.gps_latitude,
            gps_longitude: input.gps_longitude,
            notes: input.notes,
            photo_path,
            verification_code: verification_code.clone(),
            status: CollectionStatus::PendingUpload,
            retry_count: 0,
            last_error_message: None,
            created_at: Utc::now().to_rfc3339(),
            uploaded_at: None,
        };

        self.queue_repository.enqueue(record).await?;
        debug!("Captured collection {} into the outbox", collection_id);

        Ok(CaptureReceipt {
            collection_id,
            verification_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{InMemoryQueueRepository, RecordingPhotoStore};
    use super::*;
    use rust_decimal_macros::dec;

    fn input(liters: Decimal, photo_uri: Option<&str>) -> NewCollection {
        NewCollection {
            farmer_id: "farmer-7".to_string(),
            farmer_name: "K. Perera".to_string(),
            collector_id: "collector-3".to_string(),
            liters,
            rate_per_liter: dec!(50),
            gps_latitude: 6.927079,
            gps_longitude: 79.861244,
            notes: Some("evening round".to_string()),
            photo_uri: photo_uri.map(str::to_string),
        }
    }

    fn service() -> (
        CollectionCaptureService,
        Arc<InMemoryQueueRepository>,
        Arc<RecordingPhotoStore>,
        super::super::test_support::SharedLog,
    ) {
        let log = super::super::test_support::SharedLog::default();
        let repo = Arc::new(InMemoryQueueRepository::with_log(log.clone()));
        let photos = Arc::new(RecordingPhotoStore::with_log(log.clone()));
        let service = CollectionCaptureService::new(repo.clone(), photos.clone());
        (service, repo, photos, log)
    }

    #[tokio::test]
    async fn capture_computes_total_and_enqueues_pending() {
        let (service, repo, _photos, _log) = service();

        let receipt = service
            .capture(input(dec!(25.5), None))
            .await
            .expect("capture");

        let records = repo.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.collection_id, receipt.collection_id);
        assert_eq!(record.total_amount, dec!(1275.0));
        assert_eq!(record.status, CollectionStatus::PendingUpload);
        assert_eq!(record.retry_count, 0);
        assert!(record.uploaded_at.is_none());
        assert_eq!(record.verification_code.len(), 6);
        assert!(receipt.collection_id.starts_with("MC-"));
    }

    #[tokio::test]
    async fn capture_rejects_negative_liters() {
        let (service, repo, _photos, _log) = service();

        let err = service
            .capture(input(dec!(-1), None))
            .await
            .expect_err("negative liters");

        assert!(matches!(err, Error::Validation(_)));
        assert!(repo.records().is_empty());
    }

    #[tokio::test]
    async fn capture_allows_zero_liters() {
        let (service, repo, _photos, _log) = service();

        service.capture(input(dec!(0), None)).await.expect("capture");
        assert_eq!(repo.records()[0].total_amount, dec!(0));
    }

    #[tokio::test]
    async fn photo_is_staged_before_the_row_is_written() {
        let (service, repo, _photos, log) = service();

        service
            .capture(input(dec!(10), Some("/tmp/shot.jpg")))
            .await
            .expect("capture");

        let record = &repo.records()[0];
        let staged = record.photo_path.clone().expect("photo path");
        assert!(staged.contains(&record.collection_id));

        // The staging call must precede the enqueue call.
        let entries = log.lock().unwrap();
        let stage_at = entries
            .iter()
            .position(|op| op.starts_with("stage:"))
            .expect("stage logged");
        let enqueue_at = entries
            .iter()
            .position(|op| op.starts_with("enqueue:"))
            .expect("enqueue logged");
        assert!(stage_at < enqueue_at);
    }

    #[tokio::test]
    async fn staging_failure_surfaces_and_nothing_is_enqueued() {
        let (service, repo, photos, _log) = service();
        photos.fail_stage();

        let err = service
            .capture(input(dec!(10), Some("/tmp/shot.jpg")))
            .await
            .expect_err("staging failure");

        assert!(matches!(err, Error::FileStorage(_)));
        assert!(repo.records().is_empty());
    }
}
