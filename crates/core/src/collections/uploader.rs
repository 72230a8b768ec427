//! Outbox uploader: drain pending collections to the remote service in
//! bounded batches with idempotent upsert semantics.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use log::{debug, warn};

use super::{
    CollectionQueueRepositoryTrait, CollectionUpload, CollectionsGatewayTrait,
    LocalCollectionRecord, LocalPhotoStoreTrait, UploadRunReport, PHOTO_UPLOAD_CONCURRENCY,
    UPLOAD_BATCH_SIZE,
};
use crate::auth::AuthSessionProviderTrait;
use crate::staff::StaffDirectoryTrait;
use crate::Result;

#[async_trait]
pub trait CollectionUploadServiceTrait: Send + Sync {
    /// Drain the pending queue once.
    ///
    /// A failed batch is not retried within the same call; its rows keep
    /// status `pending_upload` with bumped retry bookkeeping, and the next
    /// scheduled pass re-attempts them. There is no retry ceiling: a
    /// permanently failing record stays queued and visible, never silently
    /// dropped.
    async fn upload_pending_collections(&self) -> Result<UploadRunReport>;
}

pub struct CollectionUploadService {
    auth: Arc<dyn AuthSessionProviderTrait>,
    staff_directory: Arc<dyn StaffDirectoryTrait>,
    queue_repository: Arc<dyn CollectionQueueRepositoryTrait>,
    gateway: Arc<dyn CollectionsGatewayTrait>,
    photo_store: Arc<dyn LocalPhotoStoreTrait>,
}

impl CollectionUploadService {
    pub fn new(
        auth: Arc<dyn AuthSessionProviderTrait>,
        staff_directory: Arc<dyn StaffDirectoryTrait>,
        queue_repository: Arc<dyn CollectionQueueRepositoryTrait>,
        gateway: Arc<dyn CollectionsGatewayTrait>,
        photo_store: Arc<dyn LocalPhotoStoreTrait>,
    ) -> Self {
        Self {
            auth,
            staff_directory,
            queue_repository,
            gateway,
            photo_store,
        }
    }

    /// Upload staged photos for one batch through a bounded worker pool.
    ///
    /// Returns public URLs keyed by `local_id`. A failed or unreadable photo
    /// degrades that record to photo-less; it never fails the batch.
    async fn upload_batch_photos(
        &self,
        batch: &[LocalCollectionRecord],
    ) -> HashMap<String, String> {
        let jobs: Vec<(String, String, String)> = batch
            .iter()
            .filter_map(|record| {
                record.photo_path.as_ref().map(|path| {
                    (
                        record.local_id.clone(),
                        record.collection_id.clone(),
                        path.clone(),
                    )
                })
            })
            .collect();

        let uploaded = futures::stream::iter(jobs)
            .map(|(local_id, collection_id, path)| {
                let gateway = Arc::clone(&self.gateway);
                let photo_store = Arc::clone(&self.photo_store);
                async move {
                    let url = match photo_store.read(&path) {
                        Ok(bytes) => match gateway.upload_photo(&collection_id, bytes).await {
                            Ok(url) => Some(url),
                            Err(err) => {
                                warn!(
                                    "Photo upload failed for {}; continuing without photo: {}",
                                    collection_id, err
                                );
                                None
                            }
                        },
                        Err(err) => {
                            warn!(
                                "Staged photo unreadable for {}; continuing without photo: {}",
                                collection_id, err
                            );
                            None
                        }
                    };
                    (local_id, url)
                }
            })
            .buffer_unordered(PHOTO_UPLOAD_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        uploaded
            .into_iter()
            .filter_map(|(local_id, url)| url.map(|u| (local_id, u)))
            .collect()
    }

    fn to_upload(
        record: &LocalCollectionRecord,
        collector_staff_id: &str,
        photo_url: Option<String>,
    ) -> CollectionUpload {
        CollectionUpload {
            collection_id: record.collection_id.clone(),
            farmer_id: record.farmer_id.clone(),
            farmer_name: record.farmer_name.clone(),
            collector_id: record.collector_id.clone(),
            collector_staff_id: collector_staff_id.to_string(),
            liters: record.liters,
            rate_per_liter: record.rate_per_liter,
            total_amount: record.total_amount,
            gps_latitude: record.gps_latitude,
            gps_longitude: record.gps_longitude,
            notes: record.notes.clone(),
            photo_url,
            verification_code: record.verification_code.clone(),
            captured_at: record.created_at.clone(),
        }
    }
}

#[async_trait]
impl CollectionUploadServiceTrait for CollectionUploadService {
    async fn upload_pending_collections(&self) -> Result<UploadRunReport> {
        let identity = match self.auth.current_identity().await? {
            Some(identity) => identity,
            None => {
                debug!("No authenticated identity; skipping upload pass");
                return Ok(UploadRunReport::empty());
            }
        };

        // A collector account must have exactly one staff profile. Absence is
        // fatal for this call, not retryable per record.
        let staff = match self.staff_directory.resolve(&identity.account_id).await? {
            Some(staff) => staff,
            None => {
                warn!(
                    "Account {} has no staff profile; skipping upload pass",
                    identity.account_id
                );
                return Ok(UploadRunReport::empty());
            }
        };

        let pending = self.queue_repository.list_pending()?;
        if pending.is_empty() {
            return Ok(UploadRunReport::empty());
        }
        debug!("Uploading {} pending collections", pending.len());

        let mut report = UploadRunReport::empty();

        // Batches run strictly sequentially: batch N+1 never starts before
        // batch N's local-state updates have completed, so peak concurrency
        // stays bounded by the photo pool.
        for batch in pending.chunks(UPLOAD_BATCH_SIZE) {
            let photo_urls = self.upload_batch_photos(batch).await;
            let staged_paths: Vec<String> = batch
                .iter()
                .filter_map(|record| record.photo_path.clone())
                .collect();
            let local_ids: Vec<String> =
                batch.iter().map(|record| record.local_id.clone()).collect();

            let payload: Vec<CollectionUpload> = batch
                .iter()
                .map(|record| {
                    Self::to_upload(
                        record,
                        &staff.staff_id,
                        photo_urls.get(&record.local_id).cloned(),
                    )
                })
                .collect();

            match self.gateway.upsert_collections(payload).await {
                Ok(()) => {
                    self.queue_repository
                        .mark_uploaded(local_ids, Utc::now().to_rfc3339())
                        .await?;
                    for path in staged_paths {
                        if let Err(err) = self.photo_store.remove(&path) {
                            warn!("Failed to delete staged photo {}: {}", path, err);
                        }
                    }
                    report.success += batch.len();
                }
                Err(err) => {
                    let message = err.to_string();
                    warn!("Batch upsert of {} collections failed: {}", batch.len(), message);
                    self.queue_repository
                        .record_batch_failure(local_ids, message.clone())
                        .await?;
                    report.failed += batch.len();
                    report.errors.push(message);
                }
            }
        }

        Ok(report)
    }
}
