//! Offline collection capture and the outbox uploader.

mod capture;
mod model;
mod photo;
mod uploader;

pub use capture::{CollectionCaptureService, CollectionCaptureServiceTrait};
pub use model::*;
pub use photo::{FsPhotoStore, LocalPhotoStoreTrait};
pub use uploader::{CollectionUploadService, CollectionUploadServiceTrait};

use async_trait::async_trait;

use crate::Result;

/// Local outbox of captured collections.
///
/// Capture is the only writer of new rows; the uploader is the only status
/// mutator. Reads go straight to the pool, writes through the write actor.
#[async_trait]
pub trait CollectionQueueRepositoryTrait: Send + Sync {
    async fn enqueue(&self, record: LocalCollectionRecord) -> Result<()>;

    /// Pending records, oldest first.
    fn list_pending(&self) -> Result<Vec<LocalCollectionRecord>>;

    /// Flip `pending_upload` rows to `uploaded` and clear their staged photo
    /// reference. Rows already uploaded are left untouched; there is no
    /// un-upload path.
    async fn mark_uploaded(&self, local_ids: Vec<String>, uploaded_at: String) -> Result<()>;

    /// Record one failed batch attempt: bump `retry_count` and overwrite
    /// `last_error_message` for every row in the batch. Status stays
    /// `pending_upload` so the next pass re-attempts.
    async fn record_batch_failure(&self, local_ids: Vec<String>, error_message: String)
        -> Result<()>;

    fn queue_totals(&self) -> Result<QueueTotals>;

    fn find_by_collection_id(&self, collection_id: &str) -> Result<Option<LocalCollectionRecord>>;
}

/// Remote write surface used by the uploader.
#[async_trait]
pub trait CollectionsGatewayTrait: Send + Sync {
    /// Insert-or-replace the batch keyed on `collection_id` in one remote
    /// write. Retrying a batch that partially landed is safe.
    async fn upsert_collections(&self, batch: Vec<CollectionUpload>) -> Result<()>;

    /// Upload a photo blob; returns the public URL.
    async fn upload_photo(&self, collection_id: &str, bytes: Vec<u8>) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod test_support;
