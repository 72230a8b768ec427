//! In-memory doubles shared by the capture and uploader tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{
    CollectionQueueRepositoryTrait, CollectionStatus, LocalCollectionRecord, LocalPhotoStoreTrait,
    QueueTotals,
};
use crate::{Error, Result};

/// Shared call log so tests can assert cross-component ordering.
pub(crate) type SharedLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
pub(crate) struct InMemoryQueueRepository {
    records: Mutex<Vec<LocalCollectionRecord>>,
    log: SharedLog,
}

impl InMemoryQueueRepository {
    pub fn with_log(log: SharedLog) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            log,
        }
    }

    pub fn seed(&self, records: Vec<LocalCollectionRecord>) {
        self.records.lock().unwrap().extend(records);
    }

    pub fn records(&self) -> Vec<LocalCollectionRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl CollectionQueueRepositoryTrait for InMemoryQueueRepository {
    async fn enqueue(&self, record: LocalCollectionRecord) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("enqueue:{}", record.collection_id));
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    fn list_pending(&self) -> Result<Vec<LocalCollectionRecord>> {
        let mut pending: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.status == CollectionStatus::PendingUpload)
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(pending)
    }

    async fn mark_uploaded(&self, local_ids: Vec<String>, uploaded_at: String) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        for record in records.iter_mut() {
            if local_ids.contains(&record.local_id)
                && record.status == CollectionStatus::PendingUpload
            {
                record.status = CollectionStatus::Uploaded;
                record.uploaded_at = Some(uploaded_at.clone());
                record.photo_path = None;
                record.last_error_message = None;
            }
        }
        Ok(())
    }

    async fn record_batch_failure(
        &self,
        local_ids: Vec<String>,
        error_message: String,
    ) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        for record in records.iter_mut() {
            if local_ids.contains(&record.local_id) {
                record.retry_count += 1;
                record.last_error_message = Some(error_message.clone());
            }
        }
        Ok(())
    }

    fn queue_totals(&self) -> Result<QueueTotals> {
        let records = self.records.lock().unwrap();
        let pending = records
            .iter()
            .filter(|r| r.status == CollectionStatus::PendingUpload)
            .count() as i64;
        let failed = records
            .iter()
            .filter(|r| r.status == CollectionStatus::PendingUpload && r.retry_count > 0)
            .count() as i64;
        let uploaded = records
            .iter()
            .filter(|r| r.status == CollectionStatus::Uploaded)
            .count() as i64;
        Ok(QueueTotals {
            pending,
            failed,
            uploaded,
        })
    }

    fn find_by_collection_id(&self, collection_id: &str) -> Result<Option<LocalCollectionRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.collection_id == collection_id)
            .cloned())
    }
}

#[derive(Default)]
pub(crate) struct RecordingPhotoStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    log: SharedLog,
    fail_stage: AtomicBool,
}

impl RecordingPhotoStore {
    pub fn with_log(log: SharedLog) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            log,
            fail_stage: AtomicBool::new(false),
        }
    }

    pub fn fail_stage(&self) {
        self.fail_stage.store(true, Ordering::SeqCst);
    }

    /// Pre-populate a staged file, as capture would have.
    pub fn put(&self, path: &str, bytes: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}

impl LocalPhotoStoreTrait for RecordingPhotoStore {
    fn stage(&self, collection_id: &str, _source_uri: &str) -> Result<String> {
        if self.fail_stage.load(Ordering::SeqCst) {
            return Err(Error::file_storage("stage failure injected"));
        }
        let path = format!("/photos/{}.jpg", collection_id);
        self.log.lock().unwrap().push(format!("stage:{}", path));
        self.files
            .lock()
            .unwrap()
            .insert(path.clone(), b"photo".to_vec());
        Ok(path)
    }

    fn read(&self, photo_path: &str) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(photo_path)
            .cloned()
            .ok_or_else(|| Error::file_storage(format!("missing staged photo {}", photo_path)))
    }

    fn remove(&self, photo_path: &str) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("remove:{}", photo_path));
        self.files
            .lock()
            .unwrap()
            .remove(photo_path)
            .map(|_| ())
            .ok_or_else(|| Error::file_storage(format!("missing staged photo {}", photo_path)))
    }
}
