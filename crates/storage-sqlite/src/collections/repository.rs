//! Repository for the collections outbox.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use milkline_core::collections::{
    CollectionQueueRepositoryTrait, CollectionStatus, LocalCollectionRecord, QueueTotals,
};
use milkline_core::Result;

use super::model::CollectionQueueRowDB;
use crate::codec::enum_to_db;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::collections_queue;

pub struct CollectionQueueRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CollectionQueueRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CollectionQueueRepositoryTrait for CollectionQueueRepository {
    async fn enqueue(&self, record: LocalCollectionRecord) -> Result<()> {
        let row = CollectionQueueRowDB::from_domain(record)?;
        self.writer
            .exec(move |conn| {
                diesel::insert_into(collections_queue::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn list_pending(&self) -> Result<Vec<LocalCollectionRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = collections_queue::table
            .filter(collections_queue::status.eq(enum_to_db(&CollectionStatus::PendingUpload)?))
            .order(collections_queue::created_at.asc())
            .load::<CollectionQueueRowDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(CollectionQueueRowDB::into_domain).collect()
    }

    async fn mark_uploaded(&self, local_ids: Vec<String>, uploaded_at: String) -> Result<()> {
        if local_ids.is_empty() {
            return Ok(());
        }
        self.writer
            .exec(move |conn| {
                // The status filter keeps the transition one-way: rows already
                // uploaded are never rewritten.
                diesel::update(
                    collections_queue::table
                        .filter(collections_queue::local_id.eq_any(local_ids))
                        .filter(
                            collections_queue::status
                                .eq(enum_to_db(&CollectionStatus::PendingUpload)?),
                        ),
                )
                .set((
                    collections_queue::status.eq(enum_to_db(&CollectionStatus::Uploaded)?),
                    collections_queue::uploaded_at.eq(Some(uploaded_at)),
                    collections_queue::photo_path.eq::<Option<String>>(None),
                    collections_queue::last_error_message.eq::<Option<String>>(None),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn record_batch_failure(
        &self,
        local_ids: Vec<String>,
        error_message: String,
    ) -> Result<()> {
        if local_ids.is_empty() {
            return Ok(());
        }
        self.writer
            .exec(move |conn| {
                diesel::update(
                    collections_queue::table.filter(collections_queue::local_id.eq_any(local_ids)),
                )
                .set((
                    collections_queue::retry_count.eq(collections_queue::retry_count + 1),
                    collections_queue::last_error_message.eq(Some(error_message)),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn queue_totals(&self) -> Result<QueueTotals> {
        let mut conn = get_connection(&self.pool)?;
        let pending_status = enum_to_db(&CollectionStatus::PendingUpload)?;
        let uploaded_status = enum_to_db(&CollectionStatus::Uploaded)?;

        let pending: i64 = collections_queue::table
            .filter(collections_queue::status.eq(&pending_status))
            .count()
            .first(&mut conn)
            .map_err(StorageError::from)?;
        let failed: i64 = collections_queue::table
            .filter(collections_queue::status.eq(&pending_status))
            .filter(collections_queue::retry_count.gt(0))
            .count()
            .first(&mut conn)
            .map_err(StorageError::from)?;
        let uploaded: i64 = collections_queue::table
            .filter(collections_queue::status.eq(&uploaded_status))
            .count()
            .first(&mut conn)
            .map_err(StorageError::from)?;

        Ok(QueueTotals {
            pending,
            failed,
            uploaded,
        })
    }

    fn find_by_collection_id(&self, collection_id: &str) -> Result<Option<LocalCollectionRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let row = collections_queue::table
            .filter(collections_queue::collection_id.eq(collection_id))
            .first::<CollectionQueueRowDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(CollectionQueueRowDB::into_domain).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::setup_db;
    use rust_decimal_macros::dec;

    fn record(n: usize) -> LocalCollectionRecord {
        LocalCollectionRecord {
            local_id: format!("local-{:03}", n),
            collection_id: format!("MC-1700000000{:03}-beef", n),
            farmer_id: "farmer-1".to_string(),
            farmer_name: "W. Silva".to_string(),
            collector_id: "collector-2".to_string(),
            liters: dec!(25.5),
            rate_per_liter: dec!(50),
            total_amount: dec!(1275.0),
            gps_latitude: 6.9,
            gps_longitude: 79.9,
            notes: Some("morning".to_string()),
            photo_path: Some(format!("/photos/MC-{:03}.jpg", n)),
            verification_code: "H7K2M4".to_string(),
            status: CollectionStatus::PendingUpload,
            retry_count: 0,
            last_error_message: None,
            created_at: format!("2026-03-02T04:00:{:02}+00:00", n),
            uploaded_at: None,
        }
    }

    fn repository() -> CollectionQueueRepository {
        let (pool, writer) = setup_db();
        CollectionQueueRepository::new(pool, writer)
    }

    #[tokio::test]
    async fn enqueue_and_list_pending_round_trips_oldest_first() {
        let repo = repository();
        // Insert newest first; listing must come back oldest first.
        for n in (0..3).rev() {
            repo.enqueue(record(n)).await.expect("enqueue");
        }

        let pending = repo.list_pending().expect("list");
        assert_eq!(pending.len(), 3);
        assert_eq!(pending[0], record(0));
        assert_eq!(pending[2].local_id, "local-002");
    }

    #[tokio::test]
    async fn duplicate_collection_id_is_rejected() {
        let repo = repository();
        repo.enqueue(record(1)).await.expect("first");
        let mut dup = record(2);
        dup.collection_id = record(1).collection_id;
        assert!(repo.enqueue(dup).await.is_err());
    }

    #[tokio::test]
    async fn mark_uploaded_is_one_way_and_clears_the_photo_reference() {
        let repo = repository();
        repo.enqueue(record(1)).await.expect("enqueue");

        repo.mark_uploaded(
            vec!["local-001".to_string()],
            "2026-03-02T05:00:00+00:00".to_string(),
        )
        .await
        .expect("mark");

        assert!(repo.list_pending().expect("list").is_empty());
        let stored = repo
            .find_by_collection_id("MC-1700000000001-beef")
            .expect("find")
            .expect("row");
        assert_eq!(stored.status, CollectionStatus::Uploaded);
        assert_eq!(
            stored.uploaded_at.as_deref(),
            Some("2026-03-02T05:00:00+00:00")
        );
        assert!(stored.photo_path.is_none());

        // Marking again rewrites nothing.
        repo.mark_uploaded(
            vec!["local-001".to_string()],
            "2026-03-03T09:00:00+00:00".to_string(),
        )
        .await
        .expect("second mark");
        let unchanged = repo
            .find_by_collection_id("MC-1700000000001-beef")
            .expect("find")
            .expect("row");
        assert_eq!(
            unchanged.uploaded_at.as_deref(),
            Some("2026-03-02T05:00:00+00:00")
        );
    }

    #[tokio::test]
    async fn batch_failures_accumulate_retry_bookkeeping() {
        let repo = repository();
        repo.enqueue(record(1)).await.expect("enqueue");

        repo.record_batch_failure(vec!["local-001".to_string()], "HTTP 503".to_string())
            .await
            .expect("first failure");
        repo.record_batch_failure(vec!["local-001".to_string()], "timed out".to_string())
            .await
            .expect("second failure");

        let stored = &repo.list_pending().expect("list")[0];
        assert_eq!(stored.retry_count, 2);
        assert_eq!(stored.last_error_message.as_deref(), Some("timed out"));
        assert_eq!(stored.status, CollectionStatus::PendingUpload);
        assert_eq!(stored.display_status(), CollectionStatus::Failed);
    }

    #[tokio::test]
    async fn queue_totals_derive_failed_from_pending_retries() {
        let repo = repository();
        for n in 0..4 {
            repo.enqueue(record(n)).await.expect("enqueue");
        }
        repo.mark_uploaded(
            vec!["local-000".to_string()],
            "2026-03-02T05:00:00+00:00".to_string(),
        )
        .await
        .expect("mark");
        repo.record_batch_failure(
            vec!["local-001".to_string(), "local-002".to_string()],
            "HTTP 500".to_string(),
        )
        .await
        .expect("failure");

        let totals = repo.queue_totals().expect("totals");
        assert_eq!(totals.pending, 3);
        assert_eq!(totals.failed, 2);
        assert_eq!(totals.uploaded, 1);
    }
}
