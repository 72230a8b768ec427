//! Last-refresh bookkeeping per reference dataset.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use milkline_core::sync::{SyncMetadataRepositoryTrait, SyncResource};
use milkline_core::Result;

use crate::codec::enum_to_db;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::sync_metadata;

pub struct SyncMetadataRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SyncMetadataRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SyncMetadataRepositoryTrait for SyncMetadataRepository {
    fn last_refresh_at(&self, resource: SyncResource) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let value = sync_metadata::table
            .find(enum_to_db(&resource)?)
            .select(sync_metadata::last_refreshed_at)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(value)
    }

    async fn record_refresh(&self, resource: SyncResource, refreshed_at: String) -> Result<()> {
        let key = enum_to_db(&resource)?;
        self.writer
            .exec(move |conn| {
                let now = Utc::now().to_rfc3339();
                diesel::insert_into(sync_metadata::table)
                    .values((
                        sync_metadata::resource.eq(&key),
                        sync_metadata::last_refreshed_at.eq(&refreshed_at),
                        sync_metadata::updated_at.eq(&now),
                    ))
                    .on_conflict(sync_metadata::resource)
                    .do_update()
                    .set((
                        sync_metadata::last_refreshed_at.eq(&refreshed_at),
                        sync_metadata::updated_at.eq(&now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::setup_db;

    #[tokio::test]
    async fn record_refresh_upserts_per_resource() {
        let (pool, writer) = setup_db();
        let repo = SyncMetadataRepository::new(pool, writer);

        assert!(repo
            .last_refresh_at(SyncResource::Farmers)
            .expect("read")
            .is_none());

        repo.record_refresh(SyncResource::Farmers, "2026-03-01T10:00:00+00:00".to_string())
            .await
            .expect("first");
        repo.record_refresh(SyncResource::Farmers, "2026-03-01T12:00:00+00:00".to_string())
            .await
            .expect("second");
        repo.record_refresh(
            SyncResource::CollectorRates,
            "2026-03-01T12:00:05+00:00".to_string(),
        )
        .await
        .expect("other resource");

        assert_eq!(
            repo.last_refresh_at(SyncResource::Farmers).expect("read"),
            Some("2026-03-01T12:00:00+00:00".to_string())
        );
        assert_eq!(
            repo.last_refresh_at(SyncResource::CollectorRates)
                .expect("read"),
            Some("2026-03-01T12:00:05+00:00".to_string())
        );
    }
}
