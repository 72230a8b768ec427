//! Repository for the farmer cache.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use milkline_core::farmers::{Farmer, FarmerCacheRepositoryTrait};
use milkline_core::Result;

use super::model::FarmerRowDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::farmers_local;

pub struct FarmerCacheRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl FarmerCacheRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl FarmerCacheRepositoryTrait for FarmerCacheRepository {
    fn list_farmers(&self) -> Result<Vec<Farmer>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = farmers_local::table
            .order(farmers_local::name.asc())
            .load::<FarmerRowDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Farmer::from).collect())
    }

    fn find_farmer(&self, farmer_id: &str) -> Result<Option<Farmer>> {
        let mut conn = get_connection(&self.pool)?;
        let row = farmers_local::table
            .find(farmer_id)
            .first::<FarmerRowDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Farmer::from))
    }

    async fn replace_all(&self, farmers: Vec<Farmer>) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let synced_at = Utc::now().to_rfc3339();
                diesel::delete(farmers_local::table)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                for farmer in farmers {
                    let row = FarmerRowDB::from_domain(farmer, synced_at.clone());
                    diesel::insert_into(farmers_local::table)
                        .values(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }
}
