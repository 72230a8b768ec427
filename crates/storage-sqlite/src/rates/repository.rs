//! Repository for the two rate caches.
//!
//! Collector and farmer rates live in physically separate tables; the kind
//! parameter picks the table, so the two can never be mixed in one query.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use milkline_core::rates::{RateCacheEntry, RateCacheRepositoryTrait, RateKind};
use milkline_core::Result;

use crate::codec::{decimal_from_db, decimal_to_db};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{collector_rates_local, farmer_rates_local};

pub struct RateCacheRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl RateCacheRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

type RateRow = (String, String, String, i32);

fn to_entry(row: RateRow) -> Result<RateCacheEntry> {
    let (rate_id, rate_per_liter, effective_from, is_active) = row;
    Ok(RateCacheEntry {
        rate_id,
        rate_per_liter: decimal_from_db(&rate_per_liter)?,
        effective_from,
        is_active: is_active != 0,
    })
}

fn load_rows(conn: &mut SqliteConnection, kind: RateKind) -> Result<Vec<RateRow>> {
    let rows = match kind {
        RateKind::Collector => collector_rates_local::table
            .select((
                collector_rates_local::rate_id,
                collector_rates_local::rate_per_liter,
                collector_rates_local::effective_from,
                collector_rates_local::is_active,
            ))
            .order(collector_rates_local::effective_from.asc())
            .load::<RateRow>(conn),
        RateKind::Farmer => farmer_rates_local::table
            .select((
                farmer_rates_local::rate_id,
                farmer_rates_local::rate_per_liter,
                farmer_rates_local::effective_from,
                farmer_rates_local::is_active,
            ))
            .order(farmer_rates_local::effective_from.asc())
            .load::<RateRow>(conn),
    }
    .map_err(StorageError::from)?;
    Ok(rows)
}

fn replace_rows(
    conn: &mut SqliteConnection,
    kind: RateKind,
    rates: Vec<RateCacheEntry>,
) -> Result<()> {
    match kind {
        RateKind::Collector => {
            diesel::delete(collector_rates_local::table)
                .execute(conn)
                .map_err(StorageError::from)?;
            for rate in rates {
                diesel::insert_into(collector_rates_local::table)
                    .values((
                        collector_rates_local::rate_id.eq(rate.rate_id),
                        collector_rates_local::rate_per_liter
                            .eq(decimal_to_db(rate.rate_per_liter)),
                        collector_rates_local::effective_from.eq(rate.effective_from),
                        collector_rates_local::is_active.eq(i32::from(rate.is_active)),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
            }
        }
        RateKind::Farmer => {
            diesel::delete(farmer_rates_local::table)
                .execute(conn)
                .map_err(StorageError::from)?;
            for rate in rates {
                diesel::insert_into(farmer_rates_local::table)
                    .values((
                        farmer_rates_local::rate_id.eq(rate.rate_id),
                        farmer_rates_local::rate_per_liter.eq(decimal_to_db(rate.rate_per_liter)),
                        farmer_rates_local::effective_from.eq(rate.effective_from),
                        farmer_rates_local::is_active.eq(i32::from(rate.is_active)),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
            }
        }
    }
    Ok(())
}

#[async_trait]
impl RateCacheRepositoryTrait for RateCacheRepository {
    fn list_rates(&self, kind: RateKind) -> Result<Vec<RateCacheEntry>> {
        let mut conn = get_connection(&self.pool)?;
        load_rows(&mut conn, kind)?
            .into_iter()
            .map(to_entry)
            .collect()
    }

    async fn replace_all(&self, kind: RateKind, rates: Vec<RateCacheEntry>) -> Result<()> {
        self.writer
            .exec(move |conn| replace_rows(conn, kind, rates))
            .await
    }
}
