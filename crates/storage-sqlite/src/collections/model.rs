//! Database row for the collections outbox.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use milkline_core::collections::LocalCollectionRecord;
use milkline_core::Result;

use crate::codec::{decimal_from_db, decimal_to_db, enum_from_db, enum_to_db};

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(primary_key(local_id))]
#[diesel(table_name = crate::schema::collections_queue)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CollectionQueueRowDB {
    pub local_id: String,
    pub collection_id: String,
    pub farmer_id: String,
    pub farmer_name: String,
    pub collector_id: String,
    pub liters: String,
    pub rate_per_liter: String,
    pub total_amount: String,
    pub gps_latitude: f64,
    pub gps_longitude: f64,
    pub notes: Option<String>,
    pub photo_path: Option<String>,
    pub verification_code: String,
    pub status: String,
    pub retry_count: i32,
    pub last_error_message: Option<String>,
    pub created_at: String,
    pub uploaded_at: Option<String>,
}

impl CollectionQueueRowDB {
    pub fn from_domain(record: LocalCollectionRecord) -> Result<Self> {
        Ok(Self {
            local_id: record.local_id,
            collection_id: record.collection_id,
            farmer_id: record.farmer_id,
            farmer_name: record.farmer_name,
            collector_id: record.collector_id,
            liters: decimal_to_db(record.liters),
            rate_per_liter: decimal_to_db(record.rate_per_liter),
            total_amount: decimal_to_db(record.total_amount),
            gps_latitude: record.gps_latitude,
            gps_longitude: record.gps_longitude,
            notes: record.notes,
            photo_path: record.photo_path,
            verification_code: record.verification_code,
            status: enum_to_db(&record.status)?,
            retry_count: record.retry_count,
            last_error_message: record.last_error_message,
            created_at: record.created_at,
            uploaded_at: record.uploaded_at,
        })
    }

    pub fn into_domain(self) -> Result<LocalCollectionRecord> {
        Ok(LocalCollectionRecord {
            local_id: self.local_id,
            collection_id: self.collection_id,
            farmer_id: self.farmer_id,
            farmer_name: self.farmer_name,
            collector_id: self.collector_id,
            liters: decimal_from_db(&self.liters)?,
            rate_per_liter: decimal_from_db(&self.rate_per_liter)?,
            total_amount: decimal_from_db(&self.total_amount)?,
            gps_latitude: self.gps_latitude,
            gps_longitude: self.gps_longitude,
            notes: self.notes,
            photo_path: self.photo_path,
            verification_code: self.verification_code,
            status: enum_from_db(&self.status)?,
            retry_count: self.retry_count,
            last_error_message: self.last_error_message,
            created_at: self.created_at,
            uploaded_at: self.uploaded_at,
        })
    }
}
