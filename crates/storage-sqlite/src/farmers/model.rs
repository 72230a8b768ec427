//! Database row for the farmer cache.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use milkline_core::farmers::Farmer;

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
#[diesel(primary_key(farmer_id))]
#[diesel(table_name = crate::schema::farmers_local)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FarmerRowDB {
    pub farmer_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub village: Option<String>,
    pub is_active: i32,
    pub synced_at: String,
}

impl FarmerRowDB {
    pub fn from_domain(farmer: Farmer, synced_at: String) -> Self {
        Self {
            farmer_id: farmer.farmer_id,
            name: farmer.name,
            phone: farmer.phone,
            village: farmer.village,
            is_active: i32::from(farmer.is_active),
            synced_at,
        }
    }
}

impl From<FarmerRowDB> for Farmer {
    fn from(row: FarmerRowDB) -> Self {
        Self {
            farmer_id: row.farmer_id,
            name: row.name,
            phone: row.phone,
            village: row.village,
            is_active: row.is_active != 0,
        }
    }
}
