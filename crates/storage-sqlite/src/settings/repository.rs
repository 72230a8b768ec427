//! Repository for app settings.

use std::sync::Arc;

use diesel::prelude::*;

use milkline_core::Result;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::app_settings;

pub struct AppSettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AppSettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let value = app_settings::table
            .find(key)
            .select(app_settings::setting_value)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(value)
    }

    pub async fn set(&self, key: String, value: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::insert_into(app_settings::table)
                    .values((
                        app_settings::setting_key.eq(&key),
                        app_settings::setting_value.eq(&value),
                    ))
                    .on_conflict(app_settings::setting_key)
                    .do_update()
                    .set(app_settings::setting_value.eq(&value))
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
    async fn set_upserts_and_get_reads_back() {
        let (pool, writer) = setup_db();
        let repo = AppSettingsRepository::new(pool, writer);

        assert!(repo.get("api_url").expect("read").is_none());
        repo.set("api_url".to_string(), "https://one".to_string())
            .await
            .expect("set");
        repo.set("api_url".to_string(), "https://two".to_string())
            .await
            .expect("overwrite");
        assert_eq!(
            repo.get("api_url").expect("read"),
            Some("https://two".to_string())
        );
    }
}
