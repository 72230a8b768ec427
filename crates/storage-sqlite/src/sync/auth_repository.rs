//! Cached auth session: the signed-in account survives offline restarts.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use milkline_core::auth::{AuthIdentity, AuthSessionProviderTrait};
use milkline_core::Result;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::auth_cache;

pub struct AuthSessionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AuthSessionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Replace the cached session on sign-in or token refresh. At most one
    /// session is kept.
    pub async fn store_session(&self, identity: AuthIdentity) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::delete(auth_cache::table)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                diesel::insert_into(auth_cache::table)
                    .values((
                        auth_cache::account_id.eq(&identity.account_id),
                        auth_cache::access_token.eq(&identity.access_token),
                        auth_cache::cached_at.eq(Utc::now().to_rfc3339()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    /// Drop the cached session on sign-out.
    pub async fn clear_session(&self) -> Result<()> {
        self.writer
            .exec(|conn| {
                diesel::delete(auth_cache::table)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl AuthSessionProviderTrait for AuthSessionRepository {
    async fn current_identity(&self) -> Result<Option<AuthIdentity>> {
        let mut conn = get_connection(&self.pool)?;
        let row = auth_cache::table
            .select((auth_cache::account_id, auth_cache::access_token))
            .first::<(String, String)>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(|(account_id, access_token)| AuthIdentity {
            account_id,
            access_token,
        }))
    }
}
