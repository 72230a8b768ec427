//! Full-replace refresh of the local farmer cache.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use tokio::sync::Mutex;

use super::{Farmer, FarmerCacheRepositoryTrait, FarmerDirectoryGatewayTrait, RefreshOutcome};
use crate::sync::{SyncMetadataRepositoryTrait, SyncResource};
use crate::Result;

#[async_trait]
pub trait FarmerRefreshServiceTrait: Send + Sync {
    /// Replace the local farmer cache from the remote source of truth.
    async fn sync_all_farmers(&self) -> Result<RefreshOutcome>;

    fn list_farmers(&self) -> Result<Vec<Farmer>>;
}

pub struct FarmerRefreshService {
    gateway: Arc<dyn FarmerDirectoryGatewayTrait>,
    repository: Arc<dyn FarmerCacheRepositoryTrait>,
    sync_metadata: Arc<dyn SyncMetadataRepositoryTrait>,
    /// Serializes refreshes against each other so a manual force-refresh
    /// cannot interleave with an orchestrated pass.
    refresh_lock: Mutex<()>,
}

impl FarmerRefreshService {
    pub fn new(
        gateway: Arc<dyn FarmerDirectoryGatewayTrait>,
        repository: Arc<dyn FarmerCacheRepositoryTrait>,
        sync_metadata: Arc<dyn SyncMetadataRepositoryTrait>,
    ) -> Self {
        Self {
            gateway,
            repository,
            sync_metadata,
            refresh_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl FarmerRefreshServiceTrait for FarmerRefreshService {
    async fn sync_all_farmers(&self) -> Result<RefreshOutcome> {
        let _guard = self.refresh_lock.lock().await;

        let farmers = self.gateway.fetch_all_farmers().await?;
        let count = farmers.len();
        self.repository.replace_all(farmers).await?;
        self.sync_metadata
            .record_refresh(SyncResource::Farmers, Utc::now().to_rfc3339())
            .await?;

        debug!("Replaced local farmer cache with {} remote rows", count);
        Ok(RefreshOutcome { count })
    }

    fn list_farmers(&self) -> Result<Vec<Farmer>> {
        self.repository.list_farmers()
    }
}
