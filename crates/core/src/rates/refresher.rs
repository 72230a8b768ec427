//! Full-replace refresh of the local rate caches.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use tokio::sync::Mutex;

use super::{
    latest_effective, RateCacheEntry, RateCacheRepositoryTrait, RateKind, RateSourceGatewayTrait,
};
use crate::farmers::RefreshOutcome;
use crate::sync::{SyncMetadataRepositoryTrait, SyncResource};
use crate::Result;

#[async_trait]
pub trait RateRefreshServiceTrait: Send + Sync {
    /// Replace the local cache for one rate kind from the remote active set.
    async fn sync_rates(&self, kind: RateKind) -> Result<RefreshOutcome>;

    /// The rate currently in force for the kind, if any is cached.
    fn current_rate(&self, kind: RateKind) -> Result<Option<RateCacheEntry>>;
}

pub struct RateRefreshService {
    gateway: Arc<dyn RateSourceGatewayTrait>,
    repository: Arc<dyn RateCacheRepositoryTrait>,
    sync_metadata: Arc<dyn SyncMetadataRepositoryTrait>,
    refresh_lock: Mutex<()>,
}

impl RateRefreshService {
    pub fn new(
        gateway: Arc<dyn RateSourceGatewayTrait>,
        repository: Arc<dyn RateCacheRepositoryTrait>,
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

fn resource_for(kind: RateKind) -> SyncResource {
    match kind {
        RateKind::Collector => SyncResource::CollectorRates,
        RateKind::Farmer => SyncResource::FarmerRates,
    }
}

#[async_trait]
impl RateRefreshServiceTrait for RateRefreshService {
    async fn sync_rates(&self, kind: RateKind) -> Result<RefreshOutcome> {
        let _guard = self.refresh_lock.lock().await;

        let rates = self.gateway.fetch_active_rates(kind).await?;
        let count = rates.len();
        self.repository.replace_all(kind, rates).await?;
        self.sync_metadata
            .record_refresh(resource_for(kind), Utc::now().to_rfc3339())
            .await?;

        debug!("Replaced {:?} rate cache with {} remote rows", kind, count);
        Ok(RefreshOutcome { count })
    }

    fn current_rate(&self, kind: RateKind) -> Result<Option<RateCacheEntry>> {
        let rates = self.repository.list_rates(kind)?;
        Ok(latest_effective(&rates).cloned())
    }
}
