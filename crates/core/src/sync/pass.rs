//! The default sync pass: uploads first, then reference refreshes.

use std::sync::Arc;

use async_trait::async_trait;
use log::warn;

use super::{SyncPassReport, SyncPassTrait, SyncTrigger};
use crate::collections::CollectionUploadServiceTrait;
use crate::farmers::FarmerRefreshServiceTrait;
use crate::rates::{RateKind, RateRefreshServiceTrait};

/// Runs one sync pass in strict order: outbox upload, farmer refresh, then
/// both rate refreshes.
///
/// Uploads must complete before the farmer cache is replaced so a
/// full-replace never lands mid-upload. Refresh failures degrade gracefully;
/// the caches stay stale until the next successful pass.
pub struct DefaultSyncPass {
    uploader: Arc<dyn CollectionUploadServiceTrait>,
    farmer_refresher: Arc<dyn FarmerRefreshServiceTrait>,
    rate_refresher: Arc<dyn RateRefreshServiceTrait>,
}

impl DefaultSyncPass {
    pub fn new(
        uploader: Arc<dyn CollectionUploadServiceTrait>,
        farmer_refresher: Arc<dyn FarmerRefreshServiceTrait>,
        rate_refresher: Arc<dyn RateRefreshServiceTrait>,
    ) -> Self {
        Self {
            uploader,
            farmer_refresher,
            rate_refresher,
        }
    }
}

#[async_trait]
impl SyncPassTrait for DefaultSyncPass {
    async fn run(&self, trigger: SyncTrigger) -> SyncPassReport {
        let mut report = SyncPassReport::default();

        match self.uploader.upload_pending_collections().await {
            Ok(upload) => {
                report.uploaded = upload.success;
                report.upload_failed = upload.failed;
            }
            Err(err) => {
                warn!("Upload step of {:?} sync pass failed: {}", trigger, err);
            }
        }

        match self.farmer_refresher.sync_all_farmers().await {
            Ok(outcome) => report.farmers_refreshed = Some(outcome.count),
            Err(err) => warn!("Farmer refresh failed; cache stays stale: {}", err),
        }

        match self.rate_refresher.sync_rates(RateKind::Collector).await {
            Ok(outcome) => report.collector_rates_refreshed = Some(outcome.count),
            Err(err) => warn!("Collector rate refresh failed; cache stays stale: {}", err),
        }

        match self.rate_refresher.sync_rates(RateKind::Farmer).await {
            Ok(outcome) => report.farmer_rates_refreshed = Some(outcome.count),
            Err(err) => warn!("Farmer rate refresh failed; cache stays stale: {}", err),
        }

        report
    }
}
