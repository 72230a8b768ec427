//! Sync domain models, scheduling constants, and ports.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Jitter window applied to the first sync after connectivity returns, so a
/// fleet of devices reconnecting after a shared outage does not hit the
/// server in the same instant.
pub const RECONNECT_JITTER_MIN_SECS: u64 = 2;
pub const RECONNECT_JITTER_MAX_SECS: u64 = 15;

/// Steady repeating cadence while connectivity holds.
pub const PERIODIC_SYNC_INTERVAL_SECS: u64 = 120;

/// Uniform random delay in the reconnect jitter window.
pub fn reconnect_jitter() -> Duration {
    let secs =
        rand::thread_rng().gen_range(RECONNECT_JITTER_MIN_SECS..=RECONNECT_JITTER_MAX_SECS);
    Duration::from_secs(secs)
}

/// What caused a sync pass to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    ConnectivityRegained,
    Periodic,
    Manual,
}

/// What one sync pass did. Refresh fields are `None` when that refresh
/// failed and the cache stayed stale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPassReport {
    pub uploaded: usize,
    pub upload_failed: usize,
    pub farmers_refreshed: Option<usize>,
    pub collector_rates_refreshed: Option<usize>,
    pub farmer_rates_refreshed: Option<usize>,
}

impl SyncPassReport {
    /// True when the pass uploaded or failed at least one collection, which
    /// is the condition for emitting the completion signal.
    pub fn has_upload_activity(&self) -> bool {
        self.uploaded > 0 || self.upload_failed > 0
    }
}

/// Outcome of asking the orchestrator to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(SyncPassReport),
    /// Another pass was in flight; this trigger was dropped, not queued.
    Skipped,
}

/// The work a pass performs. Composed by [`super::DefaultSyncPass`];
/// abstracted so orchestration tests can substitute a scripted pass.
#[async_trait]
pub trait SyncPassTrait: Send + Sync {
    async fn run(&self, trigger: SyncTrigger) -> SyncPassReport;
}

/// Process-wide "a sync pass changed data" signal, consumed by view refresh
/// logic outside the core.
pub trait SyncEventSinkTrait: Send + Sync {
    fn sync_completed(&self, report: &SyncPassReport);
}

/// Reference datasets tracked in `sync_metadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncResource {
    Farmers,
    CollectorRates,
    FarmerRates,
}

/// Bookkeeping for reference refreshes.
#[async_trait]
pub trait SyncMetadataRepositoryTrait: Send + Sync {
    fn last_refresh_at(&self, resource: SyncResource) -> Result<Option<String>>;

    async fn record_refresh(&self, resource: SyncResource, refreshed_at: String) -> Result<()>;
}
