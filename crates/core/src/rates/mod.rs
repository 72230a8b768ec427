//! Rate caches: the collector's per-liter earning rate and the farmer's
//! per-liter payout rate. The two kinds are kept in separate tables and
//! separate calls so they can never be conflated.

mod model;
mod refresher;

pub use model::*;
pub use refresher::{RateRefreshService, RateRefreshServiceTrait};

use async_trait::async_trait;

use crate::Result;

/// Local rate cache, one physical table per [`RateKind`].
#[async_trait]
pub trait RateCacheRepositoryTrait: Send + Sync {
    fn list_rates(&self, kind: RateKind) -> Result<Vec<RateCacheEntry>>;

    /// Delete-all + reinsert for one kind inside one transaction.
    async fn replace_all(&self, kind: RateKind, rates: Vec<RateCacheEntry>) -> Result<()>;
}

/// Remote source of the active-rate sets.
#[async_trait]
pub trait RateSourceGatewayTrait: Send + Sync {
    async fn fetch_active_rates(&self, kind: RateKind) -> Result<Vec<RateCacheEntry>>;
}
