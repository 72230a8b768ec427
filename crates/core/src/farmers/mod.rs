//! Farmer reference data: a read-mostly mirror of the remote directory.

mod model;
mod refresher;

pub use model::*;
pub use refresher::{FarmerRefreshService, FarmerRefreshServiceTrait};

use async_trait::async_trait;

use crate::Result;

/// Local farmer cache. Fully replaced on each reference sync; never patched
/// incrementally.
#[async_trait]
pub trait FarmerCacheRepositoryTrait: Send + Sync {
    fn list_farmers(&self) -> Result<Vec<Farmer>>;

    fn find_farmer(&self, farmer_id: &str) -> Result<Option<Farmer>>;

    /// Delete-all + reinsert inside one transaction.
    async fn replace_all(&self, farmers: Vec<Farmer>) -> Result<()>;
}

/// Remote source of truth for the farmer directory.
#[async_trait]
pub trait FarmerDirectoryGatewayTrait: Send + Sync {
    async fn fetch_all_farmers(&self) -> Result<Vec<Farmer>>;
}
