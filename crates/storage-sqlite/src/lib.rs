//! SQLite implementation of the milkline local durable store.
//!
//! Reads go straight to the r2d2 pool; every mutation flows through the
//! serialized write actor (`db::WriteHandle`), which wraps each job in an
//! immediate transaction.

pub mod codec;
pub mod collections;
pub mod db;
pub mod errors;
pub mod farmers;
pub mod rates;
pub mod schema;
pub mod settings;
pub mod sync;

pub use collections::CollectionQueueRepository;
pub use farmers::FarmerCacheRepository;
pub use rates::RateCacheRepository;
pub use settings::AppSettingsRepository;
pub use sync::{AuthSessionRepository, SyncMetadataRepository};

#[cfg(test)]
pub(crate) mod test_util;
