//! Sync bookkeeping and the cached auth session.

mod auth_repository;
mod metadata_repository;

pub use auth_repository::AuthSessionRepository;
pub use metadata_repository::SyncMetadataRepository;
