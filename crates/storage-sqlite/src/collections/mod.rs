//! Outbox storage for captured collections.

mod model;
mod repository;

pub use model::CollectionQueueRowDB;
pub use repository::CollectionQueueRepository;
