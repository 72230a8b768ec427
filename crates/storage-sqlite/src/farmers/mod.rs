//! Full-replace farmer cache storage.

mod model;
mod repository;

pub use model::FarmerRowDB;
pub use repository::FarmerCacheRepository;
