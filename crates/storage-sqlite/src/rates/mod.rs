//! Rate cache storage, one table per rate kind.

mod repository;

pub use repository::RateCacheRepository;
