//! Key/value app settings.

mod repository;

pub use repository::AppSettingsRepository;
