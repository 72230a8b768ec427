//! HTTP client for the hosted milkline data service, plus adapters that
//! implement the core's remote gateway ports over it.

mod client;
mod error;
mod gateways;
mod types;

pub use client::RemoteClient;
pub use error::{ApiRetryClass, RemoteError, Result};
pub use gateways::{AccessTokenProviderTrait, RemoteDataGateway, StaticTokenProvider};
pub use types::*;
