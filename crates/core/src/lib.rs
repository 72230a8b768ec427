//! Domain models and services for the milkline dairy-collection platform.
//!
//! Everything here is store- and transport-agnostic: services depend on trait
//! ports (local repositories, remote gateways, event sinks) that the
//! `milkline-storage-sqlite` and `milkline-remote` crates implement.

pub mod auth;
pub mod collections;
pub mod errors;
pub mod farmers;
pub mod rates;
pub mod reconciliation;
pub mod staff;
pub mod sync;

pub use errors::{Error, Result};
