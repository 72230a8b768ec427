//! Staff directory models and lookup port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Collector,
    Manager,
    Admin,
}

/// A staff row on the remote service. Collector accounts map 1:1 to a staff
/// profile; a collector without one cannot upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub staff_id: String,
    pub account_id: String,
    pub full_name: String,
    pub role: StaffRole,
}

/// Staff lookup that accepts either a staff id or an account id and
/// normalizes to the staff row.
#[async_trait]
pub trait StaffDirectoryTrait: Send + Sync {
    async fn resolve(&self, identifier: &str) -> Result<Option<Staff>>;
}
