//! Farmer models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    pub farmer_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub village: Option<String>,
    pub is_active: bool,
}

/// Result of one reference refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub count: usize,
}
