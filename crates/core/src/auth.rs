//! Authenticated-session lookup used by the device-side services.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Identity of the signed-in collector account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthIdentity {
    pub account_id: String,
    pub access_token: String,
}

/// Source of the current authenticated identity.
///
/// The device caches the last session locally (`auth_cache`), so this stays
/// resolvable offline as long as a session was established once.
#[async_trait]
pub trait AuthSessionProviderTrait: Send + Sync {
    async fn current_identity(&self) -> Result<Option<AuthIdentity>>;
}
