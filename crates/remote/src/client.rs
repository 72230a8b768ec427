//! Typed REST client for the hosted data service.
//!
//! One method per operation with fixed parameters; nothing assembles filter
//! or column lists dynamically.

use std::time::Duration;

use chrono::NaiveDate;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use milkline_core::collections::CollectionUpload;
use milkline_core::farmers::Farmer;
use milkline_core::rates::{RateCacheEntry, RateKind};
use milkline_core::reconciliation::{ApprovalRecord, PenaltyRule, RemoteCollection};
use milkline_core::staff::Staff;

use crate::error::{RemoteError, Result};
use crate::types::*;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Client for the milkline data service API.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the data service (e.g. "https://api.milkline.app")
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn headers(&self, token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| RemoteError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            // Try to parse the structured error body first.
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(RemoteError::api(
                    status.as_u16(),
                    format!("{}: {}", error.code, error.message),
                ));
            }
            return Err(RemoteError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "Failed to deserialize response. Body: {}, Error: {}",
                body,
                e
            );
            RemoteError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Collections
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert-or-replace a batch of collections keyed on `collectionId`.
    ///
    /// POST /api/v1/collections/upsert
    pub async fn upsert_collections(
        &self,
        token: &str,
        collections: Vec<CollectionUpload>,
    ) -> Result<UpsertCollectionsResponse> {
        let url = format!("{}/api/v1/collections/upsert", self.base_url);
        debug!("Upserting {} collections", collections.len());

        let response = self
            .client
            .post(&url)
            .headers(self.headers(token)?)
            .json(&UpsertCollectionsRequest { collections })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch one collection by business id.
    ///
    /// GET /api/v1/collections/{collectionId}
    pub async fn get_collection(
        &self,
        token: &str,
        collection_id: &str,
    ) -> Result<RemoteCollection> {
        let url = format!("{}/api/v1/collections/{}", self.base_url, collection_id);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Not-yet-approved collections for one collector on one calendar date.
    ///
    /// GET /api/v1/collections/unapproved?collectorId={id}&date={date}
    pub async fn list_unapproved_collections(
        &self,
        token: &str,
        collector_id: &str,
        collection_date: NaiveDate,
    ) -> Result<Vec<RemoteCollection>> {
        let url = format!("{}/api/v1/collections/unapproved", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&[
                ("collectorId", collector_id.to_string()),
                ("date", collection_date.to_string()),
            ])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Flip `approvedForCompany` and link the approval record.
    ///
    /// POST /api/v1/collections/{collectionId}/approve
    pub async fn mark_collection_approved(
        &self,
        token: &str,
        collection_id: &str,
        approval_id: &str,
    ) -> Result<SuccessResponse> {
        let url = format!(
            "{}/api/v1/collections/{}/approve",
            self.base_url, collection_id
        );

        let response = self
            .client
            .post(&url)
            .headers(self.headers(token)?)
            .json(&MarkApprovedRequest {
                approval_id: approval_id.to_string(),
            })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reference Data
    // ─────────────────────────────────────────────────────────────────────────

    /// The full farmer directory.
    ///
    /// GET /api/v1/farmers
    pub async fn list_farmers(&self, token: &str) -> Result<Vec<Farmer>> {
        let url = format!("{}/api/v1/farmers", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// The active-rate set for one rate kind.
    ///
    /// GET /api/v1/rates?kind={collector|farmer}
    pub async fn list_active_rates(
        &self,
        token: &str,
        kind: RateKind,
    ) -> Result<Vec<RateCacheEntry>> {
        let url = format!("{}/api/v1/rates", self.base_url);
        let kind_param = match kind {
            RateKind::Collector => "collector",
            RateKind::Farmer => "farmer",
        };

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&[("kind", kind_param)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Active penalty rules.
    ///
    /// GET /api/v1/penalty-rules/active
    pub async fn list_active_penalty_rules(&self, token: &str) -> Result<Vec<PenaltyRule>> {
        let url = format!("{}/api/v1/penalty-rules/active", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Staff
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve a staff row from a staff id or an account id.
    ///
    /// GET /api/v1/staff/{identifier}
    pub async fn get_staff(&self, token: &str, identifier: &str) -> Result<Staff> {
        let url = format!("{}/api/v1/staff/{}", self.base_url, identifier);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Approvals
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert one immutable approval record.
    ///
    /// POST /api/v1/approvals
    pub async fn insert_approval(
        &self,
        token: &str,
        approval: &ApprovalRecord,
    ) -> Result<SuccessResponse> {
        let url = format!("{}/api/v1/approvals", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(token)?)
            .json(approval)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Object Storage + Broadcast
    // ─────────────────────────────────────────────────────────────────────────

    /// Upload a collection photo; the service returns its public URL.
    ///
    /// POST /api/v1/photos/{collectionId}
    pub async fn upload_photo(
        &self,
        token: &str,
        collection_id: &str,
        bytes: Vec<u8>,
    ) -> Result<PhotoUploadResponse> {
        let url = format!("{}/api/v1/photos/{}", self.base_url, collection_id);

        let mut headers = self.headers(token)?;
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .body(bytes)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Publish one message on the broadcast channel.
    ///
    /// POST /api/v1/events/publish
    pub async fn publish_event(
        &self,
        token: &str,
        request: PublishEventRequest,
    ) -> Result<SuccessResponse> {
        let url = format!("{}/api/v1/events/publish", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(token)?)
            .json(&request)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
