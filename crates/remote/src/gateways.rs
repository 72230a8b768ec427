//! Adapters implementing the core's remote ports over [`RemoteClient`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use milkline_core::collections::{CollectionUpload, CollectionsGatewayTrait};
use milkline_core::farmers::{Farmer, FarmerDirectoryGatewayTrait};
use milkline_core::rates::{RateCacheEntry, RateKind, RateSourceGatewayTrait};
use milkline_core::reconciliation::{
    ApprovalRecord, ApprovalStoreTrait, FarmerNotifierTrait, PenaltyRule, RemoteCollection,
};
use milkline_core::staff::{Staff, StaffDirectoryTrait};
use milkline_core::Result;

use crate::client::RemoteClient;
use crate::types::PublishEventRequest;

/// Broadcast channel carrying farmer-facing approval notifications.
const FARMER_NOTIFICATION_CHANNEL: &str = "farmer-notifications";

/// Where the bearer token for remote calls comes from.
///
/// On the device this reads the cached auth session; on the portal server it
/// is a static service token from the environment.
pub trait AccessTokenProviderTrait: Send + Sync {
    fn access_token(&self) -> Result<String>;
}

/// Fixed service token, used by server-side callers.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl AccessTokenProviderTrait for StaticTokenProvider {
    fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// One adapter implementing every remote port the core defines.
pub struct RemoteDataGateway {
    client: RemoteClient,
    tokens: Arc<dyn AccessTokenProviderTrait>,
}

impl RemoteDataGateway {
    pub fn new(client: RemoteClient, tokens: Arc<dyn AccessTokenProviderTrait>) -> Self {
        Self { client, tokens }
    }
}

#[async_trait]
impl CollectionsGatewayTrait for RemoteDataGateway {
    async fn upsert_collections(&self, batch: Vec<CollectionUpload>) -> Result<()> {
        let token = self.tokens.access_token()?;
        self.client.upsert_collections(&token, batch).await?;
        Ok(())
    }

    async fn upload_photo(&self, collection_id: &str, bytes: Vec<u8>) -> Result<String> {
        let token = self.tokens.access_token()?;
        let response = self
            .client
            .upload_photo(&token, collection_id, bytes)
            .await?;
        Ok(response.photo_url)
    }
}

#[async_trait]
impl FarmerDirectoryGatewayTrait for RemoteDataGateway {
    async fn fetch_all_farmers(&self) -> Result<Vec<Farmer>> {
        let token = self.tokens.access_token()?;
        Ok(self.client.list_farmers(&token).await?)
    }
}

#[async_trait]
impl RateSourceGatewayTrait for RemoteDataGateway {
    async fn fetch_active_rates(&self, kind: RateKind) -> Result<Vec<RateCacheEntry>> {
        let token = self.tokens.access_token()?;
        Ok(self.client.list_active_rates(&token, kind).await?)
    }
}

#[async_trait]
impl StaffDirectoryTrait for RemoteDataGateway {
    async fn resolve(&self, identifier: &str) -> Result<Option<Staff>> {
        let token = self.tokens.access_token()?;
        match self.client.get_staff(&token, identifier).await {
            Ok(staff) => Ok(Some(staff)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl ApprovalStoreTrait for RemoteDataGateway {
    async fn get_collection(&self, collection_id: &str) -> Result<Option<RemoteCollection>> {
        let token = self.tokens.access_token()?;
        match self.client.get_collection(&token, collection_id).await {
            Ok(collection) => Ok(Some(collection)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn list_unapproved_for_day(
        &self,
        collector_id: &str,
        collection_date: NaiveDate,
    ) -> Result<Vec<RemoteCollection>> {
        let token = self.tokens.access_token()?;
        Ok(self
            .client
            .list_unapproved_collections(&token, collector_id, collection_date)
            .await?)
    }

    async fn active_penalty_rules(&self) -> Result<Vec<PenaltyRule>> {
        let token = self.tokens.access_token()?;
        Ok(self.client.list_active_penalty_rules(&token).await?)
    }

    async fn insert_approval(&self, approval: ApprovalRecord) -> Result<()> {
        let token = self.tokens.access_token()?;
        self.client.insert_approval(&token, &approval).await?;
        Ok(())
    }

    async fn mark_collection_approved(&self, collection_id: &str, approval_id: &str) -> Result<()> {
        let token = self.tokens.access_token()?;
        self.client
            .mark_collection_approved(&token, collection_id, approval_id)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl FarmerNotifierTrait for RemoteDataGateway {
    async fn notify_approval(&self, farmer_id: &str, approval: &ApprovalRecord) -> Result<()> {
        let token = self.tokens.access_token()?;
        self.client
            .publish_event(
                &token,
                PublishEventRequest {
                    channel: FARMER_NOTIFICATION_CHANNEL.to_string(),
                    event: "collection-approved".to_string(),
                    payload: serde_json::json!({
                        "farmerId": farmer_id,
                        "collectionId": approval.collection_id,
                        "receivedLiters": approval.received_liters,
                        "penaltyAmount": approval.penalty_amount,
                    }),
                },
            )
            .await?;
        Ok(())
    }
}
