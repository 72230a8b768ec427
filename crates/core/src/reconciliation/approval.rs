//! The approval workflow: record variance and penalty, persist an approval,
//! and irreversibly mark collections company-approved.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    apportion_received, calculate_penalty, calculate_variance, ApprovalRecord, ApprovalStoreTrait,
    ApproveRequest, BatchApprovalSummary, BatchApproveRequest, FarmerNotifierTrait, PenaltyRule,
    RemoteCollection,
};
use crate::staff::StaffDirectoryTrait;
use crate::{Error, Result};

#[async_trait]
pub trait ApprovalServiceTrait: Send + Sync {
    /// Approve one collection against a company-received volume.
    async fn approve(&self, request: ApproveRequest) -> Result<ApprovalRecord>;

    /// Approve every not-yet-approved collection of one collector's day,
    /// apportioning a single weighed total when given. Safe to re-invoke
    /// after a partial prior success: the unapproved filter skips what
    /// already went through.
    async fn batch_approve(&self, request: BatchApproveRequest) -> Result<BatchApprovalSummary>;
}

pub struct ApprovalService {
    store: Arc<dyn ApprovalStoreTrait>,
    staff_directory: Arc<dyn StaffDirectoryTrait>,
    notifier: Arc<dyn FarmerNotifierTrait>,
}

impl ApprovalService {
    pub fn new(
        store: Arc<dyn ApprovalStoreTrait>,
        staff_directory: Arc<dyn StaffDirectoryTrait>,
        notifier: Arc<dyn FarmerNotifierTrait>,
    ) -> Self {
        Self {
            store,
            staff_directory,
            notifier,
        }
    }

    fn build_approval(
        collection: &RemoteCollection,
        staff_id: &str,
        received_liters: Decimal,
        notes: Option<String>,
        rules: &[PenaltyRule],
    ) -> ApprovalRecord {
        let variance = calculate_variance(collection.liters, received_liters);
        let penalty_amount = calculate_penalty(&variance, rules);

        ApprovalRecord {
            approval_id: Uuid::new_v4().to_string(),
            collection_id: collection.collection_id.clone(),
            staff_id: staff_id.to_string(),
            collected_liters: variance.collected_liters,
            received_liters: variance.received_liters,
            variance_liters: variance.variance_liters,
            variance_percentage: variance.variance_percentage,
            variance_type: variance.variance_type,
            penalty_amount,
            notes,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Persist one approval and flip the collection.
    ///
    /// The approval row goes in before the flip, so a crash in between leaves
    /// an orphan approval (re-creatable) rather than a flipped collection
    /// with no record behind it.
    async fn commit_approval(
        &self,
        collection: &RemoteCollection,
        approval: &ApprovalRecord,
    ) -> Result<()> {
        self.store.insert_approval(approval.clone()).await?;
        self.store
            .mark_collection_approved(&collection.collection_id, &approval.approval_id)
            .await?;

        if let Err(err) = self
            .notifier
            .notify_approval(&collection.farmer_id, approval)
            .await
        {
            warn!(
                "Farmer notification failed for collection {}: {}",
                collection.collection_id, err
            );
        }
        Ok(())
    }

    async fn resolve_staff_id(&self, identifier: &str) -> Result<String> {
        let staff = self
            .staff_directory
            .resolve(identifier)
            .await?
            .ok_or_else(|| Error::not_found(format!("No staff profile for '{}'", identifier)))?;
        Ok(staff.staff_id)
    }
}

#[async_trait]
impl ApprovalServiceTrait for ApprovalService {
    async fn approve(&self, request: ApproveRequest) -> Result<ApprovalRecord> {
        let collection = self
            .store
            .get_collection(&request.collection_id)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!("Collection '{}' not found", request.collection_id))
            })?;

        let staff_id = self.resolve_staff_id(&request.staff).await?;
        let rules = self.store.active_penalty_rules().await?;
        let approval = Self::build_approval(
            &collection,
            &staff_id,
            request.received_liters,
            request.notes,
            &rules,
        );

        self.commit_approval(&collection, &approval).await?;
        debug!(
            "Approved collection {} with variance {} l and penalty {}",
            approval.collection_id, approval.variance_liters, approval.penalty_amount
        );
        Ok(approval)
    }

    async fn batch_approve(&self, request: BatchApproveRequest) -> Result<BatchApprovalSummary> {
        if let Some(total) = request.total_received_liters {
            if total < Decimal::ZERO {
                return Err(Error::validation(
                    "Total received liters must not be negative",
                ));
            }
        }

        let staff_id = self.resolve_staff_id(&request.staff).await?;
        let pending = self
            .store
            .list_unapproved_for_day(&request.collector_id, request.collection_date)
            .await?;
        if pending.is_empty() {
            return Ok(BatchApprovalSummary::default());
        }

        let collected: Vec<Decimal> = pending.iter().map(|c| c.liters).collect();
        let received = match request.total_received_liters {
            Some(total) => apportion_received(total, &collected),
            // No weighed total: zero variance for every record.
            None => collected.clone(),
        };

        let rules = self.store.active_penalty_rules().await?;
        let mut summary = BatchApprovalSummary::default();

        for (collection, received_liters) in pending.iter().zip(received) {
            let approval =
                Self::build_approval(collection, &staff_id, received_liters, None, &rules);
            self.commit_approval(collection, &approval).await?;

            summary.approved_count += 1;
            summary.total_liters_collected += approval.collected_liters;
            summary.total_liters_received += approval.received_liters;
            summary.total_variance += approval.variance_liters;
            summary.total_penalty_amount += approval.penalty_amount;
        }

        debug!(
            "Batch-approved {} collections for collector {} on {}",
            summary.approved_count, request.collector_id, request.collection_date
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{RemoteCollectionStatus, VarianceType};
    use super::*;
    use crate::staff::{Staff, StaffRole};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryApprovalStore {
        collections: Mutex<Vec<RemoteCollection>>,
        approvals: Mutex<Vec<ApprovalRecord>>,
        rules: Mutex<Vec<PenaltyRule>>,
        log: Mutex<Vec<String>>,
    }

    impl InMemoryApprovalStore {
        fn seed_collections(&self, collections: Vec<RemoteCollection>) {
            self.collections.lock().unwrap().extend(collections);
        }

        fn seed_rules(&self, rules: Vec<PenaltyRule>) {
            self.rules.lock().unwrap().extend(rules);
        }

        fn approvals(&self) -> Vec<ApprovalRecord> {
            self.approvals.lock().unwrap().clone()
        }

        fn collections(&self) -> Vec<RemoteCollection> {
            self.collections.lock().unwrap().clone()
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ApprovalStoreTrait for InMemoryApprovalStore {
        async fn get_collection(&self, collection_id: &str) -> Result<Option<RemoteCollection>> {
            Ok(self
                .collections
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.collection_id == collection_id)
                .cloned())
        }

        async fn list_unapproved_for_day(
            &self,
            collector_id: &str,
            collection_date: NaiveDate,
        ) -> Result<Vec<RemoteCollection>> {
            Ok(self
                .collections
                .lock()
                .unwrap()
                .iter()
                .filter(|c| {
                    c.collector_id == collector_id
                        && c.collection_date == collection_date
                        && !c.approved_for_company
                })
                .cloned()
                .collect())
        }

        async fn active_penalty_rules(&self) -> Result<Vec<PenaltyRule>> {
            Ok(self.rules.lock().unwrap().clone())
        }

        async fn insert_approval(&self, approval: ApprovalRecord) -> Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("insert:{}", approval.collection_id));
            self.approvals.lock().unwrap().push(approval);
            Ok(())
        }

        async fn mark_collection_approved(
            &self,
            collection_id: &str,
            approval_id: &str,
        ) -> Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("flip:{}", collection_id));
            let mut collections = self.collections.lock().unwrap();
            let collection = collections
                .iter_mut()
                .find(|c| c.collection_id == collection_id)
                .expect("collection exists");
            collection.approved_for_company = true;
            collection.approval_id = Some(approval_id.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notified: Mutex<Vec<String>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl FarmerNotifierTrait for RecordingNotifier {
        async fn notify_approval(
            &self,
            farmer_id: &str,
            _approval: &ApprovalRecord,
        ) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::remote("broadcast channel down"));
            }
            self.notified.lock().unwrap().push(farmer_id.to_string());
            Ok(())
        }
    }

    struct StaffByEitherId;

    #[async_trait]
    impl StaffDirectoryTrait for StaffByEitherId {
        async fn resolve(&self, identifier: &str) -> Result<Option<Staff>> {
            // Knows one manager, addressable by staff id or account id.
            if identifier == "staff-9" || identifier == "account-42" {
                Ok(Some(Staff {
                    staff_id: "staff-9".to_string(),
                    account_id: "account-42".to_string(),
                    full_name: "T. Manager".to_string(),
                    role: StaffRole::Manager,
                }))
            } else {
                Ok(None)
            }
        }
    }

    fn collection(id: &str, liters: Decimal) -> RemoteCollection {
        RemoteCollection {
            collection_id: id.to_string(),
            collector_id: "collector-1".to_string(),
            farmer_id: "farmer-1".to_string(),
            liters,
            collection_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            status: RemoteCollectionStatus::Collected,
            approved_for_company: false,
            approval_id: None,
        }
    }

    fn negative_rule() -> PenaltyRule {
        PenaltyRule {
            rule_id: "neg-wide".to_string(),
            variance_type: VarianceType::Negative,
            min_percent: dec!(1),
            max_percent: dec!(100),
            penalty_rate_per_liter: dec!(10),
            is_active: true,
        }
    }

    struct Fixture {
        service: ApprovalService,
        store: Arc<InMemoryApprovalStore>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryApprovalStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let service =
            ApprovalService::new(store.clone(), Arc::new(StaffByEitherId), notifier.clone());
        Fixture {
            service,
            store,
            notifier,
        }
    }

    fn batch_request(total: Option<Decimal>) -> BatchApproveRequest {
        BatchApproveRequest {
            staff: "staff-9".to_string(),
            collector_id: "collector-1".to_string(),
            collection_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            total_received_liters: total,
        }
    }

    #[tokio::test]
    async fn single_approval_records_variance_and_flips_state() {
        let f = fixture();
        f.store.seed_collections(vec![collection("col-1", dec!(100))]);
        f.store.seed_rules(vec![negative_rule()]);

        let approval = f
            .service
            .approve(ApproveRequest {
                collection_id: "col-1".to_string(),
                staff: "staff-9".to_string(),
                received_liters: dec!(95),
                notes: Some("weighed at depot".to_string()),
            })
            .await
            .expect("approve");

        assert_eq!(approval.variance_liters, dec!(-5));
        assert_eq!(approval.variance_type, VarianceType::Negative);
        assert_eq!(approval.penalty_amount, dec!(50));
        assert_eq!(approval.staff_id, "staff-9");

        let stored = &f.store.collections()[0];
        assert!(stored.approved_for_company);
        assert_eq!(stored.approval_id.as_deref(), Some(&*approval.approval_id));
        assert_eq!(f.notifier.notified.lock().unwrap().as_slice(), ["farmer-1"]);

        // Approval row precedes the flip.
        assert_eq!(f.store.log(), vec!["insert:col-1", "flip:col-1"]);
    }

    #[tokio::test]
    async fn staff_identifier_accepts_an_account_id() {
        let f = fixture();
        f.store.seed_collections(vec![collection("col-1", dec!(10))]);

        let approval = f
            .service
            .approve(ApproveRequest {
                collection_id: "col-1".to_string(),
                staff: "account-42".to_string(),
                received_liters: dec!(10),
                notes: None,
            })
            .await
            .expect("approve");

        assert_eq!(approval.staff_id, "staff-9");
    }

    #[tokio::test]
    async fn unknown_collection_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .approve(ApproveRequest {
                collection_id: "ghost".to_string(),
                staff: "staff-9".to_string(),
                received_liters: dec!(10),
                notes: None,
            })
            .await
            .expect_err("missing collection");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_the_approval() {
        let f = fixture();
        f.store.seed_collections(vec![collection("col-1", dec!(10))]);
        f.notifier.fail.store(true, Ordering::SeqCst);

        f.service
            .approve(ApproveRequest {
                collection_id: "col-1".to_string(),
                staff: "staff-9".to_string(),
                received_liters: dec!(10),
                notes: None,
            })
            .await
            .expect("approval still succeeds");

        assert!(f.store.collections()[0].approved_for_company);
    }

    #[tokio::test]
    async fn batch_apportions_a_weighed_total_proportionally() {
        let f = fixture();
        f.store.seed_collections(vec![
            collection("col-1", dec!(30)),
            collection("col-2", dec!(50)),
            collection("col-3", dec!(20)),
        ]);
        f.store.seed_rules(vec![negative_rule()]);

        let summary = f
            .service
            .batch_approve(batch_request(Some(dec!(95))))
            .await
            .expect("batch approve");

        assert_eq!(summary.approved_count, 3);
        assert_eq!(summary.total_liters_collected, dec!(100));
        assert!((summary.total_liters_received - dec!(95)).abs() < dec!(0.000001));
        assert!((summary.total_variance - dec!(-5)).abs() < dec!(0.000001));
        // Every record sits at -5%, inside the 1..100% band at 10/liter.
        assert!((summary.total_penalty_amount - dec!(50)).abs() < dec!(0.000001));

        let approvals = f.store.approvals();
        assert_eq!(approvals.len(), 3);
        let shares: Vec<Decimal> = approvals.iter().map(|a| a.received_liters).collect();
        assert_eq!(shares[0], dec!(95) * dec!(30) / dec!(100));
        assert_eq!(shares[1], dec!(95) * dec!(50) / dec!(100));
        assert_eq!(shares[2], dec!(95) * dec!(20) / dec!(100));
    }

    #[tokio::test]
    async fn batch_without_total_defaults_to_zero_variance() {
        let f = fixture();
        f.store.seed_collections(vec![
            collection("col-1", dec!(12)),
            collection("col-2", dec!(8)),
        ]);
        f.store.seed_rules(vec![negative_rule()]);

        let summary = f
            .service
            .batch_approve(batch_request(None))
            .await
            .expect("batch approve");

        assert_eq!(summary.total_variance, Decimal::ZERO);
        assert_eq!(summary.total_penalty_amount, Decimal::ZERO);
        assert!(f
            .store
            .approvals()
            .iter()
            .all(|a| a.variance_type == VarianceType::None));
    }

    #[tokio::test]
    async fn batch_reinvocation_only_touches_still_unapproved_rows() {
        let f = fixture();
        f.store.seed_collections(vec![
            collection("col-1", dec!(10)),
            collection("col-2", dec!(10)),
        ]);

        let first = f
            .service
            .batch_approve(batch_request(None))
            .await
            .expect("first batch");
        assert_eq!(first.approved_count, 2);

        // Simulate a late capture landing after the first batch.
        f.store.seed_collections(vec![collection("col-3", dec!(5))]);

        let second = f
            .service
            .batch_approve(batch_request(None))
            .await
            .expect("second batch");
        assert_eq!(second.approved_count, 1);
        assert_eq!(f.store.approvals().len(), 3);
    }

    #[tokio::test]
    async fn batch_rejects_a_negative_total() {
        let f = fixture();
        let err = f
            .service
            .batch_approve(batch_request(Some(dec!(-1))))
            .await
            .expect_err("negative total");
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn batch_on_an_empty_day_is_an_empty_summary() {
        let f = fixture();
        let summary = f
            .service
            .batch_approve(batch_request(Some(dec!(10))))
            .await
            .expect("empty day");
        assert_eq!(summary, BatchApprovalSummary::default());
    }

    #[tokio::test]
    async fn zero_liter_day_with_a_total_stays_defined() {
        let f = fixture();
        f.store.seed_collections(vec![
            collection("col-1", dec!(0)),
            collection("col-2", dec!(0)),
        ]);

        let summary = f
            .service
            .batch_approve(batch_request(Some(dec!(40))))
            .await
            .expect("zero-liter day");

        // Fallback: received = collected = 0, zero variance, no division.
        assert_eq!(summary.approved_count, 2);
        assert_eq!(summary.total_liters_received, Decimal::ZERO);
        assert_eq!(summary.total_variance, Decimal::ZERO);
    }
}
