//! Automatic collections processing
//!
//! Reads receivable aging per property and creates or escalates cases by
//! policy. The pass is a single sequential batch; each property is
//! independent and a failure on one is recorded while the rest continue.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::{debug, info, warn};

use core_kernel::{days_between, AssociationId, BatchOutcome, CaseId, Money, PortError, UserId};

use crate::case::{format_case_number, CollectionCase, CollectionStage};
use crate::error::CollectionsError;
use crate::ports::{CollectionsStore, PropertyReceivables};

/// Thresholds driving automatic case creation and escalation
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionsPolicy {
    /// Days overdue that force the legal stage
    pub legal_days: i64,
    /// Owed amount that forces the legal stage
    pub legal_amount: Decimal,
    /// Days overdue that force at least the demand stage
    pub demand_days: i64,
    /// Minimum owed amount before a case is opened
    pub min_case_amount: Decimal,
    /// Minimum days overdue before a case is opened
    pub min_case_days: i64,
}

impl Default for CollectionsPolicy {
    fn default() -> Self {
        Self {
            legal_days: 90,
            legal_amount: dec!(5000),
            demand_days: 60,
            min_case_amount: dec!(100),
            min_case_days: 30,
        }
    }
}

impl CollectionsPolicy {
    /// Target stage for a property's aging profile
    pub fn target_stage(&self, days_overdue: i64, total_owed: Money) -> CollectionStage {
        if days_overdue >= self.legal_days || total_owed.amount() >= self.legal_amount {
            CollectionStage::Legal
        } else if days_overdue >= self.demand_days {
            CollectionStage::Demand
        } else {
            CollectionStage::Notice
        }
    }

    /// Whether a new case should be opened for this aging profile
    pub fn warrants_case(&self, days_overdue: i64, total_owed: Money) -> bool {
        total_owed.amount() >= self.min_case_amount && days_overdue >= self.min_case_days
    }
}

/// Creates and escalates collection cases from receivable aging
pub struct CollectionsManager {
    store: Arc<dyn CollectionsStore>,
    policy: CollectionsPolicy,
}

impl CollectionsManager {
    /// Creates a manager with the default policy
    pub fn new(store: Arc<dyn CollectionsStore>) -> Self {
        Self::with_policy(store, CollectionsPolicy::default())
    }

    /// Creates a manager with an explicit policy
    pub fn with_policy(store: Arc<dyn CollectionsStore>, policy: CollectionsPolicy) -> Self {
        Self { store, policy }
    }

    /// Processes every property with open, overdue receivables
    ///
    /// Existing open cases are refreshed (owed amount) and escalated when
    /// policy demands a later stage; this path never de-escalates. New
    /// cases are opened at the computed stage once the aging profile
    /// crosses the policy minimums. A lost creation race (another
    /// invocation opened the property's case first) is recorded and the
    /// batch continues.
    pub async fn process_automatic_collections(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
        actor: UserId,
    ) -> Result<BatchOutcome, CollectionsError> {
        let receivables = self
            .store
            .list_overdue_receivables(association_id, as_of)
            .await?;
        let mut outcome = BatchOutcome::new();

        for aging in &receivables {
            match self.process_property(association_id, aging, as_of, actor).await {
                Ok(Some(case_number)) => {
                    debug!(property = %aging.property_id, %case_number, "collections case updated");
                    outcome.record_success();
                }
                // Below policy minimums; nothing to do.
                Ok(None) => {}
                Err(error) => {
                    warn!(property = %aging.property_id, %error, "collections processing failed");
                    outcome.record_failure(aging.property_id, &error);
                }
            }
        }

        info!(
            %association_id,
            %as_of,
            processed = outcome.processed,
            skipped = outcome.failures.len(),
            "automatic collections run complete"
        );
        Ok(outcome)
    }

    /// Escalates a single case to a target stage
    pub async fn escalate(
        &self,
        case_id: CaseId,
        target: CollectionStage,
        as_of: NaiveDate,
    ) -> Result<CollectionCase, CollectionsError> {
        let mut case = self.store.get_case(case_id).await?;
        case.escalate(target, as_of)?;
        self.store.save_case(&case).await?;
        info!(case = %case.case_number, stage = ?target, "case escalated");
        Ok(case)
    }

    /// Settles a single case
    pub async fn settle(
        &self,
        case_id: CaseId,
        amount: Money,
        notes: Option<String>,
    ) -> Result<CollectionCase, CollectionsError> {
        let mut case = self.store.get_case(case_id).await?;
        case.settle(amount, notes)?;
        self.store.save_case(&case).await?;
        info!(case = %case.case_number, %amount, "case settled");
        Ok(case)
    }

    /// Closes a single case
    pub async fn close(
        &self,
        case_id: CaseId,
        reason: impl Into<String>,
        as_of: NaiveDate,
    ) -> Result<CollectionCase, CollectionsError> {
        let mut case = self.store.get_case(case_id).await?;
        if case.case_status.is_terminal() {
            return Err(CollectionsError::CaseTerminal(case.case_number));
        }
        case.close(reason, as_of);
        self.store.save_case(&case).await?;
        info!(case = %case.case_number, "case closed");
        Ok(case)
    }

    async fn process_property(
        &self,
        association_id: AssociationId,
        aging: &PropertyReceivables,
        as_of: NaiveDate,
        actor: UserId,
    ) -> Result<Option<String>, CollectionsError> {
        let days_overdue = days_between(aging.oldest_due_date, as_of);
        let target = self.policy.target_stage(days_overdue, aging.total_owed);

        if let Some(mut case) = self.store.find_open_case(aging.property_id).await? {
            let current_stage = case.collection_stage;
            case.total_amount_owed = aging.total_owed;
            if target.rank() > current_stage.rank() {
                case.escalate(target, as_of)?;
            }
            // Stage check makes the read-modify-write safe against a
            // concurrent escalation; a lost race leaves the case for the
            // next invocation.
            let updated = self
                .store
                .update_case_if_stage(case.id, current_stage, &case)
                .await?;
            if !updated {
                return Err(CollectionsError::Store(PortError::conflict(format!(
                    "case {} escalated concurrently",
                    case.case_number
                ))));
            }
            return Ok(Some(case.case_number));
        }

        if !self.policy.warrants_case(days_overdue, aging.total_owed) {
            return Ok(None);
        }

        let sequence = self.store.next_case_sequence(association_id, as_of).await?;
        let case = CollectionCase::open(
            format_case_number(as_of, sequence),
            association_id,
            aging.property_id,
            aging.resident_id,
            aging.total_owed,
            target,
            as_of,
            actor,
        );
        self.store.create_case(&case).await?;
        Ok(Some(case.case_number))
    }
}
