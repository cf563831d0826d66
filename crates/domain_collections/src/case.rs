//! Collection cases and their state machine

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AssociationId, CaseId, Money, PropertyId, ResidentId, UserId};

use crate::error::CollectionsError;

/// Escalation stage of a collection case
///
/// Active stages are ordered `Notice < Demand < Legal`; `Closed` marks a
/// case whose workflow has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStage {
    Notice,
    Demand,
    Legal,
    Closed,
}

impl CollectionStage {
    /// Position in the escalation ordering; `Closed` outranks every
    /// active stage
    pub fn rank(&self) -> u8 {
        match self {
            CollectionStage::Notice => 0,
            CollectionStage::Demand => 1,
            CollectionStage::Legal => 2,
            CollectionStage::Closed => 3,
        }
    }

    /// Days until the next action is expected at this stage
    pub fn lead_time_days(&self) -> i64 {
        match self {
            CollectionStage::Notice => 14,
            CollectionStage::Demand => 10,
            CollectionStage::Legal => 30,
            CollectionStage::Closed => 0,
        }
    }
}

/// Overall case status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    Settled,
    Closed,
}

impl CaseStatus {
    /// Returns true if the case can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Settled | CaseStatus::Closed)
    }
}

/// One delinquent-account workflow instance
///
/// At most one open case exists per property; the store enforces the
/// uniqueness constraint at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionCase {
    /// Unique identifier
    pub id: CaseId,
    /// Unique, date-sequenced case number (`COLL-<YYYYMM>-<seq>`)
    pub case_number: String,
    /// Owning association
    pub association_id: AssociationId,
    /// Delinquent property
    pub property_id: PropertyId,
    /// Responsible resident, when known
    pub resident_id: Option<ResidentId>,
    /// Total overdue balance driving the case
    pub total_amount_owed: Money,
    /// Current escalation stage
    pub collection_stage: CollectionStage,
    /// Overall status
    pub case_status: CaseStatus,
    /// When the next collection action is expected
    pub next_action_date: NaiveDate,
    /// When the case last escalated
    pub escalation_date: Option<NaiveDate>,
    /// Settlement amount, for settled cases
    pub settlement_amount: Option<Money>,
    /// Free-form notes (settlement terms, closure reason)
    pub notes: Option<String>,
    /// Acting user that opened the case
    pub created_by: UserId,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl CollectionCase {
    /// Opens a new case at the given stage
    pub fn open(
        case_number: impl Into<String>,
        association_id: AssociationId,
        property_id: PropertyId,
        resident_id: Option<ResidentId>,
        total_amount_owed: Money,
        stage: CollectionStage,
        as_of: NaiveDate,
        created_by: UserId,
    ) -> Self {
        Self {
            id: CaseId::new_v7(),
            case_number: case_number.into(),
            association_id,
            property_id,
            resident_id,
            total_amount_owed,
            collection_stage: stage,
            case_status: CaseStatus::Open,
            next_action_date: as_of + Duration::days(stage.lead_time_days()),
            escalation_date: None,
            settlement_amount: None,
            notes: None,
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Escalates the case to a strictly later stage
    ///
    /// Allowed targets: an active stage later in the notice -> demand ->
    /// legal ordering, or `Closed` from any stage. Stamps the escalation
    /// date and recomputes the next action date from the target stage's
    /// lead time.
    pub fn escalate(
        &mut self,
        target: CollectionStage,
        as_of: NaiveDate,
    ) -> Result<(), CollectionsError> {
        if self.case_status.is_terminal() {
            return Err(CollectionsError::CaseTerminal(self.case_number.clone()));
        }
        if target == CollectionStage::Closed {
            self.close("escalated to closed", as_of);
            return Ok(());
        }
        if target.rank() <= self.collection_stage.rank() {
            return Err(CollectionsError::InvalidEscalation {
                from: self.collection_stage,
                to: target,
            });
        }

        self.collection_stage = target;
        self.escalation_date = Some(as_of);
        self.next_action_date = as_of + Duration::days(target.lead_time_days());
        Ok(())
    }

    /// Settles the case, recording the settlement amount
    pub fn settle(
        &mut self,
        amount: Money,
        notes: Option<String>,
    ) -> Result<(), CollectionsError> {
        if self.case_status.is_terminal() {
            return Err(CollectionsError::CaseTerminal(self.case_number.clone()));
        }
        self.settlement_amount = Some(amount);
        self.notes = notes;
        self.case_status = CaseStatus::Settled;
        Ok(())
    }

    /// Closes the case
    pub fn close(&mut self, reason: impl Into<String>, as_of: NaiveDate) {
        self.case_status = CaseStatus::Closed;
        self.collection_stage = CollectionStage::Closed;
        self.notes = Some(reason.into());
        self.escalation_date = Some(as_of);
    }
}

/// Formats a case number for a period and sequence
///
/// Format: `COLL-<YYYYMM>-<4-digit sequence>`, unique and monotonically
/// increasing within the period.
pub fn format_case_number(period: NaiveDate, sequence: u32) -> String {
    format!("COLL-{}{:02}-{:04}", period.year(), period.month(), sequence)
}
