//! Collections store port

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{AssociationId, CaseId, DomainPort, Money, PortError, PropertyId, ResidentId};

use crate::case::{CollectionCase, CollectionStage};

/// Aggregated overdue receivables for one property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyReceivables {
    /// The delinquent property
    pub property_id: PropertyId,
    /// Responsible resident, when known
    pub resident_id: Option<ResidentId>,
    /// Sum of open, overdue receivable amounts
    pub total_owed: Money,
    /// Due date of the oldest open receivable
    pub oldest_due_date: NaiveDate,
}

/// Port for collection cases and receivable aging
#[async_trait]
pub trait CollectionsStore: DomainPort {
    /// Aggregates open, overdue receivables per property as of a date
    async fn list_overdue_receivables(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
    ) -> Result<Vec<PropertyReceivables>, PortError>;

    /// Finds the open case for a property, if one exists
    async fn find_open_case(
        &self,
        property_id: PropertyId,
    ) -> Result<Option<CollectionCase>, PortError>;

    /// Allocates the next case-number sequence for a period
    ///
    /// Sequences are unique and monotonically increasing within one
    /// (association, year-month).
    async fn next_case_sequence(
        &self,
        association_id: AssociationId,
        period: NaiveDate,
    ) -> Result<u32, PortError>;

    /// Persists a new case
    ///
    /// Enforces the one-open-case-per-property uniqueness constraint:
    /// a concurrent creation for the same property fails with `Conflict`.
    async fn create_case(&self, case: &CollectionCase) -> Result<(), PortError>;

    /// Conditionally updates an open case's owed amount and stage
    ///
    /// Returns `false` if the case's stage no longer equals
    /// `expected_stage` (a concurrent invocation escalated it first).
    async fn update_case_if_stage(
        &self,
        id: CaseId,
        expected_stage: CollectionStage,
        updated: &CollectionCase,
    ) -> Result<bool, PortError>;

    /// Persists a case after a single-entity transition
    /// (escalate, settle, close)
    async fn save_case(&self, case: &CollectionCase) -> Result<(), PortError>;

    /// Fetches one case
    async fn get_case(&self, id: CaseId) -> Result<CollectionCase, PortError>;
}
