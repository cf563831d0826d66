//! Billing store port

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use core_kernel::{
    AssessmentId, AssessmentScheduleId, AssociationId, DomainPort, Money, PortError, PropertyId,
    TemplateId,
};

use crate::assessments::{Assessment, AssessmentSchedule};
use crate::recurring::RecurringEntryTemplate;

/// Port for templates, schedules, and assessments
///
/// The conditional-update methods close the concurrency hazards of
/// overlapping scheduler invocations: advancing a template or schedule
/// succeeds only if its date still equals the value the caller read, and
/// a late fee is set only if none exists yet.
#[async_trait]
pub trait BillingStore: DomainPort {
    /// Lists active templates due on or before `as_of`
    async fn list_due_templates(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
    ) -> Result<Vec<RecurringEntryTemplate>, PortError>;

    /// Conditionally advances a template's next-run date
    ///
    /// Returns `false` if `next_run_date` no longer equals `expected`
    /// (a concurrent invocation already claimed the period).
    async fn advance_template(
        &self,
        id: TemplateId,
        expected: NaiveDate,
        next: NaiveDate,
    ) -> Result<bool, PortError>;

    /// Lists active assessment schedules due on or before `as_of`
    async fn list_due_schedules(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
    ) -> Result<Vec<AssessmentSchedule>, PortError>;

    /// Conditionally advances a schedule's next-generation date and stamps
    /// the generation time
    async fn advance_schedule(
        &self,
        id: AssessmentScheduleId,
        expected: NaiveDate,
        next: NaiveDate,
        generated_at: DateTime<Utc>,
    ) -> Result<bool, PortError>;

    /// Lists the active properties of an association
    async fn list_properties(
        &self,
        association_id: AssociationId,
    ) -> Result<Vec<PropertyId>, PortError>;

    /// Persists a newly generated assessment
    async fn insert_assessment(&self, assessment: &Assessment) -> Result<(), PortError>;

    /// Lists unpaid assessments whose due date is on or before `due_on_or_before`
    async fn list_unpaid_assessments(
        &self,
        association_id: AssociationId,
        due_on_or_before: NaiveDate,
    ) -> Result<Vec<Assessment>, PortError>;

    /// Sets a late fee if none has been applied yet
    ///
    /// Returns `false` when a fee already exists; the fee is never
    /// recomputed or re-applied.
    async fn set_late_fee(&self, id: AssessmentId, fee: Money) -> Result<bool, PortError>;
}
