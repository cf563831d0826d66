//! Batch schedulers for recurring entries and assessment billing
//!
//! Both services are invoked by an external trigger (on demand or on a
//! cron cadence) and make a single sequential pass over due work. Items
//! are independent: a failure on one is recorded and the rest continue.
//! Re-invoking either operation is always safe; the conditional updates in
//! the store port make generation at-most-once per period.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use core_kernel::{AssociationId, BatchOutcome, Currency, Money, PortError, UserId};
use domain_ledger::LedgerStore;

use crate::assessments::{compute_late_fee, Assessment};
use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::ports::BillingStore;
use crate::recurring::RecurringEntryTemplate;

/// Generates posted journal entries from due recurring templates
pub struct RecurringEntryScheduler {
    billing: Arc<dyn BillingStore>,
    ledger: Arc<dyn LedgerStore>,
    currency: Currency,
}

impl RecurringEntryScheduler {
    /// Creates a scheduler posting entries in the default currency
    pub fn new(billing: Arc<dyn BillingStore>, ledger: Arc<dyn LedgerStore>) -> Self {
        Self::with_currency(billing, ledger, Currency::USD)
    }

    /// Creates a scheduler posting entries in the given currency
    pub fn with_currency(
        billing: Arc<dyn BillingStore>,
        ledger: Arc<dyn LedgerStore>,
        currency: Currency,
    ) -> Self {
        Self {
            billing,
            ledger,
            currency,
        }
    }

    /// Processes every template due on or before `as_of`
    ///
    /// For each due template: validate the blueprint against the ledger,
    /// claim the period with a conditional next-run-date advance, then
    /// post the generated entry. A template that fails validation is not
    /// advanced, so it stays due and is retried on the next invocation.
    /// A lost advance race means another invocation owns the period; the
    /// template is skipped.
    pub async fn process_due_templates(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
        actor: UserId,
    ) -> Result<BatchOutcome, BillingError> {
        let templates = self.billing.list_due_templates(association_id, as_of).await?;
        let mut outcome = BatchOutcome::new();

        for template in &templates {
            match self.generate_for_template(template, actor).await {
                Ok(entry_number) => {
                    debug!(template = %template.id, %entry_number, "generated recurring entry");
                    outcome.record_success();
                }
                Err(error) => {
                    warn!(template = %template.id, %error, "skipped recurring template");
                    outcome.record_failure(template.id, &error);
                }
            }
        }

        info!(
            %association_id,
            %as_of,
            generated = outcome.processed,
            skipped = outcome.failures.len(),
            "recurring entry run complete"
        );
        Ok(outcome)
    }

    async fn generate_for_template(
        &self,
        template: &RecurringEntryTemplate,
        actor: UserId,
    ) -> Result<String, BillingError> {
        // Validate before touching the schedule: a template that cannot
        // generate must remain due for retry.
        for blueprint in &template.lines {
            self.ledger.get_account(blueprint.account_id).await?;
        }
        let entry = template.build_entry(actor, self.currency)?;

        // Claim the period. Losing the race means a concurrent invocation
        // already generated for it.
        let next = template.frequency.advance(template.next_run_date)?;
        let claimed = self
            .billing
            .advance_template(template.id, template.next_run_date, next)
            .await?;
        if !claimed {
            return Err(BillingError::Store(PortError::conflict(format!(
                "template {} already advanced past {}",
                template.id, template.next_run_date
            ))));
        }

        match self.ledger.insert_posted_entry(&entry).await {
            Ok(()) => Ok(entry.entry_number),
            Err(error) => {
                // Give the period back so the next invocation retries it.
                // If the rollback itself fails the period is lost: the
                // template sits advanced with no entry posted, and the
                // failure names the entry so an operator can repost it.
                if let Err(rollback_error) = self
                    .billing
                    .advance_template(template.id, next, template.next_run_date)
                    .await
                {
                    warn!(
                        template = %template.id,
                        entry_number = %entry.entry_number,
                        period = %template.next_run_date,
                        %rollback_error,
                        "failed to return claimed period after entry insert failure"
                    );
                    return Err(BillingError::Store(PortError::internal(format!(
                        "entry {} was not posted ({error}) and period {} could not be \
                         returned to template {} ({rollback_error}); repost manually",
                        entry.entry_number, template.next_run_date, template.id
                    ))));
                }
                Err(error.into())
            }
        }
    }
}

/// Generates per-property assessments and applies late fees
pub struct AssessmentBillingScheduler {
    store: Arc<dyn BillingStore>,
    config: BillingConfig,
}

impl AssessmentBillingScheduler {
    /// Creates a scheduler with default billing configuration
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self::with_config(store, BillingConfig::default())
    }

    /// Creates a scheduler with explicit configuration
    pub fn with_config(store: Arc<dyn BillingStore>, config: BillingConfig) -> Self {
        Self { store, config }
    }

    /// Generates one assessment per active property for every due schedule
    ///
    /// The due date is `as_of` plus the configured billing window. One
    /// property's insert failure is recorded and the rest of the fan-out
    /// continues; the schedule only advances after its fan-out completes.
    pub async fn generate_due_assessments(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
        actor: UserId,
    ) -> Result<BatchOutcome, BillingError> {
        let schedules = self.store.list_due_schedules(association_id, as_of).await?;
        let properties = self.store.list_properties(association_id).await?;
        let due_date = Assessment::standard_due_date(as_of, self.config.assessment_due_days);
        let mut outcome = BatchOutcome::new();

        for schedule in &schedules {
            for property_id in &properties {
                let assessment = Assessment::new(
                    association_id,
                    *property_id,
                    Some(schedule.id),
                    schedule.amount,
                    due_date,
                    actor,
                );
                match self.store.insert_assessment(&assessment).await {
                    Ok(()) => outcome.record_success(),
                    Err(error) => {
                        warn!(schedule = %schedule.id, property = %property_id, %error,
                            "failed to generate assessment");
                        outcome.record_failure(property_id, &error);
                    }
                }
            }

            let next = schedule.frequency.advance(schedule.next_generation_date)?;
            let advanced = self
                .store
                .advance_schedule(schedule.id, schedule.next_generation_date, next, Utc::now())
                .await?;
            if !advanced {
                warn!(schedule = %schedule.id, "schedule advanced by concurrent invocation");
                outcome.record_failure(schedule.id, "lost generation race");
            }
        }

        info!(
            %association_id,
            %as_of,
            generated = outcome.processed,
            skipped = outcome.failures.len(),
            "assessment generation complete"
        );
        Ok(outcome)
    }

    /// Applies the one-time late fee to every eligible overdue assessment
    ///
    /// Eligible: unpaid, past due by more than the grace period, no fee
    /// yet. The fee is `min(amount * rate, cap)` and is persisted through
    /// a set-once conditional update, so re-running is a no-op for
    /// already-fee'd assessments.
    pub async fn apply_late_fees(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
    ) -> Result<BatchOutcome, BillingError> {
        let assessments = self
            .store
            .list_unpaid_assessments(association_id, as_of)
            .await?;
        let mut outcome = BatchOutcome::new();

        for assessment in &assessments {
            if !assessment.late_fee_pending(as_of, self.config.grace_period_days) {
                continue;
            }

            let cap = Money::new(self.config.late_fee_cap, assessment.amount.currency());
            let fee = compute_late_fee(assessment.amount, self.config.late_fee_rate, cap);

            match self.store.set_late_fee(assessment.id, fee).await {
                Ok(true) => {
                    debug!(assessment = %assessment.id, %fee, "applied late fee");
                    outcome.record_success();
                }
                // Fee set by a concurrent run; nothing to do.
                Ok(false) => {}
                Err(error) => {
                    warn!(assessment = %assessment.id, %error, "failed to apply late fee");
                    outcome.record_failure(assessment.id, &error);
                }
            }
        }

        info!(
            %association_id,
            %as_of,
            applied = outcome.processed,
            skipped = outcome.failures.len(),
            "late fee run complete"
        );
        Ok(outcome)
    }
}
