//! Recurring journal entry templates
//!
//! A template is an association-scoped blueprint for a balanced journal
//! entry that fires on a cadence. Each successful generation produces
//! exactly one posted entry and advances the template's next-run date by
//! one period.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AssociationId, Currency, Frequency, GlAccountId, Money, TemplateId, UserId};
use domain_ledger::{auto_entry_number, EntrySource, JournalEntry, JournalLineItem};

use crate::error::BillingError;

/// Blueprint for one line item of a generated entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineBlueprint {
    /// Account to post against
    pub account_id: GlAccountId,
    /// Fixed debit amount (zero for credit lines)
    pub debit: Money,
    /// Fixed credit amount (zero for debit lines)
    pub credit: Money,
    /// Line description carried onto the generated entry
    pub description: Option<String>,
}

impl LineBlueprint {
    /// Creates a debit blueprint
    pub fn debit(account_id: GlAccountId, amount: Money) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Money::zero(amount.currency()),
            description: None,
        }
    }

    /// Creates a credit blueprint
    pub fn credit(account_id: GlAccountId, amount: Money) -> Self {
        Self {
            account_id,
            debit: Money::zero(amount.currency()),
            credit: amount,
            description: None,
        }
    }

    /// Adds a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An association-scoped recurring entry template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringEntryTemplate {
    /// Unique identifier
    pub id: TemplateId,
    /// Owning association
    pub association_id: AssociationId,
    /// Template name, used as the generated entry's description
    pub name: String,
    /// Generation cadence
    pub frequency: Frequency,
    /// Next period the template is due for
    pub next_run_date: NaiveDate,
    /// Whether the template generates entries
    pub is_active: bool,
    /// Line item blueprints
    pub lines: Vec<LineBlueprint>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl RecurringEntryTemplate {
    /// Creates a new active template
    pub fn new(
        association_id: AssociationId,
        name: impl Into<String>,
        frequency: Frequency,
        next_run_date: NaiveDate,
        lines: Vec<LineBlueprint>,
    ) -> Self {
        Self {
            id: TemplateId::new_v7(),
            association_id,
            name: name.into(),
            frequency,
            next_run_date,
            is_active: true,
            lines,
            created_at: Utc::now(),
        }
    }

    /// Returns true if the template should fire on or before `as_of`
    pub fn is_due(&self, as_of: NaiveDate) -> bool {
        self.is_active && self.next_run_date <= as_of
    }

    /// The deterministic entry number for the template's current period
    pub fn entry_number(&self) -> String {
        auto_entry_number(self.next_run_date, &self.id.short())
    }

    /// Builds and posts the journal entry for the current period
    ///
    /// The entry is dated at the period being posted (`next_run_date`),
    /// sourced as `Recurring`, and validated for balance before it is
    /// returned; an unbalanced blueprint never yields an entry.
    pub fn build_entry(&self, actor: UserId, currency: Currency) -> Result<JournalEntry, BillingError> {
        if !self.is_active {
            return Err(BillingError::InactiveTemplate(self.name.clone()));
        }

        let mut entry = JournalEntry::new(
            self.association_id,
            self.entry_number(),
            self.next_run_date,
            self.name.clone(),
            EntrySource::Recurring,
            actor,
            currency,
        );

        for blueprint in &self.lines {
            let mut line = JournalLineItem::debit(blueprint.account_id, blueprint.debit);
            line.credit = blueprint.credit;
            line.description = blueprint.description.clone();
            entry = entry.with_line(line);
        }

        entry
            .post()
            .map_err(|_| BillingError::UnbalancedTemplate(self.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn template(lines: Vec<LineBlueprint>) -> RecurringEntryTemplate {
        RecurringEntryTemplate::new(
            AssociationId::new(),
            "Monthly landscaping accrual",
            Frequency::Monthly,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            lines,
        )
    }

    #[test]
    fn test_due_evaluation() {
        let t = template(vec![]);
        assert!(t.is_due(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(t.is_due(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
        assert!(!t.is_due(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));

        let mut inactive = template(vec![]);
        inactive.is_active = false;
        assert!(!inactive.is_due(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
    }

    #[test]
    fn test_build_entry_balanced() {
        let expense = GlAccountId::new();
        let payable = GlAccountId::new();
        let t = template(vec![
            LineBlueprint::debit(expense, usd(dec!(500))).with_description("Landscaping"),
            LineBlueprint::credit(payable, usd(dec!(500))),
        ]);

        let entry = t.build_entry(UserId::new(), Currency::USD).unwrap();
        assert_eq!(entry.entry_date, t.next_run_date);
        assert_eq!(entry.source, EntrySource::Recurring);
        assert_eq!(entry.total_amount, usd(dec!(1000)));
        assert!(entry.entry_number.starts_with("AUTO-202501-"));
    }

    #[test]
    fn test_build_entry_unbalanced_rejected() {
        let t = template(vec![
            LineBlueprint::debit(GlAccountId::new(), usd(dec!(500))),
            LineBlueprint::credit(GlAccountId::new(), usd(dec!(300))),
        ]);
        assert!(matches!(
            t.build_entry(UserId::new(), Currency::USD),
            Err(BillingError::UnbalancedTemplate(_))
        ));
    }

    #[test]
    fn test_entry_number_stable_per_period() {
        let t = template(vec![]);
        assert_eq!(t.entry_number(), t.entry_number());
    }
}
