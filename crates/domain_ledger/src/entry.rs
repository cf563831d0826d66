//! Journal entries and line items
//!
//! An entry is built in draft, validated, and posted. Posting is the only
//! path to a stored entry; an entry that fails to balance is never persisted.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    AssociationId, BankTransactionId, GlAccountId, JournalEntryId, LineItemId, Money, UserId,
    BALANCE_TOLERANCE,
};

use crate::error::LedgerError;

/// Lifecycle status of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Entry is being assembled and may still change
    Draft,
    /// Entry is validated and immutable
    Posted,
}

/// What produced a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Entered by a person
    Manual,
    /// Generated by the recurring entry scheduler
    Recurring,
    /// Posted to correct a reconciliation discrepancy
    ReconciliationAdjustment,
}

/// One debit or credit row within a journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLineItem {
    /// Unique line identifier
    pub id: LineItemId,
    /// Account posted against
    pub account_id: GlAccountId,
    /// Debit amount (zero for credit lines)
    pub debit: Money,
    /// Credit amount (zero for debit lines)
    pub credit: Money,
    /// Optional line description
    pub description: Option<String>,
    /// Whether bank reconciliation has matched this line
    pub is_matched: bool,
    /// The bank transaction this line is matched to, if any
    pub matched_bank_transaction_id: Option<BankTransactionId>,
}

impl JournalLineItem {
    /// Creates a debit line
    pub fn debit(account_id: GlAccountId, amount: Money) -> Self {
        Self {
            id: LineItemId::new_v7(),
            account_id,
            debit: amount,
            credit: Money::zero(amount.currency()),
            description: None,
            is_matched: false,
            matched_bank_transaction_id: None,
        }
    }

    /// Creates a credit line
    pub fn credit(account_id: GlAccountId, amount: Money) -> Self {
        Self {
            id: LineItemId::new_v7(),
            account_id,
            debit: Money::zero(amount.currency()),
            credit: amount,
            description: None,
            is_matched: false,
            matched_bank_transaction_id: None,
        }
    }

    /// Adds a description to the line
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The line's magnitude: the larger of its debit and credit
    pub fn amount(&self) -> Money {
        if self.debit.amount() >= self.credit.amount() {
            self.debit
        } else {
            self.credit
        }
    }
}

/// A dated, described posting event composed of line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier
    pub id: JournalEntryId,
    /// Owning association
    pub association_id: AssociationId,
    /// Unique human-readable entry number
    pub entry_number: String,
    /// Business date of the posting
    pub entry_date: NaiveDate,
    /// Description
    pub description: String,
    /// Draft or posted
    pub status: EntryStatus,
    /// What produced this entry
    pub source: EntrySource,
    /// Ordered line items
    pub line_items: Vec<JournalLineItem>,
    /// Sum of the larger of each line's debit/credit
    pub total_amount: Money,
    /// Acting user, supplied by the identity collaborator
    pub created_by: UserId,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Creates a new draft entry with no line items
    pub fn new(
        association_id: AssociationId,
        entry_number: impl Into<String>,
        entry_date: NaiveDate,
        description: impl Into<String>,
        source: EntrySource,
        created_by: UserId,
        currency: core_kernel::Currency,
    ) -> Self {
        Self {
            id: JournalEntryId::new_v7(),
            association_id,
            entry_number: entry_number.into(),
            entry_date,
            description: description.into(),
            status: EntryStatus::Draft,
            source,
            line_items: Vec::new(),
            total_amount: Money::zero(currency),
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Adds a debit line
    pub fn debit(mut self, account_id: GlAccountId, amount: Money) -> Self {
        self.line_items.push(JournalLineItem::debit(account_id, amount));
        self
    }

    /// Adds a credit line
    pub fn credit(mut self, account_id: GlAccountId, amount: Money) -> Self {
        self.line_items.push(JournalLineItem::credit(account_id, amount));
        self
    }

    /// Adds an already-constructed line
    pub fn with_line(mut self, line: JournalLineItem) -> Self {
        self.line_items.push(line);
        self
    }

    /// Sums the entry's debits and credits
    pub fn totals(&self) -> Result<(Money, Money), LedgerError> {
        let currency = self.total_amount.currency();
        let mut debits = Money::zero(currency);
        let mut credits = Money::zero(currency);
        for line in &self.line_items {
            debits = debits.checked_add(&line.debit)?;
            credits = credits.checked_add(&line.credit)?;
        }
        Ok((debits, credits))
    }

    /// Returns true if debits equal credits within the balance tolerance
    pub fn is_balanced(&self) -> bool {
        match self.totals() {
            Ok((debits, credits)) => debits.approx_eq(&credits, BALANCE_TOLERANCE),
            Err(_) => false,
        }
    }

    /// Validates the entry and marks it posted
    ///
    /// Computes `total_amount` as the sum of the larger of each line's
    /// debit/credit. An entry that fails validation stays a draft.
    pub fn post(mut self) -> Result<Self, LedgerError> {
        if self.status == EntryStatus::Posted {
            return Err(LedgerError::AlreadyPosted(self.entry_number));
        }
        if self.line_items.is_empty() {
            return Err(LedgerError::EmptyEntry(self.entry_number));
        }

        let (debits, credits) = self.totals()?;
        if !debits.approx_eq(&credits, BALANCE_TOLERANCE) {
            return Err(LedgerError::Unbalanced {
                debits: debits.amount(),
                credits: credits.amount(),
            });
        }

        let mut total = Money::zero(self.total_amount.currency());
        for line in &self.line_items {
            total = total.checked_add(&line.amount())?;
        }

        self.total_amount = total;
        self.status = EntryStatus::Posted;
        Ok(self)
    }

    /// Builds a posted entry that offsets this one
    ///
    /// Each line's debit and credit are swapped. Only posted entries can be
    /// reversed; a draft is simply discarded.
    pub fn reversing_entry(
        &self,
        entry_number: impl Into<String>,
        entry_date: NaiveDate,
        reason: &str,
        created_by: UserId,
    ) -> Result<Self, LedgerError> {
        if self.status != EntryStatus::Posted {
            return Err(LedgerError::NotPosted(self.entry_number.clone()));
        }

        let mut reversal = JournalEntry::new(
            self.association_id,
            entry_number,
            entry_date,
            format!("Reversal of {}: {}", self.entry_number, reason),
            EntrySource::ReconciliationAdjustment,
            created_by,
            self.total_amount.currency(),
        );

        for line in &self.line_items {
            let mut swapped = JournalLineItem::debit(line.account_id, line.credit);
            swapped.credit = line.debit;
            swapped.description = Some(format!("Reversal: {}", reason));
            reversal.line_items.push(swapped);
        }

        reversal.post()
    }
}

/// Builds a generated-entry number for a period
///
/// Format: `AUTO-<YYYYMM>-<suffix>`. The suffix is deterministic per
/// source (e.g., the short form of a template id), so the number is stable
/// for a given (source, period) and cannot collide across sources.
pub fn auto_entry_number(period: NaiveDate, suffix: &str) -> String {
    format!("AUTO-{}{:02}-{}", period.year(), period.month(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn draft() -> JournalEntry {
        JournalEntry::new(
            AssociationId::new(),
            "AUTO-202501-deadbeef",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            "Monthly dues accrual",
            EntrySource::Recurring,
            UserId::new(),
            Currency::USD,
        )
    }

    #[test]
    fn test_balanced_entry_posts() {
        let a = GlAccountId::new();
        let b = GlAccountId::new();
        let entry = draft()
            .debit(a, usd(dec!(500)))
            .credit(b, usd(dec!(500)))
            .post()
            .unwrap();

        assert_eq!(entry.status, EntryStatus::Posted);
        assert_eq!(entry.total_amount, usd(dec!(1000)));
    }

    #[test]
    fn test_unbalanced_entry_rejected() {
        let entry = draft()
            .debit(GlAccountId::new(), usd(dec!(500)))
            .credit(GlAccountId::new(), usd(dec!(400)));

        assert!(matches!(
            entry.post(),
            Err(LedgerError::Unbalanced { .. })
        ));
    }

    #[test]
    fn test_sub_cent_residue_tolerated() {
        let entry = draft()
            .debit(GlAccountId::new(), usd(dec!(100.00)))
            .credit(GlAccountId::new(), usd(dec!(99.99)))
            .post()
            .unwrap();
        assert_eq!(entry.status, EntryStatus::Posted);
    }

    #[test]
    fn test_empty_entry_rejected() {
        assert!(matches!(draft().post(), Err(LedgerError::EmptyEntry(_))));
    }

    #[test]
    fn test_reversal_swaps_lines() {
        let a = GlAccountId::new();
        let b = GlAccountId::new();
        let entry = draft()
            .debit(a, usd(dec!(250)))
            .credit(b, usd(dec!(250)))
            .post()
            .unwrap();

        let reversal = entry
            .reversing_entry(
                "AUTO-202502-deadbeef",
                NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
                "duplicate posting",
                UserId::new(),
            )
            .unwrap();

        assert_eq!(reversal.status, EntryStatus::Posted);
        assert_eq!(reversal.line_items[0].account_id, a);
        assert_eq!(reversal.line_items[0].credit, usd(dec!(250)));
        assert_eq!(reversal.line_items[1].debit, usd(dec!(250)));
        assert_eq!(reversal.source, EntrySource::ReconciliationAdjustment);
    }

    #[test]
    fn test_draft_cannot_be_reversed() {
        let entry = draft().debit(GlAccountId::new(), usd(dec!(1)));
        assert!(entry
            .reversing_entry(
                "AUTO-202501-ffffffff",
                NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                "n/a",
                UserId::new()
            )
            .is_err());
    }

    #[test]
    fn test_auto_entry_number_format() {
        let number = auto_entry_number(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(), "1a2b3c4d");
        assert_eq!(number, "AUTO-202503-1a2b3c4d");
    }
}
