//! Bank transactions, reconciliation sessions, and reconciliation items

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    AssociationId, BankTransactionId, GlAccountId, LineItemId, Money, ReconciliationId,
    ReconciliationItemId, UserId,
};

/// Lifecycle status of a reconciliation session
///
/// Transitions are forward-only and never skip a state; `Approved` is
/// terminal. Corrections after approval are made by posting a
/// reconciliation-adjustment entry, never by editing the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    InProgress,
    Reconciled,
    Approved,
}

impl ReconciliationStatus {
    /// Returns true if moving to `next` is a legal transition
    pub fn can_transition_to(&self, next: ReconciliationStatus) -> bool {
        matches!(
            (self, next),
            (ReconciliationStatus::InProgress, ReconciliationStatus::Reconciled)
                | (ReconciliationStatus::Reconciled, ReconciliationStatus::Approved)
        )
    }

    /// Returns true if the session can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReconciliationStatus::Approved)
    }
}

/// An externally reported cash movement on a bank account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    /// Unique identifier
    pub id: BankTransactionId,
    /// Owning association
    pub association_id: AssociationId,
    /// The bank's GL account
    pub bank_account_id: GlAccountId,
    /// Date reported by the bank
    pub transaction_date: NaiveDate,
    /// Signed amount: positive for deposits, negative for withdrawals
    pub amount: Money,
    /// Bank-provided description
    pub description: String,
    /// Whether the transaction has cleared the statement
    pub is_cleared: bool,
    /// Whether a book-side line has been matched to this transaction
    pub is_matched: bool,
    /// The matched book-side line, if any
    pub matched_line_item_id: Option<LineItemId>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl BankTransaction {
    /// Creates a new uncleared, unmatched transaction
    pub fn new(
        association_id: AssociationId,
        bank_account_id: GlAccountId,
        transaction_date: NaiveDate,
        amount: Money,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: BankTransactionId::new_v7(),
            association_id,
            bank_account_id,
            transaction_date,
            amount,
            description: description.into(),
            is_cleared: false,
            is_matched: false,
            matched_line_item_id: None,
            created_at: Utc::now(),
        }
    }

    /// Marks the transaction cleared
    pub fn cleared(mut self) -> Self {
        self.is_cleared = true;
        self
    }
}

/// A periodic reconciliation session for one bank account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankReconciliation {
    /// Unique identifier
    pub id: ReconciliationId,
    /// Owning association
    pub association_id: AssociationId,
    /// The bank's GL account
    pub bank_account_id: GlAccountId,
    /// Statement date the session reconciles to
    pub statement_date: NaiveDate,
    /// Book balance at the start of the statement period
    pub beginning_balance: Money,
    /// Ending balance reported by the bank
    pub statement_balance: Money,
    /// Beginning balance plus cleared transaction amounts
    pub reconciled_balance: Money,
    /// Statement balance minus reconciled balance
    pub difference: Money,
    /// Lifecycle status
    pub status: ReconciliationStatus,
    /// User that performed the reconciliation
    pub reconciled_by: Option<UserId>,
    /// User that approved the session
    pub approved_by: Option<UserId>,
    /// When the session was approved
    pub approved_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl BankReconciliation {
    /// Opens a new in-progress session
    ///
    /// The reconciled balance starts at the beginning balance; the
    /// difference starts at the full statement balance gap.
    pub fn new(
        association_id: AssociationId,
        bank_account_id: GlAccountId,
        statement_date: NaiveDate,
        beginning_balance: Money,
        statement_balance: Money,
    ) -> Self {
        let difference = statement_balance - beginning_balance;
        Self {
            id: ReconciliationId::new_v7(),
            association_id,
            bank_account_id,
            statement_date,
            beginning_balance,
            statement_balance,
            reconciled_balance: beginning_balance,
            difference,
            status: ReconciliationStatus::InProgress,
            reconciled_by: None,
            approved_by: None,
            approved_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Match state of one reconciliation line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Matched,
    Unmatched,
    Cleared,
}

/// One line within a reconciliation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankReconciliationItem {
    /// Unique identifier
    pub id: ReconciliationItemId,
    /// Owning session
    pub reconciliation_id: ReconciliationId,
    /// Bank-side record
    pub bank_transaction_id: BankTransactionId,
    /// Book-side record, when matched
    pub line_item_id: Option<LineItemId>,
    /// Match state
    pub status: ItemStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl BankReconciliationItem {
    /// Records a successful match between both sides
    pub fn matched(
        reconciliation_id: ReconciliationId,
        bank_transaction_id: BankTransactionId,
        line_item_id: LineItemId,
    ) -> Self {
        Self {
            id: ReconciliationItemId::new_v7(),
            reconciliation_id,
            bank_transaction_id,
            line_item_id: Some(line_item_id),
            status: ItemStatus::Matched,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_only_transitions() {
        use ReconciliationStatus::*;
        assert!(InProgress.can_transition_to(Reconciled));
        assert!(Reconciled.can_transition_to(Approved));
        // No skipping, no regression, no self-loop
        assert!(!InProgress.can_transition_to(Approved));
        assert!(!Reconciled.can_transition_to(InProgress));
        assert!(!Approved.can_transition_to(Reconciled));
        assert!(!Approved.can_transition_to(Approved));
    }

    #[test]
    fn test_approved_is_terminal() {
        assert!(ReconciliationStatus::Approved.is_terminal());
        assert!(!ReconciliationStatus::Reconciled.is_terminal());
    }
}
