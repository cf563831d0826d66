//! Ledger store port
//!
//! Repository-style access to the ledger slice of the persistent store.
//! The production adapter is a transactional relational store; tests use
//! the in-memory adapter from `test_utils`. Services receive the port as
//! `Arc<dyn LedgerStore>`.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{
    AssociationId, BankTransactionId, DateRange, DomainPort, GlAccountId, JournalEntryId,
    LineItemId, Money, PortError,
};

use crate::account::GlAccount;
use crate::entry::JournalEntry;

/// A book-side line item as seen by the reconciliation matcher
///
/// The signed amount is from the bank account's perspective: a debit to a
/// cash account (money in) is positive, a credit (money out) is negative,
/// matching the sign convention of reported bank transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookLine {
    /// The line item
    pub line_item_id: LineItemId,
    /// The entry the line belongs to
    pub entry_id: JournalEntryId,
    /// The GL account posted against
    pub account_id: GlAccountId,
    /// Business date of the owning entry
    pub entry_date: NaiveDate,
    /// Signed amount (debit minus credit)
    pub amount: Money,
}

/// Port for ledger reads and writes
#[async_trait]
pub trait LedgerStore: DomainPort {
    /// Fetches one account
    async fn get_account(&self, id: GlAccountId) -> Result<GlAccount, PortError>;

    /// Lists all accounts for an association
    async fn list_accounts(&self, association_id: AssociationId) -> Result<Vec<GlAccount>, PortError>;

    /// Persists a posted entry and applies its line items to account
    /// balances in one transaction
    ///
    /// Rejects drafts and entries referencing unknown accounts; on any
    /// failure no balance is touched.
    async fn insert_posted_entry(&self, entry: &JournalEntry) -> Result<(), PortError>;

    /// Fetches one entry
    async fn get_entry(&self, id: JournalEntryId) -> Result<JournalEntry, PortError>;

    /// Lists unmatched book-side lines against an account within a window
    async fn list_unmatched_lines(
        &self,
        account_id: GlAccountId,
        window: DateRange,
    ) -> Result<Vec<BookLine>, PortError>;

    /// Atomically claims a line item for a bank transaction
    ///
    /// Conditional update: succeeds (returns `true`) only if the line is
    /// still unmatched; returns `false` if another match claimed it first.
    async fn claim_line_item(
        &self,
        line_item_id: LineItemId,
        bank_transaction_id: BankTransactionId,
    ) -> Result<bool, PortError>;

    /// Releases a previously claimed line item
    ///
    /// Used to unwind a half-made match when the bank-side claim loses
    /// its race.
    async fn release_line_item(&self, line_item_id: LineItemId) -> Result<(), PortError>;
}
