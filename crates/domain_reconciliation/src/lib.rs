//! Reconciliation Domain - Bank Statement Matching
//!
//! Pairs externally reported bank transactions with book-side ledger
//! lines, computes reconciled balances, and tracks each reconciliation
//! session through a forward-only lifecycle:
//!
//! ```text
//! in_progress -> reconciled -> approved
//! ```
//!
//! Matching is conservative: a bank transaction is auto-matched only when
//! exactly one unmatched book line agrees on amount (within one cent) and
//! date (within the configured window). Ties are left for manual
//! resolution; the matcher never guesses.

pub mod statement;
pub mod matcher;
pub mod ports;
pub mod error;

pub use statement::{
    BankReconciliation, BankReconciliationItem, BankTransaction, ItemStatus, ReconciliationStatus,
};
pub use matcher::{compute_reconciled_balance, MatchConfig, ReconciliationMatcher};
pub use ports::ReconciliationStore;
pub use error::ReconciliationError;
