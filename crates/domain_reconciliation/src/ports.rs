//! Reconciliation store port

use async_trait::async_trait;

use core_kernel::{BankTransactionId, DomainPort, LineItemId, PortError, ReconciliationId};

use crate::statement::{BankReconciliation, BankReconciliationItem, BankTransaction};

/// Port for reconciliation sessions and bank transactions
///
/// The adapter decides which bank transactions fall within a session's
/// scope (the session's bank account and statement period); the matcher
/// only ever asks for transactions by session.
#[async_trait]
pub trait ReconciliationStore: DomainPort {
    /// Fetches one session
    async fn get_reconciliation(
        &self,
        id: ReconciliationId,
    ) -> Result<BankReconciliation, PortError>;

    /// Persists the mutable fields of a session
    async fn update_reconciliation(
        &self,
        reconciliation: &BankReconciliation,
    ) -> Result<(), PortError>;

    /// Lists every bank transaction in the session's scope
    async fn list_transactions(
        &self,
        reconciliation_id: ReconciliationId,
    ) -> Result<Vec<BankTransaction>, PortError>;

    /// Lists the not-yet-matched bank transactions in the session's scope
    async fn list_unmatched_transactions(
        &self,
        reconciliation_id: ReconciliationId,
    ) -> Result<Vec<BankTransaction>, PortError>;

    /// Atomically claims a bank transaction for a book line
    ///
    /// Conditional update: succeeds (returns `true`) only if the
    /// transaction is still unmatched.
    async fn claim_transaction(
        &self,
        id: BankTransactionId,
        line_item_id: LineItemId,
    ) -> Result<bool, PortError>;

    /// Records a reconciliation item
    async fn insert_item(&self, item: &BankReconciliationItem) -> Result<(), PortError>;
}
