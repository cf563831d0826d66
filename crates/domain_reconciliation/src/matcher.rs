//! Auto-matching and the reconciliation lifecycle
//!
//! The matcher pairs unmatched bank transactions with unmatched book
//! lines. A pair qualifies when amounts agree within the configured
//! tolerance and dates fall within the configured window. A transaction
//! with exactly one qualifying line is matched by claiming both sides
//! atomically; a transaction with several equally good lines is left for
//! manual resolution.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::{debug, info, warn};

use core_kernel::{
    days_between, BatchOutcome, DateRange, Money, PortError, ReconciliationId, UserId,
    BALANCE_TOLERANCE,
};
use domain_ledger::{BookLine, LedgerStore};

use crate::error::ReconciliationError;
use crate::ports::ReconciliationStore;
use crate::statement::{
    BankReconciliation, BankReconciliationItem, BankTransaction, ReconciliationStatus,
};

/// Matching configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MatchConfig {
    /// Maximum days between bank and book dates for a candidate pair
    pub date_window_days: i64,
    /// Maximum amount difference for a candidate pair
    pub amount_tolerance: Decimal,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            date_window_days: 7,
            amount_tolerance: dec!(0.01),
        }
    }
}

/// Computes the reconciled balance for a set of bank transactions
///
/// Pure function: beginning balance plus the sum of cleared transaction
/// amounts. Uncleared transactions do not count.
pub fn compute_reconciled_balance(
    beginning_balance: Money,
    transactions: &[BankTransaction],
) -> Result<Money, ReconciliationError> {
    let mut balance = beginning_balance;
    for transaction in transactions.iter().filter(|t| t.is_cleared) {
        balance = balance.checked_add(&transaction.amount)?;
    }
    Ok(balance)
}

/// Pairs bank activity with book entries and drives sessions to approval
pub struct ReconciliationMatcher {
    store: Arc<dyn ReconciliationStore>,
    ledger: Arc<dyn LedgerStore>,
    config: MatchConfig,
}

impl ReconciliationMatcher {
    /// Creates a matcher with the default configuration
    pub fn new(store: Arc<dyn ReconciliationStore>, ledger: Arc<dyn LedgerStore>) -> Self {
        Self::with_config(store, ledger, MatchConfig::default())
    }

    /// Creates a matcher with explicit configuration
    pub fn with_config(
        store: Arc<dyn ReconciliationStore>,
        ledger: Arc<dyn LedgerStore>,
        config: MatchConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            config,
        }
    }

    /// Matches unmatched bank transactions against unmatched book lines
    ///
    /// Idempotent: re-running only considers transactions still unmatched.
    /// Returns the count of new matches; a lost claim race is recorded as
    /// a per-item failure and the run continues.
    pub async fn auto_match(
        &self,
        reconciliation_id: ReconciliationId,
    ) -> Result<BatchOutcome, ReconciliationError> {
        let reconciliation = self.store.get_reconciliation(reconciliation_id).await?;
        if reconciliation.status.is_terminal() {
            return Err(ReconciliationError::ApprovedImmutable(
                reconciliation.id.to_string(),
            ));
        }

        let transactions = self
            .store
            .list_unmatched_transactions(reconciliation_id)
            .await?;
        let mut outcome = BatchOutcome::new();
        if transactions.is_empty() {
            return Ok(outcome);
        }

        let window = self.candidate_window(&transactions);
        let book_lines = self
            .ledger
            .list_unmatched_lines(reconciliation.bank_account_id, window)
            .await?;

        // Lines claimed during this pass; a line feeding one match must not
        // be offered to a later transaction.
        let mut taken: HashSet<_> = HashSet::new();

        for transaction in &transactions {
            let candidates: Vec<&BookLine> = book_lines
                .iter()
                .filter(|line| !taken.contains(&line.line_item_id))
                .filter(|line| self.is_candidate(transaction, line))
                .collect();

            match candidates.as_slice() {
                [line] => match self.claim_pair(&reconciliation, transaction, line).await {
                    Ok(true) => {
                        taken.insert(line.line_item_id);
                        outcome.record_success();
                    }
                    Ok(false) => {
                        // Claimed by a concurrent invocation; not an error.
                        taken.insert(line.line_item_id);
                    }
                    Err(error) => {
                        warn!(transaction = %transaction.id, %error, "match attempt failed");
                        outcome.record_failure(transaction.id, &error);
                    }
                },
                [] => {}
                _ => {
                    // Several equally good candidates: defer to manual
                    // resolution rather than guess.
                    debug!(
                        transaction = %transaction.id,
                        candidates = candidates.len(),
                        "ambiguous match left unresolved"
                    );
                }
            }
        }

        info!(
            reconciliation = %reconciliation_id,
            matched = outcome.processed,
            failed = outcome.failures.len(),
            "auto-match complete"
        );
        Ok(outcome)
    }

    /// Recomputes balances and promotes the session when it balances
    ///
    /// `reconciled_balance` and `difference` are refreshed from the
    /// session's cleared transactions. An in-progress session whose
    /// difference reaches zero moves to `Reconciled`.
    pub async fn refresh(
        &self,
        reconciliation_id: ReconciliationId,
        actor: UserId,
    ) -> Result<BankReconciliation, ReconciliationError> {
        let mut reconciliation = self.store.get_reconciliation(reconciliation_id).await?;
        if reconciliation.status.is_terminal() {
            return Err(ReconciliationError::ApprovedImmutable(
                reconciliation.id.to_string(),
            ));
        }

        let transactions = self.store.list_transactions(reconciliation_id).await?;
        reconciliation.reconciled_balance =
            compute_reconciled_balance(reconciliation.beginning_balance, &transactions)?;
        reconciliation.difference = reconciliation
            .statement_balance
            .checked_sub(&reconciliation.reconciled_balance)?;

        let balanced = reconciliation
            .difference
            .approx_eq(&Money::zero(reconciliation.difference.currency()), BALANCE_TOLERANCE);
        if balanced && reconciliation.status == ReconciliationStatus::InProgress {
            reconciliation.status = ReconciliationStatus::Reconciled;
            reconciliation.reconciled_by = Some(actor);
            info!(reconciliation = %reconciliation_id, "session reconciled");
        }

        self.store.update_reconciliation(&reconciliation).await?;
        Ok(reconciliation)
    }

    /// Approves a reconciled session
    ///
    /// Preconditions: status is `Reconciled` and the difference is zero
    /// within tolerance. Violations surface as errors, never silently.
    pub async fn approve(
        &self,
        reconciliation_id: ReconciliationId,
        approver: UserId,
    ) -> Result<BankReconciliation, ReconciliationError> {
        let mut reconciliation = self.store.get_reconciliation(reconciliation_id).await?;

        if !reconciliation
            .status
            .can_transition_to(ReconciliationStatus::Approved)
        {
            return Err(ReconciliationError::InvalidTransition {
                from: reconciliation.status,
                to: ReconciliationStatus::Approved,
            });
        }

        let zero = Money::zero(reconciliation.difference.currency());
        if !reconciliation.difference.approx_eq(&zero, BALANCE_TOLERANCE) {
            return Err(ReconciliationError::NotBalanced {
                difference: reconciliation.difference.amount(),
            });
        }

        reconciliation.status = ReconciliationStatus::Approved;
        reconciliation.approved_by = Some(approver);
        reconciliation.approved_at = Some(chrono::Utc::now());
        self.store.update_reconciliation(&reconciliation).await?;

        info!(reconciliation = %reconciliation_id, approver = %approver, "reconciliation approved");
        Ok(reconciliation)
    }

    /// The date range that can contain a candidate for any listed transaction
    fn candidate_window(&self, transactions: &[BankTransaction]) -> DateRange {
        let min = transactions
            .iter()
            .map(|t| t.transaction_date)
            .min()
            .expect("non-empty");
        let max = transactions
            .iter()
            .map(|t| t.transaction_date)
            .max()
            .expect("non-empty");
        DateRange {
            start: min - chrono::Duration::days(self.config.date_window_days),
            end: max + chrono::Duration::days(self.config.date_window_days),
        }
    }

    /// Amount within tolerance and date within window
    fn is_candidate(&self, transaction: &BankTransaction, line: &BookLine) -> bool {
        transaction
            .amount
            .approx_eq(&line.amount, self.config.amount_tolerance)
            && days_between(transaction.transaction_date, line.entry_date).abs()
                <= self.config.date_window_days
    }

    async fn claim_pair(
        &self,
        reconciliation: &BankReconciliation,
        transaction: &BankTransaction,
        line: &BookLine,
    ) -> Result<bool, PortError> {
        // Book side first; it is the side shared with other subsystems.
        if !self
            .ledger
            .claim_line_item(line.line_item_id, transaction.id)
            .await?
        {
            return Ok(false);
        }

        if !self
            .store
            .claim_transaction(transaction.id, line.line_item_id)
            .await?
        {
            // Unwind the half-made match.
            self.ledger.release_line_item(line.line_item_id).await?;
            return Ok(false);
        }

        let item = BankReconciliationItem::matched(
            reconciliation.id,
            transaction.id,
            line.line_item_id,
        );
        self.store.insert_item(&item).await?;
        Ok(true)
    }
}
