//! Reconciliation matcher and lifecycle tests against the in-memory store

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{AssociationId, Currency, Money, UserId};
use domain_ledger::{EntrySource, JournalEntry, LedgerStore};
use domain_reconciliation::{
    BankReconciliation, ReconciliationError, ReconciliationMatcher, ReconciliationStatus,
};
use test_utils::{
    assert_batch_clean, assert_money_zero, init_tracing, BankTransactionBuilder, ChartOfAccounts,
    IdFixtures, InMemoryFinanceStore,
};

fn usd(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Scenario {
    store: Arc<InMemoryFinanceStore>,
    chart: ChartOfAccounts,
    association_id: AssociationId,
    actor: UserId,
}

fn setup() -> Scenario {
    init_tracing();
    let store = Arc::new(InMemoryFinanceStore::new());
    let association_id = IdFixtures::association_id();
    let chart = ChartOfAccounts::seed(&store, association_id);
    Scenario {
        store,
        chart,
        association_id,
        actor: IdFixtures::actor(),
    }
}

impl Scenario {
    /// Posts a dues-deposit entry hitting the cash account
    async fn post_cash_deposit(&self, entry_date: NaiveDate, amount: Money, number: &str) {
        let entry = JournalEntry::new(
            self.association_id,
            number,
            entry_date,
            "Owner dues deposit",
            EntrySource::Manual,
            self.actor,
            Currency::USD,
        )
        .debit(self.chart.operating_cash, amount)
        .credit(self.chart.dues_revenue, amount)
        .post()
        .unwrap();
        self.store.insert_posted_entry(&entry).await.unwrap();
    }

    fn open_session(&self, beginning: Money, statement: Money) -> BankReconciliation {
        let session = BankReconciliation::new(
            self.association_id,
            self.chart.operating_cash,
            date(2025, 3, 31),
            beginning,
            statement,
        );
        self.store.put_reconciliation(session.clone());
        session
    }
}

#[tokio::test]
async fn test_single_candidate_is_matched() {
    let s = setup();
    s.post_cash_deposit(date(2025, 3, 28), usd(dec!(850)), "JE-1001").await;
    let session = s.open_session(usd(dec!(1000)), usd(dec!(1850)));
    let transaction = BankTransactionBuilder::new(s.association_id, s.chart.operating_cash)
        .with_date(date(2025, 3, 31))
        .with_amount(usd(dec!(850)))
        .build();
    let transaction_id = transaction.id;
    s.store.put_transaction(session.id, transaction);

    let matcher = ReconciliationMatcher::new(s.store.clone(), s.store.clone());
    let outcome = matcher.auto_match(session.id).await.unwrap();
    assert_batch_clean(&outcome, 1);

    let matched = s.store.transaction(transaction_id).unwrap();
    assert!(matched.is_matched);
    assert!(matched.matched_line_item_id.is_some());

    let items = s.store.items_for(session.id);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].bank_transaction_id, transaction_id);
    assert_eq!(items[0].line_item_id, matched.matched_line_item_id);
}

#[tokio::test]
async fn test_ambiguous_candidates_left_for_manual_resolution() {
    let s = setup();
    // Two equally good book lines for one bank transaction.
    s.post_cash_deposit(date(2025, 3, 27), usd(dec!(850)), "JE-1001").await;
    s.post_cash_deposit(date(2025, 3, 29), usd(dec!(850)), "JE-1002").await;
    let session = s.open_session(usd(dec!(1000)), usd(dec!(1850)));
    let transaction = BankTransactionBuilder::new(s.association_id, s.chart.operating_cash)
        .with_date(date(2025, 3, 31))
        .with_amount(usd(dec!(850)))
        .build();
    let transaction_id = transaction.id;
    s.store.put_transaction(session.id, transaction);

    let matcher = ReconciliationMatcher::new(s.store.clone(), s.store.clone());
    let outcome = matcher.auto_match(session.id).await.unwrap();

    // The matcher never guesses between ties.
    assert_batch_clean(&outcome, 0);
    assert!(!s.store.transaction(transaction_id).unwrap().is_matched);
}

#[tokio::test]
async fn test_matched_line_not_offered_twice_in_one_pass() {
    let s = setup();
    s.post_cash_deposit(date(2025, 3, 28), usd(dec!(850)), "JE-1001").await;
    let session = s.open_session(usd(dec!(1000)), usd(dec!(2700)));
    for day in [30, 31] {
        s.store.put_transaction(
            session.id,
            BankTransactionBuilder::new(s.association_id, s.chart.operating_cash)
                .with_date(date(2025, 3, day))
                .with_amount(usd(dec!(850)))
                .build(),
        );
    }

    let matcher = ReconciliationMatcher::new(s.store.clone(), s.store.clone());
    let outcome = matcher.auto_match(session.id).await.unwrap();

    // One line feeds at most one match; the second transaction stays open.
    assert_batch_clean(&outcome, 1);
    assert_eq!(s.store.items_for(session.id).len(), 1);
}

#[tokio::test]
async fn test_date_window_excludes_stale_lines() {
    let s = setup();
    // 11 days before the bank date, outside the 7-day window.
    s.post_cash_deposit(date(2025, 3, 20), usd(dec!(850)), "JE-1001").await;
    let session = s.open_session(usd(dec!(1000)), usd(dec!(1850)));
    let transaction = BankTransactionBuilder::new(s.association_id, s.chart.operating_cash)
        .with_date(date(2025, 3, 31))
        .with_amount(usd(dec!(850)))
        .build();
    let transaction_id = transaction.id;
    s.store.put_transaction(session.id, transaction);

    let matcher = ReconciliationMatcher::new(s.store.clone(), s.store.clone());
    let outcome = matcher.auto_match(session.id).await.unwrap();
    assert_batch_clean(&outcome, 0);
    assert!(!s.store.transaction(transaction_id).unwrap().is_matched);
}

#[tokio::test]
async fn test_refresh_promotes_balanced_session() {
    let s = setup();
    let session = s.open_session(usd(dec!(1000)), usd(dec!(1850)));
    s.store.put_transaction(
        session.id,
        BankTransactionBuilder::new(s.association_id, s.chart.operating_cash)
            .with_date(date(2025, 3, 31))
            .with_amount(usd(dec!(850)))
            .build(),
    );

    let matcher = ReconciliationMatcher::new(s.store.clone(), s.store.clone());
    let refreshed = matcher.refresh(session.id, s.actor).await.unwrap();

    assert_eq!(refreshed.reconciled_balance, usd(dec!(1850)));
    assert_money_zero(&refreshed.difference);
    assert_eq!(refreshed.status, ReconciliationStatus::Reconciled);
    assert_eq!(refreshed.reconciled_by, Some(s.actor));
}

#[tokio::test]
async fn test_refresh_ignores_uncleared_transactions() {
    let s = setup();
    let session = s.open_session(usd(dec!(1000)), usd(dec!(1850)));
    s.store.put_transaction(
        session.id,
        BankTransactionBuilder::new(s.association_id, s.chart.operating_cash)
            .with_amount(usd(dec!(850)))
            .uncleared()
            .build(),
    );

    let matcher = ReconciliationMatcher::new(s.store.clone(), s.store.clone());
    let refreshed = matcher.refresh(session.id, s.actor).await.unwrap();

    // Uncleared activity does not reconcile; the session stays in progress.
    assert_eq!(refreshed.reconciled_balance, usd(dec!(1000)));
    assert_eq!(refreshed.difference, usd(dec!(850)));
    assert_eq!(refreshed.status, ReconciliationStatus::InProgress);
}

#[tokio::test]
async fn test_approve_requires_reconciled_status() {
    let s = setup();
    let session = s.open_session(usd(dec!(1000)), usd(dec!(1000)));

    let matcher = ReconciliationMatcher::new(s.store.clone(), s.store.clone());
    let result = matcher.approve(session.id, s.actor).await;
    assert!(matches!(
        result,
        Err(ReconciliationError::InvalidTransition {
            from: ReconciliationStatus::InProgress,
            to: ReconciliationStatus::Approved,
        })
    ));
}

#[tokio::test]
async fn test_approve_requires_zero_difference() {
    let s = setup();
    let mut session = s.open_session(usd(dec!(1000)), usd(dec!(1850)));
    session.status = ReconciliationStatus::Reconciled;
    s.store.put_reconciliation(session.clone());

    let matcher = ReconciliationMatcher::new(s.store.clone(), s.store.clone());
    let result = matcher.approve(session.id, s.actor).await;
    assert!(matches!(result, Err(ReconciliationError::NotBalanced { .. })));
}

#[tokio::test]
async fn test_approved_session_is_immutable() {
    let s = setup();
    let session = s.open_session(usd(dec!(1000)), usd(dec!(1850)));
    s.store.put_transaction(
        session.id,
        BankTransactionBuilder::new(s.association_id, s.chart.operating_cash)
            .with_amount(usd(dec!(850)))
            .build(),
    );

    let matcher = ReconciliationMatcher::new(s.store.clone(), s.store.clone());
    matcher.refresh(session.id, s.actor).await.unwrap();
    let approved = matcher.approve(session.id, s.actor).await.unwrap();
    assert_eq!(approved.status, ReconciliationStatus::Approved);
    assert_eq!(approved.approved_by, Some(s.actor));
    assert!(approved.approved_at.is_some());

    // No further mutation of an approved session.
    assert!(matches!(
        matcher.auto_match(session.id).await,
        Err(ReconciliationError::ApprovedImmutable(_))
    ));
    assert!(matches!(
        matcher.refresh(session.id, s.actor).await,
        Err(ReconciliationError::ApprovedImmutable(_))
    ));
}
