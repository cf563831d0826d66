//! Recurring entry scheduler tests against the in-memory store

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{AssociationId, Currency, Frequency, GlAccountId, Money};
use domain_billing::RecurringEntryScheduler;
use domain_ledger::{
    AccountSubtype, AccountType, EntrySource, GlAccount, JournalEntry, LedgerStore,
};
use test_utils::{
    assert_batch_clean, assert_entry_balanced, init_tracing, ChartOfAccounts, IdFixtures,
    InMemoryFinanceStore, TemplateBuilder,
};

fn usd(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> (Arc<InMemoryFinanceStore>, ChartOfAccounts, AssociationId) {
    init_tracing();
    let store = Arc::new(InMemoryFinanceStore::new());
    let association_id = IdFixtures::association_id();
    let chart = ChartOfAccounts::seed(&store, association_id);
    (store, chart, association_id)
}

#[tokio::test]
async fn test_due_template_generates_one_posted_entry() {
    let (store, chart, association_id) = setup();
    let template = TemplateBuilder::new(association_id)
        .with_next_run_date(date(2025, 1, 1))
        .debit(chart.landscaping_expense, usd(dec!(500)))
        .credit(chart.accounts_payable, usd(dec!(500)))
        .build();
    let template_id = template.id;
    store.put_template(template);

    let scheduler = RecurringEntryScheduler::new(store.clone(), store.clone());
    let outcome = scheduler
        .process_due_templates(association_id, date(2025, 1, 1), IdFixtures::actor())
        .await
        .unwrap();
    assert_batch_clean(&outcome, 1);

    let entries = store.entries_for(association_id);
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_entry_balanced(entry);
    assert_eq!(entry.source, EntrySource::Recurring);
    assert_eq!(entry.entry_date, date(2025, 1, 1));
    assert!(entry.entry_number.starts_with("AUTO-202501-"));

    // The period is consumed: next run moves one month out.
    let template = store.template(template_id).unwrap();
    assert_eq!(template.next_run_date, date(2025, 2, 1));

    // Balances reflect the posting.
    let expense = store.account(chart.landscaping_expense).unwrap();
    let payable = store.account(chart.accounts_payable).unwrap();
    assert_eq!(expense.balance, usd(dec!(500)));
    assert_eq!(payable.balance, usd(dec!(500)));
}

#[tokio::test]
async fn test_rerun_same_period_is_noop() {
    let (store, chart, association_id) = setup();
    store.put_template(
        TemplateBuilder::new(association_id)
            .with_next_run_date(date(2025, 1, 1))
            .debit(chart.landscaping_expense, usd(dec!(500)))
            .credit(chart.accounts_payable, usd(dec!(500)))
            .build(),
    );

    let scheduler = RecurringEntryScheduler::new(store.clone(), store.clone());
    let actor = IdFixtures::actor();
    let first = scheduler
        .process_due_templates(association_id, date(2025, 1, 1), actor)
        .await
        .unwrap();
    assert_batch_clean(&first, 1);

    // The template is no longer due, so nothing is generated again.
    let second = scheduler
        .process_due_templates(association_id, date(2025, 1, 1), actor)
        .await
        .unwrap();
    assert_batch_clean(&second, 0);
    assert_eq!(store.entries_for(association_id).len(), 1);
}

#[tokio::test]
async fn test_overdue_template_fires_once_per_invocation() {
    let (store, chart, association_id) = setup();
    let template = TemplateBuilder::new(association_id)
        .with_next_run_date(date(2025, 1, 1))
        .debit(chart.landscaping_expense, usd(dec!(500)))
        .credit(chart.accounts_payable, usd(dec!(500)))
        .build();
    let template_id = template.id;
    store.put_template(template);

    // Trigger fires late, two periods past the next-run date. One entry is
    // generated per invocation; the still-due template catches up on reruns.
    let scheduler = RecurringEntryScheduler::new(store.clone(), store.clone());
    let actor = IdFixtures::actor();
    scheduler
        .process_due_templates(association_id, date(2025, 3, 10), actor)
        .await
        .unwrap();
    scheduler
        .process_due_templates(association_id, date(2025, 3, 10), actor)
        .await
        .unwrap();

    let entries = store.entries_for(association_id);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].entry_date, date(2025, 1, 1));
    assert_eq!(entries[1].entry_date, date(2025, 2, 1));
    assert_eq!(store.template(template_id).unwrap().next_run_date, date(2025, 3, 1));
}

#[tokio::test]
async fn test_unbalanced_template_is_skipped_and_stays_due() {
    let (store, chart, association_id) = setup();
    let template = TemplateBuilder::new(association_id)
        .with_next_run_date(date(2025, 1, 1))
        .debit(chart.landscaping_expense, usd(dec!(500)))
        .credit(chart.accounts_payable, usd(dec!(300)))
        .build();
    let template_id = template.id;
    store.put_template(template);

    let scheduler = RecurringEntryScheduler::new(store.clone(), store.clone());
    let outcome = scheduler
        .process_due_templates(association_id, date(2025, 1, 1), IdFixtures::actor())
        .await
        .unwrap();

    assert_eq!(outcome.processed, 0);
    assert_eq!(outcome.failures.len(), 1);
    assert!(store.entries_for(association_id).is_empty());
    // Not advanced: the template stays due for retry after the fix.
    assert_eq!(store.template(template_id).unwrap().next_run_date, date(2025, 1, 1));
}

#[tokio::test]
async fn test_template_with_unknown_account_is_skipped() {
    let (store, chart, association_id) = setup();
    let template = TemplateBuilder::new(association_id)
        .with_next_run_date(date(2025, 1, 1))
        .debit(GlAccountId::new(), usd(dec!(500)))
        .credit(chart.accounts_payable, usd(dec!(500)))
        .build();
    let template_id = template.id;
    store.put_template(template);

    let scheduler = RecurringEntryScheduler::new(store.clone(), store.clone());
    let outcome = scheduler
        .process_due_templates(association_id, date(2025, 1, 1), IdFixtures::actor())
        .await
        .unwrap();

    assert_eq!(outcome.processed, 0);
    assert_eq!(outcome.failures.len(), 1);
    assert!(store.entries_for(association_id).is_empty());
    assert_eq!(store.template(template_id).unwrap().next_run_date, date(2025, 1, 1));
}

#[tokio::test]
async fn test_one_failure_does_not_abort_the_batch() {
    let (store, chart, association_id) = setup();
    store.put_template(
        TemplateBuilder::new(association_id)
            .with_name("Broken accrual")
            .with_next_run_date(date(2025, 1, 1))
            .debit(chart.landscaping_expense, usd(dec!(500)))
            .credit(chart.accounts_payable, usd(dec!(300)))
            .build(),
    );
    store.put_template(
        TemplateBuilder::new(association_id)
            .with_name("Good accrual")
            .with_frequency(Frequency::Quarterly)
            .with_next_run_date(date(2025, 1, 1))
            .debit(chart.landscaping_expense, usd(dec!(750)))
            .credit(chart.accounts_payable, usd(dec!(750)))
            .build(),
    );

    let scheduler = RecurringEntryScheduler::new(store.clone(), store.clone());
    let outcome = scheduler
        .process_due_templates(association_id, date(2025, 1, 1), IdFixtures::actor())
        .await
        .unwrap();

    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.failures.len(), 1);
    let entries = store.entries_for(association_id);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].description, "Good accrual");
}

#[tokio::test]
async fn test_insert_failure_returns_the_claimed_period() {
    let (store, chart, association_id) = setup();
    let template = TemplateBuilder::new(association_id)
        .with_next_run_date(date(2025, 1, 1))
        .debit(chart.landscaping_expense, usd(dec!(500)))
        .credit(chart.accounts_payable, usd(dec!(500)))
        .build();
    let template_id = template.id;
    // A manual entry already occupies the template's deterministic number,
    // so the insert fails only after the period has been claimed.
    let conflicting = JournalEntry::new(
        association_id,
        template.entry_number(),
        date(2025, 1, 1),
        "Manually keyed accrual",
        EntrySource::Manual,
        IdFixtures::actor(),
        Currency::USD,
    )
    .debit(chart.landscaping_expense, usd(dec!(10)))
    .credit(chart.accounts_payable, usd(dec!(10)))
    .post()
    .unwrap();
    store.insert_posted_entry(&conflicting).await.unwrap();
    store.put_template(template);

    let scheduler = RecurringEntryScheduler::new(store.clone(), store.clone());
    let outcome = scheduler
        .process_due_templates(association_id, date(2025, 1, 1), IdFixtures::actor())
        .await
        .unwrap();

    assert_eq!(outcome.processed, 0);
    assert_eq!(outcome.failures.len(), 1);
    // The claimed period was given back: the template stays due and only
    // the manual entry exists.
    assert_eq!(store.template(template_id).unwrap().next_run_date, date(2025, 1, 1));
    assert_eq!(store.entries_for(association_id).len(), 1);
}

#[tokio::test]
async fn test_scheduler_posts_in_configured_currency() {
    init_tracing();
    let store = Arc::new(InMemoryFinanceStore::new());
    let association_id = IdFixtures::association_id();
    let expense = GlAccount::new(
        association_id,
        "6010",
        "Landscaping Expense",
        AccountType::Expense,
        AccountSubtype::Operating,
        Currency::EUR,
    );
    let payable = GlAccount::new(
        association_id,
        "2010",
        "Accounts Payable",
        AccountType::Liability,
        AccountSubtype::Current,
        Currency::EUR,
    );
    let (expense_id, payable_id) = (expense.id, payable.id);
    store.put_account(expense);
    store.put_account(payable);
    let eur = Money::new(dec!(500), Currency::EUR);
    store.put_template(
        TemplateBuilder::new(association_id)
            .with_next_run_date(date(2025, 1, 1))
            .debit(expense_id, eur)
            .credit(payable_id, eur)
            .build(),
    );

    let scheduler =
        RecurringEntryScheduler::with_currency(store.clone(), store.clone(), Currency::EUR);
    let outcome = scheduler
        .process_due_templates(association_id, date(2025, 1, 1), IdFixtures::actor())
        .await
        .unwrap();
    assert_batch_clean(&outcome, 1);

    let entries = store.entries_for(association_id);
    assert_eq!(entries[0].total_amount.currency(), Currency::EUR);
    assert_eq!(store.account(expense_id).unwrap().balance, eur);
}

#[tokio::test]
async fn test_inactive_template_never_fires() {
    let (store, chart, association_id) = setup();
    let mut template = TemplateBuilder::new(association_id)
        .with_next_run_date(date(2025, 1, 1))
        .debit(chart.landscaping_expense, usd(dec!(500)))
        .credit(chart.accounts_payable, usd(dec!(500)))
        .build();
    template.is_active = false;
    store.put_template(template);

    let scheduler = RecurringEntryScheduler::new(store.clone(), store.clone());
    let outcome = scheduler
        .process_due_templates(association_id, date(2025, 6, 1), IdFixtures::actor())
        .await
        .unwrap();
    assert_batch_clean(&outcome, 0);
    assert!(store.entries_for(association_id).is_empty());
}
