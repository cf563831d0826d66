//! Assessment billing scheduler tests against the in-memory store

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{AssociationId, Currency, Money, PropertyId};
use domain_billing::{Assessment, AssessmentBillingScheduler, PaymentStatus};
use test_utils::{
    assert_batch_clean, init_tracing, IdFixtures, InMemoryFinanceStore, ScheduleBuilder,
};

fn usd(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup_with_properties(count: usize) -> (Arc<InMemoryFinanceStore>, AssociationId, Vec<PropertyId>) {
    init_tracing();
    let store = Arc::new(InMemoryFinanceStore::new());
    let association_id = IdFixtures::association_id();
    let properties: Vec<PropertyId> = (0..count).map(|_| PropertyId::new()).collect();
    for property_id in &properties {
        store.put_property(association_id, *property_id);
    }
    (store, association_id, properties)
}

#[tokio::test]
async fn test_due_schedule_fans_out_per_property() {
    let (store, association_id, properties) = setup_with_properties(3);
    let schedule = ScheduleBuilder::new(association_id)
        .with_amount(usd(dec!(250)))
        .with_next_generation_date(date(2025, 1, 1))
        .build();
    let schedule_id = schedule.id;
    store.put_schedule(schedule);

    let scheduler = AssessmentBillingScheduler::new(store.clone());
    let outcome = scheduler
        .generate_due_assessments(association_id, date(2025, 1, 1), IdFixtures::actor())
        .await
        .unwrap();
    assert_batch_clean(&outcome, 3);

    let assessments = store.assessments_for(association_id);
    assert_eq!(assessments.len(), 3);
    for assessment in &assessments {
        assert_eq!(assessment.amount, usd(dec!(250)));
        assert_eq!(assessment.due_date, date(2025, 1, 31));
        assert_eq!(assessment.payment_status, PaymentStatus::Unpaid);
        assert_eq!(assessment.schedule_id, Some(schedule_id));
        assert!(properties.contains(&assessment.property_id));
    }

    let schedule = store.schedule(schedule_id).unwrap();
    assert_eq!(schedule.next_generation_date, date(2025, 2, 1));
    assert!(schedule.last_generated_at.is_some());
}

#[tokio::test]
async fn test_generation_rerun_is_noop() {
    let (store, association_id, _) = setup_with_properties(2);
    store.put_schedule(
        ScheduleBuilder::new(association_id)
            .with_next_generation_date(date(2025, 1, 1))
            .build(),
    );

    let scheduler = AssessmentBillingScheduler::new(store.clone());
    let actor = IdFixtures::actor();
    scheduler
        .generate_due_assessments(association_id, date(2025, 1, 1), actor)
        .await
        .unwrap();
    let second = scheduler
        .generate_due_assessments(association_id, date(2025, 1, 1), actor)
        .await
        .unwrap();

    assert_batch_clean(&second, 0);
    assert_eq!(store.assessments_for(association_id).len(), 2);
}

#[tokio::test]
async fn test_schedule_not_yet_due_is_skipped() {
    let (store, association_id, _) = setup_with_properties(2);
    store.put_schedule(
        ScheduleBuilder::new(association_id)
            .with_next_generation_date(date(2025, 2, 1))
            .build(),
    );

    let scheduler = AssessmentBillingScheduler::new(store.clone());
    let outcome = scheduler
        .generate_due_assessments(association_id, date(2025, 1, 15), IdFixtures::actor())
        .await
        .unwrap();
    assert_batch_clean(&outcome, 0);
    assert!(store.assessments_for(association_id).is_empty());
}

#[tokio::test]
async fn test_late_fee_applied_past_grace() {
    let (store, association_id, properties) = setup_with_properties(1);
    store.put_assessment(Assessment::new(
        association_id,
        properties[0],
        None,
        usd(dec!(250)),
        date(2025, 1, 1),
        IdFixtures::actor(),
    ));

    // 14 days past due, 10-day grace: fee = 10% of 250.
    let scheduler = AssessmentBillingScheduler::new(store.clone());
    let outcome = scheduler
        .apply_late_fees(association_id, date(2025, 1, 15))
        .await
        .unwrap();
    assert_batch_clean(&outcome, 1);

    let assessments = store.assessments_for(association_id);
    assert_eq!(assessments[0].late_fee, Some(usd(dec!(25.00))));
    assert_eq!(assessments[0].total_due(), usd(dec!(275.00)));
}

#[tokio::test]
async fn test_late_fee_applied_at_most_once() {
    let (store, association_id, properties) = setup_with_properties(1);
    store.put_assessment(Assessment::new(
        association_id,
        properties[0],
        None,
        usd(dec!(250)),
        date(2025, 1, 1),
        IdFixtures::actor(),
    ));

    let scheduler = AssessmentBillingScheduler::new(store.clone());
    scheduler
        .apply_late_fees(association_id, date(2025, 1, 15))
        .await
        .unwrap();
    // Later run, even further past due: the fee is never recomputed.
    let second = scheduler
        .apply_late_fees(association_id, date(2025, 3, 1))
        .await
        .unwrap();

    assert_batch_clean(&second, 0);
    let assessments = store.assessments_for(association_id);
    assert_eq!(assessments[0].late_fee, Some(usd(dec!(25.00))));
}

#[tokio::test]
async fn test_no_fee_within_grace_period() {
    let (store, association_id, properties) = setup_with_properties(1);
    store.put_assessment(Assessment::new(
        association_id,
        properties[0],
        None,
        usd(dec!(250)),
        date(2025, 1, 1),
        IdFixtures::actor(),
    ));

    // Exactly 10 days past due is still within the grace period.
    let scheduler = AssessmentBillingScheduler::new(store.clone());
    let outcome = scheduler
        .apply_late_fees(association_id, date(2025, 1, 11))
        .await
        .unwrap();
    assert_batch_clean(&outcome, 0);
    assert_eq!(store.assessments_for(association_id)[0].late_fee, None);
}

#[tokio::test]
async fn test_late_fee_capped() {
    let (store, association_id, properties) = setup_with_properties(1);
    store.put_assessment(Assessment::new(
        association_id,
        properties[0],
        None,
        usd(dec!(2500)),
        date(2025, 1, 1),
        IdFixtures::actor(),
    ));

    let scheduler = AssessmentBillingScheduler::new(store.clone());
    scheduler
        .apply_late_fees(association_id, date(2025, 2, 1))
        .await
        .unwrap();

    // 10% would be 250; the fee caps at 100.
    assert_eq!(
        store.assessments_for(association_id)[0].late_fee,
        Some(usd(dec!(100)))
    );
}

#[tokio::test]
async fn test_paid_assessment_never_gets_a_fee() {
    let (store, association_id, properties) = setup_with_properties(1);
    let mut assessment = Assessment::new(
        association_id,
        properties[0],
        None,
        usd(dec!(250)),
        date(2025, 1, 1),
        IdFixtures::actor(),
    );
    assessment.payment_status = PaymentStatus::Paid;
    store.put_assessment(assessment);

    let scheduler = AssessmentBillingScheduler::new(store.clone());
    let outcome = scheduler
        .apply_late_fees(association_id, date(2025, 2, 1))
        .await
        .unwrap();
    assert_batch_clean(&outcome, 0);
    assert_eq!(store.assessments_for(association_id)[0].late_fee, None);
}
