//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the finance
//! engine. These fixtures are designed to be consistent and predictable
//! for unit tests.

use chrono::NaiveDate;
use core_kernel::{AssociationId, Currency, Money, PropertyId, UserId};
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard monthly dues amount
    pub fn monthly_dues() -> Money {
        Money::new(dec!(250.00), Currency::USD)
    }

    /// Standard recurring accrual amount
    pub fn accrual_amount() -> Money {
        Money::new(dec!(500.00), Currency::USD)
    }

    /// A deposit-sized amount for matching tests
    pub fn deposit() -> Money {
        Money::new(dec!(850.00), Currency::USD)
    }

    /// Creates a zero USD amount
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// Creates a EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard period start (Jan 1, 2025)
    pub fn period_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    /// Mid-month date within the grace period of `period_start`
    pub fn within_grace() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()
    }

    /// Date past the standard 10-day grace period of `period_start`
    pub fn past_grace() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    /// Standard statement date (Mar 31, 2025)
    pub fn statement_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic association ID for testing
    pub fn association_id() -> AssociationId {
        AssociationId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Creates a deterministic property ID for testing
    pub fn property_id() -> PropertyId {
        PropertyId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// Creates a deterministic acting-user ID for testing
    pub fn actor() -> UserId {
        UserId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }
}
