//! Assessment schedules and per-property charges

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{
    days_between, AssessmentId, AssessmentScheduleId, AssociationId, Frequency, Money, PropertyId,
    UserId,
};

/// Payment state of an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

/// An association-scoped recurring charge definition
///
/// At generation time a schedule fans out to one [`Assessment`] per active
/// property in the association.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSchedule {
    /// Unique identifier
    pub id: AssessmentScheduleId,
    /// Owning association
    pub association_id: AssociationId,
    /// Schedule name (e.g., "Monthly dues")
    pub name: String,
    /// Charge amount per property
    pub amount: Money,
    /// Generation cadence
    pub frequency: Frequency,
    /// Next date the schedule generates charges
    pub next_generation_date: NaiveDate,
    /// Whether the schedule generates charges
    pub is_active: bool,
    /// When charges were last generated
    pub last_generated_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl AssessmentSchedule {
    /// Creates a new active schedule
    pub fn new(
        association_id: AssociationId,
        name: impl Into<String>,
        amount: Money,
        frequency: Frequency,
        next_generation_date: NaiveDate,
    ) -> Self {
        Self {
            id: AssessmentScheduleId::new_v7(),
            association_id,
            name: name.into(),
            amount,
            frequency,
            next_generation_date,
            is_active: true,
            last_generated_at: None,
            created_at: Utc::now(),
        }
    }

    /// Returns true if the schedule should fire on or before `as_of`
    pub fn is_due(&self, as_of: NaiveDate) -> bool {
        self.is_active && self.next_generation_date <= as_of
    }
}

/// A charge against one property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Unique identifier
    pub id: AssessmentId,
    /// Owning association
    pub association_id: AssociationId,
    /// Property being charged
    pub property_id: PropertyId,
    /// Schedule that generated the charge, if any
    pub schedule_id: Option<AssessmentScheduleId>,
    /// Charge amount
    pub amount: Money,
    /// Payment due date
    pub due_date: NaiveDate,
    /// Payment state
    pub payment_status: PaymentStatus,
    /// Late fee, applied at most once
    pub late_fee: Option<Money>,
    /// Acting user that generated the charge
    pub created_by: UserId,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Assessment {
    /// Creates a new unpaid assessment
    pub fn new(
        association_id: AssociationId,
        property_id: PropertyId,
        schedule_id: Option<AssessmentScheduleId>,
        amount: Money,
        due_date: NaiveDate,
        created_by: UserId,
    ) -> Self {
        Self {
            id: AssessmentId::new_v7(),
            association_id,
            property_id,
            schedule_id,
            amount,
            due_date,
            payment_status: PaymentStatus::Unpaid,
            late_fee: None,
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Due date shifted out by the standard billing window
    pub fn standard_due_date(as_of: NaiveDate, due_days: i64) -> NaiveDate {
        as_of + Duration::days(due_days)
    }

    /// Returns true if the assessment is unpaid and past its grace period
    pub fn is_past_grace(&self, as_of: NaiveDate, grace_period_days: i64) -> bool {
        self.payment_status == PaymentStatus::Unpaid
            && days_between(self.due_date, as_of) > grace_period_days
    }

    /// Returns true if a late fee may still be applied
    pub fn late_fee_pending(&self, as_of: NaiveDate, grace_period_days: i64) -> bool {
        self.late_fee.is_none() && self.is_past_grace(as_of, grace_period_days)
    }

    /// Total outstanding including any late fee
    pub fn total_due(&self) -> Money {
        match self.late_fee {
            Some(fee) => self.amount + fee,
            None => self.amount,
        }
    }
}

/// Computes the one-time late fee for an overdue assessment
///
/// `rate` is a fraction of the assessment amount; the result is capped.
pub fn compute_late_fee(amount: Money, rate: Decimal, cap: Money) -> Money {
    let fee = amount.multiply(rate);
    fee.min(&cap).unwrap_or(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assessment(amount: Money, due: NaiveDate) -> Assessment {
        Assessment::new(
            AssociationId::new(),
            PropertyId::new(),
            None,
            amount,
            due,
            UserId::new(),
        )
    }

    #[test]
    fn test_late_fee_ten_percent() {
        let fee = compute_late_fee(usd(dec!(250)), dec!(0.10), usd(dec!(100)));
        assert_eq!(fee, usd(dec!(25.00)));
    }

    #[test]
    fn test_late_fee_capped() {
        let fee = compute_late_fee(usd(dec!(2500)), dec!(0.10), usd(dec!(100)));
        assert_eq!(fee, usd(dec!(100)));
    }

    #[test]
    fn test_grace_period_boundary() {
        let a = assessment(usd(dec!(250)), date(2025, 1, 1));
        // 10 days past due is still within a 10-day grace period
        assert!(!a.is_past_grace(date(2025, 1, 11), 10));
        assert!(a.is_past_grace(date(2025, 1, 12), 10));
    }

    #[test]
    fn test_paid_assessment_never_past_grace() {
        let mut a = assessment(usd(dec!(250)), date(2025, 1, 1));
        a.payment_status = PaymentStatus::Paid;
        assert!(!a.is_past_grace(date(2025, 6, 1), 10));
    }

    #[test]
    fn test_late_fee_pending_only_once() {
        let mut a = assessment(usd(dec!(250)), date(2025, 1, 1));
        assert!(a.late_fee_pending(date(2025, 1, 15), 10));
        a.late_fee = Some(usd(dec!(25)));
        assert!(!a.late_fee_pending(date(2025, 1, 15), 10));
        assert_eq!(a.total_due(), usd(dec!(275)));
    }
}
