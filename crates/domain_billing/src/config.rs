//! Billing configuration

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Billing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Days past due before a late fee applies
    pub grace_period_days: i64,
    /// Late fee as a fraction of the assessment amount
    pub late_fee_rate: Decimal,
    /// Maximum late fee in currency units
    pub late_fee_cap: Decimal,
    /// Days between generation and the assessment due date
    pub assessment_due_days: i64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            grace_period_days: 10,
            late_fee_rate: dec!(0.10),
            late_fee_cap: dec!(100),
            assessment_due_days: 30,
        }
    }
}

impl BillingConfig {
    /// Loads configuration from environment variables prefixed `BILLING_`
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("BILLING"))
            .build()?
            .try_deserialize()
    }
}
