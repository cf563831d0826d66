//! Forecast configuration

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use core_kernel::Currency;

/// Forecast and alerting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    /// Currency the association's books are kept in
    #[serde(default = "default_currency")]
    pub currency: Currency,
    /// Balance below which a critical alert fires
    pub minimum_balance: Decimal,
    /// Historical records feeding the trailing average
    pub trailing_window: usize,
    /// Months of history used for the burn rate
    pub burn_rate_months: usize,
    /// Burn rate above this fraction of the current balance raises a warning
    pub burn_rate_warning_ratio: Decimal,
}

fn default_currency() -> Currency {
    Currency::USD
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            minimum_balance: dec!(10000),
            trailing_window: 12,
            burn_rate_months: 6,
            burn_rate_warning_ratio: dec!(0.10),
        }
    }
}

impl ForecastConfig {
    /// Loads configuration from environment variables prefixed `FORECAST_`
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("FORECAST"))
            .build()?
            .try_deserialize()
    }
}
