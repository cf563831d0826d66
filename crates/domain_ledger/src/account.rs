//! General ledger accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AssociationId, GlAccountId, Money, MoneyError};

/// The five fundamental account types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountType {
    /// Returns true if debits increase this account's balance
    ///
    /// Asset and expense accounts are debit-normal; liability, equity,
    /// and revenue accounts are credit-normal.
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }
}

/// Finer-grained classification within an account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSubtype {
    Current,
    LongTerm,
    Operating,
    Reserve,
}

/// A general ledger account
///
/// The `balance` field is maintained exclusively by the store when posted
/// line items are applied; nothing else writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlAccount {
    /// Unique identifier
    pub id: GlAccountId,
    /// Owning association
    pub association_id: AssociationId,
    /// Account code (e.g., "1010")
    pub code: String,
    /// Account name (e.g., "Operating Checking")
    pub name: String,
    /// Fundamental type
    pub account_type: AccountType,
    /// Classification within the type
    pub subtype: AccountSubtype,
    /// Running balance, derived from posted line items
    pub balance: Money,
    /// Whether the account accepts new postings
    pub is_active: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl GlAccount {
    /// Creates a new active account with a zero balance
    pub fn new(
        association_id: AssociationId,
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
        subtype: AccountSubtype,
        currency: core_kernel::Currency,
    ) -> Self {
        Self {
            id: GlAccountId::new_v7(),
            association_id,
            code: code.into(),
            name: name.into(),
            account_type,
            subtype,
            balance: Money::zero(currency),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Returns true if this is a cash-equivalent asset account
    ///
    /// The cash-flow forecaster sums these for the association's current
    /// cash position.
    pub fn is_cash_account(&self) -> bool {
        if self.account_type != AccountType::Asset {
            return false;
        }
        let name = self.name.to_lowercase();
        name.contains("cash") || name.contains("checking") || name.contains("savings")
    }

    /// Applies one posted line item to the running balance
    ///
    /// The signed change depends on whether the account is debit-normal.
    pub fn apply_posting(&mut self, debit: Money, credit: Money) -> Result<(), MoneyError> {
        let change = if self.account_type.is_debit_normal() {
            debit.checked_sub(&credit)?
        } else {
            credit.checked_sub(&debit)?
        };
        self.balance = self.balance.checked_add(&change)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn account(name: &str, account_type: AccountType) -> GlAccount {
        GlAccount::new(
            AssociationId::new(),
            "1010",
            name,
            account_type,
            AccountSubtype::Current,
            Currency::USD,
        )
    }

    #[test]
    fn test_debit_normal() {
        assert!(AccountType::Asset.is_debit_normal());
        assert!(AccountType::Expense.is_debit_normal());
        assert!(!AccountType::Liability.is_debit_normal());
        assert!(!AccountType::Equity.is_debit_normal());
        assert!(!AccountType::Revenue.is_debit_normal());
    }

    #[test]
    fn test_cash_account_detection() {
        assert!(account("Operating Checking", AccountType::Asset).is_cash_account());
        assert!(account("Petty Cash", AccountType::Asset).is_cash_account());
        assert!(account("Reserve Savings", AccountType::Asset).is_cash_account());
        assert!(!account("Assessments Receivable", AccountType::Asset).is_cash_account());
        // A revenue account named "Cash Donations" is not a cash position
        assert!(!account("Cash Donations", AccountType::Revenue).is_cash_account());
    }

    #[test]
    fn test_apply_posting_debit_normal() {
        let mut cash = account("Cash", AccountType::Asset);
        let usd = |d: rust_decimal::Decimal| Money::new(d, Currency::USD);
        cash.apply_posting(usd(dec!(500)), Money::zero(Currency::USD))
            .unwrap();
        assert_eq!(cash.balance, usd(dec!(500)));
        cash.apply_posting(Money::zero(Currency::USD), usd(dec!(200)))
            .unwrap();
        assert_eq!(cash.balance, usd(dec!(300)));
    }

    #[test]
    fn test_apply_posting_credit_normal() {
        let mut revenue = account("Dues Revenue", AccountType::Revenue);
        let usd = |d: rust_decimal::Decimal| Money::new(d, Currency::USD);
        revenue
            .apply_posting(Money::zero(Currency::USD), usd(dec!(500)))
            .unwrap();
        assert_eq!(revenue.balance, usd(dec!(500)));
    }
}
