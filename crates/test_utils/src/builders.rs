//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant
//! fields while using defaults for everything else.

use chrono::NaiveDate;
use core_kernel::{AssociationId, Currency, Frequency, GlAccountId, Money, PropertyId, ResidentId};
use domain_billing::{AssessmentSchedule, LineBlueprint, RecurringEntryTemplate};
use domain_collections::PropertyReceivables;
use domain_ledger::{AccountSubtype, AccountType, GlAccount};
use domain_reconciliation::{BankReconciliation, BankTransaction};

use crate::fixtures::{MoneyFixtures, TemporalFixtures};
use crate::memory::InMemoryFinanceStore;

/// A minimal association chart of accounts seeded into a store
///
/// Covers the accounts the automation services touch: a cash account for
/// reconciliation and forecasting, receivables and revenue for billing,
/// and an expense/payable pair for recurring accruals.
pub struct ChartOfAccounts {
    pub association_id: AssociationId,
    pub operating_cash: GlAccountId,
    pub assessments_receivable: GlAccountId,
    pub dues_revenue: GlAccountId,
    pub landscaping_expense: GlAccountId,
    pub accounts_payable: GlAccountId,
}

impl ChartOfAccounts {
    /// Seeds the standard chart into a store and returns the account ids
    pub fn seed(store: &InMemoryFinanceStore, association_id: AssociationId) -> Self {
        let accounts = [
            ("1010", "Operating Checking", AccountType::Asset, AccountSubtype::Operating),
            ("1200", "Assessments Receivable", AccountType::Asset, AccountSubtype::Current),
            ("4010", "Dues Revenue", AccountType::Revenue, AccountSubtype::Operating),
            ("6010", "Landscaping Expense", AccountType::Expense, AccountSubtype::Operating),
            ("2010", "Accounts Payable", AccountType::Liability, AccountSubtype::Current),
        ];
        let mut ids = Vec::with_capacity(accounts.len());
        for (code, name, account_type, subtype) in accounts {
            let account = GlAccount::new(
                association_id,
                code,
                name,
                account_type,
                subtype,
                Currency::USD,
            );
            ids.push(account.id);
            store.put_account(account);
        }
        Self {
            association_id,
            operating_cash: ids[0],
            assessments_receivable: ids[1],
            dues_revenue: ids[2],
            landscaping_expense: ids[3],
            accounts_payable: ids[4],
        }
    }
}

/// Builder for recurring entry templates
pub struct TemplateBuilder {
    association_id: AssociationId,
    name: String,
    frequency: Frequency,
    next_run_date: NaiveDate,
    lines: Vec<LineBlueprint>,
}

impl TemplateBuilder {
    /// Creates a builder with default values
    pub fn new(association_id: AssociationId) -> Self {
        Self {
            association_id,
            name: "Monthly landscaping accrual".to_string(),
            frequency: Frequency::Monthly,
            next_run_date: TemporalFixtures::period_start(),
            lines: Vec::new(),
        }
    }

    /// Sets the template name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the generation cadence
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Sets the next run date
    pub fn with_next_run_date(mut self, date: NaiveDate) -> Self {
        self.next_run_date = date;
        self
    }

    /// Adds a debit blueprint line
    pub fn debit(mut self, account_id: GlAccountId, amount: Money) -> Self {
        self.lines.push(LineBlueprint::debit(account_id, amount));
        self
    }

    /// Adds a credit blueprint line
    pub fn credit(mut self, account_id: GlAccountId, amount: Money) -> Self {
        self.lines.push(LineBlueprint::credit(account_id, amount));
        self
    }

    /// Builds the template
    pub fn build(self) -> RecurringEntryTemplate {
        RecurringEntryTemplate::new(
            self.association_id,
            self.name,
            self.frequency,
            self.next_run_date,
            self.lines,
        )
    }
}

/// Builder for assessment schedules
pub struct ScheduleBuilder {
    association_id: AssociationId,
    name: String,
    amount: Money,
    frequency: Frequency,
    next_generation_date: NaiveDate,
}

impl ScheduleBuilder {
    /// Creates a builder with default values
    pub fn new(association_id: AssociationId) -> Self {
        Self {
            association_id,
            name: "Monthly dues".to_string(),
            amount: MoneyFixtures::monthly_dues(),
            frequency: Frequency::Monthly,
            next_generation_date: TemporalFixtures::period_start(),
        }
    }

    /// Sets the per-property charge amount
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the generation cadence
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Sets the next generation date
    pub fn with_next_generation_date(mut self, date: NaiveDate) -> Self {
        self.next_generation_date = date;
        self
    }

    /// Builds the schedule
    pub fn build(self) -> AssessmentSchedule {
        AssessmentSchedule::new(
            self.association_id,
            self.name,
            self.amount,
            self.frequency,
            self.next_generation_date,
        )
    }
}

/// Builder for bank transactions within a reconciliation scope
pub struct BankTransactionBuilder {
    association_id: AssociationId,
    bank_account_id: GlAccountId,
    transaction_date: NaiveDate,
    amount: Money,
    description: String,
    is_cleared: bool,
}

impl BankTransactionBuilder {
    /// Creates a builder with default values
    pub fn new(association_id: AssociationId, bank_account_id: GlAccountId) -> Self {
        Self {
            association_id,
            bank_account_id,
            transaction_date: TemporalFixtures::statement_date(),
            amount: MoneyFixtures::deposit(),
            description: "ACH DEPOSIT".to_string(),
            is_cleared: true,
        }
    }

    /// Sets the transaction date
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.transaction_date = date;
        self
    }

    /// Sets the signed amount
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the bank-provided description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the transaction uncleared
    pub fn uncleared(mut self) -> Self {
        self.is_cleared = false;
        self
    }

    /// Builds the transaction
    pub fn build(self) -> BankTransaction {
        let transaction = BankTransaction::new(
            self.association_id,
            self.bank_account_id,
            self.transaction_date,
            self.amount,
            self.description,
        );
        if self.is_cleared {
            transaction.cleared()
        } else {
            transaction
        }
    }
}

/// Builds an in-progress reconciliation session with the given balances
pub fn reconciliation_session(
    association_id: AssociationId,
    bank_account_id: GlAccountId,
    beginning_balance: Money,
    statement_balance: Money,
) -> BankReconciliation {
    BankReconciliation::new(
        association_id,
        bank_account_id,
        TemporalFixtures::statement_date(),
        beginning_balance,
        statement_balance,
    )
}

/// Builds an aging record for a delinquent property
pub fn overdue_receivables(
    property_id: PropertyId,
    resident_id: Option<ResidentId>,
    total_owed: Money,
    oldest_due_date: NaiveDate,
) -> PropertyReceivables {
    PropertyReceivables {
        property_id,
        resident_id,
        total_owed,
        oldest_due_date,
    }
}
