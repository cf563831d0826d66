//! In-Memory Store Adapter
//!
//! A single adapter implementing every domain store port over one
//! mutex-guarded state, standing in for the production relational store.
//! The conditional-update methods have real compare-and-set semantics so
//! service tests exercise the same race-handling paths the production
//! adapter provides.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};

use core_kernel::{
    AssessmentId, AssessmentScheduleId, AssociationId, BankTransactionId, CaseId, DateRange,
    DomainPort, GlAccountId, JournalEntryId, LineItemId, Money, PortError, PropertyId,
    ReconciliationId, TemplateId,
};
use domain_billing::{
    Assessment, AssessmentSchedule, BillingStore, PaymentStatus, RecurringEntryTemplate,
};
use domain_collections::{CaseStatus, CollectionCase, CollectionStage, CollectionsStore, PropertyReceivables};
use domain_forecast::{CashFlowForecast, ForecastStore};
use domain_ledger::{BookLine, EntryStatus, GlAccount, JournalEntry, LedgerStore};
use domain_reconciliation::{
    BankReconciliation, BankReconciliationItem, BankTransaction, ReconciliationStore,
};

#[derive(Default)]
struct State {
    accounts: HashMap<GlAccountId, GlAccount>,
    entries: HashMap<JournalEntryId, JournalEntry>,
    templates: HashMap<TemplateId, RecurringEntryTemplate>,
    schedules: HashMap<AssessmentScheduleId, AssessmentSchedule>,
    properties: HashMap<AssociationId, Vec<PropertyId>>,
    assessments: HashMap<AssessmentId, Assessment>,
    reconciliations: HashMap<ReconciliationId, BankReconciliation>,
    transactions: HashMap<BankTransactionId, BankTransaction>,
    transaction_scope: HashMap<ReconciliationId, Vec<BankTransactionId>>,
    items: Vec<BankReconciliationItem>,
    receivables: HashMap<AssociationId, Vec<PropertyReceivables>>,
    cases: HashMap<CaseId, CollectionCase>,
    case_sequences: HashMap<(AssociationId, i32, u32), u32>,
    forecasts: HashMap<(AssociationId, NaiveDate), CashFlowForecast>,
}

/// In-memory store implementing all domain ports
#[derive(Default)]
pub struct InMemoryFinanceStore {
    state: Mutex<State>,
}

impl InMemoryFinanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("store state lock")
    }

    // --- seeding -------------------------------------------------------

    pub fn put_account(&self, account: GlAccount) {
        self.state().accounts.insert(account.id, account);
    }

    pub fn put_template(&self, template: RecurringEntryTemplate) {
        self.state().templates.insert(template.id, template);
    }

    pub fn put_schedule(&self, schedule: AssessmentSchedule) {
        self.state().schedules.insert(schedule.id, schedule);
    }

    pub fn put_property(&self, association_id: AssociationId, property_id: PropertyId) {
        self.state()
            .properties
            .entry(association_id)
            .or_default()
            .push(property_id);
    }

    pub fn put_assessment(&self, assessment: Assessment) {
        self.state().assessments.insert(assessment.id, assessment);
    }

    pub fn put_reconciliation(&self, reconciliation: BankReconciliation) {
        self.state()
            .reconciliations
            .insert(reconciliation.id, reconciliation);
    }

    /// Seeds a bank transaction into a reconciliation session's scope
    pub fn put_transaction(
        &self,
        reconciliation_id: ReconciliationId,
        transaction: BankTransaction,
    ) {
        let mut state = self.state();
        state
            .transaction_scope
            .entry(reconciliation_id)
            .or_default()
            .push(transaction.id);
        state.transactions.insert(transaction.id, transaction);
    }

    pub fn put_receivables(&self, association_id: AssociationId, aging: PropertyReceivables) {
        self.state()
            .receivables
            .entry(association_id)
            .or_default()
            .push(aging);
    }

    pub fn put_case(&self, case: CollectionCase) {
        self.state().cases.insert(case.id, case);
    }

    pub fn put_forecast(&self, forecast: CashFlowForecast) {
        self.state()
            .forecasts
            .insert((forecast.association_id, forecast.forecast_date), forecast);
    }

    // --- inspection ----------------------------------------------------

    pub fn account(&self, id: GlAccountId) -> Option<GlAccount> {
        self.state().accounts.get(&id).cloned()
    }

    pub fn entries_for(&self, association_id: AssociationId) -> Vec<JournalEntry> {
        let mut entries: Vec<JournalEntry> = self
            .state()
            .entries
            .values()
            .filter(|e| e.association_id == association_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.entry_number.cmp(&b.entry_number));
        entries
    }

    pub fn template(&self, id: TemplateId) -> Option<RecurringEntryTemplate> {
        self.state().templates.get(&id).cloned()
    }

    pub fn schedule(&self, id: AssessmentScheduleId) -> Option<AssessmentSchedule> {
        self.state().schedules.get(&id).cloned()
    }

    pub fn assessments_for(&self, association_id: AssociationId) -> Vec<Assessment> {
        self.state()
            .assessments
            .values()
            .filter(|a| a.association_id == association_id)
            .cloned()
            .collect()
    }

    pub fn transaction(&self, id: BankTransactionId) -> Option<BankTransaction> {
        self.state().transactions.get(&id).cloned()
    }

    pub fn reconciliation(&self, id: ReconciliationId) -> Option<BankReconciliation> {
        self.state().reconciliations.get(&id).cloned()
    }

    pub fn items_for(&self, reconciliation_id: ReconciliationId) -> Vec<BankReconciliationItem> {
        self.state()
            .items
            .iter()
            .filter(|i| i.reconciliation_id == reconciliation_id)
            .cloned()
            .collect()
    }

    pub fn case(&self, id: CaseId) -> Option<CollectionCase> {
        self.state().cases.get(&id).cloned()
    }

    pub fn cases_for(&self, association_id: AssociationId) -> Vec<CollectionCase> {
        let mut cases: Vec<CollectionCase> = self
            .state()
            .cases
            .values()
            .filter(|c| c.association_id == association_id)
            .cloned()
            .collect();
        cases.sort_by(|a, b| a.case_number.cmp(&b.case_number));
        cases
    }

    pub fn forecasts_for(&self, association_id: AssociationId) -> Vec<CashFlowForecast> {
        let mut forecasts: Vec<CashFlowForecast> = self
            .state()
            .forecasts
            .values()
            .filter(|f| f.association_id == association_id)
            .cloned()
            .collect();
        forecasts.sort_by_key(|f| f.forecast_date);
        forecasts
    }
}

impl DomainPort for InMemoryFinanceStore {}

#[async_trait]
impl LedgerStore for InMemoryFinanceStore {
    async fn get_account(&self, id: GlAccountId) -> Result<GlAccount, PortError> {
        self.state()
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("GlAccount", id))
    }

    async fn list_accounts(
        &self,
        association_id: AssociationId,
    ) -> Result<Vec<GlAccount>, PortError> {
        let mut accounts: Vec<GlAccount> = self
            .state()
            .accounts
            .values()
            .filter(|a| a.association_id == association_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    async fn insert_posted_entry(&self, entry: &JournalEntry) -> Result<(), PortError> {
        let mut state = self.state();

        if entry.status != EntryStatus::Posted {
            return Err(PortError::validation(format!(
                "entry {} is not posted",
                entry.entry_number
            )));
        }
        if state
            .entries
            .values()
            .any(|e| e.entry_number == entry.entry_number)
        {
            return Err(PortError::conflict(format!(
                "entry number {} already exists",
                entry.entry_number
            )));
        }
        for line in &entry.line_items {
            if !state.accounts.contains_key(&line.account_id) {
                return Err(PortError::not_found("GlAccount", line.account_id));
            }
        }

        // Apply postings on copies so a mid-way failure touches nothing.
        let mut staged: HashMap<GlAccountId, GlAccount> = HashMap::new();
        for line in &entry.line_items {
            let account = staged
                .entry(line.account_id)
                .or_insert_with(|| state.accounts[&line.account_id].clone());
            account
                .apply_posting(line.debit, line.credit)
                .map_err(|e| PortError::computation(e.to_string()))?;
        }
        for (id, account) in staged {
            state.accounts.insert(id, account);
        }
        state.entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn get_entry(&self, id: JournalEntryId) -> Result<JournalEntry, PortError> {
        self.state()
            .entries
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("JournalEntry", id))
    }

    async fn list_unmatched_lines(
        &self,
        account_id: GlAccountId,
        window: DateRange,
    ) -> Result<Vec<BookLine>, PortError> {
        let state = self.state();
        let mut lines = Vec::new();
        for entry in state.entries.values() {
            if !window.contains(entry.entry_date) {
                continue;
            }
            for line in &entry.line_items {
                if line.account_id != account_id || line.is_matched {
                    continue;
                }
                let amount = line
                    .debit
                    .checked_sub(&line.credit)
                    .map_err(|e| PortError::computation(e.to_string()))?;
                lines.push(BookLine {
                    line_item_id: line.id,
                    entry_id: entry.id,
                    account_id: line.account_id,
                    entry_date: entry.entry_date,
                    amount,
                });
            }
        }
        lines.sort_by_key(|l| l.entry_date);
        Ok(lines)
    }

    async fn claim_line_item(
        &self,
        line_item_id: LineItemId,
        bank_transaction_id: BankTransactionId,
    ) -> Result<bool, PortError> {
        let mut state = self.state();
        for entry in state.entries.values_mut() {
            if let Some(line) = entry.line_items.iter_mut().find(|l| l.id == line_item_id) {
                if line.is_matched {
                    return Ok(false);
                }
                line.is_matched = true;
                line.matched_bank_transaction_id = Some(bank_transaction_id);
                return Ok(true);
            }
        }
        Err(PortError::not_found("JournalLineItem", line_item_id))
    }

    async fn release_line_item(&self, line_item_id: LineItemId) -> Result<(), PortError> {
        let mut state = self.state();
        for entry in state.entries.values_mut() {
            if let Some(line) = entry.line_items.iter_mut().find(|l| l.id == line_item_id) {
                line.is_matched = false;
                line.matched_bank_transaction_id = None;
                return Ok(());
            }
        }
        Err(PortError::not_found("JournalLineItem", line_item_id))
    }
}

#[async_trait]
impl BillingStore for InMemoryFinanceStore {
    async fn list_due_templates(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
    ) -> Result<Vec<RecurringEntryTemplate>, PortError> {
        let mut templates: Vec<RecurringEntryTemplate> = self
            .state()
            .templates
            .values()
            .filter(|t| t.association_id == association_id && t.is_due(as_of))
            .cloned()
            .collect();
        templates.sort_by_key(|t| t.next_run_date);
        Ok(templates)
    }

    async fn advance_template(
        &self,
        id: TemplateId,
        expected: NaiveDate,
        next: NaiveDate,
    ) -> Result<bool, PortError> {
        let mut state = self.state();
        let template = state
            .templates
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("RecurringEntryTemplate", id))?;
        if template.next_run_date != expected {
            return Ok(false);
        }
        template.next_run_date = next;
        Ok(true)
    }

    async fn list_due_schedules(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
    ) -> Result<Vec<AssessmentSchedule>, PortError> {
        let mut schedules: Vec<AssessmentSchedule> = self
            .state()
            .schedules
            .values()
            .filter(|s| s.association_id == association_id && s.is_due(as_of))
            .cloned()
            .collect();
        schedules.sort_by_key(|s| s.next_generation_date);
        Ok(schedules)
    }

    async fn advance_schedule(
        &self,
        id: AssessmentScheduleId,
        expected: NaiveDate,
        next: NaiveDate,
        generated_at: DateTime<Utc>,
    ) -> Result<bool, PortError> {
        let mut state = self.state();
        let schedule = state
            .schedules
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("AssessmentSchedule", id))?;
        if schedule.next_generation_date != expected {
            return Ok(false);
        }
        schedule.next_generation_date = next;
        schedule.last_generated_at = Some(generated_at);
        Ok(true)
    }

    async fn list_properties(
        &self,
        association_id: AssociationId,
    ) -> Result<Vec<PropertyId>, PortError> {
        Ok(self
            .state()
            .properties
            .get(&association_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_assessment(&self, assessment: &Assessment) -> Result<(), PortError> {
        let mut state = self.state();
        let duplicate = state.assessments.values().any(|a| {
            a.schedule_id.is_some()
                && a.schedule_id == assessment.schedule_id
                && a.property_id == assessment.property_id
                && a.due_date == assessment.due_date
        });
        if duplicate {
            return Err(PortError::conflict(format!(
                "assessment for property {} already generated for {}",
                assessment.property_id, assessment.due_date
            )));
        }
        state.assessments.insert(assessment.id, assessment.clone());
        Ok(())
    }

    async fn list_unpaid_assessments(
        &self,
        association_id: AssociationId,
        due_on_or_before: NaiveDate,
    ) -> Result<Vec<Assessment>, PortError> {
        let mut assessments: Vec<Assessment> = self
            .state()
            .assessments
            .values()
            .filter(|a| {
                a.association_id == association_id
                    && a.payment_status == PaymentStatus::Unpaid
                    && a.due_date <= due_on_or_before
            })
            .cloned()
            .collect();
        assessments.sort_by_key(|a| a.due_date);
        Ok(assessments)
    }

    async fn set_late_fee(&self, id: AssessmentId, fee: Money) -> Result<bool, PortError> {
        let mut state = self.state();
        let assessment = state
            .assessments
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Assessment", id))?;
        if assessment.late_fee.is_some() {
            return Ok(false);
        }
        assessment.late_fee = Some(fee);
        Ok(true)
    }
}

#[async_trait]
impl ReconciliationStore for InMemoryFinanceStore {
    async fn get_reconciliation(
        &self,
        id: ReconciliationId,
    ) -> Result<BankReconciliation, PortError> {
        self.state()
            .reconciliations
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("BankReconciliation", id))
    }

    async fn update_reconciliation(
        &self,
        reconciliation: &BankReconciliation,
    ) -> Result<(), PortError> {
        let mut state = self.state();
        if !state.reconciliations.contains_key(&reconciliation.id) {
            return Err(PortError::not_found("BankReconciliation", reconciliation.id));
        }
        state
            .reconciliations
            .insert(reconciliation.id, reconciliation.clone());
        Ok(())
    }

    async fn list_transactions(
        &self,
        reconciliation_id: ReconciliationId,
    ) -> Result<Vec<BankTransaction>, PortError> {
        let state = self.state();
        let ids = state
            .transaction_scope
            .get(&reconciliation_id)
            .cloned()
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| state.transactions.get(id).cloned())
            .collect())
    }

    async fn list_unmatched_transactions(
        &self,
        reconciliation_id: ReconciliationId,
    ) -> Result<Vec<BankTransaction>, PortError> {
        let transactions = self.list_transactions(reconciliation_id).await?;
        Ok(transactions.into_iter().filter(|t| !t.is_matched).collect())
    }

    async fn claim_transaction(
        &self,
        id: BankTransactionId,
        line_item_id: LineItemId,
    ) -> Result<bool, PortError> {
        let mut state = self.state();
        let transaction = state
            .transactions
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("BankTransaction", id))?;
        if transaction.is_matched {
            return Ok(false);
        }
        transaction.is_matched = true;
        transaction.matched_line_item_id = Some(line_item_id);
        Ok(true)
    }

    async fn insert_item(&self, item: &BankReconciliationItem) -> Result<(), PortError> {
        self.state().items.push(item.clone());
        Ok(())
    }
}

#[async_trait]
impl CollectionsStore for InMemoryFinanceStore {
    async fn list_overdue_receivables(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
    ) -> Result<Vec<PropertyReceivables>, PortError> {
        Ok(self
            .state()
            .receivables
            .get(&association_id)
            .map(|aging| {
                aging
                    .iter()
                    .filter(|r| r.oldest_due_date < as_of)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_open_case(
        &self,
        property_id: PropertyId,
    ) -> Result<Option<CollectionCase>, PortError> {
        Ok(self
            .state()
            .cases
            .values()
            .find(|c| c.property_id == property_id && c.case_status == CaseStatus::Open)
            .cloned())
    }

    async fn next_case_sequence(
        &self,
        association_id: AssociationId,
        period: NaiveDate,
    ) -> Result<u32, PortError> {
        let mut state = self.state();
        let counter = state
            .case_sequences
            .entry((association_id, period.year(), period.month()))
            .or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn create_case(&self, case: &CollectionCase) -> Result<(), PortError> {
        let mut state = self.state();
        let open_exists = state
            .cases
            .values()
            .any(|c| c.property_id == case.property_id && c.case_status == CaseStatus::Open);
        if open_exists {
            return Err(PortError::conflict(format!(
                "property {} already has an open case",
                case.property_id
            )));
        }
        state.cases.insert(case.id, case.clone());
        Ok(())
    }

    async fn update_case_if_stage(
        &self,
        id: CaseId,
        expected_stage: CollectionStage,
        updated: &CollectionCase,
    ) -> Result<bool, PortError> {
        let mut state = self.state();
        let case = state
            .cases
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("CollectionCase", id))?;
        if case.collection_stage != expected_stage {
            return Ok(false);
        }
        *case = updated.clone();
        Ok(true)
    }

    async fn save_case(&self, case: &CollectionCase) -> Result<(), PortError> {
        let mut state = self.state();
        if !state.cases.contains_key(&case.id) {
            return Err(PortError::not_found("CollectionCase", case.id));
        }
        state.cases.insert(case.id, case.clone());
        Ok(())
    }

    async fn get_case(&self, id: CaseId) -> Result<CollectionCase, PortError> {
        self.state()
            .cases
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("CollectionCase", id))
    }
}

#[async_trait]
impl ForecastStore for InMemoryFinanceStore {
    async fn upsert_forecast(&self, forecast: &CashFlowForecast) -> Result<(), PortError> {
        let mut state = self.state();
        let key = (forecast.association_id, forecast.forecast_date);
        let mut stored = forecast.clone();
        // Recorded actuals survive regeneration of the projection.
        if let Some(existing) = state.forecasts.get(&key) {
            stored.id = existing.id;
            stored.actual_receipts = existing.actual_receipts;
            stored.actual_disbursements = existing.actual_disbursements;
            stored.actual_balance = existing.actual_balance;
        }
        state.forecasts.insert(key, stored);
        Ok(())
    }

    async fn list_forecasts_after(
        &self,
        association_id: AssociationId,
        after: NaiveDate,
    ) -> Result<Vec<CashFlowForecast>, PortError> {
        let mut forecasts: Vec<CashFlowForecast> = self
            .state()
            .forecasts
            .values()
            .filter(|f| f.association_id == association_id && f.forecast_date > after)
            .cloned()
            .collect();
        forecasts.sort_by_key(|f| f.forecast_date);
        Ok(forecasts)
    }

    async fn list_history(
        &self,
        association_id: AssociationId,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<CashFlowForecast>, PortError> {
        let mut history: Vec<CashFlowForecast> = self
            .state()
            .forecasts
            .values()
            .filter(|f| f.association_id == association_id && f.forecast_date <= as_of)
            .cloned()
            .collect();
        history.sort_by_key(|f| std::cmp::Reverse(f.forecast_date));
        history.truncate(limit);
        Ok(history)
    }
}
