//! Core Kernel - Foundational types and utilities for the HOA finance engine
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Temporal types for billing cadences and statement periods
//! - Strongly-typed entity identifiers
//! - Port error taxonomy and batch result types

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod batch;
pub mod error;

pub use money::{Money, Currency, MoneyError, BALANCE_TOLERANCE};
pub use temporal::{Frequency, DateRange, TemporalError, days_between};
pub use identifiers::{
    AssociationId, PropertyId, ResidentId, GlAccountId, JournalEntryId, LineItemId,
    TemplateId, AssessmentScheduleId, AssessmentId,
    BankTransactionId, ReconciliationId, ReconciliationItemId,
    CaseId, ForecastId, UserId,
};
pub use ports::{PortError, DomainPort};
pub use batch::{BatchOutcome, ItemFailure};
pub use error::CoreError;
