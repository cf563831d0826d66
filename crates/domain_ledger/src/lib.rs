//! Ledger Domain - Double-Entry Data Model
//!
//! This crate defines the shared ledger data model every automation service
//! operates over: GL accounts, journal entries, and line items, together
//! with the store port through which they are read and written.
//!
//! # Double-Entry Invariants
//!
//! - A posted journal entry balances: the sum of debits equals the sum of
//!   credits within a one-cent tolerance.
//! - Posted entries are immutable; corrections are made by posting a new
//!   offsetting entry, never by editing in place.
//! - Account balances are derived exclusively from posted line items; no
//!   component writes a balance directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{JournalEntry, EntrySource};
//!
//! let entry = JournalEntry::new(association_id, "AUTO-202501-1a2b3c4d", date, "Monthly dues", EntrySource::Recurring, actor)
//!     .debit(receivables, amount)
//!     .credit(dues_revenue, amount)
//!     .post()?;
//! ```

pub mod account;
pub mod entry;
pub mod store;
pub mod error;

pub use account::{AccountSubtype, AccountType, GlAccount};
pub use entry::{auto_entry_number, EntrySource, EntryStatus, JournalEntry, JournalLineItem};
pub use store::{BookLine, LedgerStore};
pub use error::LedgerError;
