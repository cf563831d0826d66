//! Collections Domain - Delinquent Account Workflow
//!
//! Tracks delinquent accounts from first notice through demand, legal
//! action, settlement, or closure. Stage progression is monotonic: a case
//! only ever escalates, except for the explicit terminal transitions into
//! `settled` or `closed`. The automatic pass reads receivable aging and
//! creates or escalates cases by policy.

pub mod case;
pub mod manager;
pub mod ports;
pub mod error;

pub use case::{format_case_number, CaseStatus, CollectionCase, CollectionStage};
pub use manager::{CollectionsManager, CollectionsPolicy};
pub use ports::{CollectionsStore, PropertyReceivables};
pub use error::CollectionsError;
