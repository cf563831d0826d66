//! Billing Domain - Recurring Entries and Assessment Billing
//!
//! Two unattended schedulers live here:
//!
//! - The **recurring entry scheduler** turns journal-entry templates into
//!   posted, balanced ledger entries on a cadence, advancing each
//!   template's next-run date at most once per period.
//! - The **assessment billing scheduler** fans active assessment schedules
//!   out to one charge per property and applies a one-time late fee to
//!   assessments past their grace period.
//!
//! Both are single-pass batch jobs driven by an external trigger. One
//! item's failure never aborts the run; results come back as a
//! [`core_kernel::BatchOutcome`].

pub mod recurring;
pub mod assessments;
pub mod scheduler;
pub mod ports;
pub mod config;
pub mod error;

pub use recurring::{LineBlueprint, RecurringEntryTemplate};
pub use assessments::{compute_late_fee, Assessment, AssessmentSchedule, PaymentStatus};
pub use scheduler::{AssessmentBillingScheduler, RecurringEntryScheduler};
pub use ports::BillingStore;
pub use config::BillingConfig;
pub use error::BillingError;
