//! Strongly-typed identifiers for domain entities
//!
//! Using newtype wrappers around UUIDs provides type safety and prevents
//! accidental mixing of different identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }

            /// Returns the first eight hex characters of the UUID
            ///
            /// Used where a short, stable suffix is embedded in a
            /// human-readable document number.
            pub fn short(&self) -> String {
                self.0.simple().to_string()[..8].to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

// Association scoping
define_id!(AssociationId, "ASSN");
define_id!(PropertyId, "PROP");
define_id!(ResidentId, "RSDT");

// Ledger domain identifiers
define_id!(GlAccountId, "GLA");
define_id!(JournalEntryId, "JNL");
define_id!(LineItemId, "JLI");

// Billing domain identifiers
define_id!(TemplateId, "RJT");
define_id!(AssessmentScheduleId, "ASCH");
define_id!(AssessmentId, "ASMT");

// Reconciliation domain identifiers
define_id!(BankTransactionId, "BTXN");
define_id!(ReconciliationId, "RECON");
define_id!(ReconciliationItemId, "RITM");

// Collections domain identifiers
define_id!(CaseId, "CASE");

// Forecast domain identifiers
define_id!(ForecastId, "FCST");

// Identity collaborator
define_id!(UserId, "USR");
