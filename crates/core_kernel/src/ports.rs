//! Port abstractions for store access
//!
//! Each domain defines a repository-style port trait for the slice of the
//! ledger store it owns; adapters (a relational store in production, an
//! in-memory store in tests) implement those traits. This module provides
//! the shared error taxonomy and the marker trait all ports extend.
//!
//! The error variants map onto the batch-processing policy: `NotFound`,
//! `Conflict`, and `Computation` are per-item failures that skip the item
//! and let the batch continue; `Validation` aborts the operation for the
//! entity it concerns and is surfaced to the caller.

use std::fmt;
use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// A precondition was not met
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A conditional update lost a concurrent race or violated a
    /// uniqueness constraint
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// An arithmetic or state inconsistency that must not be persisted
    #[error("Computation error: {message}")]
    Computation { message: String },

    /// Connection to the underlying store failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An internal adapter error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Computation error
    pub fn computation(message: impl Into<String>) -> Self {
        PortError::Computation {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns true if this error is a lost concurrent-update race
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Marker trait for all domain store ports
///
/// All port traits extend this marker to ensure they are thread-safe and
/// usable behind `Arc<dyn ...>` in async contexts.
pub trait DomainPort: Send + Sync + 'static {}
