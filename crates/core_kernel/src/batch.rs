//! Batch operation results
//!
//! Every scheduler and matcher runs as a single-pass batch job. One item's
//! failure never aborts the batch; instead failures are accumulated here and
//! returned alongside the success count so callers can report partial
//! success with reasons.

use serde::{Deserialize, Serialize};

/// A single item that was skipped or failed during a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailure {
    /// Identifier of the item (template, schedule, property, transaction)
    pub item: String,
    /// Why the item was skipped
    pub reason: String,
}

/// Structured result of a batch operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Number of items successfully processed
    pub processed: u32,
    /// Items skipped or failed, with reasons
    pub failures: Vec<ItemFailure>,
}

impl BatchOutcome {
    /// Creates an empty outcome
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successfully processed item
    pub fn record_success(&mut self) {
        self.processed += 1;
    }

    /// Records a skipped or failed item
    pub fn record_failure(&mut self, item: impl ToString, reason: impl ToString) {
        self.failures.push(ItemFailure {
            item: item.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Returns true if every item processed successfully
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Merges another outcome into this one
    pub fn merge(&mut self, other: BatchOutcome) {
        self.processed += other.processed;
        self.failures.extend(other.failures);
    }
}
