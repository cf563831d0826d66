//! Test Utilities Crate
//!
//! Provides shared test infrastructure for the HOA finance engine test
//! suite.
//!
//! # Modules
//!
//! - `memory`: In-memory store adapter implementing every domain port
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `assertions`: Custom assertion helpers for domain types

pub mod memory;
pub mod fixtures;
pub mod builders;
pub mod assertions;

pub use memory::*;
pub use fixtures::*;
pub use builders::*;
pub use assertions::*;

use once_cell::sync::Lazy;

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

/// Installs the test tracing subscriber once per process
///
/// Safe to call from every test; only the first call does anything.
/// Filtering follows `RUST_LOG`.
pub fn init_tracing() {
    Lazy::force(&TRACING);
}
