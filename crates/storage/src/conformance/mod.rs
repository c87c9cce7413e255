//! Conformance test suite for `KeyValueStore` implementations.
//!
//! This module provides a backend-agnostic test suite that any backend can
//! run to verify it behaves like browser local storage. The suite covers:
//!
//! - **Round trip**: set/get, overwrite, opaque values
//! - **Removal**: remove, remove of a missing key, re-set after remove
//! - **Keys**: key independence, invalid-key rejection
//!
//! # Usage
//!
//! Backends call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty store for each test:
//!
//! ```ignore
//! use kudos_storage::conformance::run_conformance_suite;
//!
//! #[test]
//! fn my_store_conformance() {
//!     let report = run_conformance_suite(MyStore::new);
//!     assert!(report.is_clean(), "{report}");
//! }
//! ```

mod keys;
mod remove;
mod roundtrip;

use std::fmt;

use crate::KeyValueStore;

/// One named check and how it went.
#[derive(Debug, Clone)]
pub struct Check {
    /// Group the check belongs to: "roundtrip", "remove" or "keys".
    pub category: &'static str,
    pub name: &'static str,
    pub outcome: Result<(), String>,
}

impl Check {
    fn new(category: &'static str, name: &'static str, outcome: Result<(), String>) -> Self {
        Check {
            category,
            name,
            outcome,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Every check from one suite run, in execution order.
#[derive(Debug, Clone, Default)]
pub struct ConformanceReport {
    pub checks: Vec<Check>,
}

impl ConformanceReport {
    /// True when no check failed.
    pub fn is_clean(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|check| !check.passed())
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failures().count();
        write!(f, "{} checks, {} failing", self.checks.len(), failed)?;
        for check in self.failures() {
            if let Err(reason) = &check.outcome {
                write!(f, "\n  {}::{}: {}", check.category, check.name, reason)?;
            }
        }
        Ok(())
    }
}

/// Run every check against stores built by `factory`.
///
/// `factory` is called once per check and must return an empty store.
pub fn run_conformance_suite<S, F>(factory: F) -> ConformanceReport
where
    S: KeyValueStore,
    F: Fn() -> S,
{
    let mut checks = roundtrip::run_roundtrip_tests(&factory);
    checks.extend(remove::run_remove_tests(&factory));
    checks.extend(keys::run_key_tests(&factory));
    ConformanceReport { checks }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn expect_value<S: KeyValueStore>(s: &S, key: &str, expected: Option<&str>) -> Result<(), String> {
    let got = s.get(key).map_err(|e| e.to_string())?;
    if got.as_deref() != expected {
        return Err(format!(
            "key {:?}: expected {:?}, got {:?}",
            key, expected, got
        ));
    }
    Ok(())
}
