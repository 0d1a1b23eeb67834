//! # Propdoc Testkit
//!
//! Test utilities for propdoc.
//!
//! This crate provides:
//! - The canonical sample document, its expected edit outputs and
//!   temporary file helpers
//! - Property-based test generators using proptest
//! - Golden test utilities for output verification
//! - A shadow-model harness for cross-crate integration tests
//! - Fuzz testing harnesses
//!
//! ## Usage
//!
//! ```
//! use propdoc_testkit::prelude::*;
//!
//! let mut harness = IntegrationHarness::from_store(sample());
//! harness.put("five", "5");
//! harness.remove("one");
//! harness.verify_all();
//! harness.verify_reload();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod golden;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::golden::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use golden::*;
pub use integration::*;
