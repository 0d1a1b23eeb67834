//! Benchmark utilities for propdoc.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
