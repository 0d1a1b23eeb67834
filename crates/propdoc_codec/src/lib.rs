//! # Propdoc Codec
//!
//! Escape/unescape codec for the `.properties` text format.
//!
//! Every key and value exists in two forms:
//! - **raw**: the exact text found on disk, escapes not decoded
//! - **cooked**: the logical string an application reads and writes
//!
//! ## Escapes
//!
//! - `\t \n \r \f \\` map to their control characters
//! - `\uXXXX` is one UTF-16 code unit; surrogate pairs are combined
//! - a backslash before a line terminator joins two physical lines and
//!   swallows the indentation of the second one
//! - a backslash before any other character yields that character
//!
//! ## Usage
//!
//! ```
//! use propdoc_codec::{escape_key, escape_value, unescape_key, unescape_value};
//!
//! let raw = escape_value("tab\there");
//! assert_eq!(raw, "tab\\there");
//! assert_eq!(unescape_value(&raw).unwrap(), "tab\there");
//!
//! assert_eq!(escape_key(" with spaces"), "\\ with\\ spaces");
//! assert_eq!(unescape_key("\\ with\\ spaces").unwrap(), " with spaces");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod escape;
mod unescape;

pub use error::{CodecError, CodecResult};
pub use escape::{escape, escape_key, escape_value, EscapeTarget};
pub use unescape::{
    has_continuation, is_layout_whitespace, unescape_key, unescape_value, Unescaper,
};
