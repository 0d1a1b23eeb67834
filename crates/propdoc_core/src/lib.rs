//! # Propdoc Core
//!
//! Order- and comment-preserving `.properties` documents.
//!
//! This crate provides:
//! - A single-pass line parser that keeps every comment, blank line,
//!   separator and line terminator it reads
//! - [`Properties`], an insertion-ordered store with O(1) lookup by
//!   cooked key and in-place replacement
//! - A writer that re-emits untouched entries byte for byte and escapes
//!   only what was set through the API
//! - An optional defaults chain consulted by the property-style lookups
//! - Plain map and serde views for interop
//!
//! ## Usage
//!
//! ```
//! use propdoc_core::Properties;
//!
//! let text = "#comment\n\n! the greeting\ngreeting = hello\\tworld\n";
//! let mut props: Properties = text.parse().unwrap();
//!
//! assert_eq!(props.get("greeting"), Some("hello\tworld"));
//! assert_eq!(props.get_raw("greeting"), Some("hello\\tworld"));
//!
//! // Untouched documents are written back unchanged.
//! assert_eq!(props.to_string(), text);
//!
//! props.set_property("name", "Zoë", ["who to greet"]);
//! assert!(props.to_string().ends_with("# who to greet\nname=Zo\\u00EB\n"));
//! ```
//!
//! Stores are plain single-threaded values: share them across threads
//! behind a lock if needed.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod cursor;
mod defaults;
mod entry;
mod error;
mod interop;
mod line;
mod parser;
mod properties;
mod writer;

pub use config::{CommentMarker, Config, Newline};
pub use cursor::Cursor;
pub use entry::Entry;
pub use error::{CoreError, CoreResult};
pub use line::{LineEnding, RawLine};
pub use properties::Properties;

pub use propdoc_codec::{escape_key, escape_value, unescape_key, unescape_value, CodecError};
