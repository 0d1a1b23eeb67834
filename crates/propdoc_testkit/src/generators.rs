//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random keys, values, documents
//! and edit sequences that stay within what the format can carry.

use proptest::prelude::*;

/// Characters that exercise every escape path in keys and values.
const ALPHABET: &str = "[a-zA-Z0-9 ._=:#!\\\\\t\n\r\x0c\u{e9}\u{1234}\u{1F600}]";

/// Strategy for generating cooked keys.
///
/// Keys may hold spaces, separators and comment markers anywhere,
/// including at the start.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex(&format!("{ALPHABET}{{1,12}}")).expect("Invalid regex")
}

/// Strategy for generating plain dotted keys.
pub fn simple_key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9]{0,7}(\\.[a-z0-9]{1,5}){0,2}").expect("Invalid regex")
}

/// Strategy for generating cooked values that survive a store/load cycle.
///
/// Values are written with literal spaces, so a leading space would be
/// read back as part of the separator; generated values never start
/// with one.
pub fn value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex(&format!("({ALPHABET}{{0,24}})")).expect("Invalid regex")
        .prop_filter("Value must not start with a space", |s| !s.starts_with(' '))
}

/// Strategy for generating comment text without markers.
pub fn comment_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::string::string_regex("[a-zA-Z0-9 .,]{0,20}").expect("Invalid regex"),
        0..3,
    )
}

/// Strategy for generating documents in the on-disk format.
///
/// Lines mix comments, blank lines, all separator styles, continued
/// values and every line terminator, with or without a final newline.
/// Every key is suffixed with its line number, so keys never repeat.
pub fn document_strategy() -> impl Strategy<Value = String> {
    let line = prop_oneof![
        3 => (simple_key_strategy(), "( = |=|:| : | |\t)", "[a-zA-Z0-9 .]{0,10}")
            .prop_map(|(k, sep, v)| DocLine::entry("", k, format!("{sep}{v}"))),
        1 => (simple_key_strategy(), "[a-z]{1,5}", "[a-z]{1,5}")
            .prop_map(|(k, a, b)| DocLine::entry("  ", k, format!(" = {a} \\\n    {b}"))),
        1 => (simple_key_strategy(), "[0-9A-C][0-9A-F]{3}")
            .prop_map(|(k, hex)| DocLine::entry("", k, format!("=\\u{hex}"))),
        1 => "[#!][a-zA-Z0-9 ]{0,15}".prop_map(DocLine::Other),
        1 => "[ \t]{0,3}".prop_map(DocLine::Other),
    ];
    (
        prop::collection::vec((line, "(\n|\r\n|\r)"), 0..16),
        any::<bool>(),
    )
        .prop_map(|(lines, final_newline)| {
            let mut doc = String::new();
            let count = lines.len();
            for (i, (line, ending)) in lines.into_iter().enumerate() {
                match line {
                    DocLine::Entry { indent, key, rest } => {
                        doc.push_str(&format!("{indent}{key}_{i}{rest}"));
                    }
                    DocLine::Other(text) => doc.push_str(&text),
                }
                if i + 1 < count || final_newline {
                    doc.push_str(&ending);
                }
            }
            doc
        })
}

#[derive(Debug, Clone)]
enum DocLine {
    Entry {
        indent: &'static str,
        key: String,
        rest: String,
    },
    Other(String),
}

impl DocLine {
    fn entry(indent: &'static str, key: String, rest: String) -> Self {
        Self::Entry { indent, key, rest }
    }
}

/// An edit applied to a store during a generated test.
#[derive(Debug, Clone)]
pub enum PropertyOperation {
    /// Set a cooked value.
    Put {
        /// Cooked key
        key: String,
        /// Cooked value
        value: String,
    },
    /// Set a value and replace the comment.
    SetProperty {
        /// Cooked key
        key: String,
        /// Cooked value
        value: String,
        /// Comment text
        comment: Vec<String>,
    },
    /// Remove a key.
    Remove {
        /// Cooked key
        key: String,
    },
    /// Read a key.
    Get {
        /// Cooked key
        key: String,
    },
}

/// Strategy for generating edits over a small key space.
///
/// Keys are drawn from a handful of names so puts, removes and gets
/// regularly hit the same entries.
pub fn property_operation_strategy() -> impl Strategy<Value = PropertyOperation> {
    let key = prop::sample::select(vec!["a", "b", "c", "d.e", " f", "g=h"]).prop_map(String::from);
    prop_oneof![
        4 => (key.clone(), value_strategy())
            .prop_map(|(key, value)| PropertyOperation::Put { key, value }),
        1 => (key.clone(), value_strategy(), comment_strategy())
            .prop_map(|(key, value, comment)| PropertyOperation::SetProperty { key, value, comment }),
        2 => key.clone().prop_map(|key| PropertyOperation::Remove { key }),
        2 => key.prop_map(|key| PropertyOperation::Get { key }),
    ]
}

/// Strategy for generating a sequence of edits.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<PropertyOperation>> {
    prop::collection::vec(property_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
