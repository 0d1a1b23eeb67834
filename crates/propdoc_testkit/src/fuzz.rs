//! Fuzz testing harnesses for propdoc.
//!
//! This module provides fuzz targets that can be used with cargo-fuzz
//! or other fuzzing frameworks. Inputs are raw bytes, decoded lossily
//! to text.

use propdoc_codec::{escape_key, escape_value, unescape_key, unescape_value};
use propdoc_core::Properties;

/// Fuzz target for the escape decoder.
///
/// Tests that arbitrary text either:
/// - Decodes successfully and survives a re-encode, or
/// - Returns a proper error (no panics)
pub fn fuzz_unescape(data: &[u8]) {
    let text = String::from_utf8_lossy(data);
    if let Ok(key) = unescape_key(&text) {
        assert_eq!(
            unescape_key(&escape_key(&key)).as_deref(),
            Ok(key.as_str()),
            "Key re-encode mismatch"
        );
    }
    if let Ok(value) = unescape_value(&text) {
        assert_eq!(
            unescape_value(&escape_value(&value)).as_deref(),
            Ok(value.as_str()),
            "Value re-encode mismatch"
        );
    }
}

/// Fuzz target for parsing.
///
/// Tests that arbitrary text either fails with a proper error or parses
/// into a store whose output parses back to the same pairs and the
/// same output.
pub fn fuzz_parse(data: &[u8]) {
    let text = String::from_utf8_lossy(data);
    let Ok(props) = text.parse::<Properties>() else {
        return;
    };
    props.verify_index().expect("Index out of sync after parse");

    let written = props.to_string();
    let reparsed: Properties = written.parse().expect("Written output should parse");
    assert_eq!(
        props.iter().collect::<Vec<_>>(),
        reparsed.iter().collect::<Vec<_>>(),
        "Pairs changed across a write"
    );
    assert_eq!(reparsed.to_string(), written, "Output not stable");
}

/// Fuzz target for the document round trip.
///
/// Whenever the input parses, writing it back reproduces it exactly,
/// unless a repeated key was folded into its first occurrence; folding
/// always drops at least the repeated key line.
pub fn fuzz_roundtrip(data: &[u8]) {
    let text = String::from_utf8_lossy(data);
    let Ok(props) = text.parse::<Properties>() else {
        return;
    };
    let written = props.to_string();
    assert!(
        written == text || count_lines(&written) < count_lines(&text),
        "Round trip mismatch"
    );
}

/// Counts physical lines the way the parser splits them.
fn count_lines(text: &str) -> usize {
    let mut count = 0;
    let mut rest = text;
    while !rest.is_empty() {
        rest = match rest.find(['\r', '\n']) {
            Some(end) if rest[end..].starts_with("\r\n") => &rest[end + 2..],
            Some(end) => &rest[end + 1..],
            None => "",
        };
        count += 1;
    }
    count
}

/// Structured fuzzing input for store edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FuzzOp {
    /// Set a value.
    Put {
        /// Index into the key set.
        key: u8,
        /// Value text.
        value: String,
    },
    /// Replace a comment.
    SetComment {
        /// Index into the key set.
        key: u8,
        /// Comment text.
        text: String,
    },
    /// Remove a key.
    Remove {
        /// Index into the key set.
        key: u8,
    },
    /// Drop every entry.
    Clear,
}

impl FuzzOp {
    /// Keys the edits address, chosen to need escaping.
    pub const KEYS: [&'static str; 6] = ["a", "b.c", " lead", "x=y", "#hash", "\u{e9}"];

    /// Parse operations from fuzzer input.
    ///
    /// Each operation is an opcode byte and a key byte, followed for
    /// `Put` and `SetComment` by a length byte and that many payload
    /// bytes.
    pub fn parse_sequence(data: &[u8]) -> Vec<FuzzOp> {
        let mut ops = Vec::new();
        let mut offset = 0;

        while offset + 2 <= data.len() {
            let op_type = data[offset];
            let key = data[offset + 1] % Self::KEYS.len() as u8;
            offset += 2;

            let op = match op_type % 4 {
                0 | 1 => {
                    let len = data.get(offset).copied().unwrap_or(0) as usize % 32;
                    offset += 1;
                    if offset + len > data.len() {
                        break;
                    }
                    let payload = String::from_utf8_lossy(&data[offset..offset + len]).into_owned();
                    offset += len;
                    if op_type % 4 == 0 {
                        FuzzOp::Put { key, value: payload }
                    } else {
                        FuzzOp::SetComment { key, text: payload }
                    }
                }
                2 => FuzzOp::Remove { key },
                _ => FuzzOp::Clear,
            };

            ops.push(op);
        }

        ops
    }

    /// Execute operations on a store.
    pub fn execute_sequence(ops: &[FuzzOp], props: &mut Properties) {
        for op in ops {
            match op {
                FuzzOp::Put { key, value } => {
                    props.put(Self::KEYS[*key as usize], value);
                }
                FuzzOp::SetComment { key, text } => {
                    props.set_comment(Self::KEYS[*key as usize], [text]);
                }
                FuzzOp::Remove { key } => {
                    props.remove(Self::KEYS[*key as usize]);
                }
                FuzzOp::Clear => props.clear(),
            }
        }
    }
}

/// Fuzz target for edit sequences.
///
/// Tests that arbitrary edits keep the index consistent and that the
/// written document reads back with the same keys in the same order.
pub fn fuzz_edits(data: &[u8]) {
    let mut props = Properties::new();
    FuzzOp::execute_sequence(&FuzzOp::parse_sequence(data), &mut props);
    props.verify_index().expect("Index out of sync after edits");

    let reparsed: Properties = props
        .to_string()
        .parse()
        .expect("Written output should parse");
    assert_eq!(
        props.keys().collect::<Vec<_>>(),
        reparsed.keys().collect::<Vec<_>>(),
        "Keys changed across a write"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::{DefaultHasher, Hash, Hasher};

    /// Generate pseudo-random data for fuzzing based on a seed.
    ///
    /// Bytes are biased towards the characters the format treats
    /// specially so the parser sees more than plain keys.
    fn generate_random_data(seed: u64, len: usize) -> Vec<u8> {
        const SPECIAL: &[u8] = b"\\\n\r\t =:#!u0aF ";
        let mut hasher = DefaultHasher::new();
        let mut result = Vec::with_capacity(len);
        let mut state = seed;

        for _ in 0..len {
            state.hash(&mut hasher);
            state = hasher.finish();
            hasher = DefaultHasher::new();
            let byte = if state & 0x100 == 0 {
                SPECIAL[(state as usize >> 9) % SPECIAL.len()]
            } else {
                (state & 0xFF) as u8
            };
            result.push(byte);
        }

        result
    }

    #[test]
    fn test_fuzz_parse_empty() {
        fuzz_parse(&[]);
        fuzz_roundtrip(&[]);
    }

    #[test]
    fn test_fuzz_parse_garbage() {
        fuzz_parse(&[0xFF, 0xFE, b'\\', b'u', b'\n']);
        fuzz_parse(b"\\");
    }

    #[test]
    fn test_fuzz_roundtrip_sample() {
        fuzz_roundtrip(crate::fixtures::SAMPLE.as_bytes());
    }

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("a\r\nb\rc\n"), 3);
        assert_eq!(count_lines("a\n\nb"), 3);
    }

    #[test]
    fn test_fuzz_roundtrip_folded_duplicate() {
        fuzz_roundtrip(b"a=1\n\na=2");
    }

    #[test]
    fn test_fuzz_parse_folded_key_only_line() {
        fuzz_parse(b"k\nk=v\n");
        fuzz_parse(b"k\n\tk value\nk");
        fuzz_roundtrip(b"k\nk=v\n");
    }

    #[test]
    fn test_fuzz_unescape_surrogates() {
        fuzz_unescape(b"\\uD83D\\uDE00");
        fuzz_unescape(b"\\uD83D");
    }

    #[test]
    fn test_parse_fuzz_ops() {
        let data = vec![0, 1, 3, b'a', b'b', b'c', 2, 1, 3, 0];
        let ops = FuzzOp::parse_sequence(&data);
        assert_eq!(
            ops,
            vec![
                FuzzOp::Put {
                    key: 1,
                    value: "abc".to_string()
                },
                FuzzOp::Remove { key: 1 },
                FuzzOp::Clear,
            ]
        );
    }

    // Extended randomized fuzz tests for CI

    #[test]
    fn fuzz_unescape_random_iterations() {
        for seed in 0..1000u64 {
            let len = ((seed % 64) + 1) as usize;
            let data = generate_random_data(seed, len);
            fuzz_unescape(&data);
        }
    }

    #[test]
    fn fuzz_parse_random_iterations() {
        for seed in 0..1000u64 {
            let len = ((seed % 256) + 1) as usize;
            let data = generate_random_data(seed, len);
            fuzz_parse(&data);
        }
    }

    #[test]
    fn fuzz_roundtrip_random_iterations() {
        for seed in 0..500u64 {
            let len = ((seed % 128) + 1) as usize;
            let data = generate_random_data(seed, len);
            fuzz_roundtrip(&data);
        }
    }

    #[test]
    fn fuzz_edits_random_iterations() {
        for seed in 0..200u64 {
            let len = ((seed % 256) + 16) as usize;
            let data = generate_random_data(seed, len);
            fuzz_edits(&data);
        }
    }
}
