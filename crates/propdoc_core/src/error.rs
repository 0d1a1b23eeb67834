//! Error types for propdoc core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while loading, mutating or storing properties.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Escape codec error outside of a load (e.g. from `put_raw`).
    #[error("codec error: {0}")]
    Codec(#[from] propdoc_codec::CodecError),

    /// Escape codec error raised while loading a document.
    #[error("line {line}: {source}")]
    Parse {
        /// 1-based physical line where the failing entry starts.
        line: usize,
        /// The underlying codec error.
        source: propdoc_codec::CodecError,
    },

    /// Failure reported by the stream being read or written.
    #[error("stream failure: {0}")]
    Io(#[from] io::Error),

    /// Two entries share a cooked key.
    ///
    /// Replacement semantics make this unreachable through the public
    /// API; it is reported by [`crate::Properties::verify_index`].
    #[error("duplicate key violates store invariant: {key:?}")]
    DuplicateKey {
        /// The key that appears more than once.
        key: String,
    },

    /// Raw text that would be written out but read back as something else.
    #[error("raw key {raw_key:?} does not read back: {message}")]
    UnreadableRaw {
        /// The raw key that was supplied.
        raw_key: String,
        /// What the written line would turn into.
        message: String,
    },

    /// The key index disagrees with the entry sequence.
    #[error("index out of sync: {message}")]
    IndexOutOfSync {
        /// Description of the mismatch.
        message: String,
    },
}

impl CoreError {
    /// Creates a parse error for the entry starting at `line`.
    pub fn parse(line: usize, source: propdoc_codec::CodecError) -> Self {
        Self::Parse { line, source }
    }

    /// Creates a duplicate key error.
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self::DuplicateKey { key: key.into() }
    }

    /// Creates an unreadable raw text error.
    pub fn unreadable_raw(raw_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnreadableRaw {
            raw_key: raw_key.into(),
            message: message.into(),
        }
    }

    /// Creates an index out of sync error.
    pub fn index_out_of_sync(message: impl Into<String>) -> Self {
        Self::IndexOutOfSync {
            message: message.into(),
        }
    }

    /// Returns true if this error came from a malformed escape sequence.
    pub fn is_malformed_escape(&self) -> bool {
        matches!(
            self,
            Self::Codec(propdoc_codec::CodecError::MalformedEscape { .. })
                | Self::Parse {
                    source: propdoc_codec::CodecError::MalformedEscape { .. },
                    ..
                }
        )
    }
}
