//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding raw text.
///
/// Encoding is total: every cooked string has a raw form, so only
/// the decoding direction can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// An escape sequence could not be decoded.
    #[error("malformed escape at offset {position}: {message}")]
    MalformedEscape {
        /// Byte offset of the backslash that starts the sequence.
        position: usize,
        /// Description of what was wrong with the sequence.
        message: String,
    },
}

impl CodecError {
    /// Create a malformed escape error.
    pub fn malformed_escape(position: usize, message: impl Into<String>) -> Self {
        Self::MalformedEscape {
            position,
            message: message.into(),
        }
    }

    /// Byte offset in the raw input where the error was detected.
    pub fn position(&self) -> usize {
        match self {
            Self::MalformedEscape { position, .. } => *position,
        }
    }
}
