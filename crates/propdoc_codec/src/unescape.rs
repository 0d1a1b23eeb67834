//! Raw to cooked decoding.

use crate::error::{CodecError, CodecResult};

/// Decode a raw key into its cooked form.
///
/// # Errors
///
/// Returns [`CodecError::MalformedEscape`] for a truncated or invalid
/// `\uXXXX` sequence, an unpaired surrogate, or a backslash that ends
/// the input.
pub fn unescape_key(raw: &str) -> CodecResult<String> {
    Unescaper::new(raw).unescape()
}

/// Decode a raw value into its cooked form.
///
/// # Errors
///
/// Same conditions as [`unescape_key`].
pub fn unescape_value(raw: &str) -> CodecResult<String> {
    Unescaper::new(raw).unescape()
}

/// Returns true if `line` ends in an odd number of backslashes,
/// meaning the logical line continues on the next physical line.
pub fn has_continuation(line: &str) -> bool {
    line.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// Whitespace that may surround separators and indent lines.
pub fn is_layout_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// A single-pass decoder over one raw key or value.
///
/// Backslash-newline pairs (any of `\n`, `\r\n` or `\r`) are joining
/// points: they decode to nothing, together with the indentation that
/// opens the continuation line.
pub struct Unescaper<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Unescaper<'a> {
    /// Create a decoder for the given raw text.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Decode the whole input.
    pub fn unescape(mut self) -> CodecResult<String> {
        let mut out = String::with_capacity(self.input.len());
        while let Some(c) = self.read_char() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            let start = self.pos - 1;
            let Some(next) = self.read_char() else {
                return Err(CodecError::malformed_escape(
                    start,
                    "dangling backslash at end of input",
                ));
            };
            match next {
                't' => out.push('\t'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                'f' => out.push('\x0c'),
                'u' => out.push(self.read_unicode(start)?),
                '\r' => {
                    if self.peek_char() == Some('\n') {
                        self.pos += 1;
                    }
                    self.skip_indent();
                }
                '\n' => self.skip_indent(),
                other => out.push(other),
            }
        }
        Ok(out)
    }

    #[inline]
    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    #[inline]
    fn read_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_indent(&mut self) {
        while let Some(c) = self.peek_char() {
            if !is_layout_whitespace(c) {
                break;
            }
            self.pos += 1;
        }
    }

    fn read_code_unit(&mut self, start: usize) -> CodecResult<u16> {
        let mut unit: u16 = 0;
        for _ in 0..4 {
            let digit = match self.read_char() {
                Some(c) => c.to_digit(16).ok_or_else(|| {
                    CodecError::malformed_escape(
                        start,
                        format!("invalid hex digit {c:?} in \\u sequence"),
                    )
                })?,
                None => {
                    return Err(CodecError::malformed_escape(
                        start,
                        "truncated \\u sequence",
                    ))
                }
            };
            // digit < 16, so the cast cannot truncate
            unit = (unit << 4) | digit as u16;
        }
        Ok(unit)
    }

    fn read_unicode(&mut self, start: usize) -> CodecResult<char> {
        let unit = self.read_code_unit(start)?;
        match unit {
            0xD800..=0xDBFF => {
                if !self.input[self.pos..].starts_with("\\u") {
                    return Err(CodecError::malformed_escape(
                        start,
                        "high surrogate not followed by a low surrogate",
                    ));
                }
                let low_start = self.pos;
                self.pos += 2;
                let low = self.read_code_unit(low_start)?;
                char::decode_utf16([unit, low])
                    .next()
                    .and_then(Result::ok)
                    .ok_or_else(|| {
                        CodecError::malformed_escape(
                            low_start,
                            "high surrogate not followed by a low surrogate",
                        )
                    })
            }
            0xDC00..=0xDFFF => Err(CodecError::malformed_escape(
                start,
                "unpaired low surrogate",
            )),
            _ => char::from_u32(u32::from(unit)).ok_or_else(|| {
                CodecError::malformed_escape(start, "invalid code point")
            }),
        }
    }
}
