//! Physical lines and their terminators.

use crate::config::CommentMarker;
use propdoc_codec::is_layout_whitespace;

/// Terminator that ended a physical line in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
    /// The line ran to end of input.
    None,
}

impl LineEnding {
    /// Returns the terminator text; empty for [`LineEnding::None`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
            Self::None => "",
        }
    }
}

/// A non-entry line kept verbatim: a comment or a blank line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawLine {
    /// Line text without its terminator.
    pub text: String,
    /// How the line ended.
    pub ending: LineEnding,
}

impl RawLine {
    /// Creates a raw line.
    pub fn new(text: impl Into<String>, ending: LineEnding) -> Self {
        Self {
            text: text.into(),
            ending,
        }
    }

    /// Returns true if the line holds only layout whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(is_layout_whitespace)
    }

    /// Returns the comment marker if this is a comment line.
    pub fn comment_marker(&self) -> Option<CommentMarker> {
        comment_marker(&self.text)
    }
}

/// Returns the marker of `text` if its first non-whitespace character
/// is `#` or `!`.
pub(crate) fn comment_marker(text: &str) -> Option<CommentMarker> {
    text.trim_start_matches(is_layout_whitespace)
        .chars()
        .next()
        .and_then(CommentMarker::from_char)
}

/// Iterator over the physical lines of a text, terminators split off.
///
/// Unlike [`str::lines`], a lone `\r` also ends a line and the exact
/// terminator is reported so the text can be rebuilt byte for byte.
pub(crate) struct PhysicalLines<'a> {
    rest: &'a str,
}

impl<'a> PhysicalLines<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { rest: input }
    }
}

impl<'a> Iterator for PhysicalLines<'a> {
    type Item = (&'a str, LineEnding);

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let line = match self.rest.find(['\n', '\r']) {
            Some(end) => {
                let bytes = self.rest.as_bytes();
                let (ending, width) = match bytes[end] {
                    b'\r' if bytes.get(end + 1) == Some(&b'\n') => (LineEnding::CrLf, 2),
                    b'\r' => (LineEnding::Cr, 1),
                    _ => (LineEnding::Lf, 1),
                };
                let text = &self.rest[..end];
                self.rest = &self.rest[end + width..];
                (text, ending)
            }
            None => {
                let text = self.rest;
                self.rest = "";
                (text, LineEnding::None)
            }
        };
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &str) -> Vec<(&str, LineEnding)> {
        PhysicalLines::new(input).collect()
    }

    #[test]
    fn splits_every_terminator() {
        assert_eq!(
            split("a\nb\r\nc\rd"),
            vec![
                ("a", LineEnding::Lf),
                ("b", LineEnding::CrLf),
                ("c", LineEnding::Cr),
                ("d", LineEnding::None),
            ]
        );
    }

    #[test]
    fn trailing_terminator_adds_no_empty_line() {
        assert_eq!(split("a\n"), vec![("a", LineEnding::Lf)]);
        assert_eq!(split(""), vec![]);
        assert_eq!(split("\n\n"), vec![("", LineEnding::Lf), ("", LineEnding::Lf)]);
    }

    #[test]
    fn classifies_lines() {
        assert!(RawLine::new(" \t", LineEnding::Lf).is_blank());
        assert!(!RawLine::new("# c", LineEnding::Lf).is_blank());
        assert_eq!(
            RawLine::new("  ! c", LineEnding::Lf).comment_marker(),
            Some(CommentMarker::Bang)
        );
        assert_eq!(RawLine::new("k=v", LineEnding::Lf).comment_marker(), None);
    }
}
