//! Store configuration.

use crate::line::LineEnding;

/// Line terminator written for lines the store creates itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl Newline {
    /// Returns the terminator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    pub(crate) const fn line_ending(self) -> LineEnding {
        match self {
            Self::Lf => LineEnding::Lf,
            Self::CrLf => LineEnding::CrLf,
            Self::Cr => LineEnding::Cr,
        }
    }
}

/// Marker character that opens a comment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentMarker {
    /// `#`
    #[default]
    Hash,
    /// `!`
    Bang,
}

impl CommentMarker {
    /// Returns the marker character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Hash => '#',
            Self::Bang => '!',
        }
    }

    /// Returns the marker for `c`, if it is one.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(Self::Hash),
            '!' => Some(Self::Bang),
            _ => None,
        }
    }
}

/// Formatting choices for content the store generates.
///
/// Loaded content is never reformatted; these settings only apply to
/// entries, comments and headers created through the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Line terminator for generated lines.
    pub newline: Newline,

    /// Marker used for plain-text comments when none can be inherited.
    pub comment_marker: CommentMarker,

    /// Text written between key and value of new entries.
    pub separator: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            newline: Newline::Lf,
            comment_marker: CommentMarker::Hash,
            separator: "=".to_string(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the line terminator for generated lines.
    #[must_use]
    pub const fn newline(mut self, newline: Newline) -> Self {
        self.newline = newline;
        self
    }

    /// Sets the default comment marker.
    #[must_use]
    pub const fn comment_marker(mut self, marker: CommentMarker) -> Self {
        self.comment_marker = marker;
        self
    }

    /// Sets the separator for new entries.
    ///
    /// The separator should be `=`, `:` or whitespace, optionally
    /// surrounded by whitespace, for the output to load back.
    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}
