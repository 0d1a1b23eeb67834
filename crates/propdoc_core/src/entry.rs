//! A single property entry with its raw and cooked forms.

use crate::config::{CommentMarker, Config};
use crate::line::{LineEnding, PhysicalLines, RawLine};
use propdoc_codec::{escape_key, escape_value, unescape_key, unescape_value, CodecResult};

/// One logical property line, possibly spanning several physical lines.
///
/// The cooked key and value are what lookups and accessors use. The
/// raw forms, together with the layout fields, are what the writer
/// emits, so an entry that was loaded and never touched is written
/// back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    raw_key: String,
    value: String,
    raw_value: String,
    /// Comment block directly above the key line.
    comment: Vec<RawLine>,
    /// Blank lines and detached comments before the comment block.
    pub(crate) leading: Vec<RawLine>,
    pub(crate) indent: String,
    pub(crate) separator: String,
    pub(crate) ending: LineEnding,
}

impl Entry {
    /// Creates an entry from cooked text, escaping it for output.
    pub(crate) fn from_cooked(key: &str, value: &str, config: &Config) -> Self {
        let raw_value = escape_value(value);
        Self {
            key: key.to_string(),
            raw_key: escape_key(key),
            value: value.to_string(),
            separator: writable_separator(&config.separator, &raw_value, config).to_string(),
            raw_value,
            comment: Vec::new(),
            leading: Vec::new(),
            indent: String::new(),
            ending: config.newline.line_ending(),
        }
    }

    /// Creates an entry from raw text, decoding the cooked forms.
    pub(crate) fn from_raw(raw_key: &str, raw_value: &str, config: &Config) -> CodecResult<Self> {
        Ok(Self {
            key: unescape_key(raw_key)?,
            raw_key: raw_key.to_string(),
            value: unescape_value(raw_value)?,
            raw_value: raw_value.to_string(),
            comment: Vec::new(),
            leading: Vec::new(),
            indent: String::new(),
            separator: writable_separator(&config.separator, raw_value, config).to_string(),
            ending: config.newline.line_ending(),
        })
    }

    /// Creates an entry exactly as it appeared in a source text.
    pub(crate) fn loaded(
        indent: &str,
        raw_key: &str,
        separator: &str,
        raw_value: &str,
        ending: LineEnding,
    ) -> CodecResult<Self> {
        Ok(Self {
            key: unescape_key(raw_key)?,
            raw_key: raw_key.to_string(),
            value: unescape_value(raw_value)?,
            raw_value: raw_value.to_string(),
            comment: Vec::new(),
            leading: Vec::new(),
            indent: indent.to_string(),
            separator: separator.to_string(),
            ending,
        })
    }

    /// The cooked key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The key as written on disk.
    pub fn raw_key(&self) -> &str {
        &self.raw_key
    }

    /// The cooked value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The value as written on disk.
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// The comment lines above the entry, markers included.
    pub fn comment(&self) -> impl Iterator<Item = &str> + '_ {
        self.comment.iter().map(|line| line.text.as_str())
    }

    /// Returns true if the entry has a comment block.
    pub fn has_comment(&self) -> bool {
        !self.comment.is_empty()
    }

    pub(crate) fn comment_lines(&self) -> &[RawLine] {
        &self.comment
    }

    pub(crate) fn into_value(self) -> String {
        self.value
    }

    /// Replaces the value, regenerating the raw form.
    ///
    /// The separator is kept unless it would no longer split the new
    /// value from the key (see [`writable_separator`]).
    pub(crate) fn set_value(&mut self, value: &str, config: &Config) -> String {
        self.raw_value = escape_value(value);
        self.separator = self.separator_for(&self.raw_value, config);
        std::mem::replace(&mut self.value, value.to_string())
    }

    /// The separator this entry would be written with next to `raw_value`.
    pub(crate) fn separator_for(&self, raw_value: &str, config: &Config) -> String {
        writable_separator(&self.separator, raw_value, config).to_string()
    }

    /// Replaces key, value and separator from raw text.
    ///
    /// Both forms are decoded before anything is changed, so a
    /// malformed input leaves the entry untouched.
    pub(crate) fn set_raw(
        &mut self,
        raw_key: &str,
        separator: String,
        raw_value: &str,
    ) -> CodecResult<String> {
        let key = unescape_key(raw_key)?;
        let value = unescape_value(raw_value)?;
        self.key = key;
        self.raw_key = raw_key.to_string();
        self.separator = separator;
        self.raw_value = raw_value.to_string();
        Ok(std::mem::replace(&mut self.value, value))
    }

    /// Takes over value and comment from a later duplicate of this key.
    ///
    /// The later separator comes along with the value it was read next
    /// to, so a key-only first occurrence does not glue key and value.
    pub(crate) fn absorb(&mut self, later: Entry) -> Vec<RawLine> {
        self.separator = later.separator;
        self.raw_value = later.raw_value;
        self.value = later.value;
        if !later.comment.is_empty() {
            self.comment = later.comment;
        }
        later.leading
    }

    pub(crate) fn set_comment_lines(&mut self, comment: Vec<RawLine>) {
        self.comment = comment;
    }

    /// Builds a comment block from plain text lines.
    ///
    /// Lines that already open with `#` or `!` are kept verbatim. Other
    /// lines are prefixed with the marker of this entry's current first
    /// comment line, or the configured default marker.
    pub(crate) fn normalize_comment<I, S>(&self, lines: I, config: &Config) -> Vec<RawLine>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let marker = self
            .comment
            .first()
            .and_then(RawLine::comment_marker)
            .unwrap_or(config.comment_marker);
        normalize_comment(lines, marker, config)
    }
}

/// Picks the separator to write between a raw key and `raw_value`.
///
/// `current` is kept while it still ends the key: an empty value needs
/// nothing, and a separator holding `=` or `:` always works. A key-only
/// line has no separator at all, and a whitespace-only one would let a
/// value opening with `=` or `:` lose that character on reload. Those
/// fall back to the configured separator, or to `=` when that one
/// cannot do the job either.
pub(crate) fn writable_separator<'a>(
    current: &'a str,
    raw_value: &str,
    config: &'a Config,
) -> &'a str {
    let explicit = |sep: &str| sep.contains(['=', ':']);
    if raw_value.is_empty() || explicit(current) {
        return current;
    }
    let needs_explicit = raw_value.starts_with(['=', ':']);
    if !current.is_empty() && !needs_explicit {
        return current;
    }
    let configured = config.separator.as_str();
    if explicit(configured) || (!needs_explicit && !configured.is_empty()) {
        configured
    } else {
        "="
    }
}

/// Turns plain text lines into comment lines opened by `marker`.
pub(crate) fn normalize_comment<I, S>(
    lines: I,
    marker: CommentMarker,
    config: &Config,
) -> Vec<RawLine>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let ending = config.newline.line_ending();
    lines
        .into_iter()
        .flat_map(|text| {
            let text = text.as_ref();
            let parts: Vec<String> = if text.is_empty() {
                vec![String::new()]
            } else {
                PhysicalLines::new(text)
                    .map(|(line, _)| line.to_string())
                    .collect()
            };
            parts
        })
        .map(|text| {
            if crate::line::comment_marker(&text).is_some() {
                RawLine::new(text, ending)
            } else {
                RawLine::new(format!("{} {}", marker.as_char(), text), ending)
            }
        })
        .collect()
}
