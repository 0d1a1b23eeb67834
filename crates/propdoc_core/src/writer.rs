//! Serialization back to text.

use crate::config::Config;
use crate::entry::{normalize_comment, Entry};
use crate::error::CoreResult;
use crate::line::{LineEnding, RawLine};
use crate::properties::Properties;
use std::fmt;
use std::io;
use tracing::debug;

/// Writes lines to a formatter, repairing a missing final terminator.
///
/// A line read from the very end of the input has no terminator. If
/// anything gets written after it, the configured newline is inserted
/// first; otherwise the output ends exactly like the input did.
struct LineSink<'w, W: fmt::Write> {
    out: &'w mut W,
    newline: &'static str,
    open: bool,
}

impl<'w, W: fmt::Write> LineSink<'w, W> {
    fn new(out: &'w mut W, config: &Config) -> Self {
        Self {
            out,
            newline: config.newline.as_str(),
            open: false,
        }
    }

    fn line(&mut self, parts: &[&str], ending: LineEnding) -> fmt::Result {
        if self.open {
            self.out.write_str(self.newline)?;
        }
        for part in parts {
            self.out.write_str(part)?;
        }
        self.out.write_str(ending.as_str())?;
        self.open = ending == LineEnding::None;
        Ok(())
    }

    fn raw(&mut self, line: &RawLine) -> fmt::Result {
        self.line(&[&line.text], line.ending)
    }

    fn entry(&mut self, entry: &Entry) -> fmt::Result {
        for line in &entry.leading {
            self.raw(line)?;
        }
        for line in entry.comment_lines() {
            self.raw(line)?;
        }
        self.line(
            &[&entry.indent, entry.raw_key(), &entry.separator, entry.raw_value()],
            entry.ending,
        )
    }

    /// Writes an entry's comment and key line without surrounding layout.
    fn flat_entry(&mut self, entry: &Entry, config: &Config) -> fmt::Result {
        let ending = config.newline.line_ending();
        for line in entry.comment_lines() {
            self.line(&[&line.text], ending)?;
        }
        self.line(
            &[entry.raw_key(), &entry.separator, entry.raw_value()],
            ending,
        )
    }
}

/// Writes the whole document.
///
/// With `header` set, it is written instead of the stored header. A
/// supplied header, or one set in code, is followed by a blank line
/// unless the body already starts with one.
pub(crate) fn write_document<W: fmt::Write>(
    props: &Properties,
    header: Option<&[RawLine]>,
    out: &mut W,
) -> fmt::Result {
    let config = props.config();
    let mut sink = LineSink::new(out, config);

    let (lines, needs_gap) = match header {
        Some(lines) => (lines, true),
        None => (props.header_lines(), props.header_needs_gap()),
    };
    for line in lines {
        sink.raw(line)?;
    }
    if needs_gap && !lines.is_empty() {
        let body_first = props
            .entries()
            .next()
            .map(|entry| entry.leading.first())
            .unwrap_or_else(|| props.trailer_lines().first());
        let body_is_empty = props.is_empty() && props.trailer_lines().is_empty();
        if !body_is_empty && !body_first.is_some_and(RawLine::is_blank) {
            sink.line(&[], config.newline.line_ending())?;
        }
    }

    for entry in props.entries() {
        sink.entry(entry)?;
    }
    for line in props.trailer_lines() {
        sink.raw(line)?;
    }
    Ok(())
}

/// Adapts an `io::Write` to `fmt::Write`, keeping the real I/O error.
struct IoAdapter<W: io::Write> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> fmt::Write for IoAdapter<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}

fn write_io<W, F>(writer: W, body: F) -> CoreResult<()>
where
    W: io::Write,
    F: FnOnce(&mut IoAdapter<W>) -> fmt::Result,
{
    let mut adapter = IoAdapter {
        inner: writer,
        error: None,
    };
    if body(&mut adapter).is_err() {
        let err = adapter
            .error
            .take()
            .unwrap_or_else(|| io::Error::other("formatter error"));
        return Err(err.into());
    }
    adapter.inner.flush()?;
    Ok(())
}

impl Properties {
    /// Writes the document to a stream.
    ///
    /// A store that has not been modified since it was loaded produces
    /// exactly the text it was loaded from.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Io`] if the stream fails.
    pub fn store<W: io::Write>(&self, writer: W) -> CoreResult<()> {
        debug!(entries = self.len(), "storing properties");
        write_io(writer, |out| write_document(self, None, out))
    }

    /// Writes the document with `header` in place of the stored header.
    ///
    /// The store itself is not changed. Plain text lines get the
    /// configured comment marker; an empty `header` omits the header.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Io`] if the stream fails.
    pub fn store_with_header<W, I, S>(&self, writer: W, header: I) -> CoreResult<()>
    where
        W: io::Write,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = normalize_comment(header, self.config().comment_marker, self.config());
        debug!(
            entries = self.len(),
            header_lines = lines.len(),
            "storing properties with header"
        );
        write_io(writer, |out| write_document(self, Some(&lines), out))
    }

    /// Writes every property visible through the defaults chain.
    ///
    /// Names come in [`string_property_names`](Self::string_property_names)
    /// order, each with its effective comment and raw key/value, one
    /// entry per line and without blank lines or header.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Io`] if the stream fails.
    pub fn list<W: io::Write>(&self, writer: W) -> CoreResult<()> {
        write_io(writer, |out| {
            let mut sink = LineSink::new(out, self.config());
            for name in self.string_property_names() {
                if let Some(entry) = self.property_entry(&name) {
                    sink.flat_entry(entry, self.config())?;
                }
            }
            Ok(())
        })
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_document(self, None, f)
    }
}
