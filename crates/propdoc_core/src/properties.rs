//! The ordered, comment-preserving property store.

use crate::config::Config;
use crate::entry::{normalize_comment, Entry};
use crate::error::{CoreError, CoreResult};
use crate::line::RawLine;
use crate::parser;
use propdoc_codec::unescape_key;
use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;
use tracing::trace;

/// An insertion-ordered set of properties that remembers how it was written.
///
/// Entries live in a `Vec` in document order; a `HashMap` from cooked
/// key to position gives O(1) lookup. Both are updated together on
/// every mutation, so iteration order never depends on hashing.
///
/// # Map view and property view
///
/// [`get`](Self::get), [`keys`](Self::keys), [`len`](Self::len) and the
/// other map-style accessors only see local entries. The property-style
/// accessors ([`get_property`](Self::get_property) and friends) also
/// consult the defaults chain.
///
/// # Example
///
/// ```
/// use propdoc_core::Properties;
///
/// let text = "# settings\n\nname = demo\n! the port\nport: 8080\n";
/// let mut props: Properties = text.parse().unwrap();
///
/// assert_eq!(props.get("port"), Some("8080"));
/// assert_eq!(props.comment("port"), vec!["! the port"]);
/// assert_eq!(props.to_string(), text);
///
/// props.put("port", "9090");
/// props.put("debug", "true");
/// assert_eq!(
///     props.to_string(),
///     "# settings\n\nname = demo\n! the port\nport: 9090\ndebug=true\n"
/// );
/// ```
#[derive(Clone, Default)]
pub struct Properties {
    header: Vec<RawLine>,
    /// Set when the header was supplied in code rather than loaded.
    header_gap: bool,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    /// Lines after the last entry that belong to no entry.
    trailer: Vec<RawLine>,
    pub(crate) defaults: Option<Arc<Properties>>,
    config: Config,
}

impl Properties {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that formats new content with `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Reads and parses a whole stream.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the stream fails or is not UTF-8, and
    /// [`CoreError::Parse`] if it holds a malformed escape.
    pub fn load<R: Read>(reader: R) -> CoreResult<Self> {
        Self::load_with_config(reader, Config::default())
    }

    /// Reads and parses a whole stream, keeping `config` for later edits.
    ///
    /// # Errors
    ///
    /// Same conditions as [`load`](Self::load).
    pub fn load_with_config<R: Read>(mut reader: R, config: Config) -> CoreResult<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse_with_config(&text, config)
    }

    /// Parses a document held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Parse`] if the text holds a malformed escape.
    pub fn parse_with_config(text: &str, config: Config) -> CoreResult<Self> {
        parser::parse(text, config)
    }

    /// The configuration used for generated content.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    /// Returns the cooked value of a local key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).map(Entry::value)
    }

    /// Returns the raw value of a local key, as it would be written.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.entry(key).map(Entry::raw_value)
    }

    /// Returns the comment lines of a local key, markers included.
    ///
    /// Empty if the key has no comment or does not exist.
    pub fn comment(&self, key: &str) -> Vec<String> {
        self.entry(key)
            .map(|entry| entry.comment().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Returns the full entry for a local key.
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.index.get(key).map(|&idx| &self.entries[idx])
    }

    /// Returns true if the key is defined locally.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of local entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no local entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Sets a cooked value, returning the previous one.
    ///
    /// An existing key keeps its position, raw key and comment; only the
    /// value changes, re-escaped. A new key is appended with no comment.
    pub fn put(&mut self, key: &str, value: &str) -> Option<String> {
        trace!(key, "put");
        match self.index.get(key) {
            Some(&idx) => Some(self.entries[idx].set_value(value, &self.config)),
            None => {
                let entry = Entry::from_cooked(key, value, &self.config);
                self.append(entry);
                None
            }
        }
    }

    /// Sets a key and value from their raw forms, returning the previous
    /// cooked value.
    ///
    /// The entry is matched by the cooked form of `raw_key`. Both raw
    /// strings are stored as given and written out verbatim, so they
    /// must already be valid key-line text: separators, leading spaces
    /// and line breaks need their escapes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Codec`] if either string holds a malformed
    /// escape, and [`CoreError::UnreadableRaw`] if the written line would
    /// not parse back into the same key and value. The store is left
    /// unchanged in both cases.
    pub fn put_raw(&mut self, raw_key: &str, raw_value: &str) -> CoreResult<Option<String>> {
        let key = unescape_key(raw_key)?;
        trace!(key = %key, "put_raw");
        match self.index.get(&key) {
            Some(&idx) => {
                let separator = self.entries[idx].separator_for(raw_value, &self.config);
                parser::check_readable(raw_key, &separator, raw_value)?;
                Ok(Some(self.entries[idx].set_raw(raw_key, separator, raw_value)?))
            }
            None => {
                let entry = Entry::from_raw(raw_key, raw_value, &self.config)?;
                parser::check_readable(entry.raw_key(), &entry.separator, entry.raw_value())?;
                self.append(entry);
                Ok(None)
            }
        }
    }

    /// Sets a cooked value and replaces the key's comment block.
    ///
    /// Behaves like [`put`](Self::put) for the value. The comment is
    /// replaced by `comment` (see [`set_comment`](Self::set_comment));
    /// an empty `comment` clears it. Only the local store is written,
    /// never the defaults.
    pub fn set_property<I, S>(&mut self, key: &str, value: &str, comment: I) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let previous = self.put(key, value);
        self.set_comment(key, comment);
        previous
    }

    /// Replaces the comment block of an existing key.
    ///
    /// Lines starting with `#` or `!` are kept as they are; plain text is
    /// prefixed with the marker of the current comment (or the configured
    /// default) and a space. An empty `comment` removes the block.
    ///
    /// Returns false, changing nothing, if the key does not exist.
    pub fn set_comment<I, S>(&mut self, key: &str, comment: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(&idx) = self.index.get(key) else {
            return false;
        };
        let lines = self.entries[idx].normalize_comment(comment, &self.config);
        self.entries[idx].set_comment_lines(lines);
        true
    }

    /// Removes a local key, returning its cooked value.
    ///
    /// The entry's comment goes with it. Blank lines and detached
    /// comments above it are kept in front of the next entry.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = *self.index.get(key)?;
        trace!(key, "remove");
        Some(self.remove_at(idx).into_value())
    }

    /// Removes every entry, keeping the header.
    pub fn clear(&mut self) {
        trace!(entries = self.entries.len(), "clear");
        self.entries.clear();
        self.index.clear();
        self.trailer.clear();
    }

    /// Removes every entry for which `keep` returns false.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        let mut cursor = self.cursor();
        while let Some(entry) = cursor.advance() {
            if !keep(entry.key(), entry.value()) {
                cursor.remove();
            }
        }
    }

    // ---------------------------------------------------------------
    // Header
    // ---------------------------------------------------------------

    /// The header comment lines, markers included.
    pub fn header(&self) -> impl Iterator<Item = &str> + '_ {
        self.header.iter().map(|line| line.text.as_str())
    }

    /// Replaces the header with the given comment lines.
    ///
    /// Plain text lines are prefixed with the configured marker. An
    /// empty iterator removes the header. The header is written with a
    /// blank line below it, so it is read back as a header and not as
    /// the first entry's comment.
    pub fn set_header<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.header = normalize_comment(lines, self.config.comment_marker, &self.config);
        self.header_gap = !self.header.is_empty();
    }

    // ---------------------------------------------------------------
    // Enumeration (document order)
    // ---------------------------------------------------------------

    /// Cooked keys in document order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.iter().map(Entry::key)
    }

    /// Raw keys in document order.
    pub fn raw_keys(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.iter().map(Entry::raw_key)
    }

    /// Cooked values in document order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.iter().map(Entry::value)
    }

    /// Raw values in document order.
    pub fn raw_values(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.iter().map(Entry::raw_value)
    }

    /// Cooked key/value pairs in document order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|entry| (entry.key(), entry.value()))
    }

    /// Entries in document order.
    pub fn entries(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Checks that the key index matches the entry sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateKey`] if two entries share a cooked
    /// key, or [`CoreError::IndexOutOfSync`] for any other mismatch.
    pub fn verify_index(&self) -> CoreResult<()> {
        for (pos, entry) in self.entries.iter().enumerate() {
            match self.index.get(entry.key()) {
                Some(&idx) if idx == pos => {}
                Some(&idx) if self.entries.get(idx).map(Entry::key) == Some(entry.key()) => {
                    return Err(CoreError::duplicate_key(entry.key()));
                }
                Some(&idx) => {
                    return Err(CoreError::index_out_of_sync(format!(
                        "key {:?} at position {pos} is indexed at {idx}",
                        entry.key()
                    )));
                }
                None => {
                    return Err(CoreError::index_out_of_sync(format!(
                        "key {:?} at position {pos} is not indexed",
                        entry.key()
                    )));
                }
            }
        }
        if self.index.len() != self.entries.len() {
            return Err(CoreError::index_out_of_sync(format!(
                "{} index slots for {} entries",
                self.index.len(),
                self.entries.len()
            )));
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Internal
    // ---------------------------------------------------------------

    pub(crate) fn header_lines(&self) -> &[RawLine] {
        &self.header
    }

    /// Returns true if the writer must keep the header off the body.
    pub(crate) fn header_needs_gap(&self) -> bool {
        self.header_gap
    }

    pub(crate) fn trailer_lines(&self) -> &[RawLine] {
        &self.trailer
    }

    /// Installs header and trailer once the parser has seen all input.
    pub(crate) fn set_layout(&mut self, header: Vec<RawLine>, trailer: Vec<RawLine>) {
        self.header = header;
        self.trailer = trailer;
    }

    /// Adds an entry read by the parser.
    ///
    /// A repeated key replaces the earlier entry's value in place. The
    /// duplicate's leading trivia is returned so the parser can hand it
    /// to the next entry instead of losing it.
    pub(crate) fn push_loaded(&mut self, entry: Entry) -> Vec<RawLine> {
        match self.index.get(entry.key()) {
            Some(&idx) => {
                tracing::debug!(key = entry.key(), "duplicate key folded into earlier entry");
                self.entries[idx].absorb(entry)
            }
            None => {
                self.index.insert(entry.key().to_string(), self.entries.len());
                self.entries.push(entry);
                Vec::new()
            }
        }
    }

    /// Appends a new entry after the last one, before the trailer.
    ///
    /// The first entry of an empty store takes over the trailer as its
    /// leading trivia, so it lands below anything already written.
    fn append(&mut self, mut entry: Entry) {
        if self.entries.is_empty() && !self.trailer.is_empty() {
            let mut leading = std::mem::take(&mut self.trailer);
            leading.append(&mut entry.leading);
            entry.leading = leading;
        }
        self.index.insert(entry.key().to_string(), self.entries.len());
        self.entries.push(entry);
    }

    /// Removes the entry at `idx`, re-indexing everything after it.
    pub(crate) fn remove_at(&mut self, idx: usize) -> Entry {
        let mut entry = self.entries.remove(idx);
        self.index.remove(entry.key());
        for (pos, later) in self.entries.iter().enumerate().skip(idx) {
            if let Some(slot) = self.index.get_mut(later.key()) {
                *slot = pos;
            }
        }

        let mut leading = std::mem::take(&mut entry.leading);
        if !leading.is_empty() {
            let target = match self.entries.get_mut(idx) {
                Some(next) => &mut next.leading,
                None => &mut self.trailer,
            };
            leading.append(target);
            *target = leading;
        }
        entry
    }
}

impl FromStr for Properties {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse_with_config(s, Config::default())
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl std::fmt::Debug for Properties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Properties")
            .field("len", &self.entries.len())
            .field("header_lines", &self.header.len())
            .field("has_defaults", &self.defaults.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Properties {
        let mut props = Properties::new();
        props.put("one", "simple");
        props.put("two", "value containing spaces");
        props.put("three", "and escapes\n\t\r\x0c");
        props
    }

    #[test]
    fn put_appends_in_call_order() {
        let props = abc();
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["one", "two", "three"]);
        assert_eq!(props.len(), 3);
        props.verify_index().unwrap();
    }

    #[test]
    fn put_replaces_in_place() {
        for (key, expected) in [
            ("one", "one=replaced\ntwo=value containing spaces\nthree=and escapes\\n\\t\\r\\f\n"),
            ("two", "one=simple\ntwo=replaced\nthree=and escapes\\n\\t\\r\\f\n"),
            ("three", "one=simple\ntwo=value containing spaces\nthree=replaced\n"),
        ] {
            let mut props = abc();
            let previous = props.put(key, "replaced");
            assert!(previous.is_some());
            assert_eq!(props.len(), 3);
            assert_eq!(props.to_string(), expected);
        }
    }

    #[test]
    fn put_keeps_comment() {
        let mut props: Properties = "# about a\na=1\n".parse().unwrap();
        props.put("a", "2");
        assert_eq!(props.comment("a"), vec!["# about a"]);
        assert_eq!(props.to_string(), "# about a\na=2\n");
    }

    #[test]
    fn put_keeps_layout_of_loaded_entry() {
        let mut props: Properties = "  key : old\n".parse().unwrap();
        props.put("key", "new value");
        assert_eq!(props.to_string(), "  key : new value\n");
    }

    #[test]
    fn missing_key_is_absent_not_empty() {
        let props = abc();
        assert_eq!(props.get("nope"), None);
        assert_eq!(props.get_raw("nope"), None);
        assert!(props.comment("nope").is_empty());
    }

    #[test]
    fn put_raw_matches_cooked_key() {
        let mut props = Properties::new();
        props.put(" with spaces", "x");
        let previous = props.put_raw("\\ with\\ spaces", "everywhere  ").unwrap();
        assert_eq!(previous.as_deref(), Some("x"));
        assert_eq!(props.len(), 1);
        assert_eq!(props.get(" with spaces"), Some("everywhere  "));
    }

    #[test]
    fn put_raw_rejects_malformed_escape() {
        let mut props = Properties::new();
        let err = props.put_raw("k", "\\u12").unwrap_err();
        assert!(err.is_malformed_escape());
        assert!(props.is_empty());
    }

    #[test]
    fn set_comment_on_missing_key_is_noop() {
        let mut props = abc();
        assert!(!props.set_comment("missing", ["text"]));
        assert!(!props.contains_key("missing"));
    }

    #[test]
    fn set_comment_replaces_and_clears() {
        let mut props = abc();
        assert!(props.set_comment("two", ["new multi", "line", "comment"]));
        assert_eq!(props.comment("two"), vec!["# new multi", "# line", "# comment"]);
        assert!(props.set_comment("two", Vec::<String>::new()));
        assert!(props.comment("two").is_empty());
    }

    #[test]
    fn set_property_replaces_comment() {
        let mut props = Properties::new();
        props.set_property("five", "5", ["a new comment"]);
        assert_eq!(props.comment("five"), vec!["# a new comment"]);
        props.set_property("five", "6", Vec::<&str>::new());
        assert!(props.comment("five").is_empty());
        assert_eq!(props.get("five"), Some("6"));
    }

    #[test]
    fn remove_keeps_remaining_order() {
        for victim in ["one", "two", "three"] {
            let mut props = abc();
            assert!(props.remove(victim).is_some());
            let expected: Vec<_> = ["one", "two", "three"]
                .into_iter()
                .filter(|k| *k != victim)
                .collect();
            assert_eq!(props.keys().collect::<Vec<_>>(), expected);
            props.verify_index().unwrap();
        }
    }

    #[test]
    fn remove_missing_key() {
        let mut props = abc();
        assert_eq!(props.remove("missing"), None);
        assert_eq!(props.len(), 3);
    }

    #[test]
    fn remove_then_reinsert_goes_to_end() {
        let mut props = abc();
        props.remove("one");
        props.put("one", "back");
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["two", "three", "one"]);
    }

    #[test]
    fn remove_hands_blank_lines_on() {
        let mut props: Properties = "a=1\n\n# about b\nb=2\n\nc=3\n".parse().unwrap();
        props.remove("b");
        assert_eq!(props.to_string(), "a=1\n\n\nc=3\n");
    }

    #[test]
    fn clear_keeps_header() {
        let mut props: Properties = "# header\n\n# about a\na=1\n\n# trailing\n".parse().unwrap();
        props.clear();
        assert!(props.is_empty());
        assert_eq!(props.to_string(), "# header\n");
        props.verify_index().unwrap();
    }

    #[test]
    fn retain_filters_in_place() {
        let mut props = abc();
        props.retain(|key, _| key != "two");
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["one", "three"]);
        props.verify_index().unwrap();
    }

    #[test]
    fn enumerations_agree() {
        let props = abc();
        assert_eq!(
            props.raw_values().collect::<Vec<_>>(),
            vec!["simple", "value containing spaces", "and escapes\\n\\t\\r\\f"]
        );
        assert_eq!(props.values().nth(2), Some("and escapes\n\t\r\x0c"));
        assert_eq!(props.iter().count(), 3);
        assert_eq!((&props).into_iter().count(), 3);
    }

    #[test]
    fn set_header_normalizes() {
        let mut props = abc();
        props.set_header(["generated", "! keep"]);
        assert_eq!(props.header().collect::<Vec<_>>(), vec!["# generated", "! keep"]);
    }

    #[test]
    fn header_set_in_code_reads_back_as_header() {
        let mut props = Properties::new();
        props.set_header(["generated"]);
        props.put("a", "1");
        assert_eq!(props.to_string(), "# generated\n\na=1\n");

        let reloaded: Properties = props.to_string().parse().unwrap();
        assert_eq!(reloaded.header().collect::<Vec<_>>(), vec!["# generated"]);
        assert!(reloaded.comment("a").is_empty());
        assert_eq!(reloaded.to_string(), props.to_string());
    }

    #[test]
    fn header_set_in_code_reuses_existing_blank_line() {
        let mut props: Properties = "# old\n\na=1\n".parse().unwrap();
        props.set_header(["new"]);
        assert_eq!(props.to_string(), "# new\n\na=1\n");

        let mut empty = Properties::new();
        empty.set_header(["only"]);
        assert_eq!(empty.to_string(), "# only\n");
    }

    #[test]
    fn put_on_key_only_line_adds_separator() {
        let mut props: Properties = "lonely\nother=1\n".parse().unwrap();
        props.put("lonely", "x");
        assert_eq!(props.to_string(), "lonely=x\nother=1\n");

        let reloaded: Properties = props.to_string().parse().unwrap();
        assert_eq!(reloaded.keys().collect::<Vec<_>>(), vec!["lonely", "other"]);
        assert_eq!(reloaded.get("lonely"), Some("x"));
    }

    #[test]
    fn put_on_whitespace_separator_keeps_leading_equals() {
        let mut props: Properties = "altsep value\n".parse().unwrap();
        props.put("altsep", "=x");
        assert_eq!(props.to_string(), "altsep==x\n");
        let reloaded: Properties = props.to_string().parse().unwrap();
        assert_eq!(reloaded.get("altsep"), Some("=x"));

        props.put("altsep", "plain");
        assert_eq!(reloaded.get("altsep"), Some("=x"));
        assert_eq!(props.get("altsep"), Some("plain"));
    }

    #[test]
    fn put_raw_rejects_text_that_would_not_read_back() {
        let mut props: Properties = "a=1\n".parse().unwrap();
        for (key, value) in [("a b", "c"), ("a=b", "c"), ("a", "one\ntwo"), ("#a", "v")] {
            let err = props.put_raw(key, value).unwrap_err();
            assert!(matches!(err, CoreError::UnreadableRaw { .. }), "{key:?}");
        }
        assert_eq!(props.to_string(), "a=1\n");

        props.put_raw("a\\ b", "c").unwrap();
        let reloaded: Properties = props.to_string().parse().unwrap();
        assert_eq!(reloaded.get("a b"), Some("c"));
    }

    #[test]
    fn load_from_reader() {
        let props = Properties::load("a=1\nb=2\n".as_bytes()).unwrap();
        assert_eq!(props.get("b"), Some("2"));
    }

    #[test]
    fn load_rejects_invalid_utf8() {
        let err = Properties::load(&[b'a', b'=', 0xff, b'\n'][..]).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
