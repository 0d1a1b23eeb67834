//! Single-pass line parser.
//!
//! The parser walks physical lines and keeps just enough state to
//! decide where each line belongs:
//!
//! - comment lines directly above a key line become that entry's comment
//! - a comment block opening the input and closed by a blank line (or
//!   by the end of an input that holds no entries) becomes the header
//! - any other blank or comment line is leading trivia of the next entry,
//!   or file trailer if no entry follows
//!
//! Nothing is normalized: every entry keeps its indentation, separator
//! text, raw key/value and line terminator.

use crate::config::Config;
use crate::entry::Entry;
use crate::error::{CoreError, CoreResult};
use crate::line::{LineEnding, PhysicalLines, RawLine};
use crate::properties::Properties;
use propdoc_codec::{has_continuation, is_layout_whitespace};
use tracing::debug;

/// Where the parser is between two physical lines.
#[derive(Debug)]
enum State {
    /// Not inside a comment block or an entry.
    BetweenEntries,
    /// One or more comment lines seen since the last blank line.
    AccumulatingComment,
    /// A key line ended with a continuation; collecting its value.
    InValue {
        /// 1-based line number where the entry starts.
        start_line: usize,
        /// The logical line so far, joined with the original terminators.
        text: String,
        /// Terminator of the last physical line appended to `text`.
        ending: LineEnding,
    },
}

/// Parses `input` into a store using `config` for later mutations.
///
/// # Errors
///
/// Returns [`CoreError::Parse`] if a key or value holds a malformed
/// escape. The whole input is rejected; no partial store is returned.
pub(crate) fn parse(input: &str, config: Config) -> CoreResult<Properties> {
    Parser::new(config).run(input)
}

struct Parser {
    props: Properties,
    state: State,
    header: Option<Vec<RawLine>>,
    /// Blank lines and detached comments since the last entry.
    trivia: Vec<RawLine>,
    /// The comment run currently being accumulated.
    comment: Vec<RawLine>,
}

impl Parser {
    fn new(config: Config) -> Self {
        Self {
            props: Properties::with_config(config),
            state: State::BetweenEntries,
            header: None,
            trivia: Vec::new(),
            comment: Vec::new(),
        }
    }

    fn run(mut self, input: &str) -> CoreResult<Properties> {
        for (index, (text, ending)) in PhysicalLines::new(input).enumerate() {
            self.line(index + 1, text, ending)?;
        }
        self.finish()
    }

    fn line(&mut self, line_no: usize, text: &str, ending: LineEnding) -> CoreResult<()> {
        match std::mem::replace(&mut self.state, State::BetweenEntries) {
            State::InValue {
                start_line,
                text: mut logical,
                ending: previous,
            } => {
                logical.push_str(previous.as_str());
                logical.push_str(text);
                self.continue_or_finish(start_line, logical, ending)
            }
            State::BetweenEntries | State::AccumulatingComment => {
                let raw = RawLine::new(text, ending);
                if raw.is_blank() {
                    self.close_comment_run();
                    self.trivia.push(raw);
                } else if raw.comment_marker().is_some() {
                    self.comment.push(raw);
                    self.state = State::AccumulatingComment;
                } else {
                    self.continue_or_finish(line_no, text.to_string(), ending)?;
                }
                Ok(())
            }
        }
    }

    fn continue_or_finish(
        &mut self,
        start_line: usize,
        text: String,
        ending: LineEnding,
    ) -> CoreResult<()> {
        if ending != LineEnding::None && has_continuation(&text) {
            self.state = State::InValue {
                start_line,
                text,
                ending,
            };
            Ok(())
        } else {
            self.finish_entry(start_line, &text, ending)
        }
    }

    /// Detaches the pending comment run from whatever follows.
    ///
    /// Called on a blank line and at end of input. A run that opens the
    /// input becomes the header; any other run joins the trivia.
    fn close_comment_run(&mut self) {
        if self.comment.is_empty() {
            return;
        }
        let run = std::mem::take(&mut self.comment);
        let opens_input = self.header.is_none() && self.trivia.is_empty() && self.props.is_empty();
        if opens_input {
            self.header = Some(run);
        } else {
            self.trivia.extend(run);
        }
    }

    fn finish_entry(
        &mut self,
        start_line: usize,
        logical: &str,
        ending: LineEnding,
    ) -> CoreResult<()> {
        let (indent, raw_key, separator, raw_value) = split_entry(logical);
        let mut entry = Entry::loaded(indent, raw_key, separator, raw_value, ending)
            .map_err(|source| CoreError::parse(start_line, source))?;
        entry.set_comment_lines(std::mem::take(&mut self.comment));
        entry.leading = std::mem::take(&mut self.trivia);
        self.trivia = self.props.push_loaded(entry);
        self.state = State::BetweenEntries;
        Ok(())
    }

    fn finish(mut self) -> CoreResult<Properties> {
        match std::mem::replace(&mut self.state, State::BetweenEntries) {
            State::InValue {
                start_line,
                text: mut logical,
                ending,
            } => {
                // A continuation on the final line joins onto nothing.
                logical.push_str(ending.as_str());
                self.finish_entry(start_line, &logical, LineEnding::None)?;
            }
            State::AccumulatingComment => self.close_comment_run(),
            State::BetweenEntries => {}
        }

        let header = self.header.unwrap_or_default();
        debug!(
            entries = self.props.len(),
            header_lines = header.len(),
            trailer_lines = self.trivia.len(),
            "loaded properties"
        );
        self.props.set_layout(header, self.trivia);
        Ok(self.props)
    }
}

/// Splits a logical line into indentation, raw key, separator and raw value.
///
/// The key runs up to the first unescaped `=`, `:` or whitespace. The
/// separator is any whitespace, at most one `=` or `:`, then any
/// whitespace again. Everything after it, trailing whitespace included,
/// is the raw value.
pub(crate) fn split_entry(logical: &str) -> (&str, &str, &str, &str) {
    let key_start = logical.len() - logical.trim_start_matches(is_layout_whitespace).len();
    let key_end = scan_key(logical, key_start);

    let rest = &logical[key_end..];
    let mut sep_len = rest.len() - rest.trim_start_matches(is_layout_whitespace).len();
    if matches!(rest[sep_len..].chars().next(), Some('=' | ':')) {
        sep_len += 1;
        let after = &rest[sep_len..];
        sep_len += after.len() - after.trim_start_matches(is_layout_whitespace).len();
    }
    let value_start = key_end + sep_len;

    (
        &logical[..key_start],
        &logical[key_start..key_end],
        &logical[key_end..value_start],
        &logical[value_start..],
    )
}

/// Checks that a key line built from these raw pieces parses back into
/// the same pieces.
///
/// # Errors
///
/// Returns [`CoreError::UnreadableRaw`] if the line would read back as
/// a comment or blank line, if a line break in it is not escaped, or
/// if the key would end somewhere else.
pub(crate) fn check_readable(raw_key: &str, separator: &str, raw_value: &str) -> CoreResult<()> {
    let logical = format!("{raw_key}{separator}{raw_value}");
    let mut physical = PhysicalLines::new(&logical).peekable();

    if let Some(&(first, _)) = physical.peek() {
        let first = RawLine::new(first, LineEnding::None);
        if first.is_blank() || first.comment_marker().is_some() {
            return Err(CoreError::unreadable_raw(
                raw_key,
                "line would read as a comment or blank line",
            ));
        }
    }
    for (text, ending) in physical {
        if ending != LineEnding::None && !has_continuation(text) {
            return Err(CoreError::unreadable_raw(raw_key, "unescaped line break"));
        }
    }
    if split_entry(&logical) != ("", raw_key, separator, raw_value) {
        return Err(CoreError::unreadable_raw(
            raw_key,
            "key and value would split differently",
        ));
    }
    Ok(())
}

fn scan_key(logical: &str, start: usize) -> usize {
    let mut chars = logical[start..].char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, '\r')) => {
                    chars.next_if(|&(_, c)| c == '\n');
                    while chars.next_if(|&(_, c)| is_layout_whitespace(c)).is_some() {}
                }
                Some((_, '\n')) => {
                    while chars.next_if(|&(_, c)| is_layout_whitespace(c)).is_some() {}
                }
                _ => {}
            },
            '=' | ':' => return start + offset,
            c if is_layout_whitespace(c) => return start + offset,
            _ => {}
        }
    }
    logical.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(input: &str) -> Properties {
        parse(input, Config::default()).unwrap()
    }

    #[test]
    fn split_equals() {
        assert_eq!(split_entry("one=simple"), ("", "one", "=", "simple"));
    }

    #[test]
    fn split_spaced_equals() {
        assert_eq!(
            split_entry("\\ with\\ spaces = everywhere  "),
            ("", "\\ with\\ spaces", " = ", "everywhere  ")
        );
    }

    #[test]
    fn split_whitespace_separator() {
        assert_eq!(split_entry("altsep value"), ("", "altsep", " ", "value"));
        assert_eq!(split_entry("  k\t:\tv"), ("  ", "k", "\t:\t", "v"));
    }

    #[test]
    fn split_only_one_separator_char() {
        assert_eq!(split_entry("k==v"), ("", "k", "=", "=v"));
        assert_eq!(split_entry("k = : v"), ("", "k", " = ", ": v"));
    }

    #[test]
    fn split_escaped_separator_stays_in_key() {
        assert_eq!(split_entry("a\\=b=c"), ("", "a\\=b", "=", "c"));
        assert_eq!(split_entry("a\\:b c"), ("", "a\\:b", " ", "c"));
    }

    #[test]
    fn split_key_only() {
        assert_eq!(split_entry("lonely"), ("", "lonely", "", ""));
        assert_eq!(split_entry("empty="), ("", "empty", "=", ""));
    }

    #[test]
    fn split_key_with_continuation() {
        assert_eq!(split_entry("ke\\\n   y=v"), ("", "ke\\\n   y", "=", "v"));
    }

    #[test]
    fn header_separated_by_blank_line() {
        let props = load("#comment1\n#  comment2\n\n! comment3\none=simple\n");
        assert_eq!(props.header().collect::<Vec<_>>(), vec!["#comment1", "#  comment2"]);
        assert_eq!(props.comment("one"), vec!["! comment3"]);
    }

    #[test]
    fn leading_comment_touching_key_is_not_header() {
        let props = load("# about one\none=1\n");
        assert_eq!(props.header().count(), 0);
        assert_eq!(props.comment("one"), vec!["# about one"]);
    }

    #[test]
    fn header_only_input() {
        let props = load("# A header comment");
        assert!(props.is_empty());
        assert_eq!(props.header().collect::<Vec<_>>(), vec!["# A header comment"]);
    }

    #[test]
    fn detached_comment_is_not_attached() {
        let props = load("a=1\n# detached\n\n# attached\nb=2\n");
        assert_eq!(props.comment("b"), vec!["# attached"]);
        assert_eq!(props.to_string(), "a=1\n# detached\n\n# attached\nb=2\n");
    }

    #[test]
    fn continuation_keeps_raw_and_cooks_value() {
        let props = load("multiline = one \\\n    two  \\\n\tthree\n");
        assert_eq!(props.get("multiline"), Some("one two  three"));
        assert_eq!(props.get_raw("multiline"), Some("one \\\n    two  \\\n\tthree"));
    }

    #[test]
    fn continuation_swallows_comment_looking_line() {
        let props = load("k=a\\\n# not a comment\n");
        assert_eq!(props.get("k"), Some("a# not a comment"));
        assert!(props.comment("k").is_empty());
    }

    #[test]
    fn continuation_at_end_of_input() {
        let props = load("k=a\\\n");
        assert_eq!(props.get("k"), Some("a"));
        assert_eq!(props.to_string(), "k=a\\\n");
    }

    #[test]
    fn mixed_terminators_round_trip() {
        let input = "a=1\r\nb=2\rc=3\n# c\r\nd=4";
        let props = load(input);
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
        assert_eq!(props.to_string(), input);
    }

    #[test]
    fn crlf_continuation() {
        let props = load("k=one \\\r\n  two\r\n");
        assert_eq!(props.get("k"), Some("one two"));
        assert_eq!(props.to_string(), "k=one \\\r\n  two\r\n");
    }

    #[test]
    fn dangling_backslash_rejects_input() {
        let err = parse("a=1\nb=oops\\", Config::default()).unwrap_err();
        assert!(err.is_malformed_escape());
        assert!(matches!(err, CoreError::Parse { line: 2, .. }));
    }

    #[test]
    fn bad_unicode_rejects_input() {
        let err = parse("a=\\u12x4\n", Config::default()).unwrap_err();
        assert!(matches!(err, CoreError::Parse { line: 1, .. }));
    }

    #[test]
    fn duplicate_key_replaces_in_place() {
        let props = load("a=1\nb=2\n\na=3\nc=4\n");
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(props.get("a"), Some("3"));
        assert_eq!(props.to_string(), "a=3\nb=2\n\nc=4\n");
    }

    #[test]
    fn duplicate_of_key_only_line_keeps_its_separator() {
        let props = load("k\nk=v\n");
        assert_eq!(props.iter().collect::<Vec<_>>(), vec![("k", "v")]);
        assert_eq!(props.to_string(), "k=v\n");
        assert_eq!(load(&props.to_string()).iter().collect::<Vec<_>>(), vec![("k", "v")]);
    }

    #[test]
    fn readable_raw_pieces() {
        assert!(check_readable("a", "=", "b").is_ok());
        assert!(check_readable("\\ with\\ spaces", " = ", "x  ").is_ok());
        assert!(check_readable("k", "=", "one \\\n    two").is_ok());
        assert!(check_readable("k", "=", "").is_ok());
    }

    #[test]
    fn unreadable_raw_pieces() {
        for (key, sep, value) in [
            ("a b", "=", "c"),
            ("a=b", "=", "c"),
            ("k", "=", "one\ntwo"),
            ("k", "=", "trailing\n"),
            ("#k", "=", "v"),
            ("  k", "=", "v"),
            ("k", "=", " v"),
        ] {
            let err = check_readable(key, sep, value).unwrap_err();
            assert!(matches!(err, CoreError::UnreadableRaw { .. }), "{key:?} {value:?}");
        }
    }

    #[test]
    fn trailing_content_is_kept() {
        let input = "a=1\n\n# end of file\n";
        let props = load(input);
        assert!(props.comment("a").is_empty());
        assert_eq!(props.to_string(), input);
    }

    #[test]
    fn empty_input() {
        let props = load("");
        assert!(props.is_empty());
        assert_eq!(props.to_string(), "");
    }
}
