//! Cooked to raw encoding.

/// What a string is being escaped as.
///
/// Keys and values share every escape except the ones that would
/// otherwise end a key early: separators, comment markers and spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeTarget {
    /// The string is a property key.
    Key,
    /// The string is a property value.
    Value,
}

/// Escape a cooked key into its raw on-disk form.
///
/// Every space is written as `\ `, and `=`, `:`, `#` and `!` are
/// prefixed with a backslash so the key cannot be mistaken for a
/// separator or a comment line.
pub fn escape_key(cooked: &str) -> String {
    escape(cooked, EscapeTarget::Key)
}

/// Escape a cooked value into its raw on-disk form.
///
/// Spaces are kept literally, including trailing runs, since the
/// format preserves everything after the separator up to the line end.
pub fn escape_value(cooked: &str) -> String {
    escape(cooked, EscapeTarget::Value)
}

/// Escape `cooked` for the given target.
///
/// Backslash and the control characters `\t \n \r \f` get their short
/// escapes; anything else outside printable ASCII becomes one `\uXXXX`
/// per UTF-16 code unit, so supplementary characters are written as a
/// surrogate pair.
pub fn escape(cooked: &str, target: EscapeTarget) -> String {
    let mut out = String::with_capacity(cooked.len() + cooked.len() / 4);
    for c in cooked.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            ' ' | '=' | ':' | '#' | '!' if target == EscapeTarget::Key => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => push_unicode_escape(&mut out, c),
        }
    }
    out
}

fn push_unicode_escape(out: &mut String, c: char) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        out.push_str(&format!("\\u{unit:04X}"));
    }
}
