//! Mutation-safe traversal of a store.

use crate::entry::Entry;
use crate::properties::Properties;

/// A position in a [`Properties`] that allows removing the current entry.
///
/// Unlike a borrowed iterator, the cursor keeps an index into the entry
/// sequence and fixes it up after a removal, so traversal continues at
/// the entry that followed the removed one.
///
/// ```
/// use propdoc_core::Properties;
///
/// let mut props: Properties = "a=1\nb=2\nc=3\n".parse().unwrap();
/// let mut cursor = props.cursor();
/// while let Some(entry) = cursor.advance() {
///     if entry.key() == "b" {
///         cursor.remove();
///     }
/// }
/// assert_eq!(props.to_string(), "a=1\nc=3\n");
/// ```
pub struct Cursor<'a> {
    props: &'a mut Properties,
    /// Index of the entry the next `advance` returns.
    next: usize,
    /// Index of the entry last returned, if it is still present.
    current: Option<usize>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(props: &'a mut Properties) -> Self {
        Self {
            props,
            next: 0,
            current: None,
        }
    }

    /// Moves to the next entry and returns it.
    pub fn advance(&mut self) -> Option<&Entry> {
        let idx = self.next;
        if idx >= self.props.len() {
            return None;
        }
        self.current = Some(idx);
        self.next = idx + 1;
        self.props.entries().nth(idx)
    }

    /// Removes the entry last returned by [`advance`](Self::advance).
    ///
    /// Returns `None` if there is no current entry, either because
    /// `advance` was not called yet or because it was already removed.
    pub fn remove(&mut self) -> Option<Entry> {
        let idx = self.current.take()?;
        let entry = self.props.remove_at(idx);
        self.next = idx;
        Some(entry)
    }

    /// Number of entries not yet visited.
    pub fn remaining(&self) -> usize {
        self.props.len().saturating_sub(self.next)
    }
}

impl Properties {
    /// Returns a cursor positioned before the first entry.
    pub fn cursor(&mut self) -> Cursor<'_> {
        Cursor::new(self)
    }
}
