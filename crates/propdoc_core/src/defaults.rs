//! Defaults chain lookups.
//!
//! A store may point at one parent store holding default values. The
//! parent is shared through an `Arc` and is never mutated through the
//! child; since a store's parent is fixed when it is created, no store
//! can become its own ancestor.

use crate::entry::Entry;
use crate::properties::Properties;
use std::collections::HashSet;
use std::sync::Arc;

impl Properties {
    /// Creates an empty store backed by `defaults`.
    pub fn with_defaults(defaults: Arc<Properties>) -> Self {
        let mut props = Self::with_config(defaults.config().clone());
        props.defaults = Some(defaults);
        props
    }

    /// The parent store, if any.
    pub fn defaults(&self) -> Option<&Arc<Properties>> {
        self.defaults.as_ref()
    }

    /// Returns the cooked value of `key`, falling back to the defaults chain.
    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.property_entry(key).map(Entry::value)
    }

    /// Returns the cooked value of `key` or `default` if no store in the
    /// chain defines it.
    pub fn get_property_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_property(key).unwrap_or(default)
    }

    /// Returns the comment of the entry [`get_property`](Self::get_property)
    /// would read.
    pub fn get_property_comment(&self, key: &str) -> Vec<String> {
        self.property_entry(key)
            .map(|entry| entry.comment().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// All keys visible through the chain.
    ///
    /// The root's keys come first in its document order, then each
    /// child adds the keys it does not share with its ancestors. A key
    /// defined at several levels is listed once.
    pub fn string_property_names(&self) -> Vec<String> {
        let mut names = match &self.defaults {
            Some(parent) => parent.string_property_names(),
            None => Vec::new(),
        };
        let mut seen: HashSet<String> = names.iter().cloned().collect();
        for key in self.keys() {
            if seen.insert(key.to_string()) {
                names.push(key.to_string());
            }
        }
        names
    }

    /// Finds the entry for `key` in this store or the nearest ancestor.
    pub(crate) fn property_entry(&self, key: &str) -> Option<&Entry> {
        let mut store = self;
        loop {
            if let Some(entry) = store.entry(key) {
                return Some(entry);
            }
            store = store.defaults.as_deref()?;
        }
    }
}
