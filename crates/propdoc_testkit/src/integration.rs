//! Cross-crate integration test helpers.
//!
//! Provides a harness that mirrors every edit in a plain ordered model
//! and checks the store, its written form and its serde view against it.

use crate::generators::PropertyOperation;
use propdoc_core::Properties;

/// A test harness for integration testing.
pub struct IntegrationHarness {
    /// The store under test.
    pub props: Properties,
    /// Expected cooked pairs in document order.
    model: Vec<(String, String)>,
}

impl IntegrationHarness {
    /// Creates a new integration harness with an empty store.
    pub fn new() -> Self {
        Self {
            props: Properties::new(),
            model: Vec::new(),
        }
    }

    /// Creates a harness around a loaded store.
    pub fn from_store(props: Properties) -> Self {
        let model = props
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self { props, model }
    }

    /// Sets a value and tracks it for later verification.
    pub fn put(&mut self, key: &str, value: &str) {
        let previous = self.props.put(key, value);
        let expected = self.model_put(key, value);
        assert_eq!(previous, expected, "Previous value mismatch for {:?}", key);
    }

    /// Removes a key and updates tracking.
    pub fn remove(&mut self, key: &str) {
        let removed = self.props.remove(key);
        let expected = self
            .model
            .iter()
            .position(|(k, _)| k == key)
            .map(|pos| self.model.remove(pos).1);
        assert_eq!(removed, expected, "Removed value mismatch for {:?}", key);
    }

    /// Reads a key and verifies it matches the tracked value.
    pub fn get_and_verify(&self, key: &str) -> Option<String> {
        let actual = self.props.get(key).map(str::to_string);
        let expected = self
            .model
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone());
        assert_eq!(actual, expected, "Value mismatch for {:?}", key);
        actual
    }

    /// Applies a generated operation to both store and model.
    ///
    /// Generated comment text is single-line, so each supplied line
    /// becomes exactly one comment line.
    pub fn apply(&mut self, op: &PropertyOperation) {
        match op {
            PropertyOperation::Put { key, value } => self.put(key, value),
            PropertyOperation::SetProperty {
                key,
                value,
                comment,
            } => {
                let previous = self.props.set_property(key, value, comment);
                let expected = self.model_put(key, value);
                assert_eq!(previous, expected, "Previous value mismatch for {:?}", key);
                assert_eq!(self.props.comment(key).len(), comment.len());
            }
            PropertyOperation::Remove { key } => self.remove(key),
            PropertyOperation::Get { key } => {
                self.get_and_verify(key);
            }
        }
    }

    /// Verifies order, values, index and serde view against the model.
    pub fn verify_all(&self) {
        let actual: Vec<_> = self.props.iter().collect();
        let expected: Vec<_> = self
            .model
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(actual, expected, "Store diverged from model");
        self.props
            .verify_index()
            .expect("Index out of sync with entries");

        let json = serde_json::to_value(&self.props).expect("Failed to serialize store");
        let object = json.as_object().expect("Store should serialize as a map");
        assert_eq!(object.len(), self.model.len());
        for (key, value) in &self.model {
            assert_eq!(object.get(key).and_then(|v| v.as_str()), Some(value.as_str()));
        }
    }

    /// Writes the store, reads it back and verifies the copy.
    ///
    /// The reloaded store must hold the model's pairs and write out the
    /// same text again.
    pub fn verify_reload(&self) -> Properties {
        let mut out = Vec::new();
        self.props.store(&mut out).expect("Failed to store");
        let reloaded = Properties::load(out.as_slice()).expect("Failed to reload");

        let pairs: Vec<_> = reloaded.iter().collect();
        let expected: Vec<_> = self
            .model
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(pairs, expected, "Reloaded store diverged from model");
        assert_eq!(reloaded.to_string().as_bytes(), out.as_slice());
        reloaded
    }

    /// Returns the count of tracked entries.
    pub fn tracked_count(&self) -> usize {
        self.model.len()
    }

    fn model_put(&mut self, key: &str, value: &str) -> Option<String> {
        match self.model.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value.to_string())),
            None => {
                self.model.push((key.to_string(), value.to_string()));
                None
            }
        }
    }
}

impl Default for IntegrationHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Test the defaults chain across stores.
pub mod defaults {
    use super::*;
    use std::sync::Arc;

    /// Verifies that a child shadows its parent without changing it.
    pub fn test_defaults_shadowing(parent: Properties) {
        let parent = Arc::new(parent);
        let mut child = Properties::with_defaults(Arc::clone(&parent));

        for (key, value) in parent.iter() {
            assert_eq!(child.get_property(key), Some(value));
            assert_eq!(child.get(key), None);
        }

        let keys: Vec<String> = parent.keys().map(str::to_string).collect();
        for key in &keys {
            child.put(key, "shadowed");
        }
        for key in &keys {
            assert_eq!(child.get_property(key), Some("shadowed"));
            assert_ne!(parent.get(key), Some("shadowed"));
        }
        assert_eq!(child.string_property_names(), keys);
    }
}

/// Test reading and writing through real files.
pub mod streams {
    use crate::fixtures::TestFile;

    /// Loads `contents` from disk, stores it back and checks the bytes.
    pub fn test_file_roundtrip(contents: &str) {
        let file = TestFile::with_contents(contents);
        let props = file.load();
        file.store(&props);
        assert_eq!(file.contents(), contents, "File changed across a load/store");
    }
}
