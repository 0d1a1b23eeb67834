//! Plain map views for code that does not care about layout.
//!
//! These conversions only carry cooked keys and values. Comments,
//! header, raw escapes and layout are lost on the way out and start
//! empty on the way in.

use crate::properties::Properties;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

impl Properties {
    /// Snapshot of the local cooked pairs as an unordered map.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut props = Properties::new();
        props.extend(iter);
        props
    }
}

impl<K, V> Extend<(K, V)> for Properties
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.put(key.as_ref(), value.as_ref());
        }
    }
}

impl From<HashMap<String, String>> for Properties {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<&Properties> for HashMap<String, String> {
    fn from(props: &Properties) -> Self {
        props.to_map()
    }
}

/// Serializes the local cooked pairs as a map, in document order.
impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct PropertiesVisitor;

impl<'de> Visitor<'de> for PropertiesVisitor {
    type Value = Properties;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of string keys to string values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Properties, A::Error> {
        let mut props = Properties::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            props.put(&key, &value);
        }
        Ok(props)
    }
}

/// Builds a store from a map, keeping the order the deserializer yields.
impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PropertiesVisitor)
    }
}
