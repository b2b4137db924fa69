//! Dynamically-keyed XML value tree
//!
//! Device responses have no fixed schema, so they are decoded into an ordered
//! map of element name to [`XmlValue`]. Typed results are built on top of this
//! with the accessor helpers below.

use crate::{Error, Result};
use serde::Serialize;
use std::str::FromStr;

/// A decoded XML element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum XmlValue {
    /// Leaf element text (empty for `<tag/>` and `<tag></tag>`)
    Text(String),
    /// Element with child elements
    Map(XmlMap),
    /// Sibling elements sharing one name
    List(Vec<XmlValue>),
}

/// Insertion-ordered element map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlMap {
    entries: Vec<(String, XmlValue)>,
}

impl XmlMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a child element.
    ///
    /// A name seen before turns the existing entry into a [`XmlValue::List`]
    /// that keeps document order.
    pub fn insert(&mut self, name: impl Into<String>, value: XmlValue) {
        let name = name.into();
        let Some(pos) = self.entries.iter().position(|(key, _)| *key == name) else {
            self.entries.push((name, value));
            return;
        };

        let existing = &mut self.entries[pos].1;
        match existing {
            XmlValue::List(items) => items.push(value),
            _ => {
                let first = std::mem::replace(existing, XmlValue::List(Vec::new()));
                *existing = XmlValue::List(vec![first, value]);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&XmlValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &XmlValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Text of a leaf child, failing fast when the child is absent or not a leaf
    pub fn text(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(XmlValue::Text(text)) => Ok(text.as_str()),
            Some(other) => Err(Error::invalid_field(name, &format!("{:?}", other))),
            None => Err(Error::missing_field(name, "envelope")),
        }
    }

    /// Text of a leaf child if present
    pub fn text_opt(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(XmlValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Parse a leaf child into `T`
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T> {
        let raw = self.text(name)?;
        raw.trim()
            .parse()
            .map_err(|_| Error::invalid_field(name, raw))
    }

    /// Parse a leaf child into `T`, falling back to `T::default()` when absent or empty
    pub fn parse_or_default<T: FromStr + Default>(&self, name: &str) -> Result<T> {
        match self.text_opt(name).map(str::trim) {
            None | Some("") => Ok(T::default()),
            Some(raw) => raw.parse().map_err(|_| Error::invalid_field(name, raw)),
        }
    }

    /// Nested map child
    pub fn map(&self, name: &str) -> Result<&XmlMap> {
        match self.get(name) {
            Some(XmlValue::Map(map)) => Ok(map),
            Some(other) => Err(Error::invalid_field(name, &format!("{:?}", other))),
            None => Err(Error::missing_field(name, "envelope")),
        }
    }
}

impl Serialize for XmlMap {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl XmlValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&XmlMap> {
        match self {
            XmlValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Child lookup that treats non-map values as having no children
    pub fn get(&self, name: &str) -> Option<&XmlValue> {
        self.as_map().and_then(|map| map.get(name))
    }
}

/// Normalize a repeatable element into a sequence.
///
/// The device presents a repeatable element as a bare value when exactly one
/// item exists, and as an empty element (or not at all) when there are none.
pub fn coerce_to_sequence(value: Option<&XmlValue>) -> Vec<&XmlValue> {
    match value {
        None => Vec::new(),
        Some(XmlValue::Text(text)) if text.trim().is_empty() => Vec::new(),
        Some(XmlValue::List(items)) => items.iter().collect(),
        Some(single) => vec![single],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> XmlValue {
        XmlValue::Text(value.to_string())
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut map = XmlMap::new();
        map.insert("b", text("1"));
        map.insert("a", text("2"));

        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_repeated_names_become_list() {
        let mut map = XmlMap::new();
        map.insert("Index", text("1"));
        map.insert("Index", text("2"));
        map.insert("Index", text("3"));

        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get("Index"),
            Some(&XmlValue::List(vec![text("1"), text("2"), text("3")]))
        );
    }

    #[test]
    fn test_typed_accessors() {
        let mut map = XmlMap::new();
        map.insert("Count", text(" 42 "));
        map.insert("Empty", text(""));
        map.insert("Word", text("abc"));

        assert_eq!(map.parse::<u32>("Count").unwrap(), 42);
        assert_eq!(map.parse_or_default::<u32>("Empty").unwrap(), 0);
        assert_eq!(map.parse_or_default::<u32>("Absent").unwrap(), 0);
        assert!(matches!(
            map.parse::<u32>("Word"),
            Err(Error::InvalidField { .. })
        ));
        assert!(matches!(
            map.text("Absent"),
            Err(Error::MissingField { .. })
        ));
    }

    #[test]
    fn test_coerce_to_sequence() {
        let single = XmlValue::Map(XmlMap::new());
        assert_eq!(coerce_to_sequence(Some(&single)).len(), 1);

        let many = XmlValue::List(vec![text("a"), text("b")]);
        assert_eq!(coerce_to_sequence(Some(&many)), vec![&text("a"), &text("b")]);

        assert!(coerce_to_sequence(None).is_empty());
        assert!(coerce_to_sequence(Some(&text(""))).is_empty());
    }

    #[test]
    fn test_serialize_as_json_object() {
        let mut inner = XmlMap::new();
        inner.insert("Index", text("40001"));
        let mut map = XmlMap::new();
        map.insert("Count", text("1"));
        map.insert("Message", XmlValue::Map(inner));

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Count": "1", "Message": {"Index": "40001"}})
        );
    }
}
