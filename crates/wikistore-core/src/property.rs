//! Page property tree.
//!
//! A [`PageProperty`] is an insertion-ordered bag of named entries. Each entry
//! is a present-flag, a text value, or a nested bag (used for symbolic links).

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Page type flags. At most one is normally set.
pub const PAGE_TYPE_ATTRIBUTES: [&str; 3] = ["Static", "Test", "Suite"];

/// Flags controlling page actions and navigation.
pub const NON_SECURITY_ATTRIBUTES: [&str; 9] = [
    "Edit",
    "Files",
    "Properties",
    "RecentChanges",
    "Refactor",
    "Search",
    "Versions",
    "WhereUsed",
    "Prune",
];

/// Action flags every page inherits. `Prune` is opt-in and not among them.
pub const DEFAULT_FLAGS: [&str; 8] = [
    "Edit",
    "Files",
    "Properties",
    "RecentChanges",
    "Refactor",
    "Search",
    "Versions",
    "WhereUsed",
];

/// Access control flags.
pub const SECURITY_ATTRIBUTES: [&str; 3] = ["secure-read", "secure-write", "secure-test"];

pub const TEST: &str = "Test";
pub const SUITE: &str = "Suite";
pub const STATIC: &str = "Static";
pub const HELP: &str = "Help";
pub const SUITES: &str = "Suites";
pub const SYMBOLIC_LINKS: &str = "SymbolicLinks";
pub const LAST_MODIFYING_USER: &str = "LastModifyingUser";

/// Whether `key` is one of the boolean attributes the front matter understands.
#[must_use]
pub fn is_flag(key: &str) -> bool {
    PAGE_TYPE_ATTRIBUTES.contains(&key)
        || NON_SECURITY_ATTRIBUTES.contains(&key)
        || SECURITY_ATTRIBUTES.contains(&key)
}

/// Value of a single property entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Present without a value.
    Flag,
    /// A scalar string.
    Text(String),
    /// A nested property bag.
    Nested(PageProperty),
}

/// Ordered, keyed property bag with a last-modification timestamp.
///
/// Equality ignores key order: two bags are equal when they hold the same
/// keys with the same values and the same timestamp.
#[derive(Debug, Clone, Default)]
pub struct PageProperty {
    entries: Vec<(String, PropertyValue)>,
    last_modified: Option<DateTime<Utc>>,
}

impl PageProperty {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The properties a page named `name` inherits before its front matter
    /// is applied.
    #[must_use]
    pub fn defaults_for(name: &str) -> Self {
        let mut props = Self::new();
        for flag in DEFAULT_FLAGS {
            props.set_flag(flag);
        }
        if name.starts_with(SUITE) || name.ends_with(SUITE) {
            props.set_flag(SUITE);
        } else if name.starts_with(TEST) || name.ends_with(TEST) {
            props.set_flag(TEST);
        }
        props
    }

    /// Insert or replace an entry. Replacing keeps the key's position.
    pub fn set(&mut self, key: &str, value: PropertyValue) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn set_flag(&mut self, key: &str) {
        self.set(key, PropertyValue::Flag);
    }

    pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
        self.set(key, PropertyValue::Text(value.into()));
    }

    /// Insert an empty nested bag under `key` (replacing any previous value)
    /// and return it for filling.
    pub fn set_nested(&mut self, key: &str) -> &mut PageProperty {
        self.set(key, PropertyValue::Nested(PageProperty::new()));
        match self.entry_mut(key) {
            Some(PropertyValue::Nested(nested)) => nested,
            _ => unreachable!("entry was just inserted as nested"),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    #[must_use]
    pub fn value(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn nested_mut(&mut self, key: &str) -> Option<&mut PageProperty> {
        match self.entry_mut(key)? {
            PropertyValue::Nested(p) => Some(p),
            _ => None,
        }
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut PropertyValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// The text value of `key`, if it is a scalar.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.value(key)? {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn nested(&self, key: &str) -> Option<&PageProperty> {
        match self.value(key)? {
            PropertyValue::Nested(p) => Some(p),
            _ => None,
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    pub fn set_last_modified(&mut self, at: Option<DateTime<Utc>>) {
        self.last_modified = at;
    }
}

impl PartialEq for PageProperty {
    fn eq(&self, other: &Self) -> bool {
        self.last_modified == other.last_modified
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.value(k).is_some_and(|ov| ov == v))
    }
}

impl Serialize for PageProperty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            match value {
                PropertyValue::Flag => map.serialize_entry(key, &true)?,
                PropertyValue::Text(s) => map.serialize_entry(key, s)?,
                PropertyValue::Nested(p) => map.serialize_entry(key, p)?,
            }
        }
        map.end()
    }
}
