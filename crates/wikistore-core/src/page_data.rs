//! Page data: body content paired with its property tree.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::property::{PageProperty, LAST_MODIFYING_USER};

/// The content and metadata of one page revision.
///
/// Values handed out by a page are clones of its cached copy; mutating one
/// has no effect on the page until it is committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageData {
    content: String,
    properties: PageProperty,
}

impl PageData {
    pub fn new(content: impl Into<String>, properties: PageProperty) -> Self {
        Self {
            content: content.into(),
            properties,
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    #[must_use]
    pub fn properties(&self) -> &PageProperty {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PageProperty {
        &mut self.properties
    }

    /// The text value of a scalar attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }

    /// Whether the attribute is present in any form.
    #[must_use]
    pub fn has_attribute(&self, key: &str) -> bool {
        self.properties.has(key)
    }

    #[must_use]
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.properties.last_modified()
    }

    #[must_use]
    pub fn last_modifying_user(&self) -> Option<&str> {
        self.attribute(LAST_MODIFYING_USER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_are_independent() {
        let mut props = PageProperty::new();
        props.set_flag("Test");
        let original = PageData::new("body", props);

        let mut copy = original.clone();
        copy.set_content("changed");
        copy.properties_mut().remove("Test");

        assert_eq!(original.content(), "body");
        assert!(original.has_attribute("Test"));
        assert!(!copy.has_attribute("Test"));
    }

    #[test]
    fn exposes_last_modifying_user() {
        let mut props = PageProperty::new();
        props.set_text(LAST_MODIFYING_USER, "alice");
        let data = PageData::new("", props);
        assert_eq!(data.last_modifying_user(), Some("alice"));
        assert_eq!(data.last_modified(), None);
    }
}
