//! The child-page creation policy.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use wikistore_core::error::WikiError;
use wikistore_core::page_data::PageData;
use wikistore_core::path::{is_wiki_word, WikiPath};
use wikistore_core::property::{
    PageProperty, HELP, LAST_MODIFYING_USER, STATIC, SUITE, SUITES, TEST,
};
use wikistore_store::page::WikiPage;

/// The type a new page is created as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Neither `Test` nor `Suite`.
    Static,
    Test,
    Suite,
}

impl PageType {
    /// Guess the type from the page name: `Suite` wins over `Test`.
    #[must_use]
    pub fn infer(name: &str) -> Self {
        if name.contains(SUITE) {
            Self::Suite
        } else if name.contains(TEST) {
            Self::Test
        } else {
            Self::Static
        }
    }

    /// Parse the request form value; the empty string means "infer".
    ///
    /// # Errors
    ///
    /// Returns [`UnknownPageType`] for anything but `""`, `Static`, `Test` or `Suite`.
    pub fn from_form(value: &str) -> Result<Option<Self>, UnknownPageType> {
        if value.is_empty() {
            Ok(None)
        } else {
            value.parse().map(Some)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown page type {0:?}")]
pub struct UnknownPageType(pub String);

impl FromStr for PageType {
    type Err = UnknownPageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATIC => Ok(Self::Static),
            TEST => Ok(Self::Test),
            SUITE => Ok(Self::Suite),
            other => Err(UnknownPageType(other.to_string())),
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Static => STATIC,
            Self::Test => TEST,
            Self::Suite => SUITE,
        })
    }
}

/// Why a child page was not created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    InvalidChildName(String),
    InvalidPageType(String),
    ParentNotFound(String),
    ChildExists(String),
}

impl Rejection {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidChildName(_) => "INVALID_CHILD_NAME",
            Self::InvalidPageType(_) => "INVALID_PAGE_TYPE",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::ChildExists(_) => "CHILD_EXISTS",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChildName(name) => write!(f, "Invalid Child Name: '{name}'"),
            Self::InvalidPageType(kind) => write!(f, "Invalid Page Type: '{kind}'"),
            Self::ParentNotFound(path) => write!(f, "Parent Page Not Found: '{path}'"),
            Self::ChildExists(path) => write!(f, "Child Page Exists: '{path}'"),
        }
    }
}

/// Result of a creation attempt that did not fail in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddChildOutcome {
    /// The child was written; its path from the root.
    Created(WikiPath),
    Rejected(Rejection),
}

/// What to create under a parent.
#[derive(Debug, Clone, Default)]
pub struct ChildPage<'a> {
    pub name: &'a str,
    pub content: &'a str,
    /// `None` infers the type from the name.
    pub page_type: Option<PageType>,
    pub help_text: Option<&'a str>,
    pub suites: Option<&'a str>,
    pub author: Option<&'a str>,
}

/// Validates and creates child pages.
pub struct AddChildPolicy;

impl AddChildPolicy {
    /// Create `child` under `parent`.
    ///
    /// Names that are not a single WikiWord (including the empty name) are
    /// rejected without touching storage.
    ///
    /// # Errors
    ///
    /// Propagates storage failures from looking up or committing the page.
    pub fn create<P: WikiPage>(
        parent: &P,
        child: &ChildPage<'_>,
    ) -> Result<AddChildOutcome, WikiError> {
        if !is_wiki_word(child.name) {
            debug!(name = child.name, "rejecting child name");
            return Ok(AddChildOutcome::Rejected(Rejection::InvalidChildName(
                child.name.to_string(),
            )));
        }
        if parent.child_page(child.name)?.is_some() {
            let path = parent.path().child(child.name);
            return Ok(AddChildOutcome::Rejected(Rejection::ChildExists(
                path.qualified_name(),
            )));
        }

        let data = PageData::new(child.content, Self::seed_properties(child));
        let page = parent.add_child(child.name, &data)?;
        info!(page = %page.path(), "created child page");
        Ok(AddChildOutcome::Created(page.path().clone()))
    }

    /// The properties a new child starts with.
    #[must_use]
    pub fn seed_properties(child: &ChildPage<'_>) -> PageProperty {
        let mut properties = PageProperty::defaults_for(child.name);
        properties.remove(TEST);
        properties.remove(SUITE);
        match child
            .page_type
            .unwrap_or_else(|| PageType::infer(child.name))
        {
            PageType::Test => properties.set_flag(TEST),
            PageType::Suite => properties.set_flag(SUITE),
            PageType::Static => {}
        }

        if let Some(help) = child.help_text.filter(|h| !h.is_empty()) {
            properties.set_text(HELP, help);
        }
        if let Some(suites) = child.suites.filter(|s| !s.is_empty()) {
            properties.set_text(SUITES, suites);
        }
        if let Some(author) = child.author.filter(|a| !a.is_empty()) {
            properties.set_text(LAST_MODIFYING_USER, author);
        }
        properties.set_last_modified(Some(Utc::now()));
        properties
    }
}
