//! Dotted page paths (`FrontPage.ChildPage`) and WikiWord validation.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::WikiError;

/// Whether `name` has the capitalized camel-case WikiWord shape:
/// `[A-Z][a-z0-9]+([A-Z][a-z0-9]+)+`.
#[must_use]
pub fn is_wiki_word(name: &str) -> bool {
    let mut humps = 0;
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if !c.is_ascii_uppercase() {
            return false;
        }
        let mut tail = 0;
        while chars
            .peek()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            chars.next();
            tail += 1;
        }
        if tail == 0 {
            return false;
        }
        humps += 1;
    }
    humps >= 2
}

/// How a path is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathMode {
    /// `A.B`: a sibling of the current page.
    #[default]
    Relative,
    /// `.A.B`: from the root.
    Absolute,
    /// `>A.B` or `^A.B`: below the current page.
    SubPage,
    /// `<A.B`: from the nearest ancestor that has `A`.
    BackwardSearch,
}

impl PathMode {
    fn prefix(self) -> &'static str {
        match self {
            Self::Relative => "",
            Self::Absolute => ".",
            Self::SubPage => ">",
            Self::BackwardSearch => "<",
        }
    }
}

/// An ordered sequence of page names plus an anchoring mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WikiPath {
    mode: PathMode,
    names: Vec<String>,
}

impl WikiPath {
    /// The root page, as an absolute path with no names.
    #[must_use]
    pub fn root() -> Self {
        Self {
            mode: PathMode::Absolute,
            names: Vec::new(),
        }
    }

    /// Parse a dotted path. Every segment must be a WikiWord.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::InvalidPath`] for empty or malformed segments.
    pub fn parse(input: &str) -> Result<Self, WikiError> {
        let input = input.trim();
        let (mode, rest) = match input.chars().next() {
            Some('.') => (PathMode::Absolute, &input[1..]),
            Some('>') | Some('^') => (PathMode::SubPage, &input[1..]),
            Some('<') => (PathMode::BackwardSearch, &input[1..]),
            _ => (PathMode::Relative, input),
        };

        if rest.is_empty() {
            return Ok(Self {
                mode,
                names: Vec::new(),
            });
        }

        let names = rest
            .split('.')
            .map(|name| {
                if is_wiki_word(name) {
                    Ok(name.to_string())
                } else {
                    Err(WikiError::InvalidPath(input.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { mode, names })
    }

    #[must_use]
    pub fn mode(&self) -> PathMode {
        self.mode
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    /// Names joined by dots, without the anchoring prefix.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.names.join(".")
    }

    /// This path extended by one name.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let mut names = self.names.clone();
        names.push(name.to_string());
        Self {
            mode: self.mode,
            names,
        }
    }

    /// This path without its last name; `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.names.split_last()?;
        Some(Self {
            mode: self.mode,
            names: rest.to_vec(),
        })
    }

    /// Resolve against the absolute path of the current page.
    ///
    /// Backward searches depend on which pages exist, so they cannot be
    /// resolved from names alone and yield `None`.
    #[must_use]
    pub fn resolve(&self, base: &WikiPath) -> Option<WikiPath> {
        let names = match self.mode {
            PathMode::Absolute => self.names.clone(),
            PathMode::SubPage => [base.names.as_slice(), self.names.as_slice()].concat(),
            PathMode::Relative => {
                let parent = base.names.split_last().map_or(&[][..], |(_, p)| p);
                [parent, self.names.as_slice()].concat()
            }
            PathMode::BackwardSearch => return None,
        };
        Some(Self {
            mode: PathMode::Absolute,
            names,
        })
    }
}

impl fmt::Display for WikiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mode.prefix(), self.names.join("."))
    }
}

impl FromStr for WikiPath {
    type Err = WikiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for WikiPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
