//! # wikistore-core
//!
//! Core types for the wikistore page store.
//!
//! This crate defines everything that does not touch the filesystem:
//! - [`PageProperty`]: the ordered property tree carried by every page
//! - [`PageData`]: page content paired with its properties
//! - Front-matter encoding and decoding ([`frontmatter`])
//! - [`WikiPath`]: dotted page addressing and WikiWord validation
//! - Error hierarchy ([`WikiError`], [`VersionsError`])
//! - [`WikiConfig`]: `wikistore.toml` settings

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod page_data;
pub mod path;
pub mod property;

pub use config::{VersionsBackend, WikiConfig};
pub use error::{Result, VersionsError, WikiError};
pub use page_data::PageData;
pub use path::{is_wiki_word, PathMode, WikiPath};
pub use property::{PageProperty, PropertyValue};
