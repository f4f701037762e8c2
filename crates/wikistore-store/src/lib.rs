//! # wikistore-store
//!
//! Versioned file-backed wiki pages.
//!
//! Every page is one `.wiki` file (front matter plus body) and an optional
//! folder of the same name holding its children. Writes and reads go through a
//! [`VersionsController`], which decides how versions are kept:
//! - [`SimpleFileVersionsController`] keeps only the head file
//! - [`HistoryVersionsController`] also keeps snapshots under `.history/`

use std::sync::Arc;

use wikistore_core::config::{VersionsBackend, WikiConfig};
use wikistore_core::error::WikiError;

pub mod factory;
pub mod history;
pub mod page;
pub mod simple;
pub mod versions;
pub mod watcher;

pub use factory::{FileSystemSubWikiPageFactory, SubWikiPageFactory};
pub use history::HistoryVersionsController;
pub use page::{WikiFilePage, WikiPage};
pub use simple::SimpleFileVersionsController;
pub use versions::{FileVersion, VersionInfo, VersionsController};
pub use watcher::{page_path, PageEvent, PageWatcher};

/// Open the root page described by `config`, creating its folder if needed.
///
/// # Errors
///
/// Returns [`WikiError::Io`] if the root folder cannot be created.
pub fn open_root(config: &WikiConfig) -> Result<WikiFilePage, WikiError> {
    let versions: Arc<dyn VersionsController> = match config.versions {
        VersionsBackend::Simple => Arc::new(SimpleFileVersionsController),
        VersionsBackend::History => Arc::new(HistoryVersionsController::new(config.max_versions)),
    };
    WikiFilePage::create_root(&config.root, versions)
}
