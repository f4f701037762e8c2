//! Change notification for a page tree.
//!
//! A [`WikiFilePage`](crate::page::WikiFilePage) caches its data and does not
//! see writes made through other instances or other processes. [`PageWatcher`]
//! maps file system events under the root folder back to page paths so that
//! holders know which pages to `reset_cache`.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use wikistore_core::error::WikiError;
use wikistore_core::path::{is_wiki_word, WikiPath};

use crate::versions::FILE_EXTENSION;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// The page file was written.
    Changed(WikiPath),
    /// The page file is gone.
    Removed(WikiPath),
}

impl PageEvent {
    #[must_use]
    pub fn page(&self) -> &WikiPath {
        match self {
            Self::Changed(page) | Self::Removed(page) => page,
        }
    }
}

/// The page stored in `file`, for a file under the root folder `root`.
///
/// `None` for anything that is not a page file: other extensions, names that
/// are not WikiWords, and everything under dot-folders such as `.history`.
#[must_use]
pub fn page_path(root: &Path, file: &Path) -> Option<WikiPath> {
    let relative = file.strip_prefix(root).ok()?;
    if relative.extension()?.to_str()? != FILE_EXTENSION {
        return None;
    }
    relative
        .with_extension("")
        .iter()
        .try_fold(WikiPath::root(), |page, name| {
            let name = name.to_str()?;
            is_wiki_word(name).then(|| page.child(name))
        })
        .filter(|page| !page.is_empty())
}

fn page_events(root: &Path, event: &Event) -> Vec<PageEvent> {
    let make: fn(WikiPath) -> PageEvent = match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) | EventKind::Remove(_) => {
            PageEvent::Removed
        }
        EventKind::Create(_) | EventKind::Modify(_) => PageEvent::Changed,
        _ => return Vec::new(),
    };
    event
        .paths
        .iter()
        .filter_map(|file| page_path(root, file))
        .map(make)
        .collect()
}

/// Watches the files of a page tree.
pub struct PageWatcher {
    _watcher: RecommendedWatcher,
    events: mpsc::Receiver<PageEvent>,
}

impl PageWatcher {
    /// Start watching the page tree kept in `root` (the root page's folder).
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Io`] if `root` cannot be resolved or watched.
    pub fn start(root: &Path) -> Result<Self, WikiError> {
        let root = root.canonicalize()?;
        let (sender, events) = mpsc::channel();

        let watched = root.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "file watch error");
                    return;
                }
            };
            for page_event in page_events(&watched, &event) {
                debug!(page = %page_event.page(), kind = ?event.kind, "page file event");
                // The receiver only goes away with the watcher.
                let _ = sender.send(page_event);
            }
        })
        .map_err(|e| WikiError::Io(std::io::Error::other(e)))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| WikiError::Io(std::io::Error::other(e)))?;

        Ok(Self {
            _watcher: watcher,
            events,
        })
    }

    /// The next event, waiting at most `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PageEvent> {
        self.events.recv_timeout(timeout).ok()
    }

    /// The next event if one is already queued.
    pub fn try_recv(&self) -> Option<PageEvent> {
        self.events.try_recv().ok()
    }
}
