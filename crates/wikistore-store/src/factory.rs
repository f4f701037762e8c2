//! Mapping child page names onto files inside a parent's folder.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use wikistore_core::error::WikiError;
use wikistore_core::path::is_wiki_word;

use crate::page::WikiFilePage;
use crate::versions::FILE_EXTENSION;

/// Finds the child pages of a page.
pub trait SubWikiPageFactory: fmt::Debug + Send + Sync {
    /// The page file a child named `name` would use.
    fn child_file(&self, parent: &WikiFilePage, name: &str) -> PathBuf;

    /// The child named `name`, or `None` if it has no page file.
    fn child_page(&self, parent: &WikiFilePage, name: &str)
        -> Result<Option<WikiFilePage>, WikiError>;

    /// All children, ordered case-insensitively by name.
    fn children(&self, parent: &WikiFilePage) -> Result<Vec<WikiFilePage>, WikiError>;
}

/// Children are `<parent dir>/<Name>.wiki` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemSubWikiPageFactory;

fn page_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{FILE_EXTENSION}"))
}

impl SubWikiPageFactory for FileSystemSubWikiPageFactory {
    fn child_file(&self, parent: &WikiFilePage, name: &str) -> PathBuf {
        page_file(parent.dir(), name)
    }

    fn child_page(
        &self,
        parent: &WikiFilePage,
        name: &str,
    ) -> Result<Option<WikiFilePage>, WikiError> {
        if !is_wiki_word(name) || !self.child_file(parent, name).is_file() {
            return Ok(None);
        }
        Ok(Some(parent.make_child(name)))
    }

    fn children(&self, parent: &WikiFilePage) -> Result<Vec<WikiFilePage>, WikiError> {
        let entries = match fs::read_dir(parent.dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION)
                || !entry.file_type()?.is_file()
            {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                if is_wiki_word(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort_by_key(|name| name.to_lowercase());

        Ok(names.iter().map(|name| parent.make_child(name)).collect())
    }
}
