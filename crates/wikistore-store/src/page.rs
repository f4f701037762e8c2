//! File-backed wiki pages.
//!
//! A page named `ChildPage` under a parent whose folder is `D` lives in the
//! file `D/ChildPage.wiki`; its own children live under `D/ChildPage/`.
//! All reads and writes of the page file go through a [`VersionsController`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{debug, info};

use wikistore_core::error::{VersionsError, WikiError};
use wikistore_core::frontmatter;
use wikistore_core::page_data::PageData;
use wikistore_core::path::{is_wiki_word, PathMode, WikiPath};
use wikistore_core::property::{PageProperty, LAST_MODIFYING_USER};

use crate::factory::{FileSystemSubWikiPageFactory, SubWikiPageFactory};
use crate::versions::{FileVersion, VersionInfo, VersionsController, FILE_EXTENSION};

/// What every page variant can do.
pub trait WikiPage: Sized + Clone {
    fn name(&self) -> &str;

    /// Absolute path of this page from the root.
    fn path(&self) -> &WikiPath;

    /// A fresh copy of the page data. Changes to it are only stored by
    /// [`commit`](Self::commit).
    fn data(&self) -> Result<PageData, WikiError>;

    /// Store `data` as a new version of this page.
    ///
    /// The version is stamped with `data.last_modified()`, or the current
    /// time when that is unset.
    fn commit(&self, data: &PageData) -> Result<VersionInfo, WikiError>;

    fn children(&self) -> Result<Vec<Self>, WikiError>;

    fn child_page(&self, name: &str) -> Result<Option<Self>, WikiError>;

    /// Create (or overwrite) the child `name` with `data`.
    fn add_child(&self, name: &str, data: &PageData) -> Result<Self, WikiError>;

    fn remove_child_page(&self, name: &str) -> Result<(), WikiError> {
        match self.child_page(name)? {
            Some(child) => child.remove(),
            None => Ok(()),
        }
    }

    /// Delete this page and everything below it.
    fn remove(&self) -> Result<(), WikiError>;

    /// This page pinned to an earlier version.
    fn version(&self, version: &str) -> Result<Self, WikiError>;

    fn versions(&self) -> Result<Vec<VersionInfo>, WikiError>;

    /// Follow `path`'s names downward from this page.
    ///
    /// The anchoring of `path` is not interpreted here; backward searches are
    /// rejected. Resolve anchors with [`WikiPath::resolve`] first.
    fn page_at(&self, path: &WikiPath) -> Result<Option<Self>, WikiError> {
        if path.mode() == PathMode::BackwardSearch {
            return Err(WikiError::InvalidPath(path.to_string()));
        }
        let mut current = self.clone();
        for name in path.names() {
            match current.child_page(name)? {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

/// A page stored as one `.wiki` file holding front matter and content.
#[derive(Debug)]
pub struct WikiFilePage {
    dir: PathBuf,
    file: PathBuf,
    name: String,
    path: WikiPath,
    version_name: Option<String>,
    versions: Arc<dyn VersionsController>,
    factory: Arc<dyn SubWikiPageFactory>,
    cache: Mutex<Option<PageData>>,
}

impl WikiFilePage {
    /// The root page of the tree kept in directory `dir`.
    ///
    /// The root's own page file is `dir` with `.wiki` appended.
    pub fn root(dir: impl Into<PathBuf>, versions: Arc<dyn VersionsController>) -> Self {
        Self::root_with_factory(dir, versions, Arc::new(FileSystemSubWikiPageFactory))
    }

    pub fn root_with_factory(
        dir: impl Into<PathBuf>,
        versions: Arc<dyn VersionsController>,
        factory: Arc<dyn SubWikiPageFactory>,
    ) -> Self {
        let dir = dir.into();
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let mut file = dir.clone().into_os_string();
        file.push(format!(".{FILE_EXTENSION}"));

        Self {
            file: PathBuf::from(file),
            dir,
            name,
            path: WikiPath::root(),
            version_name: None,
            versions,
            factory,
            cache: Mutex::new(None),
        }
    }

    /// Like [`root`](Self::root), creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::Io`] if the directory cannot be created.
    pub fn create_root(
        dir: impl Into<PathBuf>,
        versions: Arc<dyn VersionsController>,
    ) -> Result<Self, WikiError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!(root = %dir.display(), "opened page tree");
        Ok(Self::root(dir, versions))
    }

    /// A handle on the child `name`, whether or not its file exists yet.
    #[must_use]
    pub fn make_child(&self, name: &str) -> Self {
        Self {
            dir: self.dir.join(name),
            file: self.factory.child_file(self, name),
            name: name.to_string(),
            path: self.path.child(name),
            version_name: None,
            versions: Arc::clone(&self.versions),
            factory: Arc::clone(&self.factory),
            cache: Mutex::new(None),
        }
    }

    /// The parent page, rebuilt from this page's location.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let parent_path = self.path.parent()?;
        let parent_dir = self.dir.parent()?;
        let name = match parent_path.last() {
            Some(name) => name.to_string(),
            None => parent_dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string(),
        };
        let mut file = parent_dir.as_os_str().to_owned();
        file.push(format!(".{FILE_EXTENSION}"));
        Some(Self {
            dir: parent_dir.to_path_buf(),
            file: PathBuf::from(file),
            name,
            path: parent_path,
            version_name: None,
            versions: Arc::clone(&self.versions),
            factory: Arc::clone(&self.factory),
            cache: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Folder holding this page's children.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The page file itself.
    #[must_use]
    pub fn wiki_file(&self) -> &Path {
        &self.file
    }

    /// The pinned version, or `None` for head.
    #[must_use]
    pub fn version_name(&self) -> Option<&str> {
        self.version_name.as_deref()
    }

    /// Properties this page inherits before its front matter applies.
    #[must_use]
    pub fn default_properties(&self) -> PageProperty {
        PageProperty::defaults_for(&self.name)
    }

    /// Drop the cached page data; the next read goes to the controller.
    pub fn reset_cache(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn load_failure(&self, source: VersionsError) -> WikiError {
        WikiError::PageLoad {
            page: self.dir.display().to_string(),
            source,
        }
    }

    fn load(&self) -> Result<PageData, WikiError> {
        let defaults = self.default_properties();
        let revisions = match self
            .versions
            .revision_data(self.version_name.as_deref(), &self.file)
        {
            Ok(revisions) => revisions,
            Err(e) if e.is_not_found() => {
                if let Some(version) = &self.version_name {
                    return Err(WikiError::VersionNotFound {
                        page: self.path.to_string(),
                        version: version.clone(),
                    });
                }
                debug!(page = %self.path, "no page file yet, using defaults");
                return Ok(PageData::new("", defaults));
            }
            Err(e) => return Err(self.load_failure(e)),
        };

        let primary = revisions.into_iter().next().ok_or_else(|| {
            self.load_failure(VersionsError::NotFound {
                path: self.file.clone(),
                version: self.version_name.clone(),
            })
        })?;
        let text = String::from_utf8(primary.content).map_err(|_| {
            self.load_failure(VersionsError::Encoding {
                path: self.file.clone(),
            })
        })?;

        let (content, mut properties) = frontmatter::decode(&text, &defaults);
        if let Some(author) = primary.author {
            properties.set_text(LAST_MODIFYING_USER, author);
        }
        properties.set_last_modified(Some(primary.last_modified));
        Ok(PageData::new(content, properties))
    }
}

impl Clone for WikiFilePage {
    /// Clones share storage but not the cache.
    fn clone(&self) -> Self {
        Self {
            dir: self.dir.clone(),
            file: self.file.clone(),
            name: self.name.clone(),
            path: self.path.clone(),
            version_name: self.version_name.clone(),
            versions: Arc::clone(&self.versions),
            factory: Arc::clone(&self.factory),
            cache: Mutex::new(None),
        }
    }
}

impl WikiPage for WikiFilePage {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &WikiPath {
        &self.path
    }

    fn data(&self) -> Result<PageData, WikiError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(data) = cache.as_ref() {
            return Ok(data.clone());
        }
        debug!(page = %self.path, version = ?self.version_name, "loading page data");
        let data = self.load()?;
        *cache = Some(data.clone());
        Ok(data)
    }

    fn commit(&self, data: &PageData) -> Result<VersionInfo, WikiError> {
        self.reset_cache();
        let version = FileVersion {
            file: self.file.clone(),
            content: frontmatter::write_page(data, &self.default_properties()).into_bytes(),
            author: data.last_modifying_user().map(str::to_string),
            last_modified: data.last_modified().unwrap_or_else(Utc::now),
        };
        let info = self
            .versions
            .make_version(&version)
            .map_err(|source| WikiError::PageCommit {
                page: self.dir.display().to_string(),
                source,
            })?;
        info!(page = %self.path, version = %info.name, "committed page");
        Ok(info)
    }

    fn children(&self) -> Result<Vec<Self>, WikiError> {
        self.factory.children(self)
    }

    fn child_page(&self, name: &str) -> Result<Option<Self>, WikiError> {
        self.factory.child_page(self, name)
    }

    fn add_child(&self, name: &str, data: &PageData) -> Result<Self, WikiError> {
        if !is_wiki_word(name) {
            return Err(WikiError::InvalidPageName(name.to_string()));
        }
        let child = self.make_child(name);
        child.commit(data)?;
        Ok(child)
    }

    fn remove(&self) -> Result<(), WikiError> {
        self.reset_cache();
        self.versions
            .delete(&self.dir, &self.file)
            .map_err(|source| WikiError::PageRemove {
                page: self.path.to_string(),
                source,
            })?;
        info!(page = %self.path, "removed page");
        Ok(())
    }

    fn version(&self, version: &str) -> Result<Self, WikiError> {
        if let Err(e) = self.versions.revision_data(Some(version), &self.file) {
            return Err(if e.is_not_found() {
                WikiError::VersionNotFound {
                    page: self.path.to_string(),
                    version: version.to_string(),
                }
            } else {
                self.load_failure(e)
            });
        }
        let mut pinned = self.clone();
        pinned.version_name = Some(version.to_string());
        Ok(pinned)
    }

    fn versions(&self) -> Result<Vec<VersionInfo>, WikiError> {
        self.versions
            .history(&self.file)
            .map_err(|e| self.load_failure(e))
    }
}
