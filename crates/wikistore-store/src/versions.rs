//! The versions controller seam: how page files are written, read back and
//! listed as immutable versions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wikistore_core::error::VersionsError;

/// Extension of every page file.
pub const FILE_EXTENSION: &str = "wiki";

/// One revision of one file: what a write commits and what a read returns.
#[derive(Debug, Clone, PartialEq)]
pub struct FileVersion {
    pub file: PathBuf,
    pub content: Vec<u8>,
    pub author: Option<String>,
    pub last_modified: DateTime<Utc>,
}

/// Identity of a stored version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Opaque id, passed back to [`VersionsController::revision_data`].
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created: DateTime<Utc>,
}

/// Storage backend for page files.
///
/// After a successful [`make_version`](Self::make_version),
/// `revision_data(None, file)` must return the content just written.
pub trait VersionsController: fmt::Debug + Send + Sync {
    /// Persist a new head revision of `version.file`.
    fn make_version(&self, version: &FileVersion) -> Result<VersionInfo, VersionsError>;

    /// Read a revision of `file`; `None` means head. The primary revision is first.
    fn revision_data(
        &self,
        version: Option<&str>,
        file: &Path,
    ) -> Result<Vec<FileVersion>, VersionsError>;

    /// Known versions of `file`, newest first.
    fn history(&self, file: &Path) -> Result<Vec<VersionInfo>, VersionsError>;

    /// Remove a page: its file and its children directory.
    fn delete(&self, dir: &Path, file: &Path) -> Result<(), VersionsError>;
}

pub(crate) fn write_file(path: &Path, content: &[u8]) -> Result<(), VersionsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| VersionsError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| VersionsError::io(path, e))
}

/// Read a file, mapping a missing file to [`VersionsError::NotFound`].
pub(crate) fn read_file(path: &Path, version: Option<&str>) -> Result<Vec<u8>, VersionsError> {
    fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => VersionsError::NotFound {
            path: path.to_path_buf(),
            version: version.map(str::to_string),
        },
        _ => VersionsError::io(path, e),
    })
}

pub(crate) fn modified_time(path: &Path) -> Result<DateTime<Utc>, VersionsError> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| VersionsError::io(path, e))?;
    Ok(DateTime::<Utc>::from(modified))
}

/// Remove the page file and children directory, tolerating either being absent.
pub(crate) fn remove_page_files(dir: &Path, file: &Path) -> Result<(), VersionsError> {
    match fs::remove_file(file) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(VersionsError::io(file, e)),
    }
    if dir.is_dir() {
        fs::remove_dir_all(dir).map_err(|e| VersionsError::io(dir, e))?;
    }
    Ok(())
}
