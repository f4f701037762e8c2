//! Snapshot-keeping controller.
//!
//! The head revision lives at the page file as usual. Every write also stores
//! a snapshot next to it:
//! ```text
//! FrontPage.wiki
//! .history/FrontPage/20250210091500123456789-1f2e3d4c.wiki
//! .history/FrontPage/20250210091500123456789-1f2e3d4c.json
//! ```
//! The JSON sidecar holds the [`VersionInfo`]. Ids start with a nanosecond
//! timestamp, so sorting ids sorts versions by age.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use wikistore_core::error::VersionsError;

use crate::versions::{
    modified_time, read_file, remove_page_files, write_file, FileVersion, VersionInfo,
    VersionsController,
};

const HISTORY_DIR: &str = ".history";

#[derive(Debug, Clone)]
pub struct HistoryVersionsController {
    max_versions: usize,
}

impl HistoryVersionsController {
    /// Keep at most `max_versions` snapshots per page (at least one).
    #[must_use]
    pub fn new(max_versions: usize) -> Self {
        Self {
            max_versions: max_versions.max(1),
        }
    }

    fn history_dir(file: &Path) -> PathBuf {
        let stem = file.file_stem().unwrap_or_default();
        file.parent()
            .unwrap_or_else(|| Path::new(""))
            .join(HISTORY_DIR)
            .join(stem)
    }

    /// Snapshot ids of `file`, oldest first.
    fn snapshot_ids(file: &Path) -> Result<Vec<String>, VersionsError> {
        let dir = Self::history_dir(file);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(VersionsError::io(&dir, e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| VersionsError::io(&dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn read_info(file: &Path, id: &str) -> Result<VersionInfo, VersionsError> {
        let meta = Self::history_dir(file).join(format!("{id}.json"));
        let bytes = read_file(&meta, Some(id))?;
        serde_json::from_slice(&bytes).map_err(|e| VersionsError::Metadata {
            path: meta,
            message: e.to_string(),
        })
    }

    fn prune(&self, file: &Path) -> Result<(), VersionsError> {
        let ids = Self::snapshot_ids(file)?;
        if ids.len() <= self.max_versions {
            return Ok(());
        }
        let dir = Self::history_dir(file);
        for id in &ids[..ids.len() - self.max_versions] {
            debug!(file = %file.display(), version = %id, "pruning old version");
            for ext in ["wiki", "json"] {
                let path = dir.join(format!("{id}.{ext}"));
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(VersionsError::io(&path, e)),
                }
            }
        }
        Ok(())
    }
}

impl Default for HistoryVersionsController {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Version id: nanosecond timestamp plus a short content hash.
fn version_id(at: DateTime<Utc>, content: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(content));
    format!("{}-{}", at.format("%Y%m%d%H%M%S%9f"), &digest[..8])
}

fn is_version_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl VersionsController for HistoryVersionsController {
    fn make_version(&self, version: &FileVersion) -> Result<VersionInfo, VersionsError> {
        let info = VersionInfo {
            name: version_id(version.last_modified, &version.content),
            author: version.author.clone(),
            created: version.last_modified,
        };

        write_file(&version.file, &version.content)?;

        let dir = Self::history_dir(&version.file);
        write_file(&dir.join(format!("{}.wiki", info.name)), &version.content)?;
        let meta = serde_json::to_vec_pretty(&info).map_err(|e| VersionsError::Metadata {
            path: dir.join(format!("{}.json", info.name)),
            message: e.to_string(),
        })?;
        write_file(&dir.join(format!("{}.json", info.name)), &meta)?;
        debug!(file = %version.file.display(), version = %info.name, "stored version");

        self.prune(&version.file)?;
        Ok(info)
    }

    fn revision_data(
        &self,
        version: Option<&str>,
        file: &Path,
    ) -> Result<Vec<FileVersion>, VersionsError> {
        match version {
            None => {
                let content = read_file(file, None)?;
                let latest = Self::snapshot_ids(file)?
                    .pop()
                    .map(|id| Self::read_info(file, &id))
                    .transpose();
                let latest = match latest {
                    Ok(info) => info,
                    Err(e) => {
                        warn!(file = %file.display(), error = %e, "ignoring unreadable version metadata");
                        None
                    }
                };
                let (author, last_modified) = match latest {
                    Some(info) => (info.author, info.created),
                    None => (None, modified_time(file)?),
                };
                Ok(vec![FileVersion {
                    file: file.to_path_buf(),
                    content,
                    author,
                    last_modified,
                }])
            }
            Some(id) => {
                if !is_version_id(id) {
                    return Err(VersionsError::NotFound {
                        path: file.to_path_buf(),
                        version: Some(id.to_string()),
                    });
                }
                let info = Self::read_info(file, id)?;
                let snapshot = Self::history_dir(file).join(format!("{id}.wiki"));
                let content = read_file(&snapshot, Some(id))?;
                Ok(vec![FileVersion {
                    file: file.to_path_buf(),
                    content,
                    author: info.author,
                    last_modified: info.created,
                }])
            }
        }
    }

    fn history(&self, file: &Path) -> Result<Vec<VersionInfo>, VersionsError> {
        let mut infos = Self::snapshot_ids(file)?
            .iter()
            .map(|id| Self::read_info(file, id))
            .collect::<Result<Vec<_>, _>>()?;
        infos.reverse();
        Ok(infos)
    }

    fn delete(&self, dir: &Path, file: &Path) -> Result<(), VersionsError> {
        remove_page_files(dir, file)?;
        let history = Self::history_dir(file);
        if history.is_dir() {
            fs::remove_dir_all(&history).map_err(|e| VersionsError::io(&history, e))?;
        }
        Ok(())
    }
}
