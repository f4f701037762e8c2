//! Head-only controller: page files are plain files with no history.

use std::path::Path;

use tracing::debug;

use wikistore_core::error::VersionsError;

use crate::versions::{
    modified_time, read_file, remove_page_files, write_file, FileVersion, VersionInfo,
    VersionsController,
};

/// Name reported for the only version this controller knows. Reading it
/// reads the head file.
pub const HEAD: &str = "HEAD";

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFileVersionsController;

impl VersionsController for SimpleFileVersionsController {
    fn make_version(&self, version: &FileVersion) -> Result<VersionInfo, VersionsError> {
        write_file(&version.file, &version.content)?;
        debug!(file = %version.file.display(), bytes = version.content.len(), "wrote page file");
        Ok(VersionInfo {
            name: HEAD.to_string(),
            author: version.author.clone(),
            created: version.last_modified,
        })
    }

    fn revision_data(
        &self,
        version: Option<&str>,
        file: &Path,
    ) -> Result<Vec<FileVersion>, VersionsError> {
        if let Some(version) = version.filter(|v| *v != HEAD) {
            return Err(VersionsError::NotFound {
                path: file.to_path_buf(),
                version: Some(version.to_string()),
            });
        }
        let content = read_file(file, None)?;
        Ok(vec![FileVersion {
            file: file.to_path_buf(),
            content,
            author: None,
            last_modified: modified_time(file)?,
        }])
    }

    fn history(&self, _file: &Path) -> Result<Vec<VersionInfo>, VersionsError> {
        Ok(Vec::new())
    }

    fn delete(&self, dir: &Path, file: &Path) -> Result<(), VersionsError> {
        remove_page_files(dir, file)
    }
}
