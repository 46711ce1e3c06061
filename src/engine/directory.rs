//! Model descriptor listings backed by the file system or a fixed list

use crate::engine::ModelSource;
use crate::error::{BotError, Result};
use std::path::PathBuf;
use tracing::debug;

/// Lists model descriptors from a directory on disk
#[derive(Debug, Clone)]
pub struct DirectoryModelSource {
    root: PathBuf,
}

impl DirectoryModelSource {
    /// Create a source resolving directories relative to `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ModelSource for DirectoryModelSource {
    fn list_files(&self, directory: &str, extension: &str) -> Result<Vec<String>> {
        let path = self.root.join(directory);
        let entries = std::fs::read_dir(&path).map_err(|e| BotError::ModelListing {
            directory: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BotError::ModelListing {
                directory: path.display().to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let matches_extension = name.len() > extension.len()
                && name
                    .get(name.len() - extension.len()..)
                    .is_some_and(|tail| tail.eq_ignore_ascii_case(extension));
            if matches_extension {
                files.push(format!("/{}", name));
            }
        }

        files.sort();
        debug!("Listed {} files under {}", files.len(), path.display());
        Ok(files)
    }
}

/// Returns the same fixed listing for every directory
#[derive(Debug, Clone, Default)]
pub struct StaticModelSource {
    files: Vec<String>,
}

impl StaticModelSource {
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

impl ModelSource for StaticModelSource {
    fn list_files(&self, _directory: &str, _extension: &str) -> Result<Vec<String>> {
        Ok(self.files.clone())
    }
}
