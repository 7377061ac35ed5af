use crate::documents::Document;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{} must have one of these extensions: {}", .path.display(), .expected.join(", "))]
    UnsupportedExtension {
        path: PathBuf,
        expected: Vec<String>,
    },

    #[error("Failed to scan {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

/// Finds documents with supported extensions
#[derive(Debug, Clone)]
pub struct DocumentScanner {
    extensions: Vec<String>,
}

impl DocumentScanner {
    /// `extensions` are matched case-insensitively, without the leading dot
    pub fn new(extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.into().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|s| s.eq_ignore_ascii_case(ext)))
    }

    /// Documents at `path`, sorted. A directory yields its direct children,
    /// or the whole tree when `recursive`.
    pub fn scan(&self, path: &Path, recursive: bool) -> Result<Vec<Document>, DiscoveryError> {
        if !path.exists() {
            return Err(DiscoveryError::NotFound(path.to_path_buf()));
        }

        if path.is_file() {
            if !self.is_supported(path) {
                return Err(DiscoveryError::UnsupportedExtension {
                    path: path.to_path_buf(),
                    expected: self.extensions.iter().map(|e| format!(".{e}")).collect(),
                });
            }
            let root = path.parent().unwrap_or(path);
            return Ok(vec![Document::new(path.to_path_buf(), root)]);
        }

        let mut builder = WalkBuilder::new(path);
        builder
            .hidden(true)
            .ignore(false)
            .parents(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .max_depth(if recursive { None } else { Some(1) });

        let mut documents = Vec::new();
        for entry in builder.build() {
            let entry = entry.map_err(|source| DiscoveryError::Walk {
                path: path.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if self.is_supported(entry.path()) {
                documents.push(Document::new(entry.into_path(), path));
            }
        }

        documents.sort();
        debug!(
            "Found {} documents under {}",
            documents.len(),
            path.display()
        );
        Ok(documents)
    }
}

impl Default for DocumentScanner {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EXTENSIONS.iter().copied())
    }
}
