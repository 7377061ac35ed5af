//! Document discovery and text loading
//!
//! The scanner turns a CLI path into an ordered list of documents; the loader
//! turns one document into flat paragraph text (`"\n\n"`-joined) ready for
//! segmentation.

mod loader;
mod scanner;

pub use loader::{DocumentError, DocumentLoader};
pub use scanner::{DiscoveryError, DocumentScanner};

use std::path::{Path, PathBuf};

/// A discovered document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Document {
    pub path: PathBuf,
    /// Name used in reports: the file name, or the path relative to the
    /// scanned directory
    pub identifier: String,
}

impl Document {
    pub(crate) fn new(path: PathBuf, root: &Path) -> Self {
        let identifier = match path.strip_prefix(root) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative,
            _ => path.file_name().map(Path::new).unwrap_or(&path),
        }
        .to_string_lossy()
        .replace('\\', "/");
        Self { path, identifier }
    }
}
