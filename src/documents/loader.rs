use crate::text::paragraph_break;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors for a single document. They end up in that document's outcome and
/// never stop the batch.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8 text", .0.display())]
    NotUtf8(PathBuf),

    #[error("{} is {size} bytes, larger than the {limit} byte limit", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
}

/// Reads plain-text documents into the flat paragraph model
#[derive(Debug, Clone, Copy)]
pub struct DocumentLoader {
    max_bytes: u64,
}

impl DocumentLoader {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn load(&self, path: &Path) -> Result<String, DocumentError> {
        let io_err = |source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        };

        let size = fs::metadata(path).map_err(io_err)?.len();
        if size > self.max_bytes {
            return Err(DocumentError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_bytes,
            });
        }

        let bytes = fs::read(path).map_err(io_err)?;
        let raw = String::from_utf8(bytes).map_err(|_| DocumentError::NotUtf8(path.to_path_buf()))?;
        Ok(normalize(&raw))
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_FILE_BYTES)
    }
}

/// Strip a BOM, normalize line endings, drop blank paragraphs and join the
/// rest with a blank line
pub fn normalize(raw: &str) -> String {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw).replace("\r\n", "\n");
    paragraph_break()
        .split(&text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_paragraphs() {
        let raw = "\u{feff}  Title\r\n\r\n\r\nFirst line\r\nsecond line\r\n \t \r\n\r\n\nLast  \n";
        assert_eq!(normalize(raw), "Title\n\nFirst line\nsecond line\n\nLast");
    }

    #[test]
    fn test_normalize_blank() {
        assert_eq!(normalize(" \n\n\t\n"), "");
    }

    #[test]
    fn test_load_and_limits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "one\n\n\ntwo").unwrap();

        assert_eq!(DocumentLoader::default().load(&path).unwrap(), "one\n\ntwo");
        assert!(matches!(
            DocumentLoader::new(3).load(&path),
            Err(DocumentError::TooLarge { size: 9, limit: 3, .. })
        ));
    }

    #[test]
    fn test_binary_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        assert!(matches!(
            DocumentLoader::default().load(&path),
            Err(DocumentError::NotUtf8(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DocumentLoader::default().load(&dir.path().join("gone.txt")),
            Err(DocumentError::Io { .. })
        ));
    }
}
