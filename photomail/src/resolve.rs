//! Mapping identifiers to photo files on disk.

use std::path::{Path, PathBuf};

/// Where a row's photos live and how their file names are formed.
#[derive(Debug, Clone)]
pub struct PhotoSource {
    pub folder: PathBuf,
    /// Prepended to the identifier; may be empty.
    pub suffix: String,
    /// File extension without the dot, e.g. `jpg`.
    pub filetype: String,
}

/// Expected file for one identifier, and whether it is there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttachment {
    pub identifier: String,
    pub filename: String,
    pub path: PathBuf,
    pub exists: bool,
}

/// Build `{suffix}{identifier}.{filetype}` and look it up under `folder`.
pub fn resolve(identifier: &str, folder: &Path, suffix: &str, filetype: &str) -> ResolvedAttachment {
    let filename = format!("{suffix}{identifier}.{filetype}");
    let path = folder.join(&filename);
    let exists = path.exists();
    ResolvedAttachment {
        identifier: identifier.to_string(),
        filename,
        path,
        exists,
    }
}

impl PhotoSource {
    pub fn resolve(&self, identifier: &str) -> ResolvedAttachment {
        resolve(identifier, &self.folder, &self.suffix, &self.filetype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_name_from_suffix_identifier_and_type() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("EVT042.jpg"), b"jpeg").unwrap();

        let found = resolve("042", dir.path(), "EVT", "jpg");
        assert_eq!(found.filename, "EVT042.jpg");
        assert_eq!(found.path, dir.path().join("EVT042.jpg"));
        assert!(found.exists);

        let missing = resolve("043", dir.path(), "EVT", "jpg");
        assert_eq!(missing.filename, "EVT043.jpg");
        assert!(!missing.exists);
    }

    #[test]
    fn empty_suffix_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("7.png"), b"png").unwrap();

        let source = PhotoSource {
            folder: dir.path().to_path_buf(),
            suffix: String::new(),
            filetype: "png".into(),
        };
        assert!(source.resolve("7").exists);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn lookup_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("evt1.jpg"), b"jpeg").unwrap();
        assert!(!resolve("1", dir.path(), "EVT", "jpg").exists);
    }
}
