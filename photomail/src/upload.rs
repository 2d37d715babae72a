//! On-disk staging for uploaded spreadsheets.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "xla", "xlam", "ods"];

/// An uploaded spreadsheet as received from the client.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    /// Client-side file name, used only to pick the decoder.
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Temporary copy of an upload; the file is removed when this is dropped.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    pub fn stage(upload: &Upload) -> io::Result<Self> {
        let extension = upload
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| WORKBOOK_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or_else(|| "xlsx".to_string());

        let mut file = tempfile::Builder::new()
            .prefix("photomail-upload-")
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        file.write_all(&upload.bytes)?;
        file.flush()?;

        tracing::debug!(path = %file.path().display(), bytes = upload.bytes.len(), "staged upload");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
