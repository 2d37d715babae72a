//! Recipient spreadsheet decoding.
//!
//! The first worksheet must have a header row containing `Name`, `Email` and one
//! or more attachment columns, i.e. headers starting with the configured prefix
//! (`Photo` by default). Attachment columns keep their sheet order.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use thiserror::Error;

mod cell;

pub use cell::CellValue;

pub const NAME_HEADER: &str = "Name";
pub const EMAIL_HEADER: &str = "Email";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("cannot open workbook: {0}")]
    Open(#[from] calamine::Error),

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error("worksheet has no header row")]
    NoHeader,

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("no column header starts with '{0}'")]
    NoAttachmentColumns(String),
}

/// One data row of the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientRow {
    pub name: String,
    pub email: String,
    /// One cell per attachment column, in column order.
    pub photo_cells: Vec<CellValue>,
}

/// Decoded recipient sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientSheet {
    /// Attachment column headers, in sheet order.
    pub attachment_columns: Vec<String>,
    pub rows: Vec<RecipientRow>,
}

impl RecipientSheet {
    /// Read the first worksheet of the workbook at `path`.
    ///
    /// The decoder is picked from the file extension (xlsx, xlsm, xlsb, xls, ods).
    pub fn load(path: &Path, attachment_prefix: &str) -> Result<Self, SheetError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(SheetError::NoWorksheet)??;
        Self::from_range(&range, attachment_prefix)
    }

    pub fn from_range(range: &Range<Data>, attachment_prefix: &str) -> Result<Self, SheetError> {
        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .ok_or(SheetError::NoHeader)?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let position = |wanted: &'static str| {
            header
                .iter()
                .position(|h| h == wanted)
                .ok_or(SheetError::MissingColumn(wanted))
        };
        let name_idx = position(NAME_HEADER)?;
        let email_idx = position(EMAIL_HEADER)?;

        let photo_idx: Vec<usize> = header
            .iter()
            .enumerate()
            .filter(|(_, h)| h.starts_with(attachment_prefix))
            .map(|(i, _)| i)
            .collect();
        if photo_idx.is_empty() {
            return Err(SheetError::NoAttachmentColumns(attachment_prefix.to_string()));
        }

        let cell_at = |row: &[Data], idx: usize| {
            row.get(idx).map(CellValue::from).unwrap_or(CellValue::Absent)
        };

        let recipients = rows
            .filter(|row| row.iter().any(|c| !CellValue::from(c).is_absent()))
            .map(|row| RecipientRow {
                name: cell_at(row, name_idx).render(),
                email: cell_at(row, email_idx).render().trim().to_string(),
                photo_cells: photo_idx.iter().map(|&i| cell_at(row, i)).collect(),
            })
            .collect();

        Ok(Self {
            attachment_columns: photo_idx.iter().map(|&i| header[i].clone()).collect(),
            rows: recipients,
        })
    }
}
