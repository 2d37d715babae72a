//! The two-sheet delivery report returned to the caller.

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::row::OutcomeRecord;
use crate::sheet::{EMAIL_HEADER, NAME_HEADER};

pub const SUCCESS_SHEET: &str = "Successful";
pub const FAILED_SHEET: &str = "Failed";

/// One worksheet worth of text cells. Empty strings stay blank in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub sheets: Vec<ReportSheet>,
}

impl Report {
    pub fn build(
        attachment_columns: &[String],
        successful: &[OutcomeRecord],
        failed: &[OutcomeRecord],
    ) -> Self {
        let header: Vec<String> = [NAME_HEADER, EMAIL_HEADER]
            .into_iter()
            .map(str::to_string)
            .chain(attachment_columns.iter().cloned())
            .collect();

        let sheet = |name: &str, records: &[OutcomeRecord]| ReportSheet {
            name: name.to_string(),
            header: header.clone(),
            rows: records.iter().map(|r| render(r, attachment_columns.len())).collect(),
        };

        Self {
            sheets: vec![sheet(SUCCESS_SHEET, successful), sheet(FAILED_SHEET, failed)],
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&ReportSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Render as an xlsx workbook.
    pub fn to_xlsx(&self) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            for (col, title) in sheet.header.iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16, title, &bold)?;
            }
            for (row, cells) in sheet.rows.iter().enumerate() {
                for (col, value) in cells.iter().enumerate() {
                    // identifiers stay text so leading zeros survive
                    if !value.is_empty() {
                        worksheet.write_string(row as u32 + 1, col as u16, value)?;
                    }
                }
            }
            worksheet.autofit();
        }

        workbook.save_to_buffer()
    }
}

fn render(record: &OutcomeRecord, columns: usize) -> Vec<String> {
    let mut cells = Vec::with_capacity(columns + 2);
    cells.push(record.name.clone());
    cells.push(record.email.clone());
    cells.extend(
        (0..columns).map(|i| record.photos.get(i).cloned().flatten().unwrap_or_default()),
    );
    cells
}
