//! Composing the message for one recipient row.

use crate::mail::{Attachment, Email, MailError};
use crate::normalize::normalize;
use crate::resolve::PhotoSource;
use crate::sheet::RecipientRow;

/// Sender and subject shared by every message of a batch.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub sender: String,
    pub subject: String,
}

impl MessageTemplate {
    pub fn body(&self, name: &str) -> String {
        format!("Hello {name},\n\nPlease find your photos attached.")
    }
}

/// Per-row result as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRecord {
    pub name: String,
    pub email: String,
    /// Attached identifier per attachment column, `None` where nothing was attached.
    pub photos: Vec<Option<String>>,
}

impl OutcomeRecord {
    /// Record for a row where nothing could be attached.
    pub fn unattached(row: &RecipientRow) -> Self {
        Self {
            name: row.name.clone(),
            email: row.email.clone(),
            photos: vec![None; row.photo_cells.len()],
        }
    }

    pub fn attached_count(&self) -> usize {
        self.photos.iter().filter(|p| p.is_some()).count()
    }
}

/// A composed message plus what ended up attached to it.
#[derive(Debug)]
pub struct ProcessedRow {
    pub email: Email,
    pub record: OutcomeRecord,
    pub attached: usize,
    /// File names that were expected but not found or not readable.
    pub missing: Vec<String>,
}

/// Build the message for `row`, attaching every photo that exists under `source`.
///
/// Missing files only clear their column in the record; they never fail the row.
pub async fn process_row(
    row: &RecipientRow,
    source: &PhotoSource,
    template: &MessageTemplate,
) -> Result<ProcessedRow, MailError> {
    let mut builder = Email::builder()
        .from(template.sender.as_str())
        .to(row.email.as_str())
        .subject(template.subject.as_str())
        .text(template.body(&row.name));

    let mut photos = Vec::with_capacity(row.photo_cells.len());
    let mut missing = Vec::new();

    for cell in &row.photo_cells {
        let Some(identifier) = normalize(cell) else {
            photos.push(None);
            continue;
        };

        let resolved = source.resolve(&identifier);
        if !resolved.exists {
            tracing::warn!(email = %row.email, file = %resolved.filename, "photo not found");
            missing.push(resolved.filename);
            photos.push(None);
            continue;
        }

        match tokio::fs::read(&resolved.path).await {
            Ok(data) => {
                builder = builder.attach(Attachment::from_file_name(resolved.filename, data));
                photos.push(Some(resolved.identifier));
            }
            Err(e) => {
                tracing::warn!(email = %row.email, file = %resolved.filename, "photo unreadable: {e}");
                missing.push(resolved.filename);
                photos.push(None);
            }
        }
    }

    let record = OutcomeRecord {
        name: row.name.clone(),
        email: row.email.clone(),
        photos,
    };
    let attached = record.attached_count();

    Ok(ProcessedRow {
        email: builder.build()?,
        record,
        attached,
        missing,
    })
}
