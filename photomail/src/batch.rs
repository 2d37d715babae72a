//! Running one upload end to end.
//!
//! Order matters: the sender password is resolved before the upload is touched,
//! the spreadsheet is decoded before the relay is contacted, and the relay
//! session is closed exactly once after the last row.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::credentials::CredentialMap;
use crate::error::BatchError;
use crate::mail::{Login, MailSession, Mailer};
use crate::report::Report;
use crate::resolve::PhotoSource;
use crate::row::{process_row, MessageTemplate, OutcomeRecord};
use crate::sheet::RecipientSheet;
use crate::upload::{StagedUpload, Upload};

/// Everything one request asks for.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub sender_email: String,
    /// Ignored when the sender has a mapped credential.
    pub sender_pass: String,
    pub photo_folder: PathBuf,
    pub photo_suffix: String,
    pub filetype: String,
    pub upload: Upload,
}

/// Fixed per-deployment settings for batches.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub subject: String,
    pub attachment_prefix: String,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            subject: "Your Photos".to_string(),
            attachment_prefix: "Photo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchSummary {
    pub sent: usize,
    pub failed: usize,
    pub missing_files: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub attachment_columns: Vec<String>,
    pub successful: Vec<OutcomeRecord>,
    pub failed: Vec<OutcomeRecord>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn to_report(&self) -> Report {
        Report::build(&self.attachment_columns, &self.successful, &self.failed)
    }
}

pub struct BatchRunner<M> {
    mailer: M,
    credentials: CredentialMap,
    settings: BatchSettings,
}

impl<M: Mailer> BatchRunner<M> {
    pub fn new(mailer: M, credentials: CredentialMap, settings: BatchSettings) -> Self {
        Self {
            mailer,
            credentials,
            settings,
        }
    }

    pub async fn run(&self, request: BatchRequest) -> Result<BatchReport, BatchError> {
        let started = Instant::now();
        let password = self
            .credentials
            .resolve(&request.sender_email, &request.sender_pass)?;

        let sheet = self.load_sheet(request.upload).await?;
        tracing::info!(
            sender = %request.sender_email,
            rows = sheet.rows.len(),
            columns = ?sheet.attachment_columns,
            "starting batch"
        );

        let login = Login::new(request.sender_email.as_str(), password);
        let mut session = self
            .mailer
            .open_session(&login)
            .await
            .map_err(BatchError::from_session)?;

        let source = PhotoSource {
            folder: request.photo_folder,
            suffix: request.photo_suffix,
            filetype: request.filetype,
        };
        let template = MessageTemplate {
            sender: request.sender_email,
            subject: self.settings.subject.clone(),
        };

        let mut successful = Vec::new();
        let mut failed = Vec::new();
        let mut missing_files = 0;

        for row in &sheet.rows {
            let processed = match process_row(row, &source, &template).await {
                Ok(processed) => processed,
                Err(e) => {
                    tracing::warn!(email = %row.email, "cannot compose message: {e}");
                    failed.push(OutcomeRecord::unattached(row));
                    continue;
                }
            };
            missing_files += processed.missing.len();

            if processed.attached == 0 {
                tracing::debug!(email = %row.email, "no photos found, not sending");
                failed.push(processed.record);
                continue;
            }

            match session.send(&processed.email).await {
                Ok(()) => {
                    tracing::debug!(email = %row.email, attached = processed.attached, "sent");
                    successful.push(processed.record);
                }
                Err(e) => {
                    tracing::warn!(email = %row.email, "send failed: {e}");
                    failed.push(processed.record);
                }
            }
        }

        session.close().await;

        let summary = BatchSummary {
            sent: successful.len(),
            failed: failed.len(),
            missing_files,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            sent = summary.sent,
            failed = summary.failed,
            missing_files = summary.missing_files,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "batch finished"
        );

        Ok(BatchReport {
            attachment_columns: sheet.attachment_columns,
            successful,
            failed,
            summary,
        })
    }

    /// Stage the upload and decode it off the async runtime.
    ///
    /// The staged copy is dropped, and so deleted, before this returns.
    async fn load_sheet(&self, upload: Upload) -> Result<RecipientSheet, BatchError> {
        let prefix = self.settings.attachment_prefix.clone();
        tokio::task::spawn_blocking(move || -> Result<RecipientSheet, BatchError> {
            let staged = StagedUpload::stage(&upload)?;
            Ok(RecipientSheet::load(staged.path(), &prefix)?)
        })
        .await
        .map_err(|e| BatchError::Internal(e.into()))?
    }
}
