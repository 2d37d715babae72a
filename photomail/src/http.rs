//! HTTP surface: one upload route plus a health check.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::batch::{BatchRequest, BatchRunner};
use crate::error::BatchError;
use crate::mail::Mailer;
use crate::upload::Upload;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const REPORT_DISPOSITION: &str = "attachment; filename=email_reports.xlsx";

type Result<T> = std::result::Result<T, BatchError>;

pub fn router<M: Mailer>(runner: Arc<BatchRunner<M>>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/send-emails", post(send_emails::<M>))
        .route("/send-emails/", post(send_emails::<M>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(runner)
}

async fn health() -> Json<Value> {
    Json(json!({"ok": true}))
}

async fn send_emails<M: Mailer>(
    State(runner): State<Arc<BatchRunner<M>>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    let multipart = multipart.map_err(|e| BatchError::InvalidUpload(e.body_text()))?;
    let request = read_form(multipart).await?;
    let report = runner.run(request).await?;
    let xlsx = report.to_report().to_xlsx()?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, REPORT_DISPOSITION),
        ],
        xlsx,
    )
        .into_response())
}

async fn read_form(mut multipart: Multipart) -> Result<BatchRequest> {
    let mut fields = HashMap::new();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(form_error)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(form_error)?;
                upload = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "sender_email" | "sender_pass" | "sender_password" | "photo_folder" | "photo_suffix"
            | "filetype" => {
                let value = field
                    .text()
                    .await
                    .map_err(form_error)?;
                fields.insert(name.clone(), value);
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    let sender_pass = fields
        .remove("sender_pass")
        .or_else(|| fields.remove("sender_password"))
        .ok_or(BatchError::MissingField("sender_pass"))?;
    let mut take = |key: &'static str| fields.remove(key).ok_or(BatchError::MissingField(key));
    let sender_email = take("sender_email")?;

    Ok(BatchRequest {
        sender_email: sender_email.trim().to_string(),
        sender_pass,
        photo_folder: PathBuf::from(take("photo_folder")?),
        photo_suffix: take("photo_suffix")?,
        filetype: take("filetype")?,
        upload: upload.ok_or(BatchError::MissingField("file"))?,
    })
}

fn form_error(err: MultipartError) -> BatchError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        BatchError::UploadTooLarge(err.body_text())
    } else {
        BatchError::InvalidUpload(err.body_text())
    }
}
