use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::mail::MailError;
use crate::sheet::SheetError;
use crate::HttpError;

/// Failures that abort a whole batch before any mail goes out.
///
/// Per-row problems (missing photos, a rejected message) never show up here;
/// they land in the report's "Failed" sheet instead.
#[derive(Debug, thiserror::Error, HttpError)]
pub enum BatchError {
    #[error("invalid upload: {0}")]
    #[http_error(BAD_REQUEST)]
    InvalidUpload(String),

    #[error("upload too large: {0}")]
    #[http_error(PAYLOAD_TOO_LARGE)]
    UploadTooLarge(String),

    #[error("missing form field '{0}'")]
    #[http_error(BAD_REQUEST)]
    MissingField(&'static str),

    #[error("error reading spreadsheet: {0}")]
    #[http_error(BAD_REQUEST)]
    InvalidSpreadsheet(#[from] SheetError),

    #[error("password variable {variable} for {sender} is not set")]
    #[http_error(UNAUTHORIZED, "no credentials configured for {sender}")]
    MissingCredential { sender: String, variable: String },

    #[error("relay rejected login: {0}")]
    #[http_error(UNAUTHORIZED, "invalid email credentials")]
    AuthenticationRejected(String),

    #[error("relay error: {0}")]
    #[http_error(INTERNAL_SERVER_ERROR, "SMTP error: {0}")]
    Relay(String),

    #[error("cannot stage upload: {0}")]
    #[http_error(INTERNAL_SERVER_ERROR, "an internal server error occurred")]
    Storage(#[from] std::io::Error),

    #[error("cannot write report: {0}")]
    #[http_error(INTERNAL_SERVER_ERROR, "an internal server error occurred")]
    Report(#[from] rust_xlsxwriter::XlsxError),

    #[error("internal error: {0:?}")]
    #[http_error(INTERNAL_SERVER_ERROR, "an internal server error occurred")]
    Internal(#[from] anyhow::Error),
}

impl BatchError {
    /// Classify a failure to open the relay session.
    pub fn from_session(err: MailError) -> Self {
        match err {
            MailError::AuthRejected(detail) => BatchError::AuthenticationRejected(detail),
            other => BatchError::Relay(other.to_string()),
        }
    }
}

impl IntoResponse for BatchError {
    fn into_response(self) -> Response {
        // Server errors keep their detail in the log only
        if self.http_code().is_server_error() {
            tracing::error!("Error Status {}: {}", self.http_code(), self);
        } else {
            tracing::info!("Rejected batch ({}): {}", self.http_code(), self);
        }

        let body = Json(json!({
            "code": self.http_code().as_u16(),
            "message": self.http_message(),
        }));
        (self.http_code(), body).into_response()
    }
}
