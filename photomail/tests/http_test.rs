mod common;

use std::io::Cursor;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use common::{photo, two_row_workbook, RecordingMailer, RelayBehaviour};
use photomail::credentials::CredentialMap;
use photomail::{BatchRunner, BatchSettings};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "photomail-test-boundary";

fn app(mailer: &RecordingMailer) -> Router {
    app_with_limit(mailer, 1024 * 1024)
}

fn app_with_limit(mailer: &RecordingMailer, max_upload_bytes: usize) -> Router {
    let runner = BatchRunner::new(mailer.clone(), CredentialMap::default(), BatchSettings::default());
    photomail::http::router(Arc::new(runner), max_upload_bytes)
}

fn multipart(fields: &[(&str, &str)], file: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"guests.xlsx\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/send-emails/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn form_fields(folder: &str) -> Vec<(&'static str, String)> {
    vec![
        ("sender_email", "studio@example.com".to_string()),
        ("sender_pass", "form-password".to_string()),
        ("photo_folder", folder.to_string()),
        ("photo_suffix", "EVT".to_string()),
        ("filetype", "jpg".to_string()),
    ]
}

fn as_refs<'a>(fields: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let response = app(&RecordingMailer::accepting())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["ok"], true);
}

#[tokio::test]
async fn upload_returns_two_sheet_report() {
    let photos = tempfile::tempdir().unwrap();
    photo(photos.path(), "EVT101.jpg");
    let mailer = RecordingMailer::accepting();
    let fields = form_fields(photos.path().to_str().unwrap());

    let response = app(&mailer)
        .oneshot(upload_request(multipart(&as_refs(&fields), Some(two_row_workbook().as_slice()))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=email_reports.xlsx"
    );
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        photomail::http::XLSX_CONTENT_TYPE
    );

    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec())).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Successful", "Failed"]);

    let ok = workbook.worksheet_range("Successful").unwrap();
    assert_eq!(ok.height(), 2);
    assert_eq!(ok.get_value((1, 0)), Some(&Data::String("Ada".into())));
    assert_eq!(ok.get_value((1, 2)), Some(&Data::String("101".into())));

    let failed = workbook.worksheet_range("Failed").unwrap();
    assert_eq!(failed.height(), 2);
    assert_eq!(failed.get_value((1, 0)), Some(&Data::String("Bob".into())));
    assert!(matches!(failed.get_value((1, 2)), None | Some(Data::Empty)));

    assert_eq!(mailer.sent_to(), ["ada@example.com"]);
}

#[tokio::test]
async fn garbage_upload_is_bad_request() {
    let photos = tempfile::tempdir().unwrap();
    let mailer = RecordingMailer::accepting();
    let fields = form_fields(photos.path().to_str().unwrap());

    let response = app(&mailer)
        .oneshot(upload_request(multipart(&as_refs(&fields), Some(&b"not a spreadsheet"[..]))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], 400);
    assert_eq!(mailer.sessions_opened(), 0);
}

#[tokio::test]
async fn missing_file_field_is_bad_request() {
    let fields = form_fields("/tmp");
    let response = app(&RecordingMailer::accepting())
        .oneshot(upload_request(multipart(&as_refs(&fields), None)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "missing form field 'file'");
}

#[tokio::test]
async fn rejected_login_is_unauthorized() {
    let photos = tempfile::tempdir().unwrap();
    let fields = form_fields(photos.path().to_str().unwrap());

    let response = app(&RecordingMailer::new(RelayBehaviour::RejectLogin))
        .oneshot(upload_request(multipart(&as_refs(&fields), Some(two_row_workbook().as_slice()))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "invalid email credentials");
}

#[tokio::test]
async fn unreachable_relay_is_server_error() {
    let photos = tempfile::tempdir().unwrap();
    let fields = form_fields(photos.path().to_str().unwrap());

    let response = app(&RecordingMailer::new(RelayBehaviour::Unreachable))
        .oneshot(upload_request(multipart(&as_refs(&fields), Some(two_row_workbook().as_slice()))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["code"], 500);
}

#[tokio::test]
async fn non_multipart_body_gets_json_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/send-emails")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"sender_email":"studio@example.com"}"#))
        .unwrap();

    let response = app(&RecordingMailer::accepting()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], 400);
}

#[tokio::test]
async fn oversized_upload_is_payload_too_large() {
    let mailer = RecordingMailer::accepting();
    let fields = form_fields("/tmp");
    let oversized = vec![b'x'; 64 * 1024];

    let response = app_with_limit(&mailer, 4 * 1024)
        .oneshot(upload_request(multipart(&as_refs(&fields), Some(oversized.as_slice()))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(response).await["code"], 413);
    assert_eq!(mailer.sessions_opened(), 0);
}
