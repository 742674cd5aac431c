//! HTTP contract tests for the classification endpoints.
//!
//! The router runs over mock PDF/OCR/QR engines, so no MuPDF or tesseract
//! is needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use docsort_core::mock::{MockOcr, MockPage, MockPdf, MockQr};
use docsort_core::{Config, Engines};
use docsort_web::{AppState, router};

const BOUNDARY: &str = "docsort-test-boundary";

fn app(pdf: MockPdf, scratch: &std::path::Path) -> axum::Router {
    let config = Config {
        scratch_root: scratch.to_path_buf(),
        ..Config::default()
    };
    let engines = Engines {
        pdf: Arc::new(pdf),
        ocr: Arc::new(MockOcr::texts(&[])),
        qr: Arc::new(MockQr::none()),
    };
    router(Arc::new(AppState::new(config, engines)), 1)
}

fn multipart(field: &str, data: &[u8]) -> Body {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"doc.pdf\"\r\n\
         Content-Type: application/pdf\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

fn post(uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn entries(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn bank_statement_endpoint_classifies() {
    let scratch = tempfile::tempdir().unwrap();
    let pdf = MockPdf::with_pages(vec![MockPage::text(
        "This is a Bank Statement for Account Number 12345, showing Debit and Credit entries",
    )])
    .with_dates(Some("D:20230101"), Some("D:20230105"));

    let response = app(pdf, scratch.path())
        .oneshot(post("/classify/bank-statement", multipart("file", b"%PDF-1.4")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["classification"], "Bank Statement");
    assert!(json["match_count"].as_u64().unwrap() >= 8);
    assert_eq!(json["scanned"], false);
    assert_eq!(json["pdf_modified"], true);
    assert_eq!(json["creation_date"], "D:20230101");
    assert_eq!(json["modification_date"], "D:20230105");
    assert_eq!(entries(scratch.path()), 0);
}

#[tokio::test]
async fn salary_slip_endpoint_reports_other() {
    let scratch = tempfile::tempdir().unwrap();
    let pdf = MockPdf::with_pages(vec![MockPage::text("Quarterly newsletter")]);

    let response = app(pdf, scratch.path())
        .oneshot(post("/classify/salary-slip", multipart("file", b"%PDF-1.4")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["classification"], "Other");
    assert!(json["creation_date"].is_null());
    assert!(json["modification_date"].is_null());
}

#[tokio::test]
async fn missing_file_field_is_bad_request() {
    let scratch = tempfile::tempdir().unwrap();
    let pdf = MockPdf::with_pages(vec![MockPage::text("Wages")]);

    for uri in ["/classify/bank-statement", "/classify/salary-slip"] {
        let response = app(pdf.clone(), scratch.path())
            .oneshot(post(uri, multipart("document", b"%PDF-1.4")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "No file uploaded");
    }
    assert_eq!(entries(scratch.path()), 0);
}

#[tokio::test]
async fn non_multipart_request_is_bad_request() {
    let scratch = tempfile::tempdir().unwrap();
    let pdf = MockPdf::with_pages(vec![MockPage::text("Wages")]);

    for uri in ["/classify/bank-statement", "/classify/salary-slip"] {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app(pdf.clone(), scratch.path())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
        let json = json_body(response).await;
        assert_eq!(json["error"], "No file uploaded");
    }
    assert_eq!(entries(scratch.path()), 0);
}

#[tokio::test]
async fn unreadable_pdf_is_server_error_and_cleaned_up() {
    let scratch = tempfile::tempdir().unwrap();

    let response = app(MockPdf::unreadable("no header"), scratch.path())
        .oneshot(post("/classify/bank-statement", multipart("file", b"garbage")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("no header"));
    assert_eq!(entries(scratch.path()), 0);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let scratch = tempfile::tempdir().unwrap();
    let pdf = MockPdf::with_pages(vec![MockPage::text("Wages")]);
    let big = vec![b'x'; 2 * 1024 * 1024];

    let response = app(pdf, scratch.path())
        .oneshot(post("/classify/salary-slip", multipart("file", &big)))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(entries(scratch.path()), 0);
}
