use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use docsort_core::{Classifier, UploadedDocument};

use crate::state::AppState;
use crate::upload::{self, UploadError};

pub async fn bank_statement(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    classify(state.bank.clone(), &state, multipart).await
}

pub async fn salary_slip(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    classify(state.salary.clone(), &state, multipart).await
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn classify(
    classifier: Arc<Classifier>,
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    // Not a multipart request at all, so there is no file field either
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "request is not multipart");
            return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
        }
    };

    let file = match upload::parse_multipart(multipart).await {
        Ok(file) => file,
        Err(UploadError::Missing) => {
            return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
        }
        Err(UploadError::Malformed(msg)) => {
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let label = classifier.profile().label;
    tracing::debug!(profile = label, filename = %file.filename, bytes = file.data.len(), "received upload");

    // Writing, rasterizing, OCR and QR decoding all block
    let upload_dir = state.upload_dir.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let document = UploadedDocument::persist(&file.data, &upload_dir)
            .map_err(|e| format!("Failed to write temp file: {}", e))?;
        classifier.classify(document).map_err(|e| e.to_string())
    })
    .await;

    match outcome {
        Ok(Ok(result)) => Json(result).into_response(),
        Ok(Err(msg)) => {
            tracing::warn!(profile = label, error = %msg, "classification failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &msg)
        }
        Err(e) => {
            tracing::error!(profile = label, error = %e, "classification task panicked");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Classification task error: {}", e),
            )
        }
    }
}
