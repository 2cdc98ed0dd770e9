use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use lanshare_core::constants::UPLOAD_FIELD;
use lanshare_core::{AppError, FileRecord, UploadResponse};
use lanshare_services::IncomingFile;
use tokio_util::io::StreamReader;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Multipart form with a `file` field"),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadResponse),
        (status = 400, description = "Missing or oversized file", body = ErrorResponse),
        (status = 500, description = "Storage or link encoding failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut multipart = multipart.map_err(|e| {
        AppError::Validation(format!("Expected a multipart form upload: {}", e.body_text()))
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if is_body_limit(&e) {
            state.ingestion.too_large()
        } else {
            AppError::Validation(format!("Failed to read multipart: {}", e))
        }
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let declared_size = field
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        // The request body limit can trip mid-file; remember it so the storage error that
        // follows is reported as an oversized upload.
        let limit_hit = AtomicBool::new(false);
        let reader = StreamReader::new(field.map_err(|e| {
            if is_body_limit(&e) {
                limit_hit.store(true, Ordering::Relaxed);
            }
            io::Error::other(e)
        }));
        let incoming = IncomingFile {
            file_name,
            declared_size,
            reader: Box::pin(reader),
        };

        return match state.ingestion.ingest(Some(incoming)).await {
            Ok(record) => Ok(upload_response(&state, &record)),
            Err(_) if limit_hit.load(Ordering::Relaxed) => {
                Err(state.ingestion.too_large().into())
            }
            Err(e) => Err(e.into()),
        };
    }

    let record = state.ingestion.ingest(None).await?;
    Ok(upload_response(&state, &record))
}

fn is_body_limit(err: &MultipartError) -> bool {
    err.status() == StatusCode::PAYLOAD_TOO_LARGE
}

fn upload_response(state: &AppState, record: &FileRecord) -> Json<UploadResponse> {
    Json(UploadResponse {
        success: true,
        file: record.to_response(state.retention()),
        message: "File uploaded successfully".to_string(),
    })
}
