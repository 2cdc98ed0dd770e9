use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use futures::StreamExt;
use lanshare_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/download/{stored_name}",
    tag = "files",
    params(
        ("stored_name" = String, Path, description = "Stored name embedded in the download link")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 404, description = "File not found or expired", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "download"))]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(stored_name): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let resolved = state.downloads.resolve(&stored_name).await?;

    let body_stream = resolved.stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, resolved.content_type)
        .header(header::CONTENT_DISPOSITION, resolved.content_disposition.as_str());
    if let Some(length) = resolved.content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    let response = builder
        .body(Body::from_stream(body_stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
