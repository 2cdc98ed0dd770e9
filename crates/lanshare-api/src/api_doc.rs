//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use lanshare_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LAN Share API",
        version = "0.1.0",
        description = "Share files across a local network. Uploads get a download link and a QR code; files expire after the retention window."
    ),
    paths(
        handlers::upload::upload_file,
        handlers::download::download_file,
        handlers::files::list_files,
        handlers::files::delete_file,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::FileResponse,
            models::UploadResponse,
            models::ListFilesResponse,
            models::DeleteResponse,
            models::HealthResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "files", description = "Upload, download, list and delete shared files"),
        (name = "health", description = "Liveness check")
    )
)]
pub struct ApiDoc;
