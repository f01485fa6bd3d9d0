//! File upload endpoint.

use axum::{
    Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::MultipartError,
    },
    http::StatusCode,
    routing::post,
};
use biznetworq_common::{AppError, AppResult};
use biznetworq_core::{UploadKind, UploadRequest, UploadResponse};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Headroom for multipart boundaries and the text fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Upload a file via multipart form (`file` and `fileType` fields).
async fn upload(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<UploadResponse>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut file_type: Option<UploadKind> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(ToString::to_string);
                content_type = field.content_type().map(ToString::to_string);
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(multipart_error)?
                        .to_vec(),
                );
            }
            "fileType" => {
                let text = field
                    .text()
                    .await
                    .map_err(multipart_error)?;
                file_type = Some(UploadKind::parse(&text)?);
            }
            _ => {}
        }
    }

    let data = file_data.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let kind = file_type.ok_or_else(|| AppError::BadRequest("fileType is required".to_string()))?;

    let request = UploadRequest {
        kind,
        original_name: file_name.unwrap_or_else(|| "upload".to_string()),
        content_type: content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        data,
    };

    let uploaded = state.upload_service.upload(&user, request).await?;
    Ok(ApiResponse::created(uploaded))
}

/// Bodies cut off by the size limit are 413; other malformed bodies are 400.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(format!("Invalid multipart data: {}", err.body_text()))
    }
}

/// Upload routes; bodies are capped just above `max_upload_bytes`.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(upload))
        .layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
        ))
}
