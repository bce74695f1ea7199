//! Upload endpoint: multipart PDF in, document id out

use axum::{
    extract::{Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};

use crate::error::Error;
use crate::ingestion::{read_file_field, PdfExtractor, SizeGuard};
use crate::server::api_error::{ApiError, ErrorKind};
use crate::server::state::AppState;
use crate::types::{NewDocument, UploadResponse};

/// Multipart field carrying the PDF
pub const FILE_FIELD: &str = "file";

/// POST /v1/pdf - Upload a PDF and extract its text
///
/// The body is streamed through the size guard and multipart parser, the complete
/// file is parsed on the blocking pool, and the document is stored only once
/// extraction has succeeded.
pub async fn upload_pdf(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let guard = SizeGuard::from_mebibytes(state.config().upload.max_body_size_mb);

    let file = read_file_field(
        content_type.as_deref(),
        request.into_body().into_data_stream(),
        FILE_FIELD,
        guard,
    )
    .await?
    .ensure_pdf()?;

    tracing::info!("Received '{}' ({} bytes)", file.filename, file.data.len());

    let (metadata, text) =
        tokio::task::spawn_blocking(move || PdfExtractor::extract(&file.filename, &file.data))
            .await
            .map_err(|e| Error::unsupported_document(format!("extraction task failed: {}", e)))??;

    let pdf_id = state
        .documents()
        .insert(&NewDocument { metadata, text })
        .await
        .map_err(|e| ApiError::new(ErrorKind::DocumentInsert, e))?;

    tracing::info!("Stored document {}", pdf_id);
    Ok((StatusCode::CREATED, Json(UploadResponse { pdf_id })))
}
