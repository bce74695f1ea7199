//! Chat endpoint: one message about one stored document

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    Json,
};

use crate::error::Error;
use crate::server::api_error::{ApiError, ErrorKind};
use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResponse};

/// POST /v1/pdf/{pdf_id} - Ask a question about an uploaded PDF
///
/// The body is validated before the document is looked up, so a malformed body is a
/// 400 even for an unknown id.
pub async fn chat_about_pdf(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let body = body.map_err(|e| Error::InvalidRequestBody(e.body_text()))?;
    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|e| Error::InvalidRequestBody(e.to_string()))?;

    let document = state
        .documents()
        .find(&pdf_id)
        .await
        .map_err(|e| ApiError::new(ErrorKind::Unexpected, e))?
        .ok_or_else(|| Error::DocumentNotFound(pdf_id.clone()))?;

    let outcome = state
        .chat()
        .converse(&document, &request.message)
        .await
        .map_err(|e| ApiError::new(ErrorKind::ChatFailed, e))?;

    Ok(Json(ChatResponse {
        response: outcome.reply,
    }))
}
