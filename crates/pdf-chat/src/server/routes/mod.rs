//! API routes for the PDF chat server

pub mod chat;
pub mod pdf;

use axum::{extract::DefaultBodyLimit, routing::post, Router};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Upload size is enforced chunk by chunk inside the handler
        .route(
            "/v1/pdf",
            post(pdf::upload_pdf).layer(DefaultBodyLimit::disable()),
        )
        .route("/v1/pdf/:pdf_id", post(chat::chat_about_pdf))
}
