//! PDF chat server binary
//!
//! Run with: cargo run -p pdf-chat --bin pdf-chat-server

use pdf_chat::{config::AppConfig, server::PdfChatServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_chat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Upload limit: {} MiB", config.upload.max_body_size_mb);
    tracing::info!("  - History capacity: {}", config.history.capacity);
    tracing::info!("  - Model: {}", config.model.model_name);
    tracing::info!("  - Database: {}", config.storage.database_path.display());

    // Create and start server
    let server = PdfChatServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /v1/pdf          - Upload a PDF (multipart field 'file')");
    println!("  POST /v1/pdf/:pdf_id  - Chat about an uploaded PDF");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
