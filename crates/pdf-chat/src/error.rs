//! Error types for the PDF chat service

use thiserror::Error;

/// Result type alias for PDF chat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message carried by every extraction failure, whatever the underlying cause
pub const EMPTY_DOCUMENT_MESSAGE: &str = "Empty PDF file or unsupported format";

/// PDF chat service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request body missing or malformed
    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Upload stream ended or failed before parsing completed
    #[error("Client disconnected: {0}")]
    ClientDisconnected(String),

    /// Upload exceeded the configured size ceiling
    #[error("Request body size exceeded {limit} bytes ({received} bytes received)")]
    PayloadTooLarge { received: usize, limit: usize },

    /// Multipart body could not be parsed or lacks the expected file field
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    /// Bytes are not a readable PDF, or the PDF has no extractable text
    #[error("{}", EMPTY_DOCUMENT_MESSAGE)]
    UnsupportedOrEmptyDocument { reason: String },

    /// Document or log store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Conversation model error
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error; the reason is kept for diagnostics only
    pub fn unsupported_document(reason: impl Into<String>) -> Self {
        Self::UnsupportedOrEmptyDocument {
            reason: reason.into(),
        }
    }

    /// Create a malformed upload error
    pub fn malformed_upload(message: impl Into<String>) -> Self {
        Self::MalformedUpload(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a model invocation error
    pub fn model(message: impl Into<String>) -> Self {
        Self::ModelInvocation(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Variant name, recorded as the error type in request traces
    pub fn kind_name(&self) -> &'static str {
        match self {
            Error::Config(_) => "Config",
            Error::InvalidRequestBody(_) => "InvalidRequestBody",
            Error::DocumentNotFound(_) => "DocumentNotFound",
            Error::ClientDisconnected(_) => "ClientDisconnected",
            Error::PayloadTooLarge { .. } => "PayloadTooLarge",
            Error::MalformedUpload(_) => "MalformedUpload",
            Error::UnsupportedOrEmptyDocument { .. } => "UnsupportedOrEmptyDocument",
            Error::Storage(_) => "Storage",
            Error::ModelInvocation(_) => "ModelInvocation",
            Error::Io(_) => "Io",
            Error::Json(_) => "Json",
            Error::Http(_) => "Http",
            Error::Database(_) => "Database",
            Error::Internal(_) => "Internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_too_large_message() {
        let err = Error::PayloadTooLarge {
            received: 2_000_000,
            limit: 1_048_576,
        };
        assert_eq!(
            err.to_string(),
            "Request body size exceeded 1048576 bytes (2000000 bytes received)"
        );
    }

    #[test]
    fn test_extraction_message_hides_reason() {
        let err = Error::unsupported_document("xref table is corrupt");
        assert_eq!(err.to_string(), EMPTY_DOCUMENT_MESSAGE);
        assert_eq!(err.kind_name(), "UnsupportedOrEmptyDocument");
    }
}
