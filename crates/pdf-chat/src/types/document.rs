//! Persisted document types

use serde::{Deserialize, Serialize};

/// Language code recorded when detection is inconclusive
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Metadata extracted from an uploaded PDF
///
/// Text fields missing from the PDF info dictionary are stored as empty strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: String,
    /// Filename declared by the multipart field
    pub filename: String,
    pub page_count: u32,
    /// ISO-639-1 code, or `"unknown"`
    pub language: String,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            subject: String::new(),
            keywords: String::new(),
            filename: String::new(),
            page_count: 0,
            language: UNKNOWN_LANGUAGE.to_string(),
        }
    }
}

/// Fully extracted document awaiting an identifier from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub metadata: DocumentMetadata,
    /// Normalized plain text
    pub text: String,
}

/// Stored document; immutable once created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Opaque identifier assigned by the document store
    pub id: String,
    pub metadata: DocumentMetadata,
    pub text: String,
}

impl Document {
    /// Attach a store-assigned identifier to an extracted document
    pub fn from_new(id: impl Into<String>, document: NewDocument) -> Self {
        Self {
            id: id.into(),
            metadata: document.metadata,
            text: document.text,
        }
    }
}
