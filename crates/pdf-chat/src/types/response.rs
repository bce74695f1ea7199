//! Request and response bodies for the HTTP API

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/pdf/{pdf_id}`; unknown fields are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub pdf_id: String,
}

/// Successful chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Failure body; the only thing a client sees of an error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_ignores_extra_fields() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"message": "What is this?", "temperature": 3}"#).unwrap();
        assert_eq!(req.message, "What is this?");
    }

    #[test]
    fn test_chat_request_requires_message() {
        assert!(serde_json::from_str::<ChatRequest>(r#"{"text": "What is this?"}"#).is_err());
        assert!(serde_json::from_str::<ChatRequest>(r#"{"message": 42}"#).is_err());
    }
}
