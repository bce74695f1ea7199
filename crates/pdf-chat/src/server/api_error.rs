//! HTTP error taxonomy
//!
//! Every failure that reaches the boundary becomes an [`ApiError`]: a status code, the
//! client-facing detail, and a trace captured where the error was classified. Only the
//! detail is serialized; the whole error rides in the response extensions so the
//! request logger can record the trace, and the logger removes it again.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::Location;

use crate::error::Error;
use crate::types::ErrorBody;

/// Non-standard status for a client that went away mid-request
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Crate prefix used to keep only our own frames from a backtrace
const CRATE_PREFIX: &str = "pdf_chat::";

/// Client-facing failure categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequestBody,
    PdfNotFound,
    ClientDisconnected,
    PayloadTooLarge { received: usize, limit: usize },
    InvalidFileData,
    PdfParse,
    DocumentInsert,
    ChatFailed,
    Unexpected,
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidRequestBody | ErrorKind::InvalidFileData => 400,
            ErrorKind::PdfNotFound => 404,
            ErrorKind::PayloadTooLarge { .. } => 413,
            ErrorKind::ClientDisconnected => CLIENT_CLOSED_REQUEST,
            ErrorKind::PdfParse
            | ErrorKind::DocumentInsert
            | ErrorKind::ChatFailed
            | ErrorKind::Unexpected => 500,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            ErrorKind::InvalidRequestBody => "Invalid request body".to_string(),
            ErrorKind::PdfNotFound => "PDF not found".to_string(),
            ErrorKind::ClientDisconnected => "Client disconnected".to_string(),
            ErrorKind::PayloadTooLarge { received, limit } => format!(
                "Request body size exceeded {} bytes ({} bytes received)",
                limit, received
            ),
            ErrorKind::InvalidFileData => "Invalid file data".to_string(),
            ErrorKind::PdfParse => {
                "Failed to parse PDF file, please check the file content/format".to_string()
            }
            ErrorKind::DocumentInsert => {
                "Failed to insert PDF document into the database".to_string()
            }
            ErrorKind::ChatFailed => "Failed to chat with the bot".to_string(),
            ErrorKind::Unexpected => "An unexpected error occurred.".to_string(),
        }
    }
}

/// Default classification; handlers override it where context decides the category
impl From<&Error> for ErrorKind {
    fn from(err: &Error) -> Self {
        match err {
            Error::InvalidRequestBody(_) => ErrorKind::InvalidRequestBody,
            Error::DocumentNotFound(_) => ErrorKind::PdfNotFound,
            Error::ClientDisconnected(_) => ErrorKind::ClientDisconnected,
            Error::PayloadTooLarge { received, limit } => ErrorKind::PayloadTooLarge {
                received: *received,
                limit: *limit,
            },
            Error::MalformedUpload(_) => ErrorKind::InvalidFileData,
            Error::UnsupportedOrEmptyDocument { .. } => ErrorKind::PdfParse,
            Error::ModelInvocation(_) => ErrorKind::ChatFailed,
            _ => ErrorKind::Unexpected,
        }
    }
}

/// One stack frame of a trace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Frame {
    pub file: String,
    pub function: Option<String>,
    pub line_no: u32,
    /// Source text of the line; always `None`, the binary carries no source
    pub source_line: Option<String>,
    pub column: u32,
}

/// Machine-readable record of a failure; logged, never returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trace {
    /// Debug rendering of the error value
    pub repr: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    /// Innermost first
    pub frames: Vec<Frame>,
}

impl Trace {
    /// Capture a trace for `err` classified at `location`
    ///
    /// The classification site is always the first frame. Further frames come from a
    /// captured backtrace when `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE` enables one.
    pub fn capture(err: &Error, location: &'static Location<'static>) -> Self {
        let mut frames = vec![Frame {
            file: location.file().to_string(),
            function: None,
            line_no: location.line(),
            source_line: None,
            column: location.column(),
        }];

        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            frames.extend(parse_backtrace(&backtrace.to_string()));
        }

        Self {
            repr: format!("{:?}", err),
            error_type: err.kind_name().to_string(),
            message: err.to_string(),
            frames,
        }
    }

    /// Trace for a panic caught at the service boundary
    pub fn from_panic(message: String) -> Self {
        Self {
            repr: format!("panic({:?})", message),
            error_type: "Panic".to_string(),
            message,
            frames: Vec::new(),
        }
    }
}

static FRAME_FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+:\s+(\S.*)$").unwrap());
static FRAME_LOCATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*at\s+(.+):(\d+):(\d+)$").unwrap());

/// Keep this crate's frames from a rendered backtrace, skipping the trace machinery
fn parse_backtrace(rendered: &str) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut function: Option<String> = None;

    for line in rendered.lines() {
        if let Some(caps) = FRAME_FUNCTION.captures(line) {
            function = Some(caps[1].trim().to_string());
            continue;
        }
        let Some(caps) = FRAME_LOCATION.captures(line) else {
            continue;
        };
        let Some(name) = function.take() else {
            continue;
        };
        if !name.starts_with(CRATE_PREFIX) || name.contains("api_error") {
            continue;
        }
        frames.push(Frame {
            file: caps[1].to_string(),
            function: Some(name),
            line_no: caps[2].parse().unwrap_or(0),
            source_line: None,
            column: caps[3].parse().unwrap_or(0),
        });
    }

    frames
}

/// A classified failure on its way to the client
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status_code: u16,
    pub detail: String,
    pub trace: Option<Trace>,
}

impl ApiError {
    /// Classify `err` explicitly, capturing the trace at the caller
    #[track_caller]
    pub fn new(kind: ErrorKind, err: Error) -> Self {
        let trace = Trace::capture(&err, Location::caller());
        Self {
            status_code: kind.status_code(),
            detail: kind.detail(),
            trace: Some(trace),
        }
    }

    /// Failure with no underlying error value
    pub fn bare(kind: ErrorKind) -> Self {
        Self {
            status_code: kind.status_code(),
            detail: kind.detail(),
            trace: None,
        }
    }

    /// Response for a panic inside a handler
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic payload".to_string()
        };

        Self {
            trace: Some(Trace::from_panic(message)),
            ..Self::bare(ErrorKind::Unexpected)
        }
    }
}

impl From<Error> for ApiError {
    #[track_caller]
    fn from(err: Error) -> Self {
        let kind = ErrorKind::from(&err);
        Self::new(kind, err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            detail: self.detail.clone(),
        };
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// `CatchPanicLayer` hook: a panicking handler becomes a 500 "unexpected" response
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked");
    ApiError::from_panic(payload).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_detail_table() {
        let cases = [
            (ErrorKind::InvalidRequestBody, 400, "Invalid request body"),
            (ErrorKind::PdfNotFound, 404, "PDF not found"),
            (ErrorKind::ClientDisconnected, 499, "Client disconnected"),
            (ErrorKind::InvalidFileData, 400, "Invalid file data"),
            (
                ErrorKind::PdfParse,
                500,
                "Failed to parse PDF file, please check the file content/format",
            ),
            (
                ErrorKind::DocumentInsert,
                500,
                "Failed to insert PDF document into the database",
            ),
            (ErrorKind::ChatFailed, 500, "Failed to chat with the bot"),
            (ErrorKind::Unexpected, 500, "An unexpected error occurred."),
        ];
        for (kind, status, detail) in cases {
            assert_eq!(kind.status_code(), status, "{:?}", kind);
            assert_eq!(kind.detail(), detail);
        }

        let too_large = ErrorKind::PayloadTooLarge {
            received: 1_049_000,
            limit: 1_048_576,
        };
        assert_eq!(too_large.status_code(), 413);
        assert_eq!(
            too_large.detail(),
            "Request body size exceeded 1048576 bytes (1049000 bytes received)"
        );
    }

    #[test]
    fn test_default_classification() {
        let kind = |err: Error| ErrorKind::from(&err);
        assert_eq!(kind(Error::malformed_upload("x")), ErrorKind::InvalidFileData);
        assert_eq!(kind(Error::unsupported_document("x")), ErrorKind::PdfParse);
        assert_eq!(kind(Error::model("x")), ErrorKind::ChatFailed);
        assert_eq!(kind(Error::storage("x")), ErrorKind::Unexpected);
        assert_eq!(kind(Error::internal("x")), ErrorKind::Unexpected);
    }

    #[test]
    fn test_trace_records_classification_site() {
        let err = ApiError::from(Error::DocumentNotFound("abc".into()));
        let line = line!() - 1;

        assert_eq!(err.status_code, 404);
        let trace = err.trace.unwrap();
        assert_eq!(trace.error_type, "DocumentNotFound");
        assert_eq!(trace.message, "Document not found: abc");
        assert!(trace.repr.contains("DocumentNotFound"));
        assert!(trace.frames[0].file.ends_with("api_error.rs"));
        assert_eq!(trace.frames[0].line_no, line);
    }

    #[test]
    fn test_serialized_frame_shape() {
        let trace = ApiError::from(Error::model("quota exceeded")).trace.unwrap();
        let value = serde_json::to_value(&trace).unwrap();

        assert_eq!(value["type"], "ModelInvocation");
        let frame = &value["frames"][0];
        for key in ["file", "function", "line_no", "source_line"] {
            assert!(frame.get(key).is_some(), "frame is missing {key}");
        }
        assert!(frame["source_line"].is_null());
    }

    #[test]
    fn test_parse_backtrace_keeps_crate_frames() {
        let rendered = "   0: std::backtrace::Backtrace::capture\n             at /rustc/library/std/src/backtrace.rs:296:13\n   1: pdf_chat::server::api_error::Trace::capture\n             at ./src/server/api_error.rs:120:25\n   2: pdf_chat::server::routes::chat::chat_about_pdf::{{closure}}\n             at ./src/server/routes/chat.rs:41:9\n   3: tokio::runtime::task::core::Core<T,S>::poll\n";
        let frames = parse_backtrace(rendered);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].file, "./src/server/routes/chat.rs");
        assert_eq!(frames[0].line_no, 41);
        assert!(frames[0]
            .function
            .as_deref()
            .unwrap()
            .starts_with("pdf_chat::server::routes::chat"));
    }

    #[test]
    fn test_response_carries_only_detail() {
        let response = ApiError::bare(ErrorKind::PdfNotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<ApiError>().is_some());
    }

    #[test]
    fn test_panic_payloads() {
        let err = ApiError::from_panic(Box::new("boom"));
        assert_eq!(err.status_code, 500);
        assert_eq!(err.trace.unwrap().message, "boom");

        let err = ApiError::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(err.detail, "An unexpected error occurred.");
        assert_eq!(err.trace.unwrap().error_type, "Panic");
    }
}
