//! Request log entries written by the request logger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::api_error::Trace;

/// Severity of a request log entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

/// One phase of one request: received, succeeded, or failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// `host:port` of the peer, or `"unknown"`
    pub client: String,
    /// e.g. `HTTP/1.1`
    pub protocol: String,
    pub path: String,
    pub method: String,
    pub level: LogLevel,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Trace>,
    pub timestamp: DateTime<Utc>,
}
