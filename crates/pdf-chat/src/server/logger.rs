//! Request logging middleware
//!
//! Each request produces exactly two entries: one when it is received and one when it
//! completes, successfully or not. Entries go to `tracing` and, best effort, to the
//! configured [`RequestLogSink`].

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;

use super::api_error::{ApiError, Trace};
use super::state::AppState;
use crate::providers::RequestLogSink;
use crate::types::{LogEntry, LogLevel};

pub const RECEIVED_DETAIL: &str = "Incoming request.";
pub const SUCCEEDED_DETAIL: &str = "Endpoint returns successfully.";

/// Writes request log entries; never fails the request
#[derive(Clone)]
pub struct RequestLogger {
    sink: Arc<dyn RequestLogSink>,
}

impl RequestLogger {
    pub fn new(sink: Arc<dyn RequestLogSink>) -> Self {
        Self { sink }
    }

    /// Emit the entry and persist it; persistence failures are reported and swallowed
    pub async fn record(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Info => tracing::info!(
                client = %entry.client,
                status = ?entry.status_code,
                "{} {} {}: {}",
                entry.protocol,
                entry.method,
                entry.path,
                entry.detail
            ),
            LogLevel::Error => tracing::error!(
                client = %entry.client,
                status = ?entry.status_code,
                "{} {} {}: {}",
                entry.protocol,
                entry.method,
                entry.path,
                entry.detail
            ),
        }

        if let Err(e) = self.sink.insert_log(&entry).await {
            let rendered =
                serde_json::to_string(&entry).unwrap_or_else(|_| format!("{:?}", entry));
            tracing::error!("Failed to persist request log: {} ({})", rendered, e);
        }
    }
}

/// Request fields shared by both entries of one request
struct RequestContext {
    client: String,
    protocol: String,
    path: String,
    method: String,
}

impl RequestContext {
    fn from_request(request: &Request) -> Self {
        let client = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            client,
            protocol: format!("{:?}", request.version()),
            path: request.uri().path().to_string(),
            method: request.method().to_string(),
        }
    }

    fn entry(
        &self,
        level: LogLevel,
        detail: impl Into<String>,
        status_code: Option<u16>,
        trace: Option<Trace>,
    ) -> LogEntry {
        LogEntry {
            client: self.client.clone(),
            protocol: self.protocol.clone(),
            path: self.path.clone(),
            method: self.method.clone(),
            level,
            detail: detail.into(),
            status_code,
            trace,
            timestamp: Utc::now(),
        }
    }
}

/// Middleware: log the received request, run it, then log its outcome
///
/// Classified failures arrive as an [`ApiError`] in the response extensions; it is
/// removed here so the trace never leaves the process.
pub async fn log_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let context = RequestContext::from_request(&request);
    let logger = state.request_logger();

    logger
        .record(context.entry(LogLevel::Info, RECEIVED_DETAIL, None, None))
        .await;

    let mut response = next.run(request).await;
    let status = response.status();

    let entry = match response.extensions_mut().remove::<ApiError>() {
        Some(err) => context.entry(LogLevel::Error, err.detail, Some(err.status_code), err.trace),
        // Rejections produced by the router itself (unknown route, wrong method)
        None if status.is_client_error() || status.is_server_error() => context.entry(
            LogLevel::Error,
            status.canonical_reason().unwrap_or("Request failed"),
            Some(status.as_u16()),
            None,
        ),
        None => context.entry(LogLevel::Info, SUCCEEDED_DETAIL, Some(status.as_u16()), None),
    };
    logger.record(entry).await;

    response
}
