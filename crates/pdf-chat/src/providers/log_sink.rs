//! Destination for persisted request log entries

use async_trait::async_trait;

use crate::error::Result;
use crate::types::LogEntry;

/// Trait for request log persistence
///
/// Write-only: the service never reads entries back.
///
/// Implementations:
/// - `SqliteStore`: `request_logs` table
#[async_trait]
pub trait RequestLogSink: Send + Sync {
    async fn insert_log(&self, entry: &LogEntry) -> Result<()>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
