//! Running byte counter that rejects oversized uploads while they stream in

use crate::error::{Error, Result};

/// Number of bytes in one mebibyte
pub const MIB: usize = 1024 * 1024;

/// Counts upload bytes and fails once the total exceeds the limit
#[derive(Debug, Clone)]
pub struct SizeGuard {
    limit: usize,
    received: usize,
}

impl SizeGuard {
    /// Create a guard with a limit in bytes
    pub fn new(limit: usize) -> Self {
        Self { limit, received: 0 }
    }

    /// Create a guard with a limit in mebibytes
    pub fn from_mebibytes(megabytes: usize) -> Self {
        Self::new(megabytes.saturating_mul(MIB))
    }

    /// Record a chunk
    ///
    /// Fails with `PayloadTooLarge` as soon as the running total is strictly
    /// greater than the limit. A body of exactly `limit` bytes is accepted.
    pub fn observe(&mut self, chunk: &[u8]) -> Result<()> {
        self.received = self.received.saturating_add(chunk.len());
        if self.received > self.limit {
            return Err(Error::PayloadTooLarge {
                received: self.received,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Bytes observed so far
    pub fn received(&self) -> usize {
        self.received
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
