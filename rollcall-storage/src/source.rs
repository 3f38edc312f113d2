//! Async data source trait implemented by every storage tier.
//!
//! The repository depends only on this trait, never on a concrete store.
//! Each call resolves exactly once: reads yield the record(s) or a
//! `StorageError::NotAvailable`, writes yield `()` or a
//! `StorageError::WriteFailed`.

use ::async_trait::async_trait;
use rollcall_core::{Record, RollcallResult, Tier};

/// Capability contract for one storage tier.
///
/// Implementations decide what "not available" means for them (an empty
/// table, an unreachable host) and report it through the error channel.
/// Writes have upsert semantics for `save`.
#[async_trait]
pub trait DataSource<R: Record>: Send + Sync {
    /// Which tier this source serves.
    fn tier(&self) -> Tier;

    // ========================================================================
    // READS
    // ========================================================================

    /// List every record held by this source.
    async fn list_all(&self) -> RollcallResult<Vec<R>>;

    /// Get one record by id.
    async fn get_one(&self, id: &str) -> RollcallResult<R>;

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Insert or replace a record.
    async fn save(&self, record: &R) -> RollcallResult<()>;

    /// Replace the stored fields of an existing record.
    async fn update(&self, record: &R) -> RollcallResult<()>;

    /// Remove every record.
    async fn delete_all(&self) -> RollcallResult<()>;

    /// Remove one record by id.
    async fn delete_one(&self, id: &str) -> RollcallResult<()>;

    // ========================================================================
    // INVALIDATION
    // ========================================================================

    /// Hint that cached views of this source should be rebuilt.
    /// No I/O; sources without a view of their own ignore it.
    fn refresh(&self) -> RollcallResult<()> {
        Ok(())
    }
}
