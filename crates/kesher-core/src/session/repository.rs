//! Session record repository trait.
//!
//! Defines the interface for persisting finalized session records.

use super::record::SessionRecord;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for finalized session records.
///
/// This trait decouples the lifecycle manager from the storage mechanism
/// (TOML files, managed database, remote API). Records are append-only:
/// there is no update or delete, and implementations must reject duplicate
/// record ids rather than overwrite.
#[async_trait]
pub trait SessionRecordRepository: Send + Sync {
    /// Inserts a finalized record.
    ///
    /// # Errors
    ///
    /// Returns an error if a record with the same id already exists or if
    /// storage fails.
    async fn insert(&self, record: &SessionRecord) -> Result<()>;

    /// Finds a record by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(SessionRecord))`: Record found
    /// - `Ok(None)`: Record not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, record_id: &str) -> Result<Option<SessionRecord>>;

    /// Lists all stored records, most recent first.
    async fn list_all(&self) -> Result<Vec<SessionRecord>>;
}
