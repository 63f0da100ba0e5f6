//! The entry store contract shared by every backend.

use async_trait::async_trait;
use domain::models::{AlertThresholds, EntryFilter, IngestionMode, NewWeatherEntry, WeatherEntry};

use crate::error::StoreError;

/// Owner-scoped storage for weather entries and alert thresholds.
///
/// Every operation is scoped to one owner; entries belonging to another
/// owner are invisible, including to `delete`.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;

    /// Stores one entry and returns its assigned id.
    async fn add(&self, owner_id: &str, entry: NewWeatherEntry) -> Result<i64, StoreError>;

    /// Lists the owner's entries matching `filter`, newest first.
    async fn list(&self, owner_id: &str, filter: &EntryFilter)
        -> Result<Vec<WeatherEntry>, StoreError>;

    /// Removes one entry. Fails with `NotFound` when the id does not exist
    /// under this owner.
    async fn delete(&self, owner_id: &str, id: i64) -> Result<(), StoreError>;

    /// Removes every entry of the owner and returns how many were removed.
    async fn clear(&self, owner_id: &str) -> Result<u64, StoreError>;

    /// Stores a fetched batch as one unit.
    async fn ingest(
        &self,
        owner_id: &str,
        entries: Vec<NewWeatherEntry>,
        mode: IngestionMode,
    ) -> Result<usize, StoreError>;

    /// Distinct, non-empty city labels of the owner's entries, sorted.
    async fn cities(&self, owner_id: &str) -> Result<Vec<String>, StoreError>;

    /// Number of entries stored for the owner.
    async fn count(&self, owner_id: &str) -> Result<i64, StoreError>;

    /// Stored thresholds, or empty thresholds when none were set.
    async fn get_alerts(&self, owner_id: &str) -> Result<AlertThresholds, StoreError>;

    /// Overwrites the owner's thresholds.
    async fn set_alerts(
        &self,
        owner_id: &str,
        thresholds: AlertThresholds,
    ) -> Result<(), StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
