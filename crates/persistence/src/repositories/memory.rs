//! In-memory entry store.
//!
//! Holds everything in process memory for the lifetime of the value. Used
//! for the stateless deployment and as the default test backend.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use domain::models::{AlertThresholds, EntryFilter, IngestionMode, NewWeatherEntry, WeatherEntry};
use tokio::sync::RwLock;
use tracing::debug;

use super::entry_store::EntryStore;
use crate::error::StoreError;

/// Entry store backed by in-process maps.
#[derive(Debug)]
pub struct InMemoryEntryStore {
    entries: RwLock<HashMap<String, Vec<WeatherEntry>>>,
    alerts: RwLock<HashMap<String, AlertThresholds>>,
    next_id: AtomicI64,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            alerts: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for InMemoryEntryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn add(&self, owner_id: &str, entry: NewWeatherEntry) -> Result<i64, StoreError> {
        let id = self.allocate_id();
        let entry = entry.into_entry(id, owner_id, Utc::now());

        let mut entries = self.entries.write().await;
        entries.entry(owner_id.to_string()).or_default().push(entry);
        Ok(id)
    }

    async fn list(
        &self,
        owner_id: &str,
        filter: &EntryFilter,
    ) -> Result<Vec<WeatherEntry>, StoreError> {
        let entries = self.entries.read().await;
        let mut result: Vec<WeatherEntry> = entries
            .get(owner_id)
            .map(|owned| owned.iter().filter(|e| filter.matches(e)).cloned().collect())
            .unwrap_or_default();

        result.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(result)
    }

    async fn delete(&self, owner_id: &str, id: i64) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        let owned = entries
            .get_mut(owner_id)
            .ok_or(StoreError::NotFound { id })?;

        let position = owned
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::NotFound { id })?;
        owned.remove(position);
        Ok(())
    }

    async fn clear(&self, owner_id: &str) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().await;
        let removed = entries.remove(owner_id).map_or(0, |owned| owned.len() as u64);
        Ok(removed)
    }

    async fn ingest(
        &self,
        owner_id: &str,
        batch: Vec<NewWeatherEntry>,
        mode: IngestionMode,
    ) -> Result<usize, StoreError> {
        let now = Utc::now();
        let stored: Vec<WeatherEntry> = batch
            .into_iter()
            .map(|e| e.into_entry(self.allocate_id(), owner_id, now))
            .collect();
        let count = stored.len();

        // The batch is fully built before the lock is taken, so readers see
        // either the old collection or the new one.
        let mut entries = self.entries.write().await;
        match mode {
            IngestionMode::Replace => {
                entries.insert(owner_id.to_string(), stored);
            }
            IngestionMode::Append => {
                entries.entry(owner_id.to_string()).or_default().extend(stored);
            }
        }

        debug!(owner_id, count, mode = %mode, "Ingested entries into memory store");
        Ok(count)
    }

    async fn cities(&self, owner_id: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().await;
        let cities: BTreeSet<String> = entries
            .get(owner_id)
            .into_iter()
            .flatten()
            .filter_map(|e| e.city.clone())
            .filter(|c| !c.is_empty())
            .collect();
        Ok(cities.into_iter().collect())
    }

    async fn count(&self, owner_id: &str) -> Result<i64, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(owner_id).map_or(0, |owned| owned.len() as i64))
    }

    async fn get_alerts(&self, owner_id: &str) -> Result<AlertThresholds, StoreError> {
        let alerts = self.alerts.read().await;
        Ok(alerts.get(owner_id).copied().unwrap_or_default())
    }

    async fn set_alerts(
        &self,
        owner_id: &str,
        thresholds: AlertThresholds,
    ) -> Result<(), StoreError> {
        let mut alerts = self.alerts.write().await;
        alerts.insert(owner_id.to_string(), thresholds);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
