//! SQLite-backed entry store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{AlertThresholds, EntryFilter, IngestionMode, NewWeatherEntry, WeatherEntry};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::entry_store::EntryStore;
use crate::entities::{AlertThresholdEntity, EntrySourceDb, WeatherEntryEntity};
use crate::error::StoreError;
use crate::metrics::QueryTimer;

const ENTRY_COLUMNS: &str = "id, owner_id, observed_at, temperature, humidity, wind_speed, \
                             description, city, source, created_at";

const INSERT_ENTRY: &str = r#"
    INSERT INTO weather_entries
        (owner_id, observed_at, temperature, humidity, wind_speed, description, city, source, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

/// Repository for weather entries stored in SQLite.
#[derive(Clone)]
pub struct SqliteEntryStore {
    pool: SqlitePool,
}

impl SqliteEntryStore {
    /// Creates a new SqliteEntryStore with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn insert_entry<'e, E>(
    executor: E,
    owner_id: &str,
    entry: &NewWeatherEntry,
    created_at: DateTime<Utc>,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(INSERT_ENTRY)
        .bind(owner_id)
        .bind(entry.timestamp)
        .bind(entry.temperature)
        .bind(entry.humidity)
        .bind(entry.wind_speed)
        .bind(entry.description.as_str())
        .bind(entry.city.as_deref())
        .bind(EntrySourceDb::from(entry.source))
        .bind(created_at)
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn add(&self, owner_id: &str, entry: NewWeatherEntry) -> Result<i64, StoreError> {
        let timer = QueryTimer::new("add_entry");
        let result = insert_entry(&self.pool, owner_id, &entry, Utc::now()).await;
        timer.record(&result);
        Ok(result?)
    }

    async fn list(
        &self,
        owner_id: &str,
        filter: &EntryFilter,
    ) -> Result<Vec<WeatherEntry>, StoreError> {
        let timer = QueryTimer::new("list_entries");

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM weather_entries WHERE owner_id = ",
            ENTRY_COLUMNS
        ));
        query.push_bind(owner_id.to_string());
        if let Some(city) = &filter.city {
            query.push(" AND city = ").push_bind(city.clone());
        }
        if let Some(from) = filter.date_from {
            query.push(" AND observed_at >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            query.push(" AND observed_at <= ").push_bind(to);
        }
        query.push(" ORDER BY observed_at DESC, id DESC");

        let result = query
            .build_query_as::<WeatherEntryEntity>()
            .fetch_all(&self.pool)
            .await;
        timer.record(&result);

        Ok(result?.into_iter().map(WeatherEntry::from).collect())
    }

    async fn delete(&self, owner_id: &str, id: i64) -> Result<(), StoreError> {
        let timer = QueryTimer::new("delete_entry");
        let result = sqlx::query("DELETE FROM weather_entries WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await;
        timer.record(&result);

        if result?.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }

    async fn clear(&self, owner_id: &str) -> Result<u64, StoreError> {
        let timer = QueryTimer::new("clear_entries");
        let result = sqlx::query("DELETE FROM weather_entries WHERE owner_id = ?")
            .bind(owner_id)
            .execute(&self.pool)
            .await;
        timer.record(&result);
        Ok(result?.rows_affected())
    }

    async fn ingest(
        &self,
        owner_id: &str,
        entries: Vec<NewWeatherEntry>,
        mode: IngestionMode,
    ) -> Result<usize, StoreError> {
        let timer = QueryTimer::new("ingest_entries");
        let created_at = Utc::now();

        let result = async {
            let mut tx = self.pool.begin().await?;
            if mode == IngestionMode::Replace {
                let removed = sqlx::query("DELETE FROM weather_entries WHERE owner_id = ?")
                    .bind(owner_id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                debug!(owner_id, removed, "Replacing existing entries");
            }
            for entry in &entries {
                insert_entry(&mut *tx, owner_id, entry, created_at).await?;
            }
            tx.commit().await?;
            Ok::<(), sqlx::Error>(())
        }
        .await;
        timer.record(&result);
        result?;

        Ok(entries.len())
    }

    async fn cities(&self, owner_id: &str) -> Result<Vec<String>, StoreError> {
        let timer = QueryTimer::new("distinct_cities");
        let result = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT city
            FROM weather_entries
            WHERE owner_id = ? AND city IS NOT NULL AND city <> ''
            ORDER BY city
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await;
        timer.record(&result);
        Ok(result?)
    }

    async fn count(&self, owner_id: &str) -> Result<i64, StoreError> {
        let timer = QueryTimer::new("count_entries");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM weather_entries WHERE owner_id = ?")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await;
        timer.record(&result);
        Ok(result?)
    }

    async fn get_alerts(&self, owner_id: &str) -> Result<AlertThresholds, StoreError> {
        let timer = QueryTimer::new("get_alerts");
        let result = sqlx::query_as::<_, AlertThresholdEntity>(
            r#"
            SELECT owner_id, temp_threshold, humidity_threshold, updated_at
            FROM alert_thresholds
            WHERE owner_id = ?
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record(&result);
        Ok(result?.map(AlertThresholds::from).unwrap_or_default())
    }

    async fn set_alerts(
        &self,
        owner_id: &str,
        thresholds: AlertThresholds,
    ) -> Result<(), StoreError> {
        let timer = QueryTimer::new("set_alerts");
        let result = sqlx::query(
            r#"
            INSERT INTO alert_thresholds (owner_id, temp_threshold, humidity_threshold, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (owner_id) DO UPDATE SET
                temp_threshold = excluded.temp_threshold,
                humidity_threshold = excluded.humidity_threshold,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(owner_id)
        .bind(thresholds.temp_threshold)
        .bind(thresholds.humidity_threshold)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;
        timer.record(&result);
        result?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
