//! Persisted metric history.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

pub const CPU_USAGE: &str = "cpu_usage";
pub const MEM_USAGE: &str = "mem_usage";

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub metric: String,
    pub value: f64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored timestamp {0} is out of range")]
    Timestamp(i64),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Append-only time-series store keyed by (timestamp, metric).
pub trait HistoryStore: Send + Sync {
    /// Writing the same (metric, timestamp) twice keeps the last value.
    fn append<'a>(
        &'a self,
        metric: &'a str,
        at: DateTime<Utc>,
        value: f64,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Points for `metric` with timestamp >= `since`, oldest first.
    fn query_window<'a>(
        &'a self,
        metric: &'a str,
        since: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Vec<HistoryPoint>, StoreError>>;
}

fn to_point(metric: &str, millis: i64, value: f64) -> Result<HistoryPoint, StoreError> {
    let timestamp = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or(StoreError::Timestamp(millis))?;
    Ok(HistoryPoint {
        timestamp,
        metric: metric.to_string(),
        value,
    })
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS metrics (
    timestamp INTEGER NOT NULL,
    metric_name TEXT NOT NULL,
    value REAL NOT NULL,
    PRIMARY KEY (timestamp, metric_name)
)";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database file and ensure the table exists.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        debug!(path = %path.display(), "history store opened");
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl HistoryStore for SqliteStore {
    fn append<'a>(
        &'a self,
        metric: &'a str,
        at: DateTime<Utc>,
        value: f64,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO metrics (timestamp, metric_name, value) VALUES (?, ?, ?)
                 ON CONFLICT(timestamp, metric_name) DO UPDATE SET value = excluded.value",
            )
            .bind(at.timestamp_millis())
            .bind(metric)
            .bind(value)
            .execute(&self.pool)
            .await?;
            Ok(())
        })
    }

    fn query_window<'a>(
        &'a self,
        metric: &'a str,
        since: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Vec<HistoryPoint>, StoreError>> {
        Box::pin(async move {
            let rows: Vec<(i64, f64)> = sqlx::query_as(
                "SELECT timestamp, value FROM metrics
                 WHERE metric_name = ? AND timestamp >= ?
                 ORDER BY timestamp ASC",
            )
            .bind(metric)
            .bind(since.timestamp_millis())
            .fetch_all(&self.pool)
            .await?;
            rows.into_iter()
                .map(|(ts, v)| to_point(metric, ts, v))
                .collect()
        })
    }
}

/// In-process store, used in headless tests and when no database is wanted.
#[derive(Default)]
pub struct MemoryStore {
    points: Mutex<BTreeMap<(String, i64), f64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryStore for MemoryStore {
    fn append<'a>(
        &'a self,
        metric: &'a str,
        at: DateTime<Utc>,
        value: f64,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        let res = self
            .points
            .lock()
            .map(|mut p| {
                p.insert((metric.to_string(), at.timestamp_millis()), value);
            })
            .map_err(|_| StoreError::Poisoned);
        Box::pin(async move { res })
    }

    fn query_window<'a>(
        &'a self,
        metric: &'a str,
        since: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Vec<HistoryPoint>, StoreError>> {
        let res = match self.points.lock() {
            Ok(p) => p
                .range((metric.to_string(), since.timestamp_millis())..=(metric.to_string(), i64::MAX))
                .map(|((_, ts), v)| to_point(metric, *ts, *v))
                .collect(),
            Err(_) => Err(StoreError::Poisoned),
        };
        Box::pin(async move { res })
    }
}
