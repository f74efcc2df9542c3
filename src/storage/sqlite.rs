use std::path::Path;

use rusqlite::params;
use tokio_rusqlite::Connection;

use crate::config::RunConfig;
use crate::config::RunMetadata;
use crate::error::{AppError, AppResult, StorageError};
use crate::http_client::{ErrorKind, RequestEvent};
use crate::metrics::PerSecondMetrics;

use super::{RunMeta, Storage};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS run_meta (
    run_id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    config_json TEXT NOT NULL,
    notes TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS request_events (
    run_id TEXT NOT NULL,
    wall_time REAL NOT NULL,
    mono_time REAL NOT NULL,
    latency_ms REAL NOT NULL,
    status_code INTEGER,
    error_type TEXT,
    bytes_sent INTEGER NOT NULL,
    bytes_received INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS per_second (
    run_id TEXT NOT NULL,
    second INTEGER NOT NULL,
    requested_rps REAL NOT NULL,
    achieved_rps REAL NOT NULL,
    p50_ms REAL NOT NULL,
    p95_ms REAL NOT NULL,
    p99_ms REAL NOT NULL,
    error_rate REAL NOT NULL,
    timeout_rate REAL NOT NULL
);
";

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn error_kind_to_str(kind: ErrorKind) -> &'static str {
    kind.as_str()
}

fn str_to_error_kind(value: &str) -> Option<ErrorKind> {
    match value {
        "timeout" => Some(ErrorKind::Timeout),
        "connect" => Some(ErrorKind::Connect),
        "read" => Some(ErrorKind::Read),
        "other" => Some(ErrorKind::Other),
        _ => None,
    }
}

/// SQLite-backed adapter. `open` creates the schema on first connect if it
/// does not yet exist.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub async fn open(path: &Path) -> AppResult<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|source| AppError::storage(StorageError::Connection {
                context: "open database",
                source,
            }))?;
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(|source| {
            AppError::storage(StorageError::Connection {
                context: "create schema",
                source,
            })
        })?;
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    async fn run_exists(&self, run_id: &str) -> AppResult<bool> {
        let run_id = run_id.to_string();
        self.conn
            .call(move |conn| {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM run_meta WHERE run_id = ?1)",
                    params![run_id],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(|source| {
                AppError::storage(StorageError::Connection {
                    context: "check run_exists",
                    source,
                })
            })
    }

    async fn save_run(
        &self,
        config: &RunConfig,
        events: &[RequestEvent],
        per_second: &[PerSecondMetrics],
    ) -> AppResult<()> {
        if self.run_exists(&config.run_id).await? {
            return Err(AppError::storage(StorageError::DuplicateRunId {
                run_id: config.run_id.clone(),
            }));
        }

        let metadata = RunMetadata::from(config);
        let config_json = metadata
            .to_json()
            .map_err(|source| AppError::storage(StorageError::Json {
                context: "serialize run metadata",
                source,
            }))?;
        let run_id = config.run_id.clone();
        let created_at = config.created_at.to_rfc3339();
        let notes = config.notes.clone();
        let events = events.to_vec();
        let per_second = per_second.to_vec();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    tx.execute(
                        "INSERT INTO run_meta (run_id, created_at, config_json, notes) VALUES (?1, ?2, ?3, ?4)",
                        params![run_id, created_at, config_json, notes],
                    )?;

                    let mut event_stmt = tx.prepare(
                        "INSERT INTO request_events (run_id, wall_time, mono_time, latency_ms, status_code, error_type, bytes_sent, bytes_received) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    )?;
                    for event in &events {
                        event_stmt.execute(params![
                            event.run_id,
                            event.wall_time,
                            event.mono_time,
                            event.latency_ms,
                            event.status_code,
                            event.error_kind.map(error_kind_to_str),
                            clamp_i64(event.bytes_sent),
                            clamp_i64(event.bytes_received),
                        ])?;
                    }

                    let mut per_second_stmt = tx.prepare(
                        "INSERT INTO per_second (run_id, second, requested_rps, achieved_rps, p50_ms, p95_ms, p99_ms, error_rate, timeout_rate) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    )?;
                    for row in &per_second {
                        per_second_stmt.execute(params![
                            row.run_id,
                            clamp_i64(row.second),
                            row.requested_rps,
                            row.achieved_rps,
                            row.p50_ms,
                            row.p95_ms,
                            row.p99_ms,
                            row.error_rate,
                            row.timeout_rate,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|source| {
                AppError::storage(StorageError::Connection {
                    context: "save run",
                    source,
                })
            })
    }

    async fn load_per_second(&self, run_id: &str) -> AppResult<Vec<PerSecondMetrics>> {
        let run_id_owned = run_id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT run_id, second, requested_rps, achieved_rps, p50_ms, p95_ms, p99_ms, error_rate, timeout_rate FROM per_second WHERE run_id = ?1 ORDER BY second ASC",
                )?;
                let rows = stmt
                    .query_map(params![run_id_owned], |row| {
                        Ok(PerSecondMetrics {
                            run_id: row.get(0)?,
                            second: row.get::<_, i64>(1)? as u64,
                            requested_rps: row.get(2)?,
                            achieved_rps: row.get(3)?,
                            p50_ms: row.get(4)?,
                            p95_ms: row.get(5)?,
                            p99_ms: row.get(6)?,
                            error_rate: row.get(7)?,
                            timeout_rate: row.get(8)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(|source| {
                AppError::storage(StorageError::Connection {
                    context: "load per_second",
                    source,
                })
            })
    }

    async fn load_request_events(&self, run_id: &str) -> AppResult<Vec<RequestEvent>> {
        let run_id_owned = run_id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT run_id, wall_time, mono_time, latency_ms, status_code, error_type, bytes_sent, bytes_received FROM request_events WHERE run_id = ?1",
                )?;
                let rows = stmt
                    .query_map(params![run_id_owned], |row| {
                        let error_type: Option<String> = row.get(5)?;
                        Ok(RequestEvent {
                            run_id: row.get(0)?,
                            wall_time: row.get(1)?,
                            mono_time: row.get(2)?,
                            latency_ms: row.get(3)?,
                            status_code: row.get::<_, Option<i64>>(4)?.map(|v| v as u16),
                            error_kind: error_type.as_deref().and_then(str_to_error_kind),
                            bytes_sent: row.get::<_, i64>(6)? as u64,
                            bytes_received: row.get::<_, i64>(7)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(|source| {
                AppError::storage(StorageError::Connection {
                    context: "load request_events",
                    source,
                })
            })
    }

    async fn load_run_meta(&self, run_id: &str) -> AppResult<Option<RunMeta>> {
        let run_id_owned = run_id.to_string();
        self.conn
            .call(move |conn| {
                let result = conn.query_row(
                    "SELECT run_id, created_at, config_json, notes FROM run_meta WHERE run_id = ?1",
                    params![run_id_owned],
                    |row| {
                        Ok(RunMeta {
                            run_id: row.get(0)?,
                            created_at: row.get(1)?,
                            config_json: row.get(2)?,
                            notes: row.get(3)?,
                        })
                    },
                );
                match result {
                    Ok(meta) => Ok(Some(meta)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(err) => Err(err),
                }
            })
            .await
            .map_err(|source| {
                AppError::storage(StorageError::Connection {
                    context: "load run_meta",
                    source,
                })
            })
    }

    async fn list_runs(&self) -> AppResult<Vec<RunMeta>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT run_id, created_at, config_json, notes FROM run_meta ORDER BY created_at DESC",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(RunMeta {
                            run_id: row.get(0)?,
                            created_at: row.get(1)?,
                            config_json: row.get(2)?,
                            notes: row.get(3)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(|source| {
                AppError::storage(StorageError::Connection {
                    context: "list runs",
                    source,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BurstyParams, CircuitBreakerConfig, LoadModel, PatternParams, RetryConfig, TargetConfig,
    };
    use std::collections::BTreeMap;

    fn config(run_id: &str) -> RunConfig {
        RunConfig::new(
            TargetConfig {
                base_url: "http://example.test".into(),
                method: "GET".into(),
                timeout_sec: 5.0,
                headers: BTreeMap::new(),
            },
            PatternParams::Bursty(BurstyParams {
                baseline_rps: 10.0,
                burst_rps: 20.0,
                burst_duration_sec: 1,
                burst_interval_sec: 5,
                jitter_pct: 0.0,
            }),
            2,
            LoadModel::OpenLoop,
            1,
            7,
            RetryConfig::default(),
            CircuitBreakerConfig::default(),
            Some(run_id.to_string()),
            "test run".into(),
        )
        .expect("valid config")
    }

    #[tokio::test]
    async fn save_and_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("runs.sqlite3");
        let storage = SqliteStorage::open(&path).await.expect("open");

        let cfg = config("roundtrip-run");
        assert!(!storage.run_exists(&cfg.run_id).await.expect("exists"));

        let events = vec![RequestEvent {
            run_id: cfg.run_id.clone(),
            wall_time: 1.0,
            mono_time: 0.5,
            latency_ms: 12.0,
            status_code: Some(200),
            error_kind: None,
            bytes_sent: 0,
            bytes_received: 100,
        }];
        let per_second = vec![PerSecondMetrics {
            run_id: cfg.run_id.clone(),
            second: 0,
            requested_rps: 10.0,
            achieved_rps: 1.0,
            p50_ms: 12.0,
            p95_ms: 12.0,
            p99_ms: 12.0,
            error_rate: 0.0,
            timeout_rate: 0.0,
        }];

        storage
            .save_run(&cfg, &events, &per_second)
            .await
            .expect("save run");

        assert!(storage.run_exists(&cfg.run_id).await.expect("exists"));

        let loaded_events = storage
            .load_request_events(&cfg.run_id)
            .await
            .expect("load events");
        assert_eq!(loaded_events.len(), 1);
        assert_eq!(loaded_events[0].status_code, Some(200));

        let loaded_rows = storage
            .load_per_second(&cfg.run_id)
            .await
            .expect("load per_second");
        assert_eq!(loaded_rows.len(), 1);
        assert_eq!(loaded_rows[0].achieved_rps, 1.0);

        let meta = storage
            .load_run_meta(&cfg.run_id)
            .await
            .expect("load meta")
            .expect("meta present");
        assert_eq!(meta.run_id, cfg.run_id);
        assert_eq!(meta.notes, "test run");
    }

    #[tokio::test]
    async fn duplicate_run_id_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("runs.sqlite3");
        let storage = SqliteStorage::open(&path).await.expect("open");
        let cfg = config("dup-run");
        storage.save_run(&cfg, &[], &[]).await.expect("first save");
        let err = storage.save_run(&cfg, &[], &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(StorageError::DuplicateRunId { .. })));
    }

    #[tokio::test]
    async fn list_runs_orders_by_created_at_desc() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("runs.sqlite3");
        let storage = SqliteStorage::open(&path).await.expect("open");
        storage.save_run(&config("run-a"), &[], &[]).await.expect("save a");
        storage.save_run(&config("run-b"), &[], &[]).await.expect("save b");
        let runs = storage.list_runs().await.expect("list");
        assert_eq!(runs.len(), 2);
    }
}
