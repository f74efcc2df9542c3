use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error during {context}: {source}")]
    Sqlite {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("sqlite connection error during {context}: {source}")]
    Connection {
        context: &'static str,
        #[source]
        source: tokio_rusqlite::Error,
    },
    #[error("json error during {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("run id {run_id} already exists")]
    DuplicateRunId { run_id: String },
}
