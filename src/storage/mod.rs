//! Storage adapter: persists/loads run artifacts behind a narrow interface,
//! keyed by run id.
mod sqlite;

pub use sqlite::SqliteStorage;

use crate::config::RunConfig;
use crate::error::AppResult;
use crate::http_client::RequestEvent;
use crate::metrics::PerSecondMetrics;

/// A row from `run_meta`: the stable `config_json` projection plus its
/// storage-level envelope fields.
#[derive(Debug, Clone)]
pub struct RunMeta {
    pub run_id: String,
    pub created_at: String,
    pub config_json: String,
    pub notes: String,
}

/// The interface the core consumes; concrete adapters (here, SQLite) must
/// reject a re-used run id and persist `save_run`'s three artifacts
/// atomically.
pub trait Storage {
    async fn run_exists(&self, run_id: &str) -> AppResult<bool>;

    async fn save_run(
        &self,
        config: &RunConfig,
        events: &[RequestEvent],
        per_second: &[PerSecondMetrics],
    ) -> AppResult<()>;

    async fn load_per_second(&self, run_id: &str) -> AppResult<Vec<PerSecondMetrics>>;

    async fn load_request_events(&self, run_id: &str) -> AppResult<Vec<RequestEvent>>;

    async fn load_run_meta(&self, run_id: &str) -> AppResult<Option<RunMeta>>;

    async fn list_runs(&self) -> AppResult<Vec<RunMeta>>;
}
