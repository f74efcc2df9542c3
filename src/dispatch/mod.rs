//! Time-driven request emission under the open-loop and closed-loop models.
mod closed_loop;
mod open_loop;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::mpsc::Sender;

use crate::breaker::CircuitBreaker;
use crate::config::{LoadModel, RetryConfig, RunConfig, TargetConfig};
use crate::http_client::RequestEvent;
use crate::pattern::PatternSchedule;

pub type EventBuffer = Arc<Mutex<Vec<RequestEvent>>>;
pub type SharedBreaker = Arc<Mutex<CircuitBreaker>>;
/// Bounded so a slow progress sink applies backpressure to the scheduler
/// rather than letting progress reporting run arbitrarily far ahead.
pub type ProgressSender = Sender<(u64, u64)>;

/// Runs the configured load model to completion and returns the collected
/// request events along with the run's monotonic start instant (needed by
/// the aggregator to replicate the dispatcher's bucketing).
pub async fn run(
    config: &RunConfig,
    schedule: &PatternSchedule,
    client: reqwest::Client,
    progress: Option<ProgressSender>,
) -> (Vec<RequestEvent>, Instant) {
    let run_start = Instant::now();
    let breaker = if config.circuit_breaker.enabled {
        Some(Arc::new(Mutex::new(CircuitBreaker::new(
            config.circuit_breaker,
        ))))
    } else {
        None
    };
    let events: EventBuffer = Arc::new(Mutex::new(Vec::new()));
    let target = Arc::new(config.target.clone());
    let run_id: Arc<str> = Arc::from(config.run_id.as_str());

    match config.load_model {
        LoadModel::OpenLoop => {
            open_loop::run(
                config,
                schedule,
                client,
                target,
                run_id,
                breaker,
                events.clone(),
                progress,
                run_start,
            )
            .await;
        }
        LoadModel::ClosedLoop => {
            closed_loop::run(
                config,
                schedule,
                client,
                target,
                run_id,
                breaker,
                events.clone(),
                progress,
                run_start,
            )
            .await;
        }
    }

    let events = Arc::try_unwrap(events)
        .map(|m| m.into_inner().unwrap_or_default())
        .unwrap_or_default();
    (events, run_start)
}

/// Consults the breaker (if present), performs one `send()` when admitted,
/// and records the outcome. Returns `None` when the breaker blocked the
/// dispatch — a blocked attempt produces no event.
async fn maybe_send(
    client: &reqwest::Client,
    run_id: &str,
    target: &TargetConfig,
    retry: &RetryConfig,
    breaker: &Option<SharedBreaker>,
    run_start: Instant,
) -> Option<RequestEvent> {
    if let Some(breaker) = breaker {
        let admitted = {
            let mut guard = breaker.lock().unwrap_or_else(|p| p.into_inner());
            guard.allow_request()
        };
        if !admitted {
            return None;
        }
    }

    let event = crate::http_client::send(client, run_id, target, retry, run_start).await;

    if let Some(breaker) = breaker {
        let mut guard = breaker.lock().unwrap_or_else(|p| p.into_inner());
        guard.record(event.success());
    }

    Some(event)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::CircuitBreakerConfig;

    fn target(base_url: String) -> TargetConfig {
        TargetConfig {
            base_url,
            method: "GET".to_string(),
            timeout_sec: 2.0,
            headers: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn maybe_send_returns_none_once_breaker_opens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let target = target(server.uri());
        let retry = RetryConfig::default();
        let breaker = Some(Arc::new(Mutex::new(CircuitBreaker::new(CircuitBreakerConfig {
            enabled: true,
            window_size: 1,
            error_rate_threshold: 0.5,
            open_cooldown_sec: 5.0,
        }))));
        let client = reqwest::Client::new();
        let run_start = Instant::now();

        let first = maybe_send(&client, "run-a", &target, &retry, &breaker, run_start).await;
        assert_eq!(first.expect("first attempt admitted").status_code, Some(500));

        let second = maybe_send(&client, "run-a", &target, &retry, &breaker, run_start).await;
        assert!(second.is_none(), "breaker should block once open");
    }

    #[tokio::test]
    async fn maybe_send_with_no_breaker_always_sends() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let target = target(server.uri());
        let retry = RetryConfig::default();
        let client = reqwest::Client::new();
        let run_start = Instant::now();

        for _ in 0..3 {
            let event = maybe_send(&client, "run-b", &target, &retry, &None, run_start).await;
            assert_eq!(event.expect("admitted").status_code, Some(200));
        }
    }
}
