use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::config::{RunConfig, TargetConfig};

use super::{maybe_send, EventBuffer, ProgressSender, SharedBreaker};

fn rate_at(schedule: &[f64], elapsed_sec: f64) -> f64 {
    let idx = elapsed_sec.floor() as i64;
    if idx < 0 || idx as usize >= schedule.len() {
        0.0
    } else {
        schedule[idx as usize]
    }
}

/// Exactly `closed_loop_workers` concurrent workers run for the schedule's
/// duration, each repeatedly sending one request and pacing itself to the
/// rate sampled at its current elapsed time.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    config: &RunConfig,
    schedule: &[f64],
    client: reqwest::Client,
    target: Arc<TargetConfig>,
    run_id: Arc<str>,
    breaker: Option<SharedBreaker>,
    events: EventBuffer,
    progress: Option<ProgressSender>,
    run_start: Instant,
) {
    let duration_sec = schedule.len() as u64;
    let workers = config.closed_loop_workers as f64;
    let retry = config.retry;
    let schedule: Arc<Vec<f64>> = Arc::new(schedule.to_vec());

    let mut handles = Vec::new();
    for _ in 0..config.closed_loop_workers {
        let client = client.clone();
        let run_id = run_id.clone();
        let target = target.clone();
        let breaker = breaker.clone();
        let events = events.clone();
        let schedule = schedule.clone();

        handles.push(tokio::spawn(async move {
            loop {
                let elapsed = run_start.elapsed().as_secs_f64();
                if elapsed >= duration_sec as f64 {
                    break;
                }
                let rate = rate_at(&schedule, elapsed);
                if rate <= 0.0 {
                    sleep(Duration::from_millis(50)).await;
                    continue;
                }
                if let Some(event) =
                    maybe_send(&client, &run_id, &target, &retry, &breaker, run_start).await
                {
                    if let Ok(mut guard) = events.lock() {
                        guard.push(event);
                    }
                }
                let interval = (workers / rate).max(0.0);
                sleep(Duration::from_secs_f64(interval)).await;
            }
        }));
    }

    let ticker = {
        let progress = progress.clone();
        tokio::spawn(async move {
            for s in 0..duration_sec {
                sleep_until_second(run_start, s + 1).await;
                if let Some(tx) = &progress {
                    let _ = tx.send((s + 1, duration_sec)).await;
                }
            }
        })
    };

    for handle in handles {
        let _ = handle.await;
    }
    let _ = ticker.await;
}

async fn sleep_until_second(run_start: Instant, second: u64) {
    let target = run_start + Duration::from_secs(second);
    tokio::time::sleep_until(target.into()).await;
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::{CircuitBreakerConfig, DiurnalParams, DiurnalShape, LoadModel, PatternParams, RetryConfig};

    #[test]
    fn rate_at_is_zero_outside_the_schedule() {
        let schedule = vec![10.0, 20.0];
        assert_eq!(rate_at(&schedule, -1.0), 0.0);
        assert_eq!(rate_at(&schedule, 0.5), 10.0);
        assert_eq!(rate_at(&schedule, 1.9), 20.0);
        assert_eq!(rate_at(&schedule, 5.0), 0.0);
    }

    fn config_for(base_url: String) -> RunConfig {
        let target = TargetConfig {
            base_url,
            method: "GET".to_string(),
            timeout_sec: 2.0,
            headers: BTreeMap::new(),
        };
        let pattern = PatternParams::Diurnal(DiurnalParams {
            min_rps: 50.0,
            max_rps: 50.0,
            cycle_duration_sec: 10,
            shape: DiurnalShape::Sine,
        });
        RunConfig::new(
            target,
            pattern,
            1,
            LoadModel::ClosedLoop,
            4,
            7,
            RetryConfig::default(),
            CircuitBreakerConfig::default(),
            None,
            String::new(),
        )
        .expect("valid config")
    }

    #[tokio::test]
    async fn every_worker_sends_at_least_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let config = config_for(server.uri());
        let schedule = vec![50.0];
        let target = Arc::new(config.target.clone());
        let run_id: Arc<str> = Arc::from(config.run_id.as_str());
        let events: EventBuffer = Arc::new(std::sync::Mutex::new(Vec::new()));
        let run_start = Instant::now();

        run(
            &config,
            &schedule,
            reqwest::Client::new(),
            target,
            run_id,
            None,
            events.clone(),
            None,
            run_start,
        )
        .await;

        let events = events.lock().expect("events lock");
        assert!(events.len() >= config.closed_loop_workers);
        assert!(events.iter().all(|e| e.status_code == Some(200)));
    }
}
