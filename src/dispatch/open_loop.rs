use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::sleep_until;

use crate::config::{RunConfig, TargetConfig};

use super::{maybe_send, EventBuffer, ProgressSender, SharedBreaker};

/// Approximates a Poisson-like arrival process with uniform within-second
/// spacing: each second's rate yields an unbiased integer draw of tasks,
/// spread evenly across that second.
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
    let mut rng = config.open_loop_rng();
    let retry = config.retry;
    let total = schedule.len() as u64;
    let mut handles = Vec::new();

    for (s, &rate) in schedule.iter().enumerate() {
        let n_base = rate.floor();
        let frac = rate - n_base;
        let mut n = n_base as u64;
        if frac > 0.0 && rng.gen::<f64>() < frac {
            n += 1;
        }

        for i in 0..n {
            let offset = if n > 0 { i as f64 / n as f64 } else { 0.0 };
            let target_instant = run_start + Duration::from_secs_f64(s as f64 + offset);
            let client = client.clone();
            let run_id = run_id.clone();
            let target = target.clone();
            let breaker = breaker.clone();
            let events = events.clone();

            handles.push(tokio::spawn(async move {
                sleep_until(target_instant.into()).await;
                if let Some(event) =
                    maybe_send(&client, &run_id, &target, &retry, &breaker, run_start).await
                {
                    if let Ok(mut guard) = events.lock() {
                        guard.push(event);
                    }
                }
            }));
        }

        sleep_until((run_start + Duration::from_secs(s as u64 + 1)).into()).await;
        if let Some(tx) = &progress {
            let _ = tx.send((s as u64 + 1, total)).await;
        }
    }

    for handle in handles {
        let _ = handle.await;
    }
}
