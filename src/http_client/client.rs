use std::time::{Instant, SystemTime, UNIX_EPOCH};

use futures_util::StreamExt;
use tokio::time::sleep;

use crate::config::{RetryConfig, TargetConfig};

use super::event::{ErrorKind, RequestEvent};

fn classify(err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        ErrorKind::Timeout
    } else if err.is_connect() {
        ErrorKind::Connect
    } else if err.is_body() || err.is_decode() {
        ErrorKind::Read
    } else {
        ErrorKind::Other
    }
}

async fn drain_response_body(response: reqwest::Response) -> (Option<u16>, u64) {
    let status = response.status().as_u16();
    let mut stream = response.bytes_stream();
    let mut received: u64 = 0;
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => received += bytes.len() as u64,
            Err(_) => break,
        }
    }
    (Some(status), received)
}

fn retry_delay_sec(retry: &RetryConfig, attempt: u32) -> f64 {
    let backoff = retry.base_delay_sec * 2f64.powi(attempt as i32 - 1);
    backoff.min(retry.max_delay_sec)
}

/// Performs a single logical request: the first attempt plus, when
/// `retry.enabled`, up to `retry.max_retries` further attempts. Always
/// produces exactly one [`RequestEvent`].
pub async fn send(
    client: &reqwest::Client,
    run_id: &str,
    target: &TargetConfig,
    retry: &RetryConfig,
    run_start: Instant,
) -> RequestEvent {
    let start_wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    let start_mono = run_start.elapsed().as_secs_f64();
    let attempt_start = Instant::now();

    let method = reqwest::Method::from_bytes(target.method.as_bytes()).unwrap_or(reqwest::Method::GET);
    let timeout = std::time::Duration::from_secs_f64(target.timeout_sec);

    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let mut builder = client
            .request(method.clone(), &target.base_url)
            .timeout(timeout);
        for (key, value) in &target.headers {
            builder = builder.header(key, value);
        }

        let result = builder.send().await;

        match result {
            Ok(response) => {
                let (status_code, bytes_received) = drain_response_body(response).await;
                let mono_time = run_start.elapsed().as_secs_f64().max(start_mono);
                let latency_ms = attempt_start.elapsed().as_secs_f64() * 1000.0;
                return RequestEvent {
                    run_id: run_id.to_string(),
                    wall_time: start_wall,
                    mono_time,
                    latency_ms,
                    status_code,
                    error_kind: None,
                    bytes_sent: 0,
                    bytes_received,
                };
            }
            Err(err) => {
                let kind = classify(&err);
                let mono_time = run_start.elapsed().as_secs_f64().max(start_mono);
                let latency_ms = attempt_start.elapsed().as_secs_f64() * 1000.0;
                let exhausted = !retry.enabled || attempt > retry.max_retries;
                if exhausted {
                    return RequestEvent {
                        run_id: run_id.to_string(),
                        wall_time: start_wall,
                        mono_time,
                        latency_ms,
                        status_code: None,
                        error_kind: Some(kind),
                        bytes_sent: 0,
                        bytes_received: 0,
                    };
                }
                let delay = retry_delay_sec(retry, attempt);
                sleep(std::time::Duration::from_secs_f64(delay)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_capped_and_doubles() {
        let retry = RetryConfig {
            enabled: true,
            max_retries: 5,
            base_delay_sec: 0.1,
            max_delay_sec: 0.3,
        };
        assert!((retry_delay_sec(&retry, 1) - 0.1).abs() < 1e-9);
        assert!((retry_delay_sec(&retry, 2) - 0.2).abs() < 1e-9);
        assert!((retry_delay_sec(&retry, 3) - 0.3).abs() < 1e-9);
        assert!((retry_delay_sec(&retry, 4) - 0.3).abs() < 1e-9);
    }
}
