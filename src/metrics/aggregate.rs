use std::collections::HashMap;

use crate::http_client::{ErrorKind, RequestEvent};

use super::percentile::percentile;
use super::types::PerSecondMetrics;

/// Buckets events by `floor(event.mono_time - start_mono)` and computes
/// one [`PerSecondMetrics`] row per second in `[0, requested_rates.len())`.
/// Output length always equals the schedule length; seconds with no events
/// are emitted with zeros.
pub fn aggregate_per_second(
    run_id: &str,
    events: &[RequestEvent],
    requested_rates: &[f64],
    start_mono: f64,
) -> Vec<PerSecondMetrics> {
    let duration = requested_rates.len() as u64;
    let mut buckets: HashMap<u64, Vec<&RequestEvent>> = HashMap::new();

    for event in events {
        let offset = event.mono_time - start_mono;
        let bucket = offset.floor().max(0.0) as u64;
        buckets.entry(bucket).or_default().push(event);
    }

    (0..duration)
        .map(|second| {
            let bucket = buckets.get(&second).cloned().unwrap_or_default();
            let achieved_rps = bucket.len() as f64;

            let mut latencies: Vec<f64> = bucket
                .iter()
                .filter(|e| e.latency_ms >= 0.0)
                .map(|e| e.latency_ms)
                .collect();
            latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            let error_count = bucket.iter().filter(|e| e.error_kind.is_some()).count() as f64;
            let timeout_count = bucket
                .iter()
                .filter(|e| e.error_kind == Some(ErrorKind::Timeout))
                .count() as f64;
            let total = achieved_rps.max(1.0);

            PerSecondMetrics {
                run_id: run_id.to_string(),
                second,
                requested_rps: requested_rates.get(second as usize).copied().unwrap_or(0.0),
                achieved_rps,
                p50_ms: percentile(&latencies, 50.0),
                p95_ms: percentile(&latencies, 95.0),
                p99_ms: percentile(&latencies, 99.0),
                error_rate: error_count / total,
                timeout_rate: timeout_count / total,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(mono_time: f64, latency_ms: f64) -> RequestEvent {
        RequestEvent {
            run_id: "r1".into(),
            wall_time: 0.0,
            mono_time,
            latency_ms,
            status_code: Some(200),
            error_kind: None,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    #[test]
    fn bucketing_scenario_matches_spec() {
        let events = vec![
            event(1000.2, 10.0),
            event(1000.9, 20.0),
            event(1001.1, 30.0),
        ];
        let rates = vec![10.0, 10.0];
        let rows = aggregate_per_second("r1", &events, &rates, 1000.0);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].achieved_rps, 2.0);
        assert!((rows[0].p50_ms - 15.0).abs() < 1e-9);
        assert_eq!(rows[1].achieved_rps, 1.0);
        assert!((rows[1].p50_ms - 30.0).abs() < 1e-9);
    }

    #[test]
    fn sum_of_achieved_equals_event_count() {
        let events = vec![event(0.1, 1.0), event(1.5, 2.0), event(1.9, 3.0), event(4.9, 4.0)];
        let rates = vec![1.0; 5];
        let rows = aggregate_per_second("r1", &events, &rates, 0.0);
        assert_eq!(rows.len(), 5);
        let total: f64 = rows.iter().map(|r| r.achieved_rps).sum();
        assert_eq!(total, events.len() as f64);
    }

    #[test]
    fn all_success_yields_zero_error_rate() {
        let events = vec![event(0.0, 1.0), event(0.5, 2.0)];
        let rates = vec![2.0];
        let rows = aggregate_per_second("r1", &events, &rates, 0.0);
        assert_eq!(rows[0].error_rate, 0.0);
    }

    #[test]
    fn empty_buckets_are_zeroed() {
        let rates = vec![5.0, 5.0, 5.0];
        let rows = aggregate_per_second("r1", &[], &rates, 0.0);
        assert_eq!(rows.len(), 3);
        for row in rows {
            assert_eq!(row.achieved_rps, 0.0);
            assert_eq!(row.p50_ms, 0.0);
            assert_eq!(row.error_rate, 0.0);
        }
    }
}
