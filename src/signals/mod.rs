//! Derived-signal analyses over a per-second table: first-difference
//! semantics, edge entries (diff undefined) treated as false.
use crate::metrics::PerSecondMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalLabel {
    Queueing,
    Overload,
    AutoscaleLag,
}

impl SignalLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            SignalLabel::Queueing => "queueing",
            SignalLabel::Overload => "overload",
            SignalLabel::AutoscaleLag => "autoscale_lag",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalWindow {
    pub start_sec: u64,
    pub end_sec: u64,
    pub label: SignalLabel,
}

fn diff(series: &[f64], i: usize) -> Option<f64> {
    if i == 0 {
        None
    } else {
        Some(series[i] - series[i - 1])
    }
}

pub fn queueing_indicator(rows: &[PerSecondMetrics]) -> Vec<SignalWindow> {
    let p99: Vec<f64> = rows.iter().map(|r| r.p99_ms).collect();
    let achieved: Vec<f64> = rows.iter().map(|r| r.achieved_rps).collect();
    let mut windows = Vec::new();
    for i in 0..rows.len() {
        let rising = diff(&p99, i).is_some_and(|d| d > 0.0);
        let stable = diff(&achieved, i).is_some_and(|d| d.abs() < 1.0);
        if rising && stable {
            let second = rows[i].second;
            windows.push(SignalWindow {
                start_sec: second,
                end_sec: second + 1,
                label: SignalLabel::Queueing,
            });
        }
    }
    windows
}

pub fn overload_indicator(rows: &[PerSecondMetrics]) -> Vec<SignalWindow> {
    let achieved: Vec<f64> = rows.iter().map(|r| r.achieved_rps).collect();
    let error_rate: Vec<f64> = rows.iter().map(|r| r.error_rate).collect();
    let mut windows = Vec::new();
    for i in 0..rows.len() {
        let falling = diff(&achieved, i).is_some_and(|d| d < 0.0);
        let rising_errors = diff(&error_rate, i).is_some_and(|d| d > 0.0);
        if falling && rising_errors {
            let second = rows[i].second;
            windows.push(SignalWindow {
                start_sec: second,
                end_sec: second + 1,
                label: SignalLabel::Overload,
            });
        }
    }
    windows
}

pub fn autoscaling_lag(rows: &[PerSecondMetrics]) -> Vec<SignalWindow> {
    let requested: Vec<f64> = rows.iter().map(|r| r.requested_rps).collect();

    let spike_idx = (0..rows.len()).find(|&i| diff(&requested, i).is_some_and(|d| d > 0.0));
    let Some(spike_idx) = spike_idx else {
        return Vec::new();
    };
    let s0 = rows[spike_idx].second;

    let catch_idx = (spike_idx..rows.len())
        .find(|&i| rows[i].achieved_rps >= 0.9 * rows[i].requested_rps);
    let Some(catch_idx) = catch_idx else {
        return Vec::new();
    };
    let s1 = rows[catch_idx].second;

    if s1 > s0 {
        vec![SignalWindow {
            start_sec: s0,
            end_sec: s1,
            label: SignalLabel::AutoscaleLag,
        }]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(second: u64, requested: f64, achieved: f64, p99: f64, error_rate: f64) -> PerSecondMetrics {
        PerSecondMetrics {
            run_id: "r1".into(),
            second,
            requested_rps: requested,
            achieved_rps: achieved,
            p50_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: p99,
            error_rate,
            timeout_rate: 0.0,
        }
    }

    #[test]
    fn queueing_fires_on_rising_p99_with_stable_throughput() {
        let rows = vec![
            row(0, 10.0, 10.0, 100.0, 0.0),
            row(1, 10.0, 10.0, 150.0, 0.0),
        ];
        let windows = queueing_indicator(&rows);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start_sec, 1);
    }

    #[test]
    fn overload_fires_on_falling_throughput_with_rising_errors() {
        let rows = vec![
            row(0, 10.0, 10.0, 0.0, 0.0),
            row(1, 10.0, 5.0, 0.0, 0.2),
        ];
        let windows = overload_indicator(&rows);
        assert_eq!(windows.len(), 1);
    }

    #[test]
    fn autoscale_lag_window_spans_spike_to_catch_up() {
        let rows = vec![
            row(0, 10.0, 10.0, 0.0, 0.0),
            row(1, 100.0, 10.0, 0.0, 0.0),
            row(2, 100.0, 50.0, 0.0, 0.0),
            row(3, 100.0, 95.0, 0.0, 0.0),
        ];
        let windows = autoscaling_lag(&rows);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start_sec, 1);
        assert_eq!(windows[0].end_sec, 3);
    }

    #[test]
    fn edge_entries_never_fire() {
        let rows = vec![row(0, 10.0, 10.0, 100.0, 0.5)];
        assert!(queueing_indicator(&rows).is_empty());
        assert!(overload_indicator(&rows).is_empty());
    }
}
