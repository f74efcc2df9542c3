//! Regression comparator: inner-join two per-second tables on `second`
//! and report material mean-delta regressions.
use std::collections::HashMap;

use crate::metrics::PerSecondMetrics;

#[derive(Debug, Clone, PartialEq)]
pub struct Regression {
    pub metric: String,
    pub delta_pct: f64,
    pub message: String,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn compare_runs(base: &[PerSecondMetrics], candidate: &[PerSecondMetrics]) -> Vec<Regression> {
    if base.is_empty() || candidate.is_empty() {
        return Vec::new();
    }

    let candidate_by_second: HashMap<u64, &PerSecondMetrics> =
        candidate.iter().map(|row| (row.second, row)).collect();

    let mut base_p99 = Vec::new();
    let mut cand_p99 = Vec::new();
    let mut base_err = Vec::new();
    let mut cand_err = Vec::new();
    let mut base_rps = Vec::new();
    let mut cand_rps = Vec::new();

    for row in base {
        if let Some(cand_row) = candidate_by_second.get(&row.second) {
            base_p99.push(row.p99_ms);
            cand_p99.push(cand_row.p99_ms);
            base_err.push(row.error_rate);
            cand_err.push(cand_row.error_rate);
            base_rps.push(row.achieved_rps);
            cand_rps.push(cand_row.achieved_rps);
        }
    }

    if base_p99.is_empty() {
        return Vec::new();
    }

    let mut regressions = Vec::new();

    let base_p99_mean = mean(&base_p99);
    if base_p99_mean > 0.0 {
        let delta = (mean(&cand_p99) - base_p99_mean) / base_p99_mean;
        if delta > 0.20 {
            regressions.push(Regression {
                metric: "p99_ms".into(),
                delta_pct: delta * 100.0,
                message: "p99 latency increased materially".into(),
            });
        }
    }

    let base_err_mean = mean(&base_err);
    if base_err_mean > 0.0 {
        let delta = (mean(&cand_err) - base_err_mean) / base_err_mean;
        if delta > 0.30 {
            regressions.push(Regression {
                metric: "error_rate".into(),
                delta_pct: delta * 100.0,
                message: "error rate regression detected".into(),
            });
        }
    }

    let base_rps_mean = mean(&base_rps);
    if base_rps_mean > 0.0 {
        let delta = (base_rps_mean - mean(&cand_rps)) / base_rps_mean;
        if delta > 0.20 {
            regressions.push(Regression {
                metric: "achieved_rps".into(),
                delta_pct: delta * 100.0,
                message: "throughput regression detected".into(),
            });
        }
    }

    regressions
}
