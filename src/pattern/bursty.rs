use rand::Rng;
use rand::rngs::StdRng;

use crate::config::BurstyParams;

use super::PatternSchedule;

fn is_burst(t: u64, params: &BurstyParams) -> bool {
    if params.burst_interval_sec == 0 {
        return false;
    }
    (t % params.burst_interval_sec) < params.burst_duration_sec
}

pub fn schedule(params: &BurstyParams, duration_sec: u64, rng: &mut StdRng) -> PatternSchedule {
    (0..duration_sec)
        .map(|t| {
            let base = if is_burst(t, params) {
                params.burst_rps
            } else {
                params.baseline_rps
            };
            let jitter = base * params.jitter_pct;
            let low = base - jitter;
            let high = base + jitter;
            let draw = if low < high {
                rng.gen_range(low..high)
            } else {
                base
            };
            draw.max(0.0)
        })
        .collect()
}
