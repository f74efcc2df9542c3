use crate::config::ViralSpikeParams;

use super::PatternSchedule;

pub fn schedule(params: &ViralSpikeParams, duration_sec: u64) -> PatternSchedule {
    let baseline = params.baseline_rps;
    let peak = baseline * params.spike_multiplier;
    let ramp_end = params.ramp_up_sec;
    let hold_end = ramp_end + params.peak_hold_sec;
    let half_life = params.decay_half_life_sec.max(1) as f64;

    (0..duration_sec)
        .map(|t| {
            if t < ramp_end && ramp_end > 0 {
                baseline + (peak - baseline) * (t as f64 / ramp_end as f64)
            } else if t < hold_end {
                peak
            } else {
                let elapsed = (t - hold_end) as f64;
                let decay = (-std::f64::consts::LN_2 * elapsed / half_life).exp();
                baseline + (peak - baseline) * decay
            }
        })
        .collect()
}
