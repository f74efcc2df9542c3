use std::f64::consts::PI;

use crate::config::{DiurnalParams, DiurnalShape};

use super::PatternSchedule;

fn shape_peak(shape: DiurnalShape, cycle_pos: f64) -> f64 {
    match shape {
        DiurnalShape::Sine => ((2.0 * PI * (cycle_pos - 0.25)).sin() + 1.0) / 2.0,
        DiurnalShape::Gaussian => (-0.5 * ((cycle_pos - 0.5) / 0.18).powi(2)).exp(),
        DiurnalShape::Commuter => {
            let morning = (-0.5 * ((cycle_pos - 0.33) / 0.08).powi(2)).exp();
            let evening = (-0.5 * ((cycle_pos - 0.72) / 0.1).powi(2)).exp();
            (morning + evening) / 2.0
        }
    }
}

pub fn schedule(params: &DiurnalParams, duration_sec: u64) -> PatternSchedule {
    (0..duration_sec)
        .map(|t| {
            let cycle_pos = (t % params.cycle_duration_sec) as f64 / params.cycle_duration_sec as f64;
            let peak = shape_peak(params.shape, cycle_pos);
            params.min_rps + (params.max_rps - params.min_rps) * peak
        })
        .collect()
}
