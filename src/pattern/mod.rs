//! Pure pattern schedulers: (params, duration, seed) -> rate curve.
mod bursty;
mod diurnal;
mod viral;

use rand::rngs::StdRng;

use crate::config::PatternParams;

/// Ordered sequence of nonnegative floats of length `duration`; entry `i`
/// is the requested rate during the half-open second `[i, i+1)`.
pub type PatternSchedule = Vec<f64>;

/// Materializes the full rate curve for the given pattern up-front.
///
/// `rng` drives jitter draws only; patterns that don't need randomness
/// (diurnal, viral spike) ignore it.
pub fn schedule_for(pattern: &PatternParams, duration_sec: u64, rng: &mut StdRng) -> PatternSchedule {
    match pattern {
        PatternParams::Bursty(params) => bursty::schedule(params, duration_sec, rng),
        PatternParams::Diurnal(params) => diurnal::schedule(params, duration_sec),
        PatternParams::ViralSpike(params) => viral::schedule(params, duration_sec),
    }
}
