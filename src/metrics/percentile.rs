/// Linear-interpolation percentile over a sample, matching the common
/// "linear" method (nearest-rank with fractional interpolation between the
/// two bracketing order statistics). `sorted` must already be sorted
/// ascending. Returns 0.0 for an empty sample.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sample_is_zero() {
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn single_value_returns_itself() {
        assert_eq!(percentile(&[42.0], 99.0), 42.0);
    }

    #[test]
    fn matches_spec_bucketing_scenario() {
        let mut sample = vec![10.0, 20.0];
        sample.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((percentile(&sample, 50.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn p99_interpolates_between_top_two() {
        let sample: Vec<f64> = (1..=100).map(|n| n as f64).collect();
        assert!((percentile(&sample, 99.0) - 99.01).abs() < 1e-6);
    }
}
