#[derive(Debug, Clone, PartialEq)]
pub struct PerSecondMetrics {
    pub run_id: String,
    pub second: u64,
    pub requested_rps: f64,
    pub achieved_rps: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub error_rate: f64,
    pub timeout_rate: f64,
}
