use clap::{Parser, Subcommand};

use crate::config::DiurnalShape;
use crate::config::LoadModel;

use super::parsers::parse_header;
use super::types::PatternKind;

#[derive(Debug, Parser)]
#[command(
    name = "loadcurve",
    version,
    about = "Traffic-pattern HTTP load generator: drives a target under a time-varying rate curve and records per-second metrics."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a load generation against a target.
    Run(RunArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Target URL for the run
    #[arg(long)]
    pub target: String,

    /// HTTP method to use
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Per-request timeout in seconds
    #[arg(long = "timeout-sec", default_value_t = 10.0)]
    pub timeout_sec: f64,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Duration of the run in seconds
    #[arg(long, default_value_t = 300)]
    pub duration: u64,

    /// Traffic pattern to drive
    #[arg(long, value_enum, default_value = "viral")]
    pub pattern: PatternKind,

    /// Load model
    #[arg(long = "load-model", value_enum, default_value = "open_loop")]
    pub load_model: LoadModel,

    /// Closed-loop worker count
    #[arg(long, default_value_t = 50)]
    pub workers: usize,

    /// Seed for deterministic jitter / open-loop fractional draws
    #[arg(long, default_value_t = 7)]
    pub seed: u64,

    /// Bursty: steady-state requests/sec
    #[arg(long = "baseline-rps", default_value_t = 30.0)]
    pub baseline_rps: f64,

    /// Bursty: requests/sec during a burst
    #[arg(long = "burst-rps", default_value_t = 500.0)]
    pub burst_rps: f64,

    /// Bursty: seconds each burst lasts
    #[arg(long = "burst-duration-sec", default_value_t = 10)]
    pub burst_duration_sec: u64,

    /// Bursty: seconds between burst starts
    #[arg(long = "burst-interval-sec", default_value_t = 120)]
    pub burst_interval_sec: u64,

    /// Bursty: fractional jitter applied to the base rate
    #[arg(long = "jitter-pct", default_value_t = 0.05)]
    pub jitter_pct: f64,

    /// Diurnal: trough requests/sec
    #[arg(long = "min-rps", default_value_t = 20.0)]
    pub min_rps: f64,

    /// Diurnal: peak requests/sec
    #[arg(long = "max-rps", default_value_t = 300.0)]
    pub max_rps: f64,

    /// Diurnal: seconds per cycle
    #[arg(long = "cycle-duration-sec", default_value_t = 1800)]
    pub cycle_duration_sec: u64,

    /// Diurnal: cycle shape
    #[arg(long, value_enum, default_value = "sine")]
    pub shape: DiurnalShape,

    /// Viral spike: peak = baseline * multiplier
    #[arg(long = "spike-multiplier", default_value_t = 100.0)]
    pub spike_multiplier: f64,

    /// Viral spike: ramp-up duration in seconds
    #[arg(long = "ramp-up-sec", default_value_t = 45)]
    pub ramp_up_sec: u64,

    /// Viral spike: seconds held at peak
    #[arg(long = "peak-hold-sec", default_value_t = 120)]
    pub peak_hold_sec: u64,

    /// Viral spike: decay half-life in seconds
    #[arg(long = "decay-half-life-sec", default_value_t = 90)]
    pub decay_half_life_sec: u64,

    /// Circuit breaker: enable request gating
    #[arg(long = "breaker-enabled")]
    pub breaker_enabled: bool,

    /// Circuit breaker: sliding window size
    #[arg(long = "breaker-window-size", default_value_t = 20)]
    pub breaker_window_size: usize,

    /// Circuit breaker: error-rate threshold that trips the breaker open
    #[arg(long = "breaker-error-rate-threshold", default_value_t = 0.5)]
    pub breaker_error_rate_threshold: f64,

    /// Circuit breaker: cooldown in seconds before a half-open probe
    #[arg(long = "breaker-open-cooldown-sec", default_value_t = 5.0)]
    pub breaker_open_cooldown_sec: f64,

    /// Retry: enable bounded retry with exponential backoff
    #[arg(long = "retry-enabled")]
    pub retry_enabled: bool,

    /// Retry: additional attempts after the first
    #[arg(long = "retry-max-retries", default_value_t = 2)]
    pub retry_max_retries: u32,

    /// Retry: base backoff delay in seconds
    #[arg(long = "retry-base-delay-sec", default_value_t = 0.2)]
    pub retry_base_delay_sec: f64,

    /// Retry: backoff delay cap in seconds
    #[arg(long = "retry-max-delay-sec", default_value_t = 2.0)]
    pub retry_max_delay_sec: f64,

    /// Explicit run id (generated if omitted)
    #[arg(long = "run-id")]
    pub run_id: Option<String>,

    /// Free-form notes stored with the run
    #[arg(long, default_value = "")]
    pub notes: String,

    /// Path to the SQLite database file
    #[arg(long, default_value = "./loadcurve-runs.sqlite3")]
    pub db: String,

    /// Enable verbose (debug) logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
