use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::{AppResult, ValidationError};

/// HTTP target: one method, one URL, one static header set, one timeout per attempt.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    pub base_url: String,
    pub method: String,
    pub timeout_sec: f64,
    pub headers: BTreeMap<String, String>,
}

impl TargetConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        url::Url::parse(&self.base_url).map_err(|source| ValidationError::InvalidUrl {
            value: self.base_url.clone(),
            source,
        })?;
        if self.timeout_sec <= 0.0 {
            return Err(ValidationError::MustBePositive {
                field: "timeout_sec",
                value: self.timeout_sec.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "snake_case")]
pub enum LoadModel {
    OpenLoop,
    ClosedLoop,
}

impl LoadModel {
    pub const fn as_str(self) -> &'static str {
        match self {
            LoadModel::OpenLoop => "open_loop",
            LoadModel::ClosedLoop => "closed_loop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DiurnalShape {
    Sine,
    Gaussian,
    Commuter,
}

impl DiurnalShape {
    pub const fn as_str(self) -> &'static str {
        match self {
            DiurnalShape::Sine => "sine",
            DiurnalShape::Gaussian => "gaussian",
            DiurnalShape::Commuter => "commuter",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BurstyParams {
    pub baseline_rps: f64,
    pub burst_rps: f64,
    pub burst_duration_sec: u64,
    pub burst_interval_sec: u64,
    pub jitter_pct: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct DiurnalParams {
    pub min_rps: f64,
    pub max_rps: f64,
    pub cycle_duration_sec: u64,
    pub shape: DiurnalShape,
}

#[derive(Debug, Clone, Copy)]
pub struct ViralSpikeParams {
    pub baseline_rps: f64,
    pub spike_multiplier: f64,
    pub ramp_up_sec: u64,
    pub peak_hold_sec: u64,
    pub decay_half_life_sec: u64,
}

/// Tagged pattern variant, each with its own explicit parameter record.
#[derive(Debug, Clone, Copy)]
pub enum PatternParams {
    Bursty(BurstyParams),
    Diurnal(DiurnalParams),
    ViralSpike(ViralSpikeParams),
}

impl PatternParams {
    pub const fn type_tag(&self) -> &'static str {
        match self {
            PatternParams::Bursty(_) => "bursty",
            PatternParams::Diurnal(_) => "diurnal",
            PatternParams::ViralSpike(_) => "viral_spike",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub enabled: bool,
    pub max_retries: u32,
    pub base_delay_sec: f64,
    pub max_delay_sec: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_retries: 2,
            base_delay_sec: 0.2,
            max_delay_sec: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub enabled: bool,
    pub window_size: usize,
    pub error_rate_threshold: f64,
    pub open_cooldown_sec: f64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window_size: 20,
            error_rate_threshold: 0.5,
            open_cooldown_sec: 5.0,
        }
    }
}

/// Immutable after construction; the caller builds one via [`RunConfig::new`]
/// which validates every field and assigns a run id if none is supplied.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub target: TargetConfig,
    pub pattern: PatternParams,
    pub duration_sec: u64,
    pub load_model: LoadModel,
    pub closed_loop_workers: usize,
    pub seed: u64,
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub notes: String,
}

/// Salt XORed into the seed to derive the open-loop fractional-draw RNG,
/// kept independent of the per-pattern jitter stream.
const OPEN_LOOP_STREAM_SALT: u64 = 0x5EED_1234_ABCD_EF01;

impl RunConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        target: TargetConfig,
        pattern: PatternParams,
        duration_sec: u64,
        load_model: LoadModel,
        closed_loop_workers: usize,
        seed: u64,
        retry: RetryConfig,
        circuit_breaker: CircuitBreakerConfig,
        run_id: Option<String>,
        notes: String,
    ) -> AppResult<Self> {
        target.validate().map_err(crate::error::AppError::validation)?;
        if duration_sec < 1 {
            return Err(crate::error::AppError::validation(ValidationError::MustBePositive {
                field: "duration_sec",
                value: duration_sec.to_string(),
            }));
        }
        if closed_loop_workers < 1 {
            return Err(crate::error::AppError::validation(ValidationError::MustBePositive {
                field: "closed_loop_workers",
                value: closed_loop_workers.to_string(),
            }));
        }
        validate_pattern(&pattern)?;

        let run_id = run_id.unwrap_or_else(generate_run_id);
        Ok(Self {
            run_id,
            created_at: Utc::now(),
            target,
            pattern,
            duration_sec,
            load_model,
            closed_loop_workers,
            seed,
            retry,
            circuit_breaker,
            notes,
        })
    }

    /// RNG seeded for this run's pattern jitter draw.
    pub fn jitter_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    /// RNG seeded for the open-loop fractional-rate draw, independent of jitter.
    pub fn open_loop_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ OPEN_LOOP_STREAM_SALT)
    }
}

fn validate_pattern(pattern: &PatternParams) -> AppResult<()> {
    match pattern {
        PatternParams::Bursty(p) => {
            if p.baseline_rps < 0.0 {
                return Err(crate::error::AppError::validation(ValidationError::MustBeNonNegative {
                    field: "baseline_rps",
                    value: p.baseline_rps.to_string(),
                }));
            }
            if p.burst_rps < 0.0 {
                return Err(crate::error::AppError::validation(ValidationError::MustBeNonNegative {
                    field: "burst_rps",
                    value: p.burst_rps.to_string(),
                }));
            }
        }
        PatternParams::Diurnal(p) => {
            if p.min_rps > p.max_rps {
                return Err(crate::error::AppError::validation(ValidationError::OutOfRange {
                    field: "min_rps",
                    min: "0".into(),
                    max: p.max_rps.to_string(),
                    value: p.min_rps.to_string(),
                }));
            }
        }
        PatternParams::ViralSpike(p) => {
            if p.baseline_rps < 0.0 {
                return Err(crate::error::AppError::validation(ValidationError::MustBeNonNegative {
                    field: "baseline_rps",
                    value: p.baseline_rps.to_string(),
                }));
            }
        }
    }
    Ok(())
}

fn generate_run_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ValidationError};

    fn target() -> TargetConfig {
        TargetConfig {
            base_url: "http://localhost:8080/".to_string(),
            method: "GET".to_string(),
            timeout_sec: 5.0,
            headers: BTreeMap::new(),
        }
    }

    fn viral_pattern() -> PatternParams {
        PatternParams::ViralSpike(ViralSpikeParams {
            baseline_rps: 10.0,
            spike_multiplier: 5.0,
            ramp_up_sec: 4,
            peak_hold_sec: 3,
            decay_half_life_sec: 2,
        })
    }

    fn new_config(
        duration_sec: u64,
        closed_loop_workers: usize,
        pattern: PatternParams,
    ) -> AppResult<RunConfig> {
        RunConfig::new(
            target(),
            pattern,
            duration_sec,
            LoadModel::OpenLoop,
            closed_loop_workers,
            7,
            RetryConfig::default(),
            CircuitBreakerConfig::default(),
            None,
            String::new(),
        )
    }

    #[test]
    fn zero_duration_is_rejected() {
        let err = new_config(0, 1, viral_pattern()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MustBePositive { field: "duration_sec", .. })
        ));
    }

    #[test]
    fn zero_closed_loop_workers_is_rejected() {
        let err = new_config(10, 0, viral_pattern()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MustBePositive {
                field: "closed_loop_workers",
                ..
            })
        ));
    }

    #[test]
    fn negative_bursty_rate_is_rejected() {
        let pattern = PatternParams::Bursty(BurstyParams {
            baseline_rps: -1.0,
            burst_rps: 100.0,
            burst_duration_sec: 3,
            burst_interval_sec: 10,
            jitter_pct: 0.0,
        });
        let err = new_config(10, 1, pattern).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MustBeNonNegative { field: "baseline_rps", .. })
        ));
    }

    #[test]
    fn diurnal_min_above_max_is_rejected() {
        let pattern = PatternParams::Diurnal(DiurnalParams {
            min_rps: 300.0,
            max_rps: 20.0,
            cycle_duration_sec: 100,
            shape: DiurnalShape::Sine,
        });
        let err = new_config(10, 1, pattern).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::OutOfRange { field: "min_rps", .. })
        ));
    }

    #[test]
    fn invalid_target_url_is_rejected() {
        let bad_target = TargetConfig {
            base_url: "not a url".to_string(),
            ..target()
        };
        let err = RunConfig::new(
            bad_target,
            viral_pattern(),
            10,
            LoadModel::OpenLoop,
            1,
            7,
            RetryConfig::default(),
            CircuitBreakerConfig::default(),
            None,
            String::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn valid_config_assigns_a_run_id_when_none_supplied() {
        let config = new_config(10, 1, viral_pattern()).expect("valid config");
        assert_eq!(config.run_id.len(), 32);
        assert!(config.run_id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
