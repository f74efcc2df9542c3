use serde::Serialize;
use serde_json::{Map, Value, json};

use super::types::{LoadModel, PatternParams, RunConfig};

/// Stable JSON projection of a [`RunConfig`], persisted as `run_meta.config_json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub run_id: String,
    pub created_at: String,
    pub duration_sec: u64,
    pub load_model: &'static str,
    pub closed_loop_workers: usize,
    pub seed: u64,
    pub notes: String,
    pub pattern: Value,
    pub target: Value,
    pub retry: Value,
    pub circuit_breaker: Value,
}

impl RunMetadata {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<&RunConfig> for RunMetadata {
    fn from(config: &RunConfig) -> Self {
        Self {
            run_id: config.run_id.clone(),
            created_at: config.created_at.to_rfc3339(),
            duration_sec: config.duration_sec,
            load_model: config.load_model.as_str(),
            closed_loop_workers: config.closed_loop_workers,
            seed: config.seed,
            notes: config.notes.clone(),
            pattern: pattern_json(&config.pattern),
            target: json!({
                "base_url": config.target.base_url,
                "method": config.target.method,
                "timeout_sec": config.target.timeout_sec,
                "headers": config.target.headers,
            }),
            retry: json!({
                "enabled": config.retry.enabled,
                "max_retries": config.retry.max_retries,
                "base_delay_sec": config.retry.base_delay_sec,
                "max_delay_sec": config.retry.max_delay_sec,
            }),
            circuit_breaker: json!({
                "enabled": config.circuit_breaker.enabled,
                "window_size": config.circuit_breaker.window_size,
                "error_rate_threshold": config.circuit_breaker.error_rate_threshold,
                "open_cooldown_sec": config.circuit_breaker.open_cooldown_sec,
            }),
        }
    }
}

fn pattern_json(pattern: &PatternParams) -> Value {
    let mut params = Map::new();
    match pattern {
        PatternParams::Bursty(p) => {
            params.insert("baseline_rps".into(), json!(p.baseline_rps));
            params.insert("burst_rps".into(), json!(p.burst_rps));
            params.insert("burst_duration_sec".into(), json!(p.burst_duration_sec));
            params.insert("burst_interval_sec".into(), json!(p.burst_interval_sec));
            params.insert("jitter_pct".into(), json!(p.jitter_pct));
        }
        PatternParams::Diurnal(p) => {
            params.insert("min_rps".into(), json!(p.min_rps));
            params.insert("max_rps".into(), json!(p.max_rps));
            params.insert("cycle_duration_sec".into(), json!(p.cycle_duration_sec));
            params.insert("shape".into(), json!(p.shape.as_str()));
        }
        PatternParams::ViralSpike(p) => {
            params.insert("baseline_rps".into(), json!(p.baseline_rps));
            params.insert("spike_multiplier".into(), json!(p.spike_multiplier));
            params.insert("ramp_up_sec".into(), json!(p.ramp_up_sec));
            params.insert("peak_hold_sec".into(), json!(p.peak_hold_sec));
            params.insert(
                "decay_half_life_sec".into(),
                json!(p.decay_half_life_sec),
            );
        }
    }
    json!({
        "type": pattern.type_tag(),
        "params": params,
    })
}
