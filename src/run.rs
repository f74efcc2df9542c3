//! Ties configuration, pattern scheduling, dispatch, aggregation, derived
//! signals, and storage together for the `run` CLI command.
use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use crate::args::{PatternKind, RunArgs};
use crate::config::{
    BurstyParams, CircuitBreakerConfig, DiurnalParams, LoadModel, PatternParams, RetryConfig,
    RunConfig, TargetConfig, ViralSpikeParams,
};
use crate::error::{AppError, AppResult, ConfigError};
use crate::metrics::aggregate_per_second;
use crate::pattern::schedule_for;
use crate::signals::{autoscaling_lag, overload_indicator, queueing_indicator};
use crate::storage::{SqliteStorage, Storage};

fn build_pattern(args: &RunArgs) -> PatternParams {
    match args.pattern {
        PatternKind::Bursty => PatternParams::Bursty(BurstyParams {
            baseline_rps: args.baseline_rps,
            burst_rps: args.burst_rps,
            burst_duration_sec: args.burst_duration_sec,
            burst_interval_sec: args.burst_interval_sec,
            jitter_pct: args.jitter_pct,
        }),
        PatternKind::Diurnal => PatternParams::Diurnal(DiurnalParams {
            min_rps: args.min_rps,
            max_rps: args.max_rps,
            cycle_duration_sec: args.cycle_duration_sec,
            shape: args.shape,
        }),
        PatternKind::Viral => PatternParams::ViralSpike(ViralSpikeParams {
            baseline_rps: args.baseline_rps,
            spike_multiplier: args.spike_multiplier,
            ramp_up_sec: args.ramp_up_sec,
            peak_hold_sec: args.peak_hold_sec,
            decay_half_life_sec: args.decay_half_life_sec,
        }),
    }
}

fn build_config(args: &RunArgs) -> AppResult<RunConfig> {
    let headers: BTreeMap<String, String> = args.headers.iter().cloned().collect();
    let target = TargetConfig {
        base_url: args.target.clone(),
        method: args.method.clone(),
        timeout_sec: args.timeout_sec,
        headers,
    };
    let pattern = build_pattern(args);
    let retry = RetryConfig {
        enabled: args.retry_enabled,
        max_retries: args.retry_max_retries,
        base_delay_sec: args.retry_base_delay_sec,
        max_delay_sec: args.retry_max_delay_sec,
    };
    let circuit_breaker = CircuitBreakerConfig {
        enabled: args.breaker_enabled,
        window_size: args.breaker_window_size,
        error_rate_threshold: args.breaker_error_rate_threshold,
        open_cooldown_sec: args.breaker_open_cooldown_sec,
    };
    let load_model = args.load_model;

    RunConfig::new(
        target,
        pattern,
        args.duration,
        load_model,
        args.workers,
        args.seed,
        retry,
        circuit_breaker,
        args.run_id.clone(),
        args.notes.clone(),
    )
}

/// Executes a full run: validate config, schedule the pattern, dispatch
/// load, aggregate, log derived signals, persist, and return the run id.
pub async fn run(args: RunArgs) -> AppResult<String> {
    let config = build_config(&args)?;

    let storage = SqliteStorage::open(Path::new(&args.db)).await?;
    if storage.run_exists(&config.run_id).await? {
        return Err(AppError::config(ConfigError::DuplicateRunId {
            run_id: config.run_id.clone(),
        }));
    }

    let mut jitter_rng = config.jitter_rng();
    let schedule = schedule_for(&config.pattern, config.duration_sec, &mut jitter_rng);

    info!(run_id = %config.run_id, duration = config.duration_sec, "starting run");

    let client = reqwest::Client::new();
    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel(1);
    let progress_task = tokio::spawn(async move {
        while let Some((done, total)) = progress_rx.recv().await {
            info!(done, total, "run progress");
        }
    });

    let (events, run_start) =
        crate::dispatch::run(&config, &schedule, client, Some(progress_tx)).await;
    let _ = progress_task.await;

    let per_second = aggregate_per_second(&config.run_id, &events, &schedule, run_start_offset(run_start));

    for window in queueing_indicator(&per_second) {
        warn!(?window, "queueing signal detected");
    }
    for window in overload_indicator(&per_second) {
        warn!(?window, "overload signal detected");
    }
    for window in autoscaling_lag(&per_second) {
        warn!(?window, "autoscale lag signal detected");
    }

    storage.save_run(&config, &events, &per_second).await?;

    info!(run_id = %config.run_id, events = events.len(), "run complete");
    Ok(config.run_id)
}

/// `RequestEvent::mono_time` is already seconds elapsed since `run_start`;
/// the aggregator's "run start monotonic" input is therefore zero.
fn run_start_offset(_run_start: std::time::Instant) -> f64 {
    0.0
}
