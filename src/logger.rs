use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;

/// Initializes the global tracing subscriber. Honors `LOADCURVE_LOG`,
/// falling back to `RUST_LOG`, defaulting to `debug` when `verbose` is set
/// and `info` otherwise.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = std::env::var("LOADCURVE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(filter))
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
