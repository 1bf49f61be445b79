use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "HONEYCOMB_LOG";

/// Installs the global fmt subscriber. `HONEYCOMB_LOG` wins over
/// `default_filter`; a second call is a no-op.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
