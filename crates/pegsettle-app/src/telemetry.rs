//! Structured logging setup.

use tracing_subscriber::EnvFilter;

use pegsettle_types::TelemetryConfig;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `cfg.level`. Returns `false` when a subscriber was
/// already installed, in which case nothing changes.
pub fn init_tracing(cfg: &TelemetryConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new(pegsettle_types::constants::DEFAULT_LOG_LEVEL));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if cfg.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    if installed {
        tracing::debug!(level = %cfg.level, json = cfg.json, "Tracing initialised");
    }
    installed
}
