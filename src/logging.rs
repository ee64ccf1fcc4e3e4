// Logging - tracing subscriber setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Filter directive from the config: `<level>[,<filters>]`
pub fn filter_directive(config: &LoggingConfig) -> String {
    let level = config.level.as_deref().unwrap_or("info");

    match config.filters.as_deref() {
        Some(filters) if !filters.is_empty() => format!("{},{}", level, filters),
        _ => level.to_string(),
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the config file.
pub fn init(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}
