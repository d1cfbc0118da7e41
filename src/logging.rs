//! Tracing subscriber setup for the CLI.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Filter directive for the configured level. `verbose` forces debug output
/// for this crate only so HTTP client internals stay quiet.
fn filter_directive(config: &LoggingConfig, verbose: bool) -> String {
    if verbose {
        format!("{},tripplanner=debug", config.level)
    } else {
        config.level.clone()
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
/// Safe to call more than once; only the first call has an effect.
pub fn init_tracing(config: &LoggingConfig, verbose: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, verbose)));

        let registry = tracing_subscriber::registry().with(filter);
        let installed = if config.format == "json" {
            registry
                .with(fmt::layer().json().with_current_span(true).with_writer(std::io::stderr))
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .try_init()
        };
        if let Err(e) = installed {
            eprintln!("Tracing already initialised: {e}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        let config = LoggingConfig {
            level: "warn".into(),
            format: "pretty".into(),
        };
        assert_eq!(filter_directive(&config, false), "warn");
        assert_eq!(filter_directive(&config, true), "warn,tripplanner=debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default();
        init_tracing(&config, false);
        init_tracing(&config, true);
    }
}
