//! Tracing subscriber setup for hosts embedding the dispatch pipeline.

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.filter` when it is set.
///
/// # Errors
///
/// Returns an error if the active filter directive (from `RUST_LOG` when set,
/// `config.filter` otherwise) is invalid, or a global subscriber is already
/// installed.
pub fn init_tracing(config: &LogConfig) -> anyhow::Result<()> {
    let from_env = match std::env::var_os(EnvFilter::DEFAULT_ENV) {
        Some(raw) => Some(
            raw.into_string()
                .map_err(|_| anyhow::anyhow!("{} is not valid unicode", EnvFilter::DEFAULT_ENV))?,
        ),
        None => None,
    };
    let filter = build_filter(from_env.as_deref(), &config.filter)?;

    let builder = fmt().with_env_filter(filter).with_target(true);
    if config.json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
    }
}

/// A set `RUST_LOG` wins, and a malformed one is an error rather than a
/// silent fallback to `fallback`.
fn build_filter(from_env: Option<&str>, fallback: &str) -> anyhow::Result<EnvFilter> {
    match from_env {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {} directive {directives:?}", EnvFilter::DEFAULT_ENV)),
        None => EnvFilter::try_new(fallback)
            .with_context(|| format!("invalid log filter {fallback:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LogConfig {
            filter: "outcome_service=loud".to_string(),
            json: false,
        };
        assert!(init_tracing(&config).is_err());
    }

    #[test]
    fn env_directive_takes_precedence() {
        // The malformed fallback is never parsed.
        assert!(build_filter(Some("outcome_service=debug"), "outcome_service=loud").is_ok());
    }

    #[test]
    fn malformed_env_directive_is_reported() {
        let err = build_filter(Some("outcome_service=loud"), "info").unwrap_err();
        assert!(err.to_string().contains("RUST_LOG"));
    }

    #[test]
    fn config_filter_applies_without_env() {
        assert!(build_filter(None, "info").is_ok());
        assert!(build_filter(None, "outcome_service=loud").is_err());
    }

    #[test]
    fn second_install_fails() {
        let config = LogConfig {
            filter: "debug".to_string(),
            json: true,
        };
        // Another test may have installed a subscriber already; either way
        // a repeated install must report an error instead of panicking.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
