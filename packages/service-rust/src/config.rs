/// Settings for the dispatch pipeline.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Timeout applied to invocations built by `OperationDispatcher`, in
    /// milliseconds. Zero disables the timeout.
    pub default_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 30_000,
        }
    }
}

/// Settings for `telemetry::init_tracing`.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}
